use std::fs;
use std::path::Path;

use chit_ledger::{PolicyKind, SessionScript};

pub fn run(path: &Path, kind: PolicyKind) -> Result<(), String> {
    if path.exists() {
        return Err(format!("file '{}' already exists", path.display()));
    }

    let json = SessionScript::template(kind)
        .to_json()
        .map_err(|e| e.to_string())?;
    fs::write(path, json + "\n")
        .map_err(|e| format!("cannot write {}: {e}", path.display()))?;

    println!("Created {kind} session script {}", path.display());
    println!();
    println!("Add click steps, then:");
    println!("  chits check {}", path.display());
    println!("  chits run {}", path.display());

    Ok(())
}
