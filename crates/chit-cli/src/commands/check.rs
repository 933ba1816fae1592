use std::path::Path;

use chit_ledger::Step;
use colored::Colorize;

pub fn run(path: &Path) -> Result<(), String> {
    let script = super::load_script(path)?;
    let session = script.start().map_err(|e| e.to_string())?;

    println!(
        "  {} ({} chits, target {})",
        super::session_title(&script).bold(),
        script.chits.len(),
        script.policy.target()
    );
    match session.capacity() {
        Some(capacity) => println!("  capacity:  {capacity}"),
        None => println!("  capacity:  unbounded"),
    }
    if session.count_too_large() {
        println!(
            "  {}",
            format!("target clamped to {}", session.count()).yellow()
        );
    }

    let replay = script.replay().map_err(|e| e.to_string())?;
    let clicks = script
        .steps
        .iter()
        .filter(|s| matches!(s, Step::Click(_)))
        .count();
    println!("  {} steps, {clicks} clicks", script.steps.len());

    let session = replay.session;
    if session.is_complete() {
        println!("  {}", "session completes".green());
    } else if session.needs_confirmation() {
        println!("  {}", "session ends early; commit needs --force".yellow());
    } else {
        return Err(format!("session does not complete: {}", session.budget_summary()));
    }

    Ok(())
}
