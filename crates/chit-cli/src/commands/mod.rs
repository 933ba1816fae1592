pub mod check;
pub mod init;
pub mod run;

use std::path::Path;

use chit_ledger::{Bin, Chit, Session, SessionScript, categories};
use comfy_table::{ContentArrangement, Table};

/// Load a session script, mapping failures to a printable message.
fn load_script(path: &Path) -> Result<SessionScript, String> {
    SessionScript::load(path).map_err(|e| format!("{}: {e}", path.display()))
}

/// One row per chit, in bin order, with held alerted chits last.
fn bin_table(session: &Session) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Chit", "Effort", "Kind", "Bin"]);

    for bin in Bin::ALL {
        for chit in session.bin(bin) {
            table.add_row(chit_row(chit, &bin.to_string()));
        }
    }
    for chit in session.held() {
        table.add_row(chit_row(chit, "(alerted)"));
    }
    table
}

fn chit_row(chit: &Chit, bin: &str) -> Vec<String> {
    vec![
        chit.label().to_string(),
        chit.effort.to_string(),
        categories(chit).to_string(),
        bin.to_string(),
    ]
}

fn session_title(script: &SessionScript) -> String {
    match &script.character {
        Some(name) => format!("{} session for {name}", script.policy.kind()),
        None => format!("{} session", script.policy.kind()),
    }
}
