use std::path::Path;

use chit_ledger::{ClickOutcome, Commit, StepOutcome};
use colored::Colorize;

pub fn run(path: &Path, json: bool, force: bool) -> Result<(), String> {
    let script = super::load_script(path)?;
    let replay = script.replay().map_err(|e| e.to_string())?;
    let session = replay.session;
    let force = force || script.force;

    if json {
        let commit = session.commit(force).map_err(|e| e.to_string())?;
        let out = serde_json::to_string_pretty(&commit).map_err(|e| e.to_string())?;
        println!("{out}");
        return Ok(());
    }

    println!("  {}", super::session_title(&script).bold());
    if session.count_too_large() {
        println!(
            "  {}",
            format!(
                "target {} is more than the chits can absorb",
                script.policy.target()
            )
            .yellow()
        );
    }
    println!();

    for (i, outcome) in replay.outcomes.iter().enumerate() {
        let line = match outcome {
            StepOutcome::Reset => "reset".dimmed().to_string(),
            StepOutcome::Click(ClickOutcome::Moved { chit, from, to }) => {
                format!("{chit}: {from} -> {to}")
            }
            StepOutcome::Click(ClickOutcome::Ignored) => "ignored".dimmed().to_string(),
            StepOutcome::Click(ClickOutcome::Blocked(reason)) => {
                format!("blocked: {reason}").red().to_string()
            }
        };
        println!("  {:>3}. {line}", i + 1);
    }
    if !replay.outcomes.is_empty() {
        println!();
    }

    println!("{}", super::bin_table(&session));
    println!();
    println!("  {}", session.budget_summary());

    let commit = session.commit(force).map_err(|e| e.to_string())?;
    print_commit(&commit);

    Ok(())
}

fn print_commit(commit: &Commit) {
    println!();
    for line in commit.log.to_string().lines() {
        println!("  {line}");
    }
    if commit.lost_asterisks > 0 {
        println!(
            "  {}",
            format!("{} asterisks lost for want of change", commit.lost_asterisks).yellow()
        );
    }
    if commit.unused > 0 {
        println!("  {}", format!("{} left unused", commit.unused).yellow());
    }
    println!("  {}", "committed".green());
}
