//! CLI frontend for chit ledger sessions.

mod commands;

use std::path::PathBuf;
use std::process;

use chit_ledger::PolicyKind;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "chits",
    about = "Replay fatigue, rest and wound sessions over action chits",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log every click to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a session script and show the committed result
    Run {
        /// Session script (JSON)
        script: PathBuf,

        /// Print the commit as JSON instead of tables
        #[arg(long)]
        json: bool,

        /// Confirm an early exit when the session ends incomplete
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a session script without replaying it
    Check {
        /// Session script (JSON)
        script: PathBuf,
    },

    /// Write a template session script
    Init {
        /// File to create
        file: PathBuf,

        /// Session kind of the template
        #[arg(short, long, value_enum, default_value = "fatigue")]
        policy: PolicyArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Fatigue,
    Rest,
    Wound,
}

impl From<PolicyArg> for PolicyKind {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Fatigue => Self::Fatigue,
            PolicyArg::Rest => Self::Rest,
            PolicyArg::Wound => Self::Wound,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "chit_ledger=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Run {
            script,
            json,
            force,
        } => commands::run::run(&script, json, force),
        Commands::Check { script } => commands::check::run(&script),
        Commands::Init { file, policy } => commands::init::run(&file, policy.into()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
