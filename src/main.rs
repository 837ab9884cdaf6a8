use beads_ready::cli::commands;
use beads_ready::cli::{Cli, Commands};
use beads_ready::config;
use beads_ready::logging::init_logging;
use beads_ready::{ReadyError, StructuredError};
use clap::Parser;
use std::io::{self, IsTerminal};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.quiet, false) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let overrides = build_cli_overrides(&cli);
    let workspace = cli.workspace.as_path();

    let result = match &cli.command {
        Commands::Status => commands::status::execute(workspace, cli.json, &overrides),
        Commands::List(args) => commands::list::execute(workspace, args, cli.json, &overrides),
        Commands::Ready(args) => commands::ready::execute(workspace, args, cli.json, &overrides),
        Commands::Completions(args) => commands::completions::execute(args),
    };

    if let Err(e) = result {
        handle_error(&e, cli.json);
    }
}

/// Handle errors with structured output support.
///
/// When --json is set or stdout is not a TTY, outputs structured JSON to stderr.
/// Otherwise, outputs human-readable error with optional color.
fn handle_error(err: &ReadyError, json_mode: bool) -> ! {
    let structured = StructuredError::from_error(err);
    let exit_code = structured.code.exit_code();

    if json_mode || !io::stdout().is_terminal() {
        let json = structured.to_json();
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
        );
    } else {
        eprintln!("{}", structured.to_human(io::stderr().is_terminal()));
    }

    std::process::exit(exit_code);
}

fn build_cli_overrides(cli: &Cli) -> config::CliOverrides {
    config::CliOverrides {
        db: cli.db.clone(),
        jsonl: cli.jsonl.clone(),
        lock_timeout: cli.lock_timeout,
        no_color: cli.no_color.then_some(true),
    }
}
