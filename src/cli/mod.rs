//! CLI definitions and entry point.

use crate::classify::Label;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;

/// Dependency-aware readiness for beads issue trackers
#[derive(Parser, Debug)]
#[command(name = "bready", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace directory to query (searched upward for .beads)
    #[arg(long, global = true, default_value = ".")]
    pub workspace: PathBuf,

    /// Database path (auto-discover .beads/*.db if not set)
    #[arg(long, global = true, conflicts_with = "jsonl")]
    pub db: Option<PathBuf>,

    /// Read a JSONL export instead of the database
    #[arg(long, global = true)]
    pub jsonl: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// `SQLite` busy timeout in ms
    #[arg(long, global = true)]
    pub lock_timeout: Option<u64>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show issue counts: total, ready, in progress, completed
    Status,

    /// List every issue with its computed readiness label
    List(ListArgs),

    /// List issues ready to work on (not done, not blocked)
    Ready(ReadyArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the list command.
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Only show issues with this computed label (can be repeated)
    #[arg(long, short = 'l', value_parser = parse_label)]
    pub label: Vec<Label>,

    /// Maximum number of issues to return (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    pub limit: usize,
}

/// Arguments for the ready command.
#[derive(Args, Debug, Clone, Default)]
pub struct ReadyArgs {
    /// Maximum number of issues to return (default: 20, 0 = unlimited)
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

/// Arguments for the completions command.
#[derive(Args, Debug, Clone)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: ShellType,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Supported shells for completion generation.
#[derive(ValueEnum, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ShellType {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    #[value(name = "powershell")]
    #[value(alias = "pwsh")]
    /// `PowerShell`
    PowerShell,
    /// Elvish
    Elvish,
}

fn parse_label(value: &str) -> std::result::Result<Label, String> {
    value.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn list_accepts_repeated_labels() {
        let cli = Cli::try_parse_from(["bready", "list", "-l", "ready", "--label", "in-progress"])
            .unwrap();
        match cli.command {
            Commands::List(args) => {
                assert_eq!(args.label, vec![Label::Ready, Label::InProgress]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn list_rejects_unknown_label() {
        assert!(Cli::try_parse_from(["bready", "list", "--label", "someday"]).is_err());
    }

    #[test]
    fn db_and_jsonl_conflict() {
        assert!(
            Cli::try_parse_from(["bready", "status", "--db", "a.db", "--jsonl", "b.jsonl"])
                .is_err()
        );
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["bready", "ready", "--json", "--limit", "5", "-vv"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.workspace, PathBuf::from("."));
        assert!(matches!(cli.command, Commands::Ready(ReadyArgs { limit: 5 })));
    }
}
