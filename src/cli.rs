//! CLI argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

/// Top-level CLI parser for `ripple`.
#[derive(Debug, Parser)]
#[command(name = "ripple", version, about = "Report the downstream impact of API surface changes")]
pub struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Diff files against a revision and report what they break downstream.
    Analyze(AnalyzeArgs),
    /// Print the API surface snapshot of one file.
    Snapshot {
        /// File to snapshot.
        file: PathBuf,
        /// Output format.
        #[arg(long, value_enum, default_value_t = SnapshotFormat::Json)]
        format: SnapshotFormat,
    },
    /// List the files and tests that transitively import a file.
    Dependents {
        /// File whose importers to list.
        file: PathBuf,
        /// Project root to walk.
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
}

/// Arguments of `ripple analyze`.
#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Files to analyze. Defaults to the files git reports as changed.
    pub files: Vec<PathBuf>,

    /// Project root to walk for dependents.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Revision holding the "before" content.
    #[arg(long, default_value = "HEAD")]
    pub rev: String,

    /// Read the "before" content from this file instead of git.
    #[arg(long)]
    pub before: Option<PathBuf>,

    /// Read the "after" content from this file instead of the working tree.
    #[arg(long)]
    pub after: Option<PathBuf>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = ReportFormat::Json)]
    pub format: ReportFormat,

    /// Write the report here instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Exit with status 2 when any breaking change is found.
    #[arg(long)]
    pub fail_on_breaking: bool,
}

/// Output formats for impact reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Deterministic JSON.
    Json,
    /// Human-readable summary.
    Text,
}

/// Output formats for snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SnapshotFormat {
    /// Pretty-printed JSON.
    Json,
    /// YAML.
    Yaml,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_defaults_to_head_and_json() {
        let cli = Cli::parse_from(["ripple", "analyze", "src/a.ts"]);
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.files, vec![PathBuf::from("src/a.ts")]);
        assert_eq!(args.rev, "HEAD");
        assert_eq!(args.format, ReportFormat::Json);
        assert_eq!(args.root, PathBuf::from("."));
        assert!(!args.fail_on_breaking);
    }

    #[test]
    fn analyze_accepts_explicit_sides() {
        let cli = Cli::parse_from([
            "ripple",
            "analyze",
            "a.ts",
            "--before",
            "old.ts",
            "--format",
            "text",
            "--fail-on-breaking",
        ]);
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.before, Some(PathBuf::from("old.ts")));
        assert_eq!(args.format, ReportFormat::Text);
        assert!(args.fail_on_breaking);
    }

    #[test]
    fn verbosity_is_global_and_counted() {
        let cli = Cli::parse_from(["ripple", "dependents", "a.ts", "-vv"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Dependents { .. }));
    }

    #[test]
    fn snapshot_parses_yaml_format() {
        let cli = Cli::parse_from(["ripple", "snapshot", "a.ts", "--format", "yaml"]);
        assert!(matches!(cli.command, Command::Snapshot { format: SnapshotFormat::Yaml, .. }));
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["ripple", "analyze", "--format", "xml"]).is_err());
    }
}
