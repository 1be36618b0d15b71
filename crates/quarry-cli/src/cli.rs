//! CLI command definitions and argument parsing.

use crate::config::OutputFormat;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Quarry CLI - Extract structured records from large documents.
#[derive(Debug, Parser)]
#[command(name = "quarry")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (defaults to ~/.quarry/config.toml)
    #[arg(short, long, global = true, env = "QUARRY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Pretty JSON (default)
    Json,
    /// Table format
    Table,
    /// Quiet format (counts only)
    Quiet,
}

impl From<CliFormat> for OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Json => OutputFormat::Json,
            CliFormat::Table => OutputFormat::Table,
            CliFormat::Quiet => OutputFormat::Quiet,
        }
    }
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract records from a PDF document
    Extract(ExtractArgs),

    /// Show how a document would be chunked, without calling the backend
    Plan(PlanArgs),

    /// Write a default configuration file
    Init(InitArgs),
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// PDF document to process
    pub file: PathBuf,

    /// Extraction instruction sent with every chunk
    #[arg(short, long)]
    pub instruction: Option<String>,

    /// Write records to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Model name override
    #[arg(short, long)]
    pub model: Option<String>,
}

/// Arguments for the plan command.
#[derive(Debug, Parser)]
pub struct PlanArgs {
    /// PDF document to inspect
    pub file: PathBuf,
}

/// Arguments for the init command.
#[derive(Debug, Parser)]
pub struct InitArgs {
    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extract() {
        let cli = Cli::try_parse_from([
            "quarry",
            "extract",
            "reports.pdf",
            "--instruction",
            "Extract lab reports",
            "-o",
            "out.json",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Extract(args) => {
                assert_eq!(args.file, PathBuf::from("reports.pdf"));
                assert_eq!(args.instruction.as_deref(), Some("Extract lab reports"));
                assert_eq!(args.output, Some(PathBuf::from("out.json")));
                assert_eq!(args.model, None);
            }
            other => panic!("Expected extract, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_plan_with_global_flags() {
        let cli = Cli::try_parse_from(["quarry", "plan", "big.pdf", "--format", "table", "--no-color"])
            .unwrap();
        assert_eq!(cli.format, Some(CliFormat::Table));
        assert!(cli.no_color);
        assert!(matches!(cli.command, Command::Plan(_)));
    }

    #[test]
    fn test_extract_requires_file() {
        assert!(Cli::try_parse_from(["quarry", "extract"]).is_err());
    }
}
