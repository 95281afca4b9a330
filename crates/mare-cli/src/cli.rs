//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API.
//!
//! Copyright (c) 2025 MARE Team
//! Licensed under the Apache-2.0 license

use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// MARE CLI - run attribute value transform chains
///
/// Validates transform chain documents, lists the transform catalog and
/// evaluates chains against values from the command line.
#[derive(Parser, Debug)]
#[command(
    name = "mare",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "MARE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results [default: human, or the config file's choice]
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a transform chain against a value
    Run(RunArgs),

    /// Build every chain in a document and report configuration errors
    Validate(ValidateArgs),

    /// List the transform catalog and its parameters
    List(ListArgs),
}

impl Commands {
    /// Subcommand name as typed on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Run(_) => "run",
            Commands::Validate(_) => "validate",
            Commands::List(_) => "list",
        }
    }
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the chain document (JSON or YAML)
    #[arg(value_name = "CHAIN_FILE")]
    pub chain_file: PathBuf,

    /// Name of the chain to run when the document holds several
    #[arg(long)]
    pub chain: Option<String>,

    /// Input value; repeat to pass a multi-value
    #[arg(long = "value", value_name = "V", conflicts_with = "absent")]
    pub values: Vec<String>,

    /// Treat the input as a multi-value even with a single --value
    #[arg(long)]
    pub multi: bool,

    /// Evaluate the chain with no input value
    #[arg(long)]
    pub absent: bool,

    /// JSON or YAML file of directory entries used by LookupMVValue
    #[arg(long, value_name = "FILE")]
    pub directory: Option<PathBuf>,

    /// Print the per-step trace records
    #[arg(long)]
    pub trace: bool,
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to the chain document (JSON or YAML)
    #[arg(value_name = "CHAIN_FILE")]
    pub chain_file: PathBuf,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Show only this catalog entry
    #[arg(value_name = "TRANSFORM")]
    pub transform: Option<String>,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_level() {
        let cli = Cli {
            verbose: 2,
            quiet: false,
            config: None,
            output: None,
            no_color: false,
            command: Commands::Validate(ValidateArgs {
                chain_file: PathBuf::from("chain.json"),
            }),
        };
        assert_eq!(cli.verbosity_level(), 2);

        let quiet_cli = Cli {
            verbose: 2,
            quiet: true,
            ..cli
        };
        assert_eq!(quiet_cli.verbosity_level(), 0);
    }

    #[test]
    fn test_run_args() {
        let cli = Cli::parse_from([
            "mare", "run", "chain.yaml", "--chain", "mail", "--value", "a", "--value", "b",
            "--trace", "-o", "json-pretty",
        ]);
        assert_eq!(cli.output, Some(OutputFormat::JsonPretty));
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.chain_file, PathBuf::from("chain.yaml"));
                assert_eq!(args.chain.as_deref(), Some("mail"));
                assert_eq!(args.values, vec!["a", "b"]);
                assert!(args.trace);
                assert!(!args.absent);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_value_conflicts_with_absent() {
        let result = Cli::try_parse_from(["mare", "run", "c.json", "--value", "x", "--absent"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_output_format_names() {
        assert_eq!(
            serde_json::from_str::<OutputFormat>("\"json-pretty\"").unwrap(),
            OutputFormat::JsonPretty
        );
    }
}
