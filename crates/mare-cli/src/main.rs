//! MARE CLI - command-line interface for attribute value transform chains
//!
//! This is the main entry point for the `mare` binary, providing commands
//! for validating chain documents, listing the transform catalog and
//! evaluating chains against values.
//!
//! Copyright (c) 2025 MARE Team
//! Licensed under the Apache-2.0 license

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands, OutputFormat};
use colored::control;
use config::Config;
use error::Result;
use logging::{CommandTimer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;

fn main() {
    let cli = Cli::parse_args();

    control::set_override(cli.use_color());

    let result = Config::load_with_file(cli.config.as_deref()).and_then(|config| {
        if let Err(e) = init_logging(&cli, &config) {
            eprintln!("Failed to initialize logging: {}", e);
        }
        run(cli, config)
    });

    match result {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("{}", error::format_error(&e, control::SHOULD_COLORIZE.should_colorize()));

            if e.should_show_help() {
                eprintln!("\nFor more information, try '--help'");
            }

            process::exit(e.exit_code());
        }
    }
}

/// Main application logic
#[instrument(skip(cli, config), fields(command = ?cli.command))]
fn run(cli: Cli, config: Config) -> Result<()> {
    let _timer = CommandTimer::start(cli.command.name());

    let format = effective_format(&cli, &config);
    let use_color = cli.use_color() && config.output.color;
    let mut output = OutputWriter::new(format, use_color, cli.quiet, cli.verbosity_level());

    tracing::info!(
        command = ?cli.command,
        verbosity = cli.verbosity_level(),
        format = ?format,
        "Executing command"
    );

    match cli.command {
        Commands::Run(args) => handlers::handle_run(args, &config, &mut output),
        Commands::Validate(args) => handlers::handle_validate(args, &config, &mut output),
        Commands::List(args) => handlers::handle_list(args, &config, &mut output),
    }
}

/// Command-line choice first, then the configuration file
fn effective_format(cli: &Cli, config: &Config) -> OutputFormat {
    cli.output.unwrap_or(config.output.format)
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: &Config) -> Result<()> {
    let mut logging_config = LoggingConfig::from_verbosity(cli.verbosity_level());
    logging_config.merge_with_file(&config.logging, cli.verbosity_level());
    logging_config.merge_with_env();

    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}
