//! Validate command handler

use super::load_document;
use crate::cli::ValidateArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use mare_core::ErrorKind;
use serde::Serialize;
use tracing::{info, instrument, warn};

/// Validation outcome of one chain
#[derive(Debug, Serialize)]
struct ChainStatus {
    name: Option<String>,
    valid: bool,
    steps: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ValidationReport {
    file: String,
    valid: bool,
    chains: Vec<ChainStatus>,
}

/// Handle the validate command
#[instrument(skip(_config, output), fields(file = %args.chain_file.display()))]
pub fn handle_validate(args: ValidateArgs, _config: &Config, output: &mut OutputWriter) -> Result<()> {
    output.info(&format!("Validating chain document: {}", args.chain_file.display()))?;

    let document = load_document(&args.chain_file)?;
    let chains = document.chains();
    if chains.is_empty() {
        output.warning("⚠ Document defines no chains")?;
    }

    let statuses: Vec<ChainStatus> = chains
        .iter()
        .map(|config| match config.build() {
            Ok(chain) => ChainStatus {
                name: config.name.clone(),
                valid: true,
                steps: chain.len(),
                error: None,
                kind: None,
                position: None,
            },
            Err(e) => {
                warn!(chain = ?config.name, "Chain failed validation: {}", e);
                ChainStatus {
                    name: config.name.clone(),
                    valid: false,
                    steps: config.transforms.len(),
                    error: Some(e.to_string()),
                    kind: Some(e.kind()),
                    position: e.position(),
                }
            }
        })
        .collect();

    let failed = statuses.iter().filter(|s| !s.valid).count();
    info!(chains = statuses.len(), failed, "Validation completed");

    if output.is_human() {
        for status in &statuses {
            let name = status.name.as_deref().unwrap_or("<unnamed>");
            if status.valid {
                output.success(&format!("✓ {} ({} step(s))", name, status.steps))?;
            } else {
                let at = status
                    .position
                    .map(|p| format!(" at step {}", p))
                    .unwrap_or_default();
                output.error(&format!("✗ {}{}", name, at))?;
                output.error(&format!("  {}", status.error.as_deref().unwrap_or_default()))?;
            }
        }
    } else {
        output.data(&ValidationReport {
            file: args.chain_file.display().to_string(),
            valid: failed == 0,
            chains: statuses,
        })?;
    }

    if failed > 0 {
        return Err(Error::other(format!(
            "Validation failed for {} chain(s)",
            failed
        )));
    }

    output.success("✓ Document is valid")?;
    Ok(())
}
