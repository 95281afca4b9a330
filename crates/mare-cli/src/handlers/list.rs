//! List command handler

use crate::cli::ListArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use mare_core::TransformKind;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct CatalogEntry {
    name: &'static str,
    parameters: Vec<ParameterEntry>,
}

#[derive(Debug, Serialize)]
struct ParameterEntry {
    name: &'static str,
    #[serde(rename = "type")]
    kind: String,
    required: bool,
    description: &'static str,
}

impl From<TransformKind> for CatalogEntry {
    fn from(kind: TransformKind) -> Self {
        Self {
            name: kind.name(),
            parameters: kind
                .parameters()
                .iter()
                .map(|p| ParameterEntry {
                    name: p.name,
                    kind: p.kind.to_string(),
                    required: p.required,
                    description: p.description,
                })
                .collect(),
        }
    }
}

/// Handle the list command
pub fn handle_list(args: ListArgs, _config: &Config, output: &mut OutputWriter) -> Result<()> {
    let kinds: Vec<TransformKind> = match &args.transform {
        Some(name) => vec![name.parse::<TransformKind>().map_err(Error::invalid_args)?],
        None => TransformKind::ALL.to_vec(),
    };
    let entries: Vec<CatalogEntry> = kinds.into_iter().map(CatalogEntry::from).collect();

    if !output.is_human() {
        return output.data(&entries);
    }

    if let [entry] = entries.as_slice() {
        output.section(entry.name)?;
        if entry.parameters.is_empty() {
            return output.writeln("No parameters");
        }
        let rows = entry
            .parameters
            .iter()
            .map(|p| {
                vec![
                    p.name.to_string(),
                    p.kind.clone(),
                    if p.required { "yes" } else { "no" }.to_string(),
                    p.description.to_string(),
                ]
            })
            .collect();
        return output.table(&["Parameter", "Type", "Required", "Description"], rows);
    }

    let rows = entries
        .iter()
        .map(|entry| {
            let params = entry
                .parameters
                .iter()
                .map(|p| if p.required { p.name.to_string() } else { format!("[{}]", p.name) })
                .collect::<Vec<_>>()
                .join(", ");
            vec![entry.name.to_string(), params]
        })
        .collect();
    output.table(&["Transform", "Parameters"], rows)
}
