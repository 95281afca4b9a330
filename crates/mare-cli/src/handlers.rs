//! Command handlers for CLI subcommands
//!
//! Each subcommand lives in its own module; this module keeps the document
//! loading shared between them.

mod list;
mod run;
mod validate;

pub use list::handle_list;
pub use run::handle_run;
pub use validate::handle_validate;

use crate::config::is_yaml;
use crate::error::{Error, Result};
use mare_core::{ConfigDocument, InMemoryDirectory};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Read a JSON or YAML file, choosing the parser by extension
fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = content.len(), "Read input file");

    if is_yaml(path) {
        serde_yaml::from_str(&content).map_err(|e| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "YAML".to_string(),
            reason: e.to_string(),
        })
    } else {
        serde_json::from_str(&content).map_err(|e| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "JSON".to_string(),
            reason: e.to_string(),
        })
    }
}

/// Load a chain document holding one chain or several named chains
pub fn load_document(path: &Path) -> Result<ConfigDocument> {
    load_file(path)
}

/// Load the directory entries served to `LookupMVValue`
pub fn load_directory(path: &Path) -> Result<InMemoryDirectory> {
    let directory: InMemoryDirectory = load_file(path)?;
    debug!(entries = directory.len(), "Loaded lookup directory");
    Ok(directory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_yaml_and_json_documents() {
        let mut yaml = NamedTempFile::with_suffix(".yml").unwrap();
        writeln!(
            yaml,
            "name: mail\ntransforms:\n  - type: Trim\n  - type: PadLeft\n    TotalWidth: 4\n    PaddingChar: '0'"
        )
        .unwrap();
        let doc = load_document(yaml.path()).unwrap();
        let chain = doc.select(None).unwrap().build().unwrap();
        assert_eq!(chain.name(), Some("mail"));
        assert_eq!(chain.len(), 2);

        let mut json = NamedTempFile::with_suffix(".json").unwrap();
        write!(json, r#"{{"chains": [{{"name": "a", "transforms": []}}, {{"name": "b", "transforms": []}}]}}"#).unwrap();
        let doc = load_document(json.path()).unwrap();
        assert_eq!(doc.chains().len(), 2);
    }

    #[test]
    fn test_unreadable_documents() {
        let missing = load_document(Path::new("/nonexistent/chain.json"));
        assert!(matches!(missing, Err(Error::FileNotFound { .. })));

        let mut bad = NamedTempFile::with_suffix(".json").unwrap();
        write!(bad, "[1, 2").unwrap();
        assert!(matches!(load_document(bad.path()), Err(Error::InvalidFormat { .. })));
    }

    #[test]
    fn test_directory_file() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        writeln!(
            file,
            "entries:\n  - attributes:\n      employeeID: '7'\n      mail: ada@example.com"
        )
        .unwrap();
        let directory = load_directory(file.path()).unwrap();
        assert_eq!(directory.len(), 1);
    }
}
