//! Configuration document loading.
//!
//! This module turns files on disk into plain YAML mappings: the main
//! configuration document, and the YAML front matter of CSVY model files
//! referenced through `csvy_model`.

use crate::error::{Error, Result};
use serde_yaml::Mapping;
use std::fs;
use std::path::Path;

/// Delimiter line around the YAML header of a CSVY file.
pub const CSVY_DELIMITER: &str = "---";

/// Loads YAML configuration documents.
///
/// # Examples
///
/// ```no_run
/// use tardis_config::config::DocumentLoader;
/// use std::path::Path;
///
/// let doc = DocumentLoader::load_file(Path::new("tardis_example.yml")).unwrap();
/// println!("Found {} top-level sections", doc.len());
/// ```
pub struct DocumentLoader;

impl DocumentLoader {
    /// Load and parse a YAML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DocumentLoad`] if the file cannot be read, the YAML
    /// is invalid, or the top level is not a mapping.
    pub fn load_file(path: &Path) -> Result<Mapping> {
        let contents = fs::read_to_string(path).map_err(|e| Error::DocumentLoad {
            path: path.to_path_buf(),
            reason: format!("failed to read configuration file: {e}"),
        })?;

        log::debug!("loaded configuration document {}", path.display());
        Self::parse_str(path, &contents)
    }

    /// Parse YAML text into a mapping, attributing errors to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DocumentLoad`] if the YAML is invalid or the top
    /// level is not a mapping.
    pub fn parse_str(path: &Path, contents: &str) -> Result<Mapping> {
        let value: serde_yaml::Value =
            serde_yaml::from_str(contents).map_err(|e| Error::DocumentLoad {
                path: path.to_path_buf(),
                reason: format!("invalid YAML: {e}"),
            })?;

        match value {
            serde_yaml::Value::Mapping(mapping) => Ok(mapping),
            serde_yaml::Value::Null => Ok(Mapping::new()),
            other => Err(Error::DocumentLoad {
                path: path.to_path_buf(),
                reason: format!(
                    "top level must be a mapping, found {}",
                    yaml_kind(&other)
                ),
            }),
        }
    }
}

fn yaml_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "a boolean",
        serde_yaml::Value::Number(_) => "a number",
        serde_yaml::Value::String(_) => "a string",
        serde_yaml::Value::Sequence(_) => "a sequence",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
    }
}

/// Source of the YAML header of a CSVY model file.
///
/// The configuration only consumes `v_inner_boundary` and
/// `v_outer_boundary` from the returned mapping.
pub trait CsvyLoader {
    /// Load the YAML header of the CSVY file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DocumentLoad`] if the file cannot be read or has no
    /// valid header.
    fn load(&self, path: &Path) -> Result<Mapping>;
}

/// Reads the YAML front matter between the first two `---` lines.
///
/// # Examples
///
/// ```
/// use tardis_config::config::CsvyFrontMatterLoader;
/// use std::path::Path;
///
/// let text = "---\nv_inner_boundary: 9000 km/s\n---\nvelocity,density\n";
/// let header = CsvyFrontMatterLoader::parse_front_matter(Path::new("model.csvy"), text).unwrap();
/// assert!(header.contains_key("v_inner_boundary"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvyFrontMatterLoader;

impl CsvyFrontMatterLoader {
    /// Extract and parse the front matter of CSVY text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DocumentLoad`] if the first line is not `---`, the
    /// closing `---` is missing, or the header is not a YAML mapping.
    pub fn parse_front_matter(path: &Path, contents: &str) -> Result<Mapping> {
        let mut lines = contents.lines();

        if lines.next().map(str::trim) != Some(CSVY_DELIMITER) {
            return Err(Error::DocumentLoad {
                path: path.to_path_buf(),
                reason: format!("first line of CSVY file is not '{CSVY_DELIMITER}'"),
            });
        }

        let mut header = Vec::new();
        let mut closed = false;
        for line in lines {
            if line.trim() == CSVY_DELIMITER {
                closed = true;
                break;
            }
            header.push(line);
        }

        if !closed {
            return Err(Error::DocumentLoad {
                path: path.to_path_buf(),
                reason: format!("closing '{CSVY_DELIMITER}' of CSVY header not found"),
            });
        }

        DocumentLoader::parse_str(path, &header.join("\n"))
    }
}

impl CsvyLoader for CsvyFrontMatterLoader {
    fn load(&self, path: &Path) -> Result<Mapping> {
        let contents = fs::read_to_string(path).map_err(|e| Error::DocumentLoad {
            path: path.to_path_buf(),
            reason: format!("failed to read CSVY model: {e}"),
        })?;

        log::debug!("loaded CSVY model header {}", path.display());
        Self::parse_front_matter(path, &contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_nonexistent_file() {
        let result = DocumentLoader::load_file(Path::new("/nonexistent/path/tardis.yml"));
        assert!(matches!(result, Err(Error::DocumentLoad { .. })));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("bad.yml");
        fs::write(&config_path, "invalid: yaml: syntax:").unwrap();

        let result = DocumentLoader::load_file(&config_path);
        assert!(matches!(result, Err(Error::DocumentLoad { .. })));
    }

    #[test]
    fn test_load_non_mapping_root() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("list.yml");
        fs::write(&config_path, "- a\n- b\n").unwrap();

        let err = DocumentLoader::load_file(&config_path).unwrap_err();
        assert!(err.to_string().contains("a sequence"));
    }

    #[test]
    fn test_load_valid_document() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("tardis.yml");
        fs::write(
            &config_path,
            "tardis_config_version: v1.0\nsupernova:\n  time_explosion: 13 day\n",
        )
        .unwrap();

        let doc = DocumentLoader::load_file(&config_path).unwrap();
        assert_eq!(
            doc.get("tardis_config_version").and_then(|v| v.as_str()),
            Some("v1.0")
        );
    }

    #[test]
    fn test_empty_document_is_empty_mapping() {
        let doc = DocumentLoader::parse_str(Path::new("empty.yml"), "").unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_csvy_front_matter() {
        let text = "---\nname: csvy_full\nv_inner_boundary: 9000 km/s\nv_outer_boundary: 20000 km/s\n---\nvelocity,density\n10000,1e-14\n";
        let header = CsvyFrontMatterLoader::parse_front_matter(Path::new("m.csvy"), text).unwrap();
        assert_eq!(header.len(), 3);
        assert_eq!(
            header.get("v_outer_boundary").and_then(|v| v.as_str()),
            Some("20000 km/s")
        );
    }

    #[test]
    fn test_csvy_missing_opening_delimiter() {
        let result =
            CsvyFrontMatterLoader::parse_front_matter(Path::new("m.csvy"), "name: x\n---\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_csvy_missing_closing_delimiter() {
        let result =
            CsvyFrontMatterLoader::parse_front_matter(Path::new("m.csvy"), "---\nname: x\n");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("closing"));
    }

    #[test]
    fn test_csvy_loader_reads_file() {
        let temp_dir = TempDir::new().unwrap();
        let csvy = temp_dir.path().join("model.csvy");
        fs::write(&csvy, "---\nv_inner_boundary: 9000 km/s\n---\nvelocity\n").unwrap();

        let header = CsvyFrontMatterLoader.load(&csvy).unwrap();
        assert!(header.contains_key("v_inner_boundary"));
    }

    #[test]
    fn test_csvy_loader_missing_file() {
        let result = CsvyFrontMatterLoader.load(Path::new("/nonexistent/model.csvy"));
        assert!(matches!(result, Err(Error::DocumentLoad { .. })));
    }
}
