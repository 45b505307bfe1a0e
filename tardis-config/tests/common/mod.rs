//! Common test utilities for integration tests.
//!
//! This module provides helper functions and fixture builders for testing
//! the tardis-config library.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Mapping;

/// A minimal document that passes every validation rule.
#[allow(dead_code)]
pub const BASE_CONFIG: &str = "\
tardis_config_version: v1.0
supernova:
  time_explosion: 13 day
  luminosity_wavelength_start: 0 Angstrom
  luminosity_wavelength_end: 100000 Angstrom
model:
  structure:
    type: specific
    velocity:
      start: 1.1e4 km/s
      stop: 20000 km/s
      num: 20
  abundances: [0.1, 0.2, 0.7]
plasma:
  initial_t_inner: -1 K
  initial_t_rad: 10000 K
montecarlo:
  enable_full_relativity: false
  convergence_strategy:
    type: damped
    damping_constant: 1.0
    threshold: 0.05
spectrum:
  start: 500 Angstrom
  stop: 20000 Angstrom
  num: 10000
  method: virtual
";

/// Path to a file under `tests/fixtures/configs`.
#[allow(dead_code)]
pub fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("configs")
        .join(relative)
}

/// Writes `content` to `dir/filename` and returns the path.
#[allow(dead_code)]
pub fn create_temp_config(dir: &Path, filename: &str, content: &str) -> PathBuf {
    let path = dir.join(filename);
    fs::write(&path, content).unwrap();
    path
}

/// Parses YAML text into a raw document.
#[allow(dead_code)]
pub fn mapping(yaml: &str) -> Mapping {
    serde_yaml::from_str(yaml).unwrap()
}

/// Builder for raw documents derived from [`BASE_CONFIG`].
///
/// # Examples
///
/// ```no_run
/// # use common::DocumentFixture;
/// let doc = DocumentFixture::new()
///     .with("supernova.time_explosion", "-5 day")
///     .without("model")
///     .build();
/// ```
#[allow(dead_code)]
pub struct DocumentFixture {
    document: Mapping,
}

#[allow(dead_code)]
impl DocumentFixture {
    /// Starts from [`BASE_CONFIG`].
    pub fn new() -> Self {
        Self {
            document: mapping(BASE_CONFIG),
        }
    }

    /// Sets a dotted path to a YAML scalar, creating missing sections.
    pub fn with(mut self, path: &str, value: impl Into<serde_yaml::Value>) -> Self {
        let mut keys: Vec<&str> = path.split('.').collect();
        let last = keys.pop().unwrap();
        let mut current = &mut self.document;
        for key in keys {
            let entry = current
                .entry(key.into())
                .or_insert_with(|| serde_yaml::Value::Mapping(Mapping::new()));
            current = entry.as_mapping_mut().unwrap();
        }
        current.insert(last.into(), value.into());
        self
    }

    /// Removes a dotted path.
    pub fn without(mut self, path: &str) -> Self {
        let mut keys: Vec<&str> = path.split('.').collect();
        let last = keys.pop().unwrap();
        let mut current = &mut self.document;
        for key in keys {
            current = current.get_mut(key).unwrap().as_mapping_mut().unwrap();
        }
        current.remove(last);
        self
    }

    /// Returns the document.
    pub fn build(self) -> Mapping {
        self.document
    }
}
