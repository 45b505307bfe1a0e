//! Error types for the tardis-config library.
//!
//! This module provides the error hierarchy for configuration loading,
//! validation and namespace access, using `thiserror` for ergonomic error
//! handling.
//!
//! Errors fall into two groups. Construction errors (document loading,
//! schema, version, mutual exclusion, physical invariants, unsupported
//! features) abort building a configuration entirely. Access errors (paths,
//! units) are local to one `get`/`set` call and leave the tree untouched.

use std::path::PathBuf;

use thiserror::Error;

use crate::units::UnitError;

/// Result type alias for operations that may fail with a configuration error.
///
/// # Examples
///
/// ```
/// use tardis_config::{Error, Result};
///
/// fn example_operation() -> Result<f64> {
///     Ok(13.0)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the tardis-config library.
#[derive(Debug, Error)]
pub enum Error {
    /// A source document is missing, unreadable or not a YAML mapping.
    #[error("cannot load document {}: {reason}", path.display())]
    DocumentLoad {
        /// The document path.
        path: PathBuf,
        /// Why loading failed.
        reason: String,
    },

    /// The raw document does not match the declared schema.
    #[error("schema error at '{path}': {message}")]
    Schema {
        /// Dotted path of the offending entry.
        path: String,
        /// A description of the schema violation.
        message: String,
    },

    /// The document version marker is missing or unsupported.
    #[error(
        "unsupported tardis_config_version {}: only {} is supported",
        found.as_deref().unwrap_or("(missing)"),
        crate::config::TARDIS_CONFIG_VERSION
    )]
    VersionUnsupported {
        /// The version found in the document, if any.
        found: Option<String>,
    },

    /// Two mutually exclusive sections were both declared.
    #[error("cannot specify both '{first}' and '{second}' in the main config file")]
    MutualExclusion {
        /// The first section.
        first: String,
        /// The second section.
        second: String,
    },

    /// An ordering, positivity or range rule was violated.
    #[error("invalid value for '{field}': {message}")]
    PhysicalInvariant {
        /// The field (or fields) at fault.
        field: String,
        /// A description naming the offending values.
        message: String,
    },

    /// The requested feature combination is not implemented yet.
    #[error("not implemented: {feature}: {details}")]
    UnsupportedFeature {
        /// The unsupported feature.
        feature: String,
        /// Details about the unsupported combination.
        details: String,
    },

    /// A value is of the wrong kind or not one of the allowed choices.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// A field required by validation is absent.
    #[error("missing required field '{field}'")]
    MissingField {
        /// Dotted path of the missing field.
        field: String,
    },

    /// A path segment does not exist.
    #[error("config path not found: {path}")]
    PathNotFound {
        /// The path up to and including the failing segment.
        path: String,
    },

    /// A list index segment is past the end of the list.
    #[error("index {index} out of range at '{path}' (length {len})")]
    IndexOutOfRange {
        /// The path up to and including the failing segment.
        path: String,
        /// The requested index.
        index: usize,
        /// The length of the list.
        len: usize,
    },

    /// A config path string is malformed.
    #[error("invalid config path '{path}': {reason}")]
    InvalidConfigPath {
        /// The path as given.
        path: String,
        /// Why the path is invalid.
        reason: String,
    },

    /// Attribute-style read of a key that does not exist.
    #[error("namespace has no attribute '{key}'")]
    MissingAttribute {
        /// The missing key.
        key: String,
    },

    /// A value cannot be expressed in the unit already stored at a key.
    #[error("unit mismatch for '{field}': expected a value convertible to {expected}, got {found}")]
    UnitMismatch {
        /// The key or path being assigned.
        field: String,
        /// The stored unit.
        expected: String,
        /// What was supplied.
        found: String,
    },

    /// A unit string could not be parsed.
    #[error("cannot parse unit '{input}': {reason}")]
    UnitParse {
        /// The offending input.
        input: String,
        /// Why parsing failed.
        reason: String,
    },

    /// YAML serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_yaml::Error),

    /// JSON serialization failed.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<UnitError> for Error {
    fn from(err: UnitError) -> Self {
        match err {
            UnitError::Parse { input, reason } => Self::UnitParse { input, reason },
            UnitError::Incompatible { from, to } => Self::UnitMismatch {
                field: String::new(),
                expected: to,
                found: from,
            },
        }
    }
}

impl Error {
    /// Check if error aborts configuration construction.
    ///
    /// # Examples
    ///
    /// ```
    /// use tardis_config::Error;
    ///
    /// let err = Error::MissingField { field: "spectrum".into() };
    /// assert!(err.is_construction_error());
    /// ```
    #[must_use]
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            Self::DocumentLoad { .. }
                | Self::Schema { .. }
                | Self::VersionUnsupported { .. }
                | Self::MutualExclusion { .. }
                | Self::PhysicalInvariant { .. }
                | Self::UnsupportedFeature { .. }
                | Self::Validation { .. }
                | Self::MissingField { .. }
        )
    }

    /// Check if error is local to a single namespace access.
    ///
    /// # Examples
    ///
    /// ```
    /// use tardis_config::Error;
    ///
    /// let err = Error::PathNotFound { path: "model.structure".into() };
    /// assert!(err.is_access_error());
    /// ```
    #[must_use]
    pub fn is_access_error(&self) -> bool {
        matches!(
            self,
            Self::PathNotFound { .. }
                | Self::IndexOutOfRange { .. }
                | Self::InvalidConfigPath { .. }
                | Self::MissingAttribute { .. }
                | Self::UnitMismatch { .. }
        )
    }

    /// Attach the field being assigned to a unit mismatch.
    pub(crate) fn with_field(self, field: &str) -> Self {
        match self {
            Self::UnitMismatch {
                expected, found, ..
            } => Self::UnitMismatch {
                field: field.to_string(),
                expected,
                found,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_load_error() {
        let err = Error::DocumentLoad {
            path: PathBuf::from("/configs/tardis_example.yml"),
            reason: "file not found".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("cannot load document"));
        let normalized = display.replace(std::path::MAIN_SEPARATOR, "/");
        assert!(normalized.contains("/configs/tardis_example.yml"));
        assert!(display.contains("file not found"));
    }

    #[test]
    fn test_version_unsupported_error() {
        let err = Error::VersionUnsupported {
            found: Some("v2.0".to_string()),
        };
        let display = format!("{err}");
        assert!(display.contains("v2.0"));
        assert!(display.contains("v1.0"));

        let missing = Error::VersionUnsupported { found: None };
        assert!(format!("{missing}").contains("(missing)"));
    }

    #[test]
    fn test_mutual_exclusion_error() {
        let err = Error::MutualExclusion {
            first: "model".to_string(),
            second: "csvy_model".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("model"));
        assert!(display.contains("csvy_model"));
    }

    #[test]
    fn test_physical_invariant_error() {
        let err = Error::PhysicalInvariant {
            field: "supernova.time_explosion".to_string(),
            message: "time of explosion must be positive, got -5 day".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("supernova.time_explosion"));
        assert!(display.contains("-5 day"));
    }

    #[test]
    fn test_unsupported_feature_error() {
        let err = Error::UnsupportedFeature {
            feature: "convergence_strategy 'custom'".to_string(),
            details: "implement your own convergence treatment".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("not implemented"));
        assert!(display.contains("custom"));
    }

    #[test]
    fn test_index_out_of_range_error() {
        let err = Error::IndexOutOfRange {
            path: "model.abundances.item3".to_string(),
            index: 3,
            len: 3,
        };
        let display = format!("{err}");
        assert!(display.contains("index 3"));
        assert!(display.contains("length 3"));
    }

    #[test]
    fn test_unit_error_conversion() {
        let err: Error = UnitError::Incompatible {
            from: "day".to_string(),
            to: "km/s".to_string(),
        }
        .into();
        let err = err.with_field("model.structure.velocity.start");
        match err {
            Error::UnitMismatch {
                field,
                expected,
                found,
            } => {
                assert_eq!(field, "model.structure.velocity.start");
                assert_eq!(expected, "km/s");
                assert_eq!(found, "day");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_error_classification() {
        let construction = Error::PhysicalInvariant {
            field: "spectrum".into(),
            message: "start > stop".into(),
        };
        assert!(construction.is_construction_error());
        assert!(!construction.is_access_error());

        let access = Error::MissingAttribute { key: "model".into() };
        assert!(access.is_access_error());
        assert!(!access.is_construction_error());
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<f64> {
            Err(Error::MissingField {
                field: "spectrum".to_string(),
            })
        }

        assert!(returns_result().is_err());
    }
}
