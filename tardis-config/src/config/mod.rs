//! Configuration construction and validation.
//!
//! A configuration is built in stages:
//!
//! 1. [`DocumentLoader`] reads the YAML document.
//! 2. The `tardis_config_version` marker is checked.
//! 3. A [`SchemaValidator`] (by default [`UnitCoercingSchema`]) turns the raw
//!    mapping into a unit-aware [`Namespace`](crate::namespace::Namespace).
//! 4. [`ConfigValidator`] enforces the physical rules and fills in the
//!    convergence defaults.
//! 5. For a `csvy_model` reference, the `model` section is synthesized from
//!    the CSVY header by a [`CsvyLoader`].
//!
//! # Examples
//!
//! Loading a file:
//!
//! ```no_run
//! use tardis_config::Configuration;
//!
//! let config = Configuration::from_yaml("tardis_example.yml").unwrap();
//! println!("{}", config.to_yaml_string().unwrap());
//! ```
//!
//! Building from an in-memory document:
//!
//! ```
//! use tardis_config::config::ConfigurationBuilder;
//! use tardis_config::Error;
//!
//! let doc: serde_yaml::Mapping = serde_yaml::from_str(
//!     "tardis_config_version: v1.0\n\
//!      montecarlo:\n  convergence_strategy:\n    type: custom\n\
//!      spectrum:\n  start: 500 Angstrom\n  stop: 20000 Angstrom\n",
//! ).unwrap();
//!
//! let err = ConfigurationBuilder::from_document(doc).build().unwrap_err();
//! assert!(matches!(err, Error::UnsupportedFeature { .. }));
//! ```

pub mod builder;
pub mod loader;
pub mod schema;
pub mod validator;

#[cfg(test)]
mod proptests;

/// The only supported value of the version marker.
pub const TARDIS_CONFIG_VERSION: &str = "v1.0";

/// Top-level key holding the version marker.
pub const VERSION_KEY: &str = "tardis_config_version";

// Re-export key types at module root
pub use builder::{Configuration, ConfigurationBuilder};
pub use loader::{CsvyFrontMatterLoader, CsvyLoader, DocumentLoader, CSVY_DELIMITER};
pub use schema::{SchemaValidator, UnitCoercingSchema};
pub use validator::{ConfigValidator, CONVERGENCE_PARAMETERS, CONVERGENCE_VARIABLES};
