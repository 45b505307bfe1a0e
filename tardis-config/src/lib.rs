#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # tardis-config
//!
//! A unit-aware configuration model for a radiative-transfer supernova
//! simulation.
//!
//! This library loads a hierarchical YAML configuration, attaches physical
//! units to its values, validates it against the physical consistency rules
//! of the simulation, and exposes the result through field-style and
//! dotted-path access.
//!
//! ## Core Types
//!
//! - [`Configuration`] and [`ConfigurationBuilder`]: Validated configuration and its construction
//! - [`Namespace`] and [`Value`]: The recursive, unit-preserving configuration tree
//! - [`ConfigPath`]: Parsed dotted paths such as `model.abundances.item2`
//! - [`Quantity`] and [`Unit`]: Magnitudes with runtime-parsed units
//! - [`Error`] and [`Result`]: Error handling types
//!
//! ## Logging
//!
//! The library logs through the [`log`] facade; the application chooses the
//! backend.
//!
//! ## Examples
//!
//! ```
//! use tardis_config::{Configuration, Error};
//!
//! let doc: serde_yaml::Mapping = serde_yaml::from_str(
//!     "tardis_config_version: v1.0\n\
//!      montecarlo:\n  convergence_strategy:\n    type: damped\n    threshold: 0.05\n\
//!      spectrum:\n  start: 500 Angstrom\n  stop: 20000 Angstrom\n",
//! ).unwrap();
//! let mut config = Configuration::from_config_dict(doc, true, "").unwrap();
//!
//! // plain numbers keep the unit already stored at the key
//! config.set("spectrum.stop", 10000.0).unwrap();
//! assert_eq!(config.get("spectrum.stop").unwrap().unit().unwrap().symbol(), "Angstrom");
//!
//! // quantities of another dimension are rejected
//! let err = config.set("spectrum.stop", "3 day".parse::<tardis_config::Quantity>().unwrap());
//! assert!(matches!(err, Err(Error::UnitMismatch { .. })));
//! ```

pub mod config;
pub mod error;
pub mod namespace;
pub mod units;

// Re-export key types at crate root for convenience
pub use config::{Configuration, ConfigurationBuilder, TARDIS_CONFIG_VERSION};
pub use error::{Error, Result};
pub use namespace::{ConfigPath, Namespace, PathSegment, Value};
pub use units::{Dimension, Quantity, Unit, UnitError};
