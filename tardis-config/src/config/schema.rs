//! Schema validation and unit coercion of raw documents.
//!
//! A [`SchemaValidator`] turns the raw YAML mapping produced by the loader
//! into a [`Namespace`] whose dimensioned fields are already [`Quantity`]
//! values. The validation pipeline runs on that output and relies on the
//! coercion having happened.

use serde_yaml::{Mapping, Value as YamlValue};

use crate::error::{Error, Result};
use crate::namespace::{scalar_key, Namespace, Value};
use crate::units::Quantity;

/// Type-checks a raw document and coerces its scalars.
///
/// Implementations may be as strict as they like; they must return a tree
/// in which every physically dimensioned field is a [`Value::Quantity`].
pub trait SchemaValidator {
    /// Validate and coerce `document`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the document violates the schema.
    fn validate(&self, document: &Mapping) -> Result<Namespace>;
}

/// Default schema: structural checks plus quantity coercion.
///
/// Every string of the form `<number> <unit>` whose unit parses becomes a
/// [`Quantity`]; any other string is kept verbatim. Keys must be scalars.
///
/// # Examples
///
/// ```
/// use tardis_config::config::{SchemaValidator, UnitCoercingSchema};
///
/// let doc: serde_yaml::Mapping = serde_yaml::from_str(
///     "supernova:\n  time_explosion: 13 day\n  name: SN 2011fe\n",
/// ).unwrap();
/// let ns = UnitCoercingSchema::default().validate(&doc).unwrap();
///
/// let t = ns.get("supernova.time_explosion").unwrap().as_quantity().unwrap();
/// assert_eq!(t.value(), 13.0);
/// assert_eq!(ns.get("supernova.name").unwrap().as_str(), Some("SN 2011fe"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct UnitCoercingSchema {
    required: Vec<String>,
}

impl UnitCoercingSchema {
    /// Creates a schema with no required top-level keys.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires `key` to be present at the top level.
    #[must_use]
    pub fn require(mut self, key: impl Into<String>) -> Self {
        self.required.push(key.into());
        self
    }

    fn coerce_mapping(&self, mapping: &Mapping, path: &str) -> Result<Namespace> {
        mapping
            .iter()
            .map(|(key, value)| {
                let key = scalar_key(key).ok_or_else(|| Error::Schema {
                    path: path.to_string(),
                    message: "mapping keys must be scalars".into(),
                })?;
                let child_path = join(path, &key);
                let value = self.coerce_value(value, &child_path)?;
                Ok((key, value))
            })
            .collect()
    }

    fn coerce_value(&self, value: &YamlValue, path: &str) -> Result<Value> {
        Ok(match value {
            YamlValue::String(s) => coerce_scalar(s),
            YamlValue::Sequence(items) => Value::List(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.coerce_value(item, &format!("{path}[{i}]")))
                    .collect::<Result<Vec<_>>>()?,
            ),
            YamlValue::Mapping(mapping) => Value::Namespace(self.coerce_mapping(mapping, path)?),
            YamlValue::Tagged(tagged) => self.coerce_value(&tagged.value, path)?,
            other => Value::from(other.clone()),
        })
    }
}

impl SchemaValidator for UnitCoercingSchema {
    fn validate(&self, document: &Mapping) -> Result<Namespace> {
        for key in &self.required {
            if !document.contains_key(key.as_str()) {
                return Err(Error::Schema {
                    path: key.clone(),
                    message: "required key is missing".into(),
                });
            }
        }

        let namespace = self.coerce_mapping(document, "")?;
        log::debug!("schema coercion produced {} top-level sections", namespace.len());
        Ok(namespace)
    }
}

/// Coerces a string into a quantity when it has the form `<number> <unit>`.
fn coerce_scalar(s: &str) -> Value {
    let has_unit = s
        .trim()
        .split_once(char::is_whitespace)
        .is_some_and(|(number, _)| number.parse::<f64>().is_ok());

    if has_unit {
        if let Ok(quantity) = s.parse::<Quantity>() {
            return Value::Quantity(quantity);
        }
    }
    Value::String(s.to_string())
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}
