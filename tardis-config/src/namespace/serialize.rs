//! Text export of configuration trees.
//!
//! Quantities render as `"<magnitude> <unit>"` strings and namespaces as
//! ordered maps. The output is meant for inspection and archiving; feeding
//! it back through the loader is not guaranteed to reproduce the same tree.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use super::{Namespace, Value};
use crate::error::Result;

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Integer(n) => serializer.serialize_i64(*n),
            Self::Float(x) => serializer.serialize_f64(*x),
            Self::String(s) => serializer.serialize_str(s),
            Self::Quantity(q) => q.serialize(serializer),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Namespace(ns) => ns.serialize(serializer),
        }
    }
}

impl Serialize for Namespace {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Namespace {
    /// Renders the tree as a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Serialization`] if the YAML emitter fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use tardis_config::namespace::Namespace;
    /// use tardis_config::units::Quantity;
    ///
    /// let mut ns = Namespace::new();
    /// ns.write("time_explosion", "13 day".parse::<Quantity>().unwrap()).unwrap();
    /// assert_eq!(ns.to_yaml_string().unwrap(), "time_explosion: 13 day\n");
    /// ```
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Renders the tree as a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Json`] if a value cannot be represented in
    /// JSON.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
