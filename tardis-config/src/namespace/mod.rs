//! Recursive, unit-aware configuration namespace.
//!
//! A [`Namespace`] is an insertion-ordered map from string keys to
//! [`Value`]s. Nested mappings are always stored as nested namespaces, so a
//! configuration tree can be traversed either field by field:
//!
//! ```
//! use tardis_config::namespace::Namespace;
//!
//! let doc: serde_yaml::Mapping =
//!     serde_yaml::from_str("supernova:\n  time_explosion: 13 day\n").unwrap();
//! let ns = Namespace::from(doc);
//!
//! let supernova = ns.section("supernova").unwrap();
//! assert_eq!(supernova.str("time_explosion").unwrap(), "13 day");
//! ```
//!
//! or with a dotted path, where `item<N>` addresses list elements:
//!
//! ```
//! use tardis_config::namespace::{Namespace, Value};
//!
//! let doc: serde_yaml::Mapping =
//!     serde_yaml::from_str("model:\n  abundances: [0.1, 0.2, 0.7]\n").unwrap();
//! let mut ns = Namespace::from(doc);
//!
//! assert_eq!(ns.get("model.abundances.item2").unwrap(), &Value::Float(0.7));
//! ns.set("model.abundances.item0", 0.3).unwrap();
//! assert!(ns.get("model.abundances.item3").is_err());
//! ```
//!
//! # Unit-preserving assignment
//!
//! When a key already holds a [`Quantity`], assigning to it keeps the stored
//! unit: plain numbers are read as magnitudes in that unit, quantities are
//! converted into it, and values of another dimension are rejected with
//! [`Error::UnitMismatch`] without touching the stored value.

mod path;
mod serialize;
mod value;

#[cfg(test)]
mod proptests;

use indexmap::IndexMap;
use serde_yaml::{Mapping, Value as YamlValue};

use crate::error::{Error, Result};
use crate::units::Quantity;

pub use path::{ConfigPath, PathSegment, INDEX_PREFIX};
pub use value::Value;

use value::coerce_assignment;

/// One level of the configuration tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Namespace {
    entries: IndexMap<String, Value>,
}

impl Namespace {
    /// Creates an empty namespace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of keys at this level.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if this level has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Membership test; never fails.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterates over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Attribute-style read of a single key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingAttribute`] if the key is absent.
    pub fn read(&self, key: &str) -> Result<&Value> {
        self.entries.get(key).ok_or_else(|| Error::MissingAttribute {
            key: key.to_string(),
        })
    }

    /// Attribute-style write of a single key.
    ///
    /// Absent keys are inserted. Existing quantity keys keep their unit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnitMismatch`] if the key holds a quantity and
    /// `value` cannot be expressed in its unit. The stored value is left
    /// unchanged on error.
    pub fn write(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        match self.entries.get_mut(key) {
            Some(slot) => *slot = coerce_assignment(slot, value, key)?,
            None => {
                self.entries.insert(key.to_string(), value);
            }
        }
        Ok(())
    }

    /// Returns the nested section stored at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingAttribute`] if the key is absent, or
    /// [`Error::Validation`] if it does not hold a section.
    pub fn section(&self, key: &str) -> Result<&Namespace> {
        let value = self.read(key)?;
        value.as_namespace().ok_or_else(|| wrong_kind(key, "section", value))
    }

    /// Returns the nested section stored at `key` mutably.
    ///
    /// # Errors
    ///
    /// Same as [`Namespace::section`].
    pub fn section_mut(&mut self, key: &str) -> Result<&mut Namespace> {
        let value = self.entries.get_mut(key).ok_or_else(|| Error::MissingAttribute {
            key: key.to_string(),
        })?;
        let kind = value.type_name();
        value.as_namespace_mut().ok_or_else(|| Error::Validation {
            field: key.to_string(),
            message: format!("expected a section, found a {kind}"),
        })
    }

    /// Returns the quantity stored at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingAttribute`] if the key is absent, or
    /// [`Error::Validation`] if it does not hold a quantity.
    pub fn quantity(&self, key: &str) -> Result<&Quantity> {
        let value = self.read(key)?;
        value.as_quantity().ok_or_else(|| wrong_kind(key, "quantity", value))
    }

    /// Returns the string stored at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingAttribute`] if the key is absent, or
    /// [`Error::Validation`] if it does not hold a string.
    pub fn str(&self, key: &str) -> Result<&str> {
        let value = self.read(key)?;
        value.as_str().ok_or_else(|| wrong_kind(key, "string", value))
    }

    /// Resolves a dotted path such as `model.structure.velocity.start`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfigPath`] for malformed paths,
    /// [`Error::PathNotFound`] if a segment is absent or a scalar is
    /// traversed, and [`Error::IndexOutOfRange`] if an `item<N>` segment is
    /// past the end of its list.
    pub fn get(&self, path: &str) -> Result<&Value> {
        self.get_path(&ConfigPath::parse(path)?)
    }

    /// Resolves an already parsed path.
    ///
    /// # Errors
    ///
    /// Same as [`Namespace::get`].
    pub fn get_path(&self, path: &ConfigPath) -> Result<&Value> {
        let (last, parents) = split_path(path)?;
        let mut node = Node::Namespace(self);
        for (depth, segment) in parents.iter().enumerate() {
            let child = node.child(segment, path, depth)?;
            node = Node::of(child).ok_or_else(|| Error::PathNotFound {
                path: path.prefix(depth + 2),
            })?;
        }
        node.child(last, path, parents.len())
    }

    /// Assigns a value at a dotted path.
    ///
    /// The terminal key is inserted if absent; intermediate segments must
    /// exist. Quantity slots (keys or list elements) keep their unit.
    ///
    /// # Errors
    ///
    /// Path errors as for [`Namespace::get`], plus [`Error::UnitMismatch`]
    /// for incompatible assignments. Nothing is modified on error.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<()> {
        self.set_path(&ConfigPath::parse(path)?, value)
    }

    /// Assigns a value at an already parsed path.
    ///
    /// # Errors
    ///
    /// Same as [`Namespace::set`].
    pub fn set_path(&mut self, path: &ConfigPath, value: impl Into<Value>) -> Result<()> {
        let (last, parents) = split_path(path)?;
        let mut node = NodeMut::Namespace(self);
        for (depth, segment) in parents.iter().enumerate() {
            let child = node.child(segment, path, depth)?;
            node = NodeMut::of(child).ok_or_else(|| Error::PathNotFound {
                path: path.prefix(depth + 2),
            })?;
        }
        node.assign(last, value.into(), path, parents.len())
    }

    /// Returns a fully independent copy of this tree.
    ///
    /// The copy shares no storage with `self`; setting a value in one never
    /// affects the other.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        self.clone()
    }
}

fn wrong_kind(key: &str, expected: &str, value: &Value) -> Error {
    Error::Validation {
        field: key.to_string(),
        message: format!("expected a {expected}, found a {}", value.type_name()),
    }
}

fn split_path(path: &ConfigPath) -> Result<(&PathSegment, &[PathSegment])> {
    path.segments()
        .split_last()
        .ok_or_else(|| Error::InvalidConfigPath {
            path: path.to_string(),
            reason: "path is empty".into(),
        })
}

/// A container a path segment can be resolved against.
enum Node<'a> {
    Namespace(&'a Namespace),
    List(&'a [Value]),
}

impl<'a> Node<'a> {
    fn of(value: &'a Value) -> Option<Self> {
        match value {
            Value::Namespace(ns) => Some(Self::Namespace(ns)),
            Value::List(items) => Some(Self::List(items)),
            _ => None,
        }
    }

    fn child(self, segment: &PathSegment, path: &ConfigPath, depth: usize) -> Result<&'a Value> {
        match (self, segment) {
            (Self::Namespace(ns), segment) => {
                ns.entries
                    .get(segment.as_str())
                    .ok_or_else(|| Error::PathNotFound {
                        path: path.prefix(depth + 1),
                    })
            }
            (Self::List(items), PathSegment::Index { index, .. }) => {
                items.get(*index).ok_or_else(|| Error::IndexOutOfRange {
                    path: path.prefix(depth + 1),
                    index: *index,
                    len: items.len(),
                })
            }
            (Self::List(_), PathSegment::Key(_)) => Err(Error::PathNotFound {
                path: path.prefix(depth + 1),
            }),
        }
    }
}

enum NodeMut<'a> {
    Namespace(&'a mut Namespace),
    List(&'a mut Vec<Value>),
}

impl<'a> NodeMut<'a> {
    fn of(value: &'a mut Value) -> Option<Self> {
        match value {
            Value::Namespace(ns) => Some(Self::Namespace(ns)),
            Value::List(items) => Some(Self::List(items)),
            _ => None,
        }
    }

    fn child(
        self,
        segment: &PathSegment,
        path: &ConfigPath,
        depth: usize,
    ) -> Result<&'a mut Value> {
        match (self, segment) {
            (Self::Namespace(ns), segment) => {
                ns.entries
                    .get_mut(segment.as_str())
                    .ok_or_else(|| Error::PathNotFound {
                        path: path.prefix(depth + 1),
                    })
            }
            (Self::List(items), PathSegment::Index { index, .. }) => {
                let len = items.len();
                items.get_mut(*index).ok_or_else(|| Error::IndexOutOfRange {
                    path: path.prefix(depth + 1),
                    index: *index,
                    len,
                })
            }
            (Self::List(_), PathSegment::Key(_)) => Err(Error::PathNotFound {
                path: path.prefix(depth + 1),
            }),
        }
    }

    fn assign(
        self,
        segment: &PathSegment,
        value: Value,
        path: &ConfigPath,
        depth: usize,
    ) -> Result<()> {
        match self {
            Self::Namespace(ns) => ns
                .write(segment.as_str(), value)
                .map_err(|err| err.with_field(&path.to_string())),
            Self::List(items) => {
                let slot = Self::List(items).child(segment, path, depth)?;
                *slot = coerce_assignment(slot, value, &path.to_string())?;
                Ok(())
            }
        }
    }
}

impl From<Mapping> for Namespace {
    /// Wraps a plain YAML mapping, converting nested mappings recursively.
    ///
    /// Non-string keys are rendered to their YAML text.
    fn from(mapping: Mapping) -> Self {
        let entries = mapping
            .into_iter()
            .map(|(key, value)| (render_key(&key), Value::from(value)))
            .collect();
        Self { entries }
    }
}

impl FromIterator<(String, Value)> for Namespace {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Returns the text of a scalar YAML key, or `None` for sequences and maps.
pub(crate) fn scalar_key(key: &YamlValue) -> Option<String> {
    match key {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Number(n) => Some(n.to_string()),
        YamlValue::Bool(b) => Some(b.to_string()),
        YamlValue::Null => Some("null".to_string()),
        YamlValue::Tagged(tagged) => scalar_key(&tagged.value),
        YamlValue::Sequence(_) | YamlValue::Mapping(_) => None,
    }
}

fn render_key(key: &YamlValue) -> String {
    scalar_key(key).unwrap_or_else(|| {
        serde_yaml::to_string(key)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default()
    })
}
