//! Values stored in a [`Namespace`].

use serde_yaml::Value as YamlValue;

use super::Namespace;
use crate::error::{Error, Result};
use crate::units::{Quantity, Unit};

/// A configuration value.
///
/// There is no raw-mapping variant: mappings always become a
/// nested [`Namespace`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// YAML `null` or an absent optional value.
    Null,
    /// A boolean.
    Bool(bool),
    /// An integer.
    Integer(i64),
    /// A floating point number.
    Float(f64),
    /// A string that is not a physical quantity.
    String(String),
    /// A magnitude with a unit.
    Quantity(Quantity),
    /// An ordered sequence.
    List(Vec<Value>),
    /// A nested section.
    Namespace(Namespace),
}

impl Value {
    /// Returns a short name for the kind of value, for error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Quantity(_) => "quantity",
            Self::List(_) => "list",
            Self::Namespace(_) => "section",
        }
    }

    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the unit tag of a quantity value.
    #[must_use]
    pub fn unit(&self) -> Option<&Unit> {
        self.as_quantity().map(Quantity::unit)
    }

    /// Returns the boolean, if this is one.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer, if this is one.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns a plain number as `f64` (integers are widened).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// Returns the string, if this is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the quantity, if this is one.
    #[must_use]
    pub const fn as_quantity(&self) -> Option<&Quantity> {
        match self {
            Self::Quantity(q) => Some(q),
            _ => None,
        }
    }

    /// Returns the list, if this is one.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the nested namespace, if this is one.
    #[must_use]
    pub const fn as_namespace(&self) -> Option<&Namespace> {
        match self {
            Self::Namespace(ns) => Some(ns),
            _ => None,
        }
    }

    /// Returns the nested namespace mutably, if this is one.
    pub fn as_namespace_mut(&mut self) -> Option<&mut Namespace> {
        match self {
            Self::Namespace(ns) => Some(ns),
            _ => None,
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Quantity(q) => format!("quantity in {}", q.unit()),
            other => format!("{} value", other.type_name()),
        }
    }
}

/// Computes the value to store when `incoming` is assigned over `current`.
///
/// When `current` is a quantity, plain numbers (and unit-less numeric
/// strings) are reinterpreted in its unit and quantities are converted into
/// it. Otherwise `incoming` is returned unchanged.
pub(crate) fn coerce_assignment(current: &Value, incoming: Value, field: &str) -> Result<Value> {
    let Some(unit) = current.unit() else {
        return Ok(incoming);
    };

    let mismatch = |found: String| Error::UnitMismatch {
        field: field.to_string(),
        expected: unit.to_string(),
        found,
    };

    let quantity = match incoming {
        Value::Quantity(q) => q
            .to(unit)
            .map_err(|_| mismatch(format!("quantity in {}", q.unit())))?,
        Value::Integer(_) | Value::Float(_) => {
            Quantity::new(incoming.as_f64().unwrap_or(f64::NAN), unit.clone())
        }
        Value::String(s) => {
            let parsed: Quantity = s
                .parse()
                .map_err(|_| mismatch(format!("string '{s}'")))?;
            if parsed.unit().symbol().is_empty() {
                Quantity::new(parsed.value(), unit.clone())
            } else {
                parsed
                    .to(unit)
                    .map_err(|_| mismatch(format!("quantity in {}", parsed.unit())))?
            }
        }
        other => return Err(mismatch(other.describe())),
    };

    Ok(Value::Quantity(quantity))
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Quantity> for Value {
    fn from(value: Quantity) -> Self {
        Self::Quantity(value)
    }
}

impl From<Namespace> for Value {
    fn from(value: Namespace) -> Self {
        Self::Namespace(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::List(value)
    }
}

impl From<serde_yaml::Mapping> for Value {
    fn from(value: serde_yaml::Mapping) -> Self {
        Self::Namespace(Namespace::from(value))
    }
}

impl From<YamlValue> for Value {
    /// Converts a plain YAML value, wrapping every nested mapping into a
    /// [`Namespace`]. No unit coercion happens here.
    fn from(value: YamlValue) -> Self {
        match value {
            YamlValue::Null => Self::Null,
            YamlValue::Bool(b) => Self::Bool(b),
            YamlValue::Number(n) => n
                .as_i64()
                .map_or_else(|| Self::Float(n.as_f64().unwrap_or(f64::NAN)), Self::Integer),
            YamlValue::String(s) => Self::String(s),
            YamlValue::Sequence(items) => Self::List(items.into_iter().map(Self::from).collect()),
            YamlValue::Mapping(mapping) => Self::from(mapping),
            YamlValue::Tagged(tagged) => Self::from(tagged.value),
        }
    }
}
