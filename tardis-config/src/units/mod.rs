//! Physical quantities with runtime units.
//!
//! Configuration values such as `"11000 km/s"` or `"13 day"` are represented
//! as a [`Quantity`]: a magnitude paired with a [`Unit`]. Units carry their
//! [`Dimension`] so that conversions between compatible units are exact up to
//! floating point and conversions between incompatible ones are rejected.
//!
//! # Examples
//!
//! ```
//! use tardis_config::units::{Quantity, Unit};
//!
//! let v: Quantity = "11000 km/s".parse().unwrap();
//! let in_cms = v.to(&Unit::parse("cm/s").unwrap()).unwrap();
//! assert!((in_cms.value() - 1.1e9).abs() < 1.0);
//! assert_eq!(v.to_string(), "11000 km/s");
//! ```

mod dimension;
mod unit;

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

pub use dimension::Dimension;
pub use unit::{Unit, UnitError};

/// A magnitude tagged with a physical unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    value: f64,
    unit: Unit,
}

impl Quantity {
    /// Creates a quantity from a magnitude and unit.
    #[must_use]
    pub const fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    /// Creates a dimensionless quantity.
    #[must_use]
    pub fn dimensionless(value: f64) -> Self {
        Self::new(value, Unit::dimensionless())
    }

    /// Returns the magnitude in this quantity's own unit.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Returns the unit.
    #[must_use]
    pub const fn unit(&self) -> &Unit {
        &self.unit
    }

    /// Returns the magnitude expressed in SI base units.
    #[must_use]
    pub fn si_value(&self) -> f64 {
        self.value * self.unit.scale()
    }

    /// Converts this quantity into `unit`.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::Incompatible`] if the dimensions differ.
    pub fn to(&self, unit: &Unit) -> Result<Self, UnitError> {
        let factor = self.unit.conversion_factor(unit)?;
        Ok(Self::new(self.value * factor, unit.clone()))
    }

    /// Returns the magnitude of this quantity expressed in `unit`.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::Incompatible`] if the dimensions differ.
    pub fn value_in(&self, unit: &Unit) -> Result<f64, UnitError> {
        self.to(unit).map(|q| q.value)
    }

    /// Compares two quantities after converting `other` into this unit.
    ///
    /// Returns `Ok(None)` only when a magnitude is NaN.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::Incompatible`] if the dimensions differ.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::cmp::Ordering;
    /// use tardis_config::units::Quantity;
    ///
    /// let a: Quantity = "1 km".parse().unwrap();
    /// let b: Quantity = "999 m".parse().unwrap();
    /// assert_eq!(a.compare(&b).unwrap(), Some(Ordering::Greater));
    /// ```
    pub fn compare(&self, other: &Self) -> Result<Option<Ordering>, UnitError> {
        let other = other.value_in(&self.unit)?;
        Ok(self.value.partial_cmp(&other))
    }
}

impl FromStr for Quantity {
    type Err = UnitError;

    /// Parses `"<magnitude> <unit>"`; a bare number is dimensionless.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (number, unit) = trimmed
            .split_once(char::is_whitespace)
            .unwrap_or((trimmed, ""));

        let value: f64 = number.parse().map_err(|_| UnitError::Parse {
            input: trimmed.to_string(),
            reason: format!("'{number}' is not a number"),
        })?;

        Ok(Self::new(value, Unit::parse(unit)?))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.symbol().is_empty() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{} {}", self.value, self.unit)
        }
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
