//! Physical dimensions as exponent vectors over the base quantities.

use std::fmt;
use std::ops::{Div, Mul};

/// Exponents of the base quantities (length, mass, time, temperature).
///
/// Two units can be converted into each other exactly when their dimensions
/// are equal.
///
/// # Examples
///
/// ```
/// use tardis_config::units::Dimension;
///
/// let velocity = Dimension::LENGTH / Dimension::TIME;
/// assert_eq!(velocity, Dimension::new(1, 0, -1, 0));
/// assert!(!velocity.is_dimensionless());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dimension {
    /// Length exponent.
    pub length: i8,
    /// Mass exponent.
    pub mass: i8,
    /// Time exponent.
    pub time: i8,
    /// Temperature exponent.
    pub temperature: i8,
}

impl Dimension {
    /// The dimension of pure numbers.
    pub const DIMENSIONLESS: Self = Self::new(0, 0, 0, 0);
    /// Length.
    pub const LENGTH: Self = Self::new(1, 0, 0, 0);
    /// Mass.
    pub const MASS: Self = Self::new(0, 1, 0, 0);
    /// Time.
    pub const TIME: Self = Self::new(0, 0, 1, 0);
    /// Thermodynamic temperature.
    pub const TEMPERATURE: Self = Self::new(0, 0, 0, 1);
    /// Energy (M L^2 T^-2).
    pub const ENERGY: Self = Self::new(2, 1, -2, 0);
    /// Power (M L^2 T^-3).
    pub const POWER: Self = Self::new(2, 1, -3, 0);
    /// Frequency (T^-1).
    pub const FREQUENCY: Self = Self::new(0, 0, -1, 0);

    /// Creates a dimension from its exponents.
    #[must_use]
    pub const fn new(length: i8, mass: i8, time: i8, temperature: i8) -> Self {
        Self {
            length,
            mass,
            time,
            temperature,
        }
    }

    /// Returns `true` if every exponent is zero.
    #[must_use]
    pub const fn is_dimensionless(self) -> bool {
        self.length == 0 && self.mass == 0 && self.time == 0 && self.temperature == 0
    }

    /// Raises the dimension to an integer power.
    #[must_use]
    pub const fn powi(self, exponent: i8) -> Self {
        Self::new(
            self.length * exponent,
            self.mass * exponent,
            self.time * exponent,
            self.temperature * exponent,
        )
    }

    /// Raises the dimension to an integer power, or `None` if an exponent
    /// leaves the `i8` range.
    #[must_use]
    pub const fn checked_powi(self, exponent: i8) -> Option<Self> {
        match (
            self.length.checked_mul(exponent),
            self.mass.checked_mul(exponent),
            self.time.checked_mul(exponent),
            self.temperature.checked_mul(exponent),
        ) {
            (Some(length), Some(mass), Some(time), Some(temperature)) => {
                Some(Self::new(length, mass, time, temperature))
            }
            _ => None,
        }
    }

    /// Multiplies two dimensions, or `None` if an exponent leaves the `i8`
    /// range.
    #[must_use]
    pub const fn checked_mul(self, rhs: Self) -> Option<Self> {
        match (
            self.length.checked_add(rhs.length),
            self.mass.checked_add(rhs.mass),
            self.time.checked_add(rhs.time),
            self.temperature.checked_add(rhs.temperature),
        ) {
            (Some(length), Some(mass), Some(time), Some(temperature)) => {
                Some(Self::new(length, mass, time, temperature))
            }
            _ => None,
        }
    }
}

impl Mul for Dimension {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.length + rhs.length,
            self.mass + rhs.mass,
            self.time + rhs.time,
            self.temperature + rhs.temperature,
        )
    }
}

impl Div for Dimension {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        self * rhs.powi(-1)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "dimensionless");
        }

        let parts = [
            ("L", self.length),
            ("M", self.mass),
            ("T", self.time),
            ("Θ", self.temperature),
        ];
        let rendered: Vec<String> = parts
            .iter()
            .filter(|(_, exp)| *exp != 0)
            .map(|(symbol, exp)| {
                if *exp == 1 {
                    (*symbol).to_string()
                } else {
                    format!("{symbol}^{exp}")
                }
            })
            .collect();
        write!(f, "{}", rendered.join(" "))
    }
}
