//! Runtime unit parsing and conversion factors.
//!
//! Units are parsed from the strings that appear in configuration documents
//! (`"km/s"`, `"g/cm^3"`, `"erg / s"`, `"day"`) into a [`Dimension`] and a
//! scale factor relative to SI base units.

use std::fmt;

use thiserror::Error;

use super::dimension::Dimension;

/// Error type for unit parsing and conversion failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    /// The unit string could not be parsed.
    #[error("cannot parse unit '{input}': {reason}")]
    Parse {
        /// The offending input.
        input: String,
        /// Why parsing failed.
        reason: String,
    },

    /// Two units have different dimensions.
    #[error("cannot convert '{from}' to '{to}': incompatible dimensions")]
    Incompatible {
        /// The source unit, as written.
        from: String,
        /// The target unit, as written.
        to: String,
    },
}

struct UnitDef {
    symbol: &'static str,
    scale: f64,
    dimension: Dimension,
    prefixable: bool,
}

const fn def(symbol: &'static str, scale: f64, dimension: Dimension, prefixable: bool) -> UnitDef {
    UnitDef {
        symbol,
        scale,
        dimension,
        prefixable,
    }
}

const DAY_SECONDS: f64 = 86_400.0;

// Scales are relative to SI base units.
const UNITS: &[UnitDef] = &[
    def("m", 1.0, Dimension::LENGTH, true),
    def("g", 1e-3, Dimension::MASS, true),
    def("s", 1.0, Dimension::TIME, true),
    def("K", 1.0, Dimension::TEMPERATURE, true),
    def("J", 1.0, Dimension::ENERGY, true),
    def("eV", 1.602_176_634e-19, Dimension::ENERGY, true),
    def("W", 1.0, Dimension::POWER, true),
    def("Hz", 1.0, Dimension::FREQUENCY, true),
    def("Angstrom", 1e-10, Dimension::LENGTH, false),
    def("AA", 1e-10, Dimension::LENGTH, false),
    def("AU", 1.495_978_707e11, Dimension::LENGTH, false),
    def("pc", 3.085_677_581_491_367e16, Dimension::LENGTH, false),
    def("solRad", 6.957e8, Dimension::LENGTH, false),
    def("min", 60.0, Dimension::TIME, false),
    def("h", 3_600.0, Dimension::TIME, false),
    def("d", DAY_SECONDS, Dimension::TIME, false),
    def("day", DAY_SECONDS, Dimension::TIME, false),
    def("yr", 365.25 * DAY_SECONDS, Dimension::TIME, false),
    def("solMass", 1.988_409_87e30, Dimension::MASS, false),
    def("erg", 1e-7, Dimension::ENERGY, false),
    def("solLum", 3.828e26, Dimension::POWER, false),
];

const PREFIXES: &[(&str, f64)] = &[
    ("G", 1e9),
    ("M", 1e6),
    ("k", 1e3),
    ("d", 1e-1),
    ("c", 1e-2),
    ("m", 1e-3),
    ("u", 1e-6),
    ("µ", 1e-6),
    ("n", 1e-9),
    ("p", 1e-12),
];

fn lookup(symbol: &str) -> Option<(f64, Dimension)> {
    if let Some(unit) = UNITS.iter().find(|u| u.symbol == symbol) {
        return Some((unit.scale, unit.dimension));
    }

    PREFIXES.iter().find_map(|(prefix, factor)| {
        let rest = symbol.strip_prefix(prefix)?;
        UNITS
            .iter()
            .find(|u| u.prefixable && u.symbol == rest)
            .map(|u| (factor * u.scale, u.dimension))
    })
}

/// A physical unit: dimension plus scale factor to SI.
///
/// The unit keeps the symbol it was written with so that it renders the way
/// the user typed it. Equality compares dimension and scale, so `"km/s"` and
/// `"km / s"` are the same unit.
///
/// # Examples
///
/// ```
/// use tardis_config::units::Unit;
///
/// let kms = Unit::parse("km/s").unwrap();
/// let cms = Unit::parse("cm / s").unwrap();
/// let factor = kms.conversion_factor(&cms).unwrap();
/// assert!((factor - 1e5).abs() < 1e-6);
/// assert!(Unit::parse("furlong").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Unit {
    symbol: String,
    scale: f64,
    dimension: Dimension,
}

impl Unit {
    /// The unit of pure numbers.
    #[must_use]
    pub fn dimensionless() -> Self {
        Self {
            symbol: String::new(),
            scale: 1.0,
            dimension: Dimension::DIMENSIONLESS,
        }
    }

    /// Parses a unit expression.
    ///
    /// Factors are separated by whitespace, `*` or `.`; a `/` divides by the
    /// factor that follows it. Exponents are written `^n`, `**n` or as a
    /// trailing integer (`cm3`, `cm-3`).
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::Parse`] for unknown symbols or malformed
    /// expressions.
    pub fn parse(input: &str) -> Result<Self, UnitError> {
        let symbol = input.trim();
        if symbol.is_empty() || symbol == "dimensionless" {
            return Ok(Self::dimensionless());
        }

        let fail = |reason: String| UnitError::Parse {
            input: symbol.to_string(),
            reason,
        };

        let normalized = symbol.replace("**", "^");
        let mut scale = 1.0_f64;
        let mut dimension = Dimension::DIMENSIONLESS;
        let mut divide_next = false;
        let mut word = String::new();
        let mut words = Vec::new();

        for ch in normalized.chars() {
            match ch {
                '/' => {
                    if !word.is_empty() {
                        words.push(std::mem::take(&mut word));
                    }
                    words.push("/".to_string());
                }
                c if c.is_whitespace() || c == '*' || c == '.' => {
                    if !word.is_empty() {
                        words.push(std::mem::take(&mut word));
                    }
                }
                c => word.push(c),
            }
        }
        if !word.is_empty() {
            words.push(word);
        }

        for word in &words {
            if word == "/" {
                if divide_next {
                    return Err(fail("consecutive '/'".into()));
                }
                divide_next = true;
                continue;
            }

            let (base, exponent) = split_exponent(word).ok_or_else(|| {
                fail(format!("malformed factor '{word}'"))
            })?;
            let exponent = if divide_next {
                exponent.checked_neg()
            } else {
                Some(exponent)
            }
            .ok_or_else(|| fail(format!("exponent of '{word}' out of range")))?;
            divide_next = false;

            if base == "1" {
                continue;
            }

            let (factor_scale, factor_dim) =
                lookup(base).ok_or_else(|| fail(format!("unknown unit symbol '{base}'")))?;
            scale *= factor_scale.powi(i32::from(exponent));
            dimension = factor_dim
                .checked_powi(exponent)
                .and_then(|factor| dimension.checked_mul(factor))
                .ok_or_else(|| fail(format!("exponent of '{word}' out of range")))?;
        }

        if divide_next {
            return Err(fail("trailing '/'".into()));
        }

        Ok(Self {
            symbol: symbol.to_string(),
            scale,
            dimension,
        })
    }

    /// Returns the symbol as written.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Returns the factor that converts one of this unit into SI base units.
    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// Returns the dimension of this unit.
    #[must_use]
    pub const fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Returns `true` if values in `self` can be converted to `other`.
    #[must_use]
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.dimension == other.dimension
    }

    /// Returns the factor `f` such that `x self == x * f other`.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::Incompatible`] if the dimensions differ.
    pub fn conversion_factor(&self, other: &Self) -> Result<f64, UnitError> {
        if !self.is_compatible(other) {
            return Err(UnitError::Incompatible {
                from: self.to_string(),
                to: other.to_string(),
            });
        }
        Ok(self.scale / other.scale)
    }
}

/// Splits `cm^3`, `cm3` or `cm-3` into base symbol and exponent.
fn split_exponent(word: &str) -> Option<(&str, i8)> {
    if let Some((base, exp)) = word.split_once('^') {
        let exp = exp.trim_start_matches('(').trim_end_matches(')');
        return Some((base, exp.parse().ok()?)).filter(|(b, _)| !b.is_empty());
    }

    if word == "1" {
        return Some((word, 1));
    }

    let digits_start = word
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i);

    let Some(mut split) = digits_start else {
        return Some((word, 1));
    };
    if word[..split].ends_with(['-', '+']) {
        split -= 1;
    }
    let (base, exp) = word.split_at(split);
    if base.is_empty() {
        return None;
    }
    Some((base, exp.parse().ok()?))
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.dimension == other.dimension
            && (self.scale - other.scale).abs() <= 1e-12 * self.scale.abs().max(other.scale.abs())
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.symbol.is_empty() {
            write!(f, "dimensionless")
        } else {
            write!(f, "{}", self.symbol)
        }
    }
}

impl std::str::FromStr for Unit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs())
    }

    #[test]
    fn test_parse_simple_symbols() {
        assert_eq!(Unit::parse("K").unwrap().dimension(), Dimension::TEMPERATURE);
        assert_eq!(Unit::parse("day").unwrap().scale(), 86_400.0);
        assert_eq!(Unit::parse("Angstrom").unwrap().dimension(), Dimension::LENGTH);
    }

    #[test]
    fn test_parse_prefixed_symbols() {
        assert!(close(Unit::parse("km").unwrap().scale(), 1e3));
        assert!(close(Unit::parse("cm").unwrap().scale(), 1e-2));
        assert!(close(Unit::parse("kg").unwrap().scale(), 1.0));
        assert!(close(Unit::parse("nm").unwrap().scale(), 1e-9));
    }

    #[test]
    fn test_exact_symbols_win_over_prefixes() {
        // "min" is minutes, not milli-"in"
        assert_eq!(Unit::parse("min").unwrap().scale(), 60.0);
        assert_eq!(Unit::parse("d").unwrap().dimension(), Dimension::TIME);
    }

    #[test]
    fn test_parse_compound_units() {
        let velocity = Unit::parse("km/s").unwrap();
        assert_eq!(velocity.dimension(), Dimension::LENGTH / Dimension::TIME);

        let density = Unit::parse("g/cm^3").unwrap();
        assert_eq!(density.dimension(), Dimension::new(-3, 1, 0, 0));
        assert!(close(density.scale(), 1e3));

        let luminosity = Unit::parse("erg / s").unwrap();
        assert_eq!(luminosity.dimension(), Dimension::POWER);
    }

    #[test]
    fn test_parse_exponent_spellings() {
        let caret = Unit::parse("g cm^-3").unwrap();
        let stars = Unit::parse("g cm**-3").unwrap();
        let trailing = Unit::parse("g cm-3").unwrap();
        let slash = Unit::parse("g / cm3").unwrap();
        assert_eq!(caret, stars);
        assert_eq!(caret, trailing);
        assert_eq!(caret, slash);
    }

    #[test]
    fn test_parse_reciprocal() {
        let per_second = Unit::parse("1/s").unwrap();
        assert_eq!(per_second.dimension(), Dimension::FREQUENCY);
        assert_eq!(per_second, Unit::parse("Hz").unwrap());
    }

    #[test]
    fn test_parse_dimensionless() {
        assert!(Unit::parse("").unwrap().dimension().is_dimensionless());
        assert!(Unit::parse("dimensionless")
            .unwrap()
            .dimension()
            .is_dimensionless());
    }

    #[test]
    fn test_parse_errors() {
        assert!(Unit::parse("furlong").is_err());
        assert!(Unit::parse("km/").is_err());
        assert!(Unit::parse("km//s").is_err());
        assert!(Unit::parse("(km/s)").is_err());
    }

    #[test]
    fn test_parse_exponent_overflow() {
        for input in ["m^100 m^100", "1/m^-128", "m^-128 / m", "g^64 g^64", "m^300"] {
            let err = Unit::parse(input).unwrap_err();
            assert!(matches!(err, UnitError::Parse { .. }), "{input}");
        }
        // the extremes of the exponent range still parse
        assert_eq!(Unit::parse("m^127").unwrap().dimension().length, 127);
        assert_eq!(Unit::parse("m^-128").unwrap().dimension().length, -128);
    }

    #[test]
    fn test_conversion_factor() {
        let kms = Unit::parse("km/s").unwrap();
        let cms = Unit::parse("cm/s").unwrap();
        assert!(close(kms.conversion_factor(&cms).unwrap(), 1e5));
        assert!(close(cms.conversion_factor(&kms).unwrap(), 1e-5));
    }

    #[test]
    fn test_incompatible_conversion() {
        let kms = Unit::parse("km/s").unwrap();
        let day = Unit::parse("day").unwrap();
        let err = kms.conversion_factor(&day).unwrap_err();
        assert!(matches!(err, UnitError::Incompatible { .. }));
        assert!(err.to_string().contains("km/s"));
    }

    #[test]
    fn test_display_keeps_symbol() {
        assert_eq!(Unit::parse(" g / cm3 ").unwrap().to_string(), "g / cm3");
        assert_eq!(Unit::dimensionless().to_string(), "dimensionless");
    }
}
