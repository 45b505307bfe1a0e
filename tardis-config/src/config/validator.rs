//! Configuration validation.
//!
//! The pipeline runs on the unit-coerced root namespace and enforces the
//! physical consistency rules that a schema cannot express: ordering of
//! boundaries, positivity of physical quantities, and propagation of shared
//! convergence defaults into the per-variable sub-sections. It stops at the
//! first violation.

use crate::error::{Error, Result};
use crate::namespace::{Namespace, Value};
use crate::units::{Quantity, Unit};

/// Variables tracked by the damped convergence strategy.
pub const CONVERGENCE_VARIABLES: [&str; 4] = ["t_inner", "t_rad", "w", "v_inner_boundary"];

/// Parameters inherited from the strategy into each tracked variable.
pub const CONVERGENCE_PARAMETERS: [&str; 3] = ["damping_constant", "threshold", "type"];

/// Lowest accepted initial temperature; `-1 K` asks for an automatic estimate.
const TEMPERATURE_FLOOR_KELVIN: f64 = -1.0;

/// Validates configuration trees according to the physical rules.
///
/// # Examples
///
/// ```
/// use tardis_config::config::{ConfigValidator, SchemaValidator, UnitCoercingSchema};
///
/// let doc: serde_yaml::Mapping = serde_yaml::from_str(
///     "montecarlo:\n  convergence_strategy:\n    type: damped\n    threshold: 0.05\n\
///      spectrum:\n  start: 500 Angstrom\n  stop: 20000 Angstrom\n",
/// ).unwrap();
/// let mut root = UnitCoercingSchema::default().validate(&doc).unwrap();
///
/// ConfigValidator::validate(&mut root).unwrap();
/// assert_eq!(
///     root.get("montecarlo.convergence_strategy.w.threshold").unwrap().as_f64(),
///     Some(0.05)
/// );
/// ```
pub struct ConfigValidator;

impl ConfigValidator {
    /// Run the full pipeline on a schema-validated root.
    ///
    /// The convergence strategy is normalized in place; nothing else is
    /// modified.
    ///
    /// # Errors
    ///
    /// Returns the first violation found: [`Error::MutualExclusion`],
    /// [`Error::MissingField`], [`Error::Validation`],
    /// [`Error::PhysicalInvariant`], [`Error::UnsupportedFeature`] or
    /// [`Error::UnitMismatch`].
    pub fn validate(root: &mut Namespace) -> Result<()> {
        Self::check_mutual_exclusion(root)?;

        let montecarlo = section_mut(root, "montecarlo", "montecarlo")?;
        Self::validate_montecarlo_section(montecarlo)?;
        let enable_full_relativity = flag(
            montecarlo,
            "enable_full_relativity",
            "montecarlo.enable_full_relativity",
        )?;
        log::debug!("montecarlo section validated");

        if root.contains_key("csvy_model") {
            log::debug!("csvy_model present, skipping model, supernova and plasma checks");
        } else if root.contains_key("model") {
            Self::validate_model_section(section(root, "model", "model")?)?;
            Self::validate_supernova_section(section(root, "supernova", "supernova")?)?;
            Self::validate_plasma_section(section(root, "plasma", "plasma")?)?;
            log::debug!("model, supernova and plasma sections validated");
        }

        Self::validate_spectrum_section(
            section(root, "spectrum", "spectrum")?,
            enable_full_relativity,
        )?;
        log::debug!("spectrum section validated");

        Ok(())
    }

    /// Reject a root that declares both `model` and `csvy_model`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MutualExclusion`] if both keys are present.
    pub fn check_mutual_exclusion(root: &Namespace) -> Result<()> {
        if root.contains_key("model") && root.contains_key("csvy_model") {
            return Err(Error::MutualExclusion {
                first: "model".into(),
                second: "csvy_model".into(),
            });
        }
        Ok(())
    }

    /// Validate the montecarlo section and normalize its convergence strategy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFeature`] for a `custom` strategy and
    /// [`Error::Validation`] for any type other than `damped`.
    pub fn validate_montecarlo_section(montecarlo: &mut Namespace) -> Result<()> {
        const PATH: &str = "montecarlo.convergence_strategy";

        let strategy = section_mut(montecarlo, "convergence_strategy", PATH)?;
        let kind = string(strategy, "type", "montecarlo.convergence_strategy.type")?.to_string();

        match kind.as_str() {
            "damped" => Self::parse_convergence_section(strategy),
            "custom" => Err(Error::UnsupportedFeature {
                feature: "custom convergence strategy".into(),
                details: "convergence_strategy is set to \"custom\"; a specific convergence \
                          treatment has to be implemented"
                    .into(),
            }),
            other => Err(Error::Validation {
                field: "montecarlo.convergence_strategy.type".into(),
                message: format!("expected \"damped\" or \"custom\", found \"{other}\""),
            }),
        }
    }

    /// Copy the strategy's shared parameters into each tracked variable.
    ///
    /// Missing (or null) variable sub-sections are created. A parameter is
    /// only written where the sub-section has no non-null value of its own.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a variable entry is neither a section
    /// nor null.
    pub fn parse_convergence_section(strategy: &mut Namespace) -> Result<()> {
        let defaults: Vec<(&str, Value)> = CONVERGENCE_PARAMETERS
            .iter()
            .filter_map(|&param| match strategy.read(param) {
                Ok(value) if !value.is_null() => Some((param, value.clone())),
                _ => None,
            })
            .collect();

        for variable in CONVERGENCE_VARIABLES {
            if !strategy.read(variable).is_ok_and(|v| !v.is_null()) {
                strategy.write(variable, Namespace::new())?;
            }

            let path = format!("montecarlo.convergence_strategy.{variable}");
            let sub = section_mut(strategy, variable, &path)?;
            for (param, value) in &defaults {
                let explicit = sub.read(param).is_ok_and(|v| !v.is_null());
                if !explicit {
                    sub.write(param, value.clone())?;
                    log::debug!("{path}.{param} inherited from convergence_strategy");
                }
            }
        }

        Ok(())
    }

    /// Validate the inline model section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PhysicalInvariant`] for inverted velocity boundaries
    /// or non-positive density parameters, and [`Error::Validation`] for an
    /// unknown density type.
    pub fn validate_model_section(model: &Namespace) -> Result<()> {
        let structure = section(model, "structure", "model.structure")?;

        match string(structure, "type", "model.structure.type")? {
            "specific" => {
                let velocity = section(structure, "velocity", "model.structure.velocity")?;
                let start = quantity(velocity, "start", "model.structure.velocity.start")?;
                let stop = quantity(velocity, "stop", "model.structure.velocity.stop")?;
                check_not_less(
                    "model.structure.velocity",
                    ("start velocity", &start),
                    ("stop velocity", &stop),
                )?;
            }
            "file" => {
                let inner = quantity(
                    structure,
                    "v_inner_boundary",
                    "model.structure.v_inner_boundary",
                )?;
                let outer = quantity(
                    structure,
                    "v_outer_boundary",
                    "model.structure.v_outer_boundary",
                )?;
                check_not_less(
                    "model.structure",
                    ("inner boundary velocity", &inner),
                    ("outer boundary velocity", &outer),
                )?;
            }
            other => log::debug!("no ordering rules for structure type \"{other}\""),
        }

        match structure.read("density") {
            Ok(Value::Null) | Err(_) => Ok(()),
            Ok(_) => Self::validate_density_section(section(
                structure,
                "density",
                "model.structure.density",
            )?),
        }
    }

    fn validate_density_section(density: &Namespace) -> Result<()> {
        match string(density, "type", "model.structure.density.type")? {
            "exponential" | "power_law" => {
                let rho_0 = quantity(density, "rho_0", "model.structure.density.rho_0")?;
                check_positive("model.structure.density.rho_0", "density", &rho_0)?;
                let v_0 = quantity(density, "v_0", "model.structure.density.v_0")?;
                check_positive("model.structure.density.v_0", "velocity", &v_0)?;
            }
            "uniform" => {
                let value = quantity(density, "value", "model.structure.density.value")?;
                check_positive("model.structure.density.value", "density value", &value)?;
            }
            other => {
                return Err(Error::Validation {
                    field: "model.structure.density.type".into(),
                    message: format!(
                        "unknown density type \"{other}\", expected exponential, power_law or uniform"
                    ),
                })
            }
        }

        if let Some(time_0) = optional_quantity(density, "time_0", "model.structure.density.time_0")? {
            check_positive("model.structure.density.time_0", "time", &time_0)?;
        }
        Ok(())
    }

    /// Validate the supernova section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PhysicalInvariant`] if `time_explosion` is not
    /// positive or the luminosity wavelength limits are inverted.
    pub fn validate_supernova_section(supernova: &Namespace) -> Result<()> {
        let time_explosion = quantity(supernova, "time_explosion", "supernova.time_explosion")?;
        check_positive("supernova.time_explosion", "time of explosion", &time_explosion)?;

        let start = quantity(
            supernova,
            "luminosity_wavelength_start",
            "supernova.luminosity_wavelength_start",
        )?;
        let end = quantity(
            supernova,
            "luminosity_wavelength_end",
            "supernova.luminosity_wavelength_end",
        )?;
        check_not_less(
            "supernova.luminosity_wavelength",
            ("luminosity wavelength start", &start),
            ("luminosity wavelength end", &end),
        )
    }

    /// Validate the plasma section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PhysicalInvariant`] if an initial temperature is
    /// below `-1 K`.
    pub fn validate_plasma_section(plasma: &Namespace) -> Result<()> {
        let kelvin = Unit::parse("K")?;

        for (key, what) in [
            ("initial_t_inner", "initial temperature of the inner boundary"),
            ("initial_t_rad", "initial radiative temperature"),
        ] {
            let path = format!("plasma.{key}");
            let temperature = quantity(plasma, key, &path)?;
            let kelvins = magnitude_in(&temperature, &kelvin, &path)?;
            if kelvins.is_nan() || kelvins < TEMPERATURE_FLOOR_KELVIN {
                return Err(Error::PhysicalInvariant {
                    field: path,
                    message: format!("{what} is invalid, {temperature}"),
                });
            }
        }
        Ok(())
    }

    /// Validate the spectrum section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PhysicalInvariant`] if `start > stop`, and
    /// [`Error::UnsupportedFeature`] for the integrated method under full
    /// relativity.
    pub fn validate_spectrum_section(spectrum: &Namespace, enable_full_relativity: bool) -> Result<()> {
        let start = quantity(spectrum, "start", "spectrum.start")?;
        let stop = quantity(spectrum, "stop", "spectrum.stop")?;
        check_not_less("spectrum", ("start", &start), ("stop", &stop))?;

        let integrated = match spectrum.read("method") {
            Ok(Value::Null) | Err(_) => false,
            Ok(_) => string(spectrum, "method", "spectrum.method")? == "integrated",
        };

        if integrated && enable_full_relativity {
            return Err(Error::UnsupportedFeature {
                feature: "integrated spectrum with full relativity".into(),
                details: "the spectrum method is set to 'integrated' and enable_full_relativity \
                          to true; the formal integral is not available in full relativity mode"
                    .into(),
            });
        }
        Ok(())
    }
}

fn section<'a>(parent: &'a Namespace, key: &str, path: &str) -> Result<&'a Namespace> {
    parent.section(key).map_err(|e| at_path(e, path))
}

fn section_mut<'a>(parent: &'a mut Namespace, key: &str, path: &str) -> Result<&'a mut Namespace> {
    parent.section_mut(key).map_err(|e| at_path(e, path))
}

fn string<'a>(parent: &'a Namespace, key: &str, path: &str) -> Result<&'a str> {
    parent.str(key).map_err(|e| at_path(e, path))
}

/// Reads a quantity; plain numbers are taken as dimensionless.
fn quantity(parent: &Namespace, key: &str, path: &str) -> Result<Quantity> {
    let value = parent.read(key).map_err(|e| at_path(e, path))?;
    match value {
        Value::Quantity(q) => Ok(q.clone()),
        Value::Integer(_) | Value::Float(_) => Ok(Quantity::dimensionless(
            value.as_f64().unwrap_or_default(),
        )),
        other => Err(Error::Validation {
            field: path.to_string(),
            message: format!("expected a quantity, found a {}", other.type_name()),
        }),
    }
}

fn optional_quantity(parent: &Namespace, key: &str, path: &str) -> Result<Option<Quantity>> {
    match parent.read(key) {
        Ok(Value::Null) | Err(_) => Ok(None),
        Ok(_) => quantity(parent, key, path).map(Some),
    }
}

/// Reads a boolean flag; absent or null counts as `false`.
fn flag(parent: &Namespace, key: &str, path: &str) -> Result<bool> {
    match parent.read(key) {
        Ok(Value::Null) | Err(_) => Ok(false),
        Ok(Value::Bool(b)) => Ok(*b),
        Ok(other) => Err(Error::Validation {
            field: path.to_string(),
            message: format!("expected a boolean, found a {}", other.type_name()),
        }),
    }
}

/// Rewrites a single-key lookup error to name the full dotted path.
fn at_path(err: Error, path: &str) -> Error {
    match err {
        Error::MissingAttribute { .. } => Error::MissingField {
            field: path.to_string(),
        },
        Error::Validation { message, .. } => Error::Validation {
            field: path.to_string(),
            message,
        },
        other => other,
    }
}

/// Magnitude of `q` in `unit`. Dimensionless numbers are taken as already
/// being in `unit`.
fn magnitude_in(q: &Quantity, unit: &Unit, path: &str) -> Result<f64> {
    if q.unit().dimension().is_dimensionless() {
        return Ok(q.value());
    }
    q.value_in(unit)
        .map_err(|e| Error::from(e).with_field(path))
}

fn check_positive(path: &str, what: &str, q: &Quantity) -> Result<()> {
    if q.value() > 0.0 {
        Ok(())
    } else {
        Err(Error::PhysicalInvariant {
            field: path.to_string(),
            message: format!("{what} must be positive, found {q}"),
        })
    }
}

/// Passes only if `lower <= upper` once both are in `lower`'s unit; an
/// unordered (NaN) pair fails.
fn check_not_less(path: &str, lower: (&str, &Quantity), upper: (&str, &Quantity)) -> Result<()> {
    let (lower_name, lower_q) = lower;
    let (upper_name, upper_q) = upper;

    let upper_value = if lower_q.unit().dimension().is_dimensionless() {
        upper_q.value()
    } else {
        magnitude_in(upper_q, lower_q.unit(), path)?
    };

    if lower_q.value() <= upper_value {
        return Ok(());
    }
    Err(Error::PhysicalInvariant {
        field: path.to_string(),
        message: format!(
            "{upper_name} cannot be less than {lower_name} \
             ({lower_name} = {lower_q}, {upper_name} = {upper_q})"
        ),
    })
}
