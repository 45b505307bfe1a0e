//! Property-based tests for the validation pipeline.

use super::validator::{ConfigValidator, CONVERGENCE_PARAMETERS, CONVERGENCE_VARIABLES};
use crate::error::Error;
use crate::namespace::{Namespace, Value};
use crate::units::{Quantity, Unit};
use proptest::prelude::*;

fn quantity(value: f64, unit: &str) -> Value {
    Value::Quantity(Quantity::new(value, Unit::parse(unit).unwrap()))
}

fn strategy_section(parent: &[(&str, f64)], explicit: &[(&str, &str, f64)]) -> Namespace {
    let mut strategy = Namespace::new();
    strategy.write("type", "damped").unwrap();
    for &(param, value) in parent {
        strategy.write(param, value).unwrap();
    }
    for &(variable, param, value) in explicit {
        if !strategy.contains_key(variable) {
            strategy.write(variable, Namespace::new()).unwrap();
        }
        strategy.section_mut(variable).unwrap().write(param, value).unwrap();
    }
    strategy
}

fn spectrum(start: f64, start_unit: &str, stop: f64, stop_unit: &str) -> Namespace {
    let mut spectrum = Namespace::new();
    spectrum.write("start", quantity(start, start_unit)).unwrap();
    spectrum.write("stop", quantity(stop, stop_unit)).unwrap();
    spectrum
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 1000,
        .. ProptestConfig::default()
    })]

    // after normalization every variable carries every parent parameter, and
    // explicitly given values survive
    #[test]
    fn convergence_defaults_fill_without_overwriting(
        damping in 0.0f64..1.0,
        threshold in 0.0f64..1.0,
        explicit_index in 0usize..4,
        explicit_value in 0.0f64..1.0,
    ) {
        let variable = CONVERGENCE_VARIABLES[explicit_index];
        let mut strategy = strategy_section(
            &[("damping_constant", damping), ("threshold", threshold)],
            &[(variable, "threshold", explicit_value)],
        );

        ConfigValidator::parse_convergence_section(&mut strategy).unwrap();

        for name in CONVERGENCE_VARIABLES {
            let sub = strategy.section(name).unwrap();
            for param in CONVERGENCE_PARAMETERS {
                prop_assert!(sub.contains_key(param));
            }
            let expected = if name == variable { explicit_value } else { threshold };
            prop_assert_eq!(sub.read("threshold").unwrap().as_f64(), Some(expected));
            prop_assert_eq!(sub.read("damping_constant").unwrap().as_f64(), Some(damping));
        }
    }

    // normalizing twice gives the same tree as normalizing once
    #[test]
    fn convergence_normalization_is_idempotent(
        damping in 0.0f64..1.0,
        threshold in 0.0f64..1.0,
    ) {
        let mut once = strategy_section(&[("damping_constant", damping), ("threshold", threshold)], &[]);
        ConfigValidator::parse_convergence_section(&mut once).unwrap();
        let mut twice = once.deep_copy();
        ConfigValidator::parse_convergence_section(&mut twice).unwrap();
        prop_assert_eq!(once, twice);
    }

    // spectrum ordering is decided after converting into the start unit
    #[test]
    fn spectrum_ordering_across_units(
        start_aa in 1.0f64..1.0e5,
        stop_aa in 1.0f64..1.0e5,
    ) {
        // stop expressed in nm: 1 nm = 10 Angstrom
        let section = spectrum(start_aa, "Angstrom", stop_aa / 10.0, "nm");
        let result = ConfigValidator::validate_spectrum_section(&section, false);

        if stop_aa < start_aa * (1.0 - 1e-9) {
            let is_invariant = matches!(result, Err(Error::PhysicalInvariant { .. }));
            prop_assert!(is_invariant);
        } else if stop_aa > start_aa * (1.0 + 1e-9) {
            prop_assert!(result.is_ok());
        }
    }

    // a non-positive time of explosion is always rejected
    #[test]
    fn time_explosion_must_be_positive(days in -1.0e3f64..1.0e3) {
        let mut supernova = Namespace::new();
        supernova.write("time_explosion", quantity(days, "day")).unwrap();
        supernova.write("luminosity_wavelength_start", quantity(0.0, "Angstrom")).unwrap();
        supernova.write("luminosity_wavelength_end", quantity(1.0e5, "Angstrom")).unwrap();

        let result = ConfigValidator::validate_supernova_section(&supernova);
        prop_assert_eq!(result.is_ok(), days > 0.0);
    }
}
