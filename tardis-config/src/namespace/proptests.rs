//! Property-based tests for namespace access and unit-preserving assignment.

use super::{Namespace, Value};
use crate::error::Error;
use crate::units::{Quantity, Unit};
use proptest::prelude::*;

fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}"
}

fn unit_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["km/s", "cm/s", "day", "s", "K", "g/cm^3", "Angstrom", "erg/s"])
}

fn nested(keys: &[String], leaf: Value) -> Namespace {
    let (last, parents) = keys.split_last().expect("at least one key");
    let mut ns = Namespace::new();
    ns.write(last, leaf).unwrap();
    for key in parents.iter().rev() {
        let mut parent = Namespace::new();
        parent.write(key, ns).unwrap();
        ns = parent;
    }
    ns
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 1000,
        .. ProptestConfig::default()
    })]

    // set then get at a quantity key returns the same magnitude and unit
    #[test]
    fn set_get_round_trip_preserves_unit(
        keys in prop::collection::vec(key_strategy(), 1..5),
        unit in unit_strategy(),
        initial in -1e6f64..1e6,
        updated in -1e6f64..1e6,
    ) {
        let unit = Unit::parse(unit).unwrap();
        let mut ns = nested(&keys, Value::Quantity(Quantity::new(initial, unit.clone())));
        let path = keys.join(".");

        ns.set(&path, Quantity::new(updated, unit.clone())).unwrap();
        let stored = ns.get(&path).unwrap().as_quantity().unwrap();
        prop_assert!((stored.value() - updated).abs() <= 1e-9 * updated.abs().max(1.0));
        prop_assert_eq!(stored.unit(), &unit);

        ns.set(&path, updated).unwrap();
        let stored = ns.get(&path).unwrap().as_quantity().unwrap();
        prop_assert_eq!(stored.value(), updated);
        prop_assert_eq!(stored.unit().symbol(), unit.symbol());
    }

    // an incompatible assignment fails and leaves the stored value alone
    #[test]
    fn incompatible_assignment_is_atomic(
        keys in prop::collection::vec(key_strategy(), 1..5),
        magnitude in -1e6f64..1e6,
        incoming in -1e6f64..1e6,
    ) {
        let stored = Quantity::new(magnitude, Unit::parse("km/s").unwrap());
        let mut ns = nested(&keys, Value::Quantity(stored.clone()));
        let path = keys.join(".");

        let result = ns.set(&path, Quantity::new(incoming, Unit::parse("day").unwrap()));
        let is_mismatch = matches!(result, Err(Error::UnitMismatch { .. }));
        prop_assert!(is_mismatch);
        prop_assert_eq!(ns.get(&path).unwrap(), &Value::Quantity(stored));
    }

    // mutating a deep copy never affects the original
    #[test]
    fn deep_copy_is_independent(
        keys in prop::collection::vec(key_strategy(), 1..5),
        original in any::<i64>(),
        replacement in any::<i64>(),
    ) {
        let ns = nested(&keys, Value::Integer(original));
        let path = keys.join(".");

        let mut copy = ns.deep_copy();
        copy.set(&path, replacement).unwrap();

        prop_assert_eq!(ns.get(&path).unwrap(), &Value::Integer(original));
        prop_assert_eq!(copy.get(&path).unwrap(), &Value::Integer(replacement));
    }

    // item<N> addresses exactly the indices of the list
    #[test]
    fn list_index_bounds(
        items in prop::collection::vec(any::<i64>(), 0..20),
        index in 0usize..30,
    ) {
        let mut ns = Namespace::new();
        ns.write("abundances", items.iter().copied().map(Value::Integer).collect::<Vec<_>>())
            .unwrap();

        let result = ns.get(&format!("abundances.item{index}"));
        if index < items.len() {
            prop_assert_eq!(result.unwrap(), &Value::Integer(items[index]));
        } else {
            let out_of_range = matches!(result, Err(Error::IndexOutOfRange { .. }));
            prop_assert!(out_of_range);
        }
    }
}
