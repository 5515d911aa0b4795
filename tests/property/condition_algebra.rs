// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for the Condition Algebra
//!
//! Merging must behave the same whatever order the rules ran in, and
//! resolving a requirement must land on a value that meets it.

use fleet_doctor::{Condition, ConditionalValue};
use proptest::prelude::*;
use std::collections::BTreeSet;

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Small atom domain so that generated sets overlap often
fn atom_set() -> impl Strategy<Value = BTreeSet<u8>> {
    prop::collection::btree_set(0u8..6, 0..4)
}

fn condition() -> impl Strategy<Value = Condition> {
    prop_oneof![
        Just(Condition::DontCare),
        Just(Condition::Is),
        Just(Condition::Include),
        Just(Condition::Included),
        Just(Condition::Exclude),
        Just(Condition::Conflict),
    ]
}

/// Requirements as rules build them: DONTCARE and CONFLICT carry no atoms
fn conditional_value() -> impl Strategy<Value = ConditionalValue<u8>> {
    (condition(), atom_set(), 0i32..40).prop_map(|(condition, value, priority)| {
        let value = match condition {
            Condition::DontCare | Condition::Conflict => BTreeSet::new(),
            _ => value,
        };
        ConditionalValue::new(condition, value).with_priority(priority)
    })
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: DONTCARE is the identity of merging
    #[test]
    fn prop_dont_care_is_identity(a in conditional_value()) {
        prop_assert_eq!(a.clone() + ConditionalValue::dont_care(), a.clone());
        prop_assert_eq!(ConditionalValue::dont_care() + a.clone(), a);
    }

    /// Property: Merging is commutative
    #[test]
    fn prop_merge_is_commutative(a in conditional_value(), b in conditional_value()) {
        prop_assert_eq!(a.clone() + b.clone(), b + a);
    }

    /// Property: CONFLICT absorbs every real requirement
    #[test]
    fn prop_conflict_absorbs(a in conditional_value(), priority in 0i32..40) {
        prop_assume!(!a.is_dont_care());
        let merged = a + ConditionalValue::conflict().with_priority(priority);
        prop_assert!(merged.is_conflict());
    }

    /// Property: Different IS values at the same priority conflict
    #[test]
    fn prop_unequal_is_at_equal_priority_conflicts(
        a in atom_set(),
        b in atom_set(),
        priority in 0i32..40,
    ) {
        prop_assume!(a != b);
        let merged = ConditionalValue::is(a).with_priority(priority)
            + ConditionalValue::is(b).with_priority(priority);
        prop_assert_eq!(merged.condition, Condition::Conflict);
    }

    /// Property: Resolution is idempotent
    #[test]
    fn prop_to_value_is_idempotent(a in conditional_value(), current in atom_set()) {
        if let Some(once) = a.to_value(&current) {
            prop_assert_eq!(a.to_value(&once), Some(once));
        } else {
            prop_assert!(a.is_conflict());
        }
    }

    /// Property: The resolved value meets the requirement
    #[test]
    fn prop_resolution_satisfies(a in conditional_value(), current in atom_set()) {
        prop_assume!(!a.is_conflict());
        let resolved = a.to_value(&current).unwrap();
        prop_assert!(a.is_satisfied_by(&resolved));
    }

    /// Property: An already satisfied requirement resolves to the current value
    #[test]
    fn prop_satisfied_value_is_kept(a in conditional_value(), current in atom_set()) {
        prop_assume!(a.is_satisfied_by(&current));
        prop_assume!(!matches!(a.condition, Condition::Include));
        prop_assert_eq!(a.to_value(&current), Some(current));
    }
}
