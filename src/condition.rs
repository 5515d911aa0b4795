// Copyright (c) 2025 - Cowboy AI, Inc.
//! Constraint Algebra over Set-Valued Fields
//!
//! A [`ConditionalValue`] is one rule's requirement on one field: a
//! [`Condition`], the set of atoms it talks about and a priority. Scalars
//! are singleton sets and absence is the empty set, so booleans, strings,
//! tags, modes and VLAN object ids all go through the same operations.
//!
//! Requirements from independent rules combine with `+`:
//!
//! ```text
//! DONTCARE + x                 = x
//! IS{a}    + IS{a}             = IS{a}
//! INCLUDE{a} + INCLUDE{b}      = INCLUDE{a ∪ b}
//! INCLUDED{a} + EXCLUDE{b}     = INCLUDED{a − b}
//! EXCLUDE{a} + EXCLUDE{b}      = EXCLUDE{a ∪ b}
//! incompatible, no tie-breaker = CONFLICT
//! ```
//!
//! `+` is commutative. CONFLICT absorbs everything except DONTCARE and is
//! never satisfiable, so a contradiction can never be silently resolved.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use tracing::debug;

/// How a policy value constrains a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Condition {
    /// No requirement
    DontCare,
    /// Field must equal the policy value
    Is,
    /// Field must be a superset of the policy value
    Include,
    /// Field must be a subset of the policy value
    Included,
    /// Field must be disjoint from the policy value
    Exclude,
    /// Unsatisfiable
    Conflict,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::DontCare => "DONTCARE",
            Self::Is => "IS",
            Self::Include => "INCLUDE",
            Self::Included => "INCLUDED",
            Self::Exclude => "EXCLUDE",
            Self::Conflict => "CONFLICT",
        })
    }
}

/// One requirement on one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalValue<T: Ord> {
    pub condition: Condition,
    pub value: BTreeSet<T>,
    pub priority: i32,
}

impl<T: Ord> Default for ConditionalValue<T> {
    fn default() -> Self {
        Self::dont_care()
    }
}

impl<T: Ord> ConditionalValue<T> {
    pub fn new(condition: Condition, value: impl IntoIterator<Item = T>) -> Self {
        Self {
            condition,
            value: value.into_iter().collect(),
            priority: 0,
        }
    }

    pub fn dont_care() -> Self {
        Self::new(Condition::DontCare, [])
    }

    pub fn is(value: impl IntoIterator<Item = T>) -> Self {
        Self::new(Condition::Is, value)
    }

    /// IS the empty set: the field must be absent
    pub fn is_absent() -> Self {
        Self::new(Condition::Is, [])
    }

    pub fn include(value: impl IntoIterator<Item = T>) -> Self {
        Self::new(Condition::Include, value)
    }

    pub fn included(value: impl IntoIterator<Item = T>) -> Self {
        Self::new(Condition::Included, value)
    }

    pub fn exclude(value: impl IntoIterator<Item = T>) -> Self {
        Self::new(Condition::Exclude, value)
    }

    pub fn conflict() -> Self {
        Self::new(Condition::Conflict, [])
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn is_dont_care(&self) -> bool {
        self.condition == Condition::DontCare
    }

    pub fn is_conflict(&self) -> bool {
        self.condition == Condition::Conflict
    }

    /// Whether `value` meets this requirement
    pub fn is_satisfied_by(&self, value: &BTreeSet<T>) -> bool {
        match self.condition {
            Condition::DontCare => true,
            Condition::Is => &self.value == value,
            Condition::Include => self.value.is_subset(value),
            Condition::Included => value.is_subset(&self.value),
            Condition::Exclude => self.value.is_disjoint(value),
            Condition::Conflict => false,
        }
    }

    /// Scalar form of [`is_satisfied_by`](Self::is_satisfied_by); `None` is the empty set
    pub fn is_satisfied_by_scalar(&self, value: Option<&T>) -> bool
    where
        T: Clone,
    {
        self.is_satisfied_by(&value.cloned().into_iter().collect())
    }
}

impl<T: Ord + Clone> ConditionalValue<T> {
    /// Closest value to `current` that meets this requirement; `None` for CONFLICT
    pub fn to_value(&self, current: &BTreeSet<T>) -> Option<BTreeSet<T>> {
        match self.condition {
            Condition::DontCare => Some(current.clone()),
            Condition::Is | Condition::Include => Some(self.value.clone()),
            Condition::Included => Some(current.intersection(&self.value).cloned().collect()),
            Condition::Exclude => Some(current.difference(&self.value).cloned().collect()),
            Condition::Conflict => None,
        }
    }

    /// Resolve a single-valued field: a singleton yields its atom, anything else `None`
    pub fn to_scalar(&self, current: Option<&T>) -> Option<T> {
        let current: BTreeSet<T> = current.cloned().into_iter().collect();
        let resolved = self.to_value(&current)?;
        if resolved.len() == 1 {
            resolved.into_iter().next()
        } else {
            None
        }
    }
}

impl ConditionalValue<bool> {
    /// Resolve a boolean field, keeping `current` unless a single value is required
    pub fn to_flag(&self, current: bool) -> bool {
        self.to_scalar(Some(&current)).unwrap_or(current)
    }
}

impl ConditionalValue<String> {
    /// Resolve a text field; anything but a single string becomes empty
    pub fn to_text(&self, current: &str) -> String {
        let current = (!current.is_empty()).then(|| current.to_string());
        self.to_scalar(current.as_ref()).unwrap_or_default()
    }
}

fn merged<T: Ord>(condition: Condition, value: BTreeSet<T>, priority: i32) -> ConditionalValue<T> {
    ConditionalValue {
        condition,
        value,
        priority,
    }
}

impl<T: Ord + Clone + fmt::Debug> Add for ConditionalValue<T> {
    type Output = ConditionalValue<T>;

    fn add(self, other: Self) -> Self::Output {
        use Condition::*;

        let priority = self.priority.max(other.priority);

        // order the pair so each combination is handled once
        let (a, b) = if rank(self.condition) <= rank(other.condition) {
            (self, other)
        } else {
            (other, self)
        };

        match (a.condition, b.condition) {
            (DontCare, DontCare) => merged(DontCare, BTreeSet::new(), priority),
            (DontCare, _) => b,

            (Is, Is) => {
                if a.value == b.value {
                    merged(Is, a.value, priority)
                } else {
                    prefer_higher(a, b, priority)
                }
            }

            (Is, Include) => {
                if b.value.is_subset(&a.value) {
                    merged(Is, a.value, priority)
                } else {
                    prefer_higher(a, b, priority)
                }
            }

            (Is, Included) => {
                if a.value.is_subset(&b.value) {
                    merged(Is, a.value, priority)
                } else {
                    prefer_higher(a, b, priority)
                }
            }

            (Is, Exclude) => {
                if a.value.is_disjoint(&b.value) {
                    merged(Is, a.value, priority)
                } else if a.priority > b.priority {
                    let remaining = a.value.difference(&b.value).cloned().collect();
                    merged(Is, remaining, priority)
                } else {
                    conflict(a, b, priority)
                }
            }

            (Include, Include) => {
                let union = a.value.union(&b.value).cloned().collect();
                merged(Include, union, priority)
            }

            (Include, Included) => {
                if a.value.is_subset(&b.value) {
                    merged(Include, a.value, priority)
                } else {
                    conflict(a, b, priority)
                }
            }

            (Include, Exclude) => {
                if a.value.is_disjoint(&b.value) {
                    merged(Include, a.value, priority)
                } else {
                    conflict(a, b, priority)
                }
            }

            (Included, Included) => {
                let union = a.value.union(&b.value).cloned().collect();
                merged(Included, union, priority)
            }

            (Included, Exclude) => {
                let remaining = a.value.difference(&b.value).cloned().collect();
                merged(Included, remaining, priority)
            }

            (Exclude, Exclude) => {
                let union = a.value.union(&b.value).cloned().collect();
                merged(Exclude, union, priority)
            }

            _ => conflict(a, b, priority),
        }
    }
}

impl<T: Ord + Clone + fmt::Debug> Sum for ConditionalValue<T> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::dont_care(), Add::add)
    }
}

fn rank(condition: Condition) -> u8 {
    match condition {
        Condition::DontCare => 0,
        Condition::Is => 1,
        Condition::Include => 2,
        Condition::Included => 3,
        Condition::Exclude => 4,
        Condition::Conflict => 5,
    }
}

fn prefer_higher<T: Ord + Clone + fmt::Debug>(
    a: ConditionalValue<T>,
    b: ConditionalValue<T>,
    priority: i32,
) -> ConditionalValue<T> {
    match a.priority.cmp(&b.priority) {
        std::cmp::Ordering::Greater => merged(a.condition, a.value, priority),
        std::cmp::Ordering::Less => merged(b.condition, b.value, priority),
        std::cmp::Ordering::Equal => conflict(a, b, priority),
    }
}

fn conflict<T: Ord + fmt::Debug>(
    a: ConditionalValue<T>,
    b: ConditionalValue<T>,
    priority: i32,
) -> ConditionalValue<T> {
    debug!(
        "Conflicting requirements: {} {:?} (priority {}) + {} {:?} (priority {})",
        a.condition, a.value, a.priority, b.condition, b.value, b.priority
    );
    merged(Condition::Conflict, BTreeSet::new(), priority)
}

impl<T: Ord + fmt::Debug> fmt::Display for ConditionalValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.condition {
            Condition::DontCare | Condition::Conflict => write!(f, "{}", self.condition),
            _ => write!(f, "{} {:?} @{}", self.condition, self.value, self.priority),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    type Cv = ConditionalValue<u32>;

    fn set(values: &[u32]) -> BTreeSet<u32> {
        values.iter().copied().collect()
    }

    fn cv(condition: Condition, values: &[u32]) -> Cv {
        Cv::new(condition, values.iter().copied())
    }

    fn assert_merge(a: Cv, b: Cv, condition: Condition, values: &[u32]) {
        let ab = a.clone() + b.clone();
        let ba = b + a;
        assert_eq!(ab.condition, condition);
        assert_eq!(ab.value, set(values));
        assert_eq!(ab, ba);
    }

    #[test_case(Condition::Is, &[1, 2, 3], &[1, 2, 3], true; "is equal")]
    #[test_case(Condition::Is, &[1, 2], &[1, 2, 3], false; "is differs")]
    #[test_case(Condition::Include, &[1, 2], &[1, 2, 3], true; "include superset")]
    #[test_case(Condition::Include, &[1, 4], &[1, 2, 3], false; "include missing")]
    #[test_case(Condition::Included, &[1, 2, 3], &[1, 3], true; "included subset")]
    #[test_case(Condition::Included, &[1, 2], &[1, 3], false; "included excess")]
    #[test_case(Condition::Exclude, &[4], &[1, 3], true; "exclude disjoint")]
    #[test_case(Condition::Exclude, &[3], &[1, 3], false; "exclude overlap")]
    #[test_case(Condition::DontCare, &[], &[7], true; "dont care")]
    #[test_case(Condition::Conflict, &[], &[], false; "conflict")]
    fn test_is_satisfied_by(condition: Condition, policy: &[u32], value: &[u32], expected: bool) {
        assert_eq!(cv(condition, policy).is_satisfied_by(&set(value)), expected);
    }

    #[test_case(Condition::Is, &[1, 2], Condition::Is, &[1, 2], Condition::Is, &[1, 2]; "is is equal")]
    #[test_case(Condition::Is, &[1, 2, 3], Condition::Include, &[1, 3], Condition::Is, &[1, 2, 3]; "is include compatible")]
    #[test_case(Condition::Is, &[1, 3], Condition::Included, &[1, 2, 3], Condition::Is, &[1, 3]; "is included compatible")]
    #[test_case(Condition::Is, &[1, 3], Condition::Exclude, &[2], Condition::Is, &[1, 3]; "is exclude disjoint")]
    #[test_case(Condition::Include, &[1, 2], Condition::Include, &[1, 3], Condition::Include, &[1, 2, 3]; "include include")]
    #[test_case(Condition::Include, &[1, 3], Condition::Included, &[1, 2, 3], Condition::Include, &[1, 3]; "include included compatible")]
    #[test_case(Condition::Include, &[1, 3], Condition::Exclude, &[2], Condition::Include, &[1, 3]; "include exclude disjoint")]
    #[test_case(Condition::Included, &[1, 3], Condition::Included, &[2, 3], Condition::Included, &[1, 2, 3]; "included included")]
    #[test_case(Condition::Included, &[1, 2, 3], Condition::Exclude, &[2], Condition::Included, &[1, 3]; "included exclude")]
    #[test_case(Condition::Exclude, &[1, 2], Condition::Exclude, &[1, 3], Condition::Exclude, &[1, 2, 3]; "exclude exclude")]
    fn test_merge_compatible(
        a: Condition,
        av: &[u32],
        b: Condition,
        bv: &[u32],
        expected: Condition,
        values: &[u32],
    ) {
        assert_merge(cv(a, av), cv(b, bv), expected, values);
    }

    #[test_case(Condition::Is, &[1, 2, 3], Condition::Is, &[1, 2]; "is is")]
    #[test_case(Condition::Is, &[1, 2, 3], Condition::Include, &[1, 4]; "is include")]
    #[test_case(Condition::Is, &[1, 3], Condition::Included, &[2, 3]; "is included")]
    #[test_case(Condition::Is, &[1, 3], Condition::Exclude, &[1]; "is exclude")]
    #[test_case(Condition::Include, &[1, 3], Condition::Included, &[1, 2]; "include included")]
    #[test_case(Condition::Include, &[1, 3], Condition::Exclude, &[1, 2]; "include exclude")]
    #[test_case(Condition::Conflict, &[], Condition::Is, &[1]; "conflict absorbs")]
    fn test_merge_conflict(a: Condition, av: &[u32], b: Condition, bv: &[u32]) {
        assert_merge(cv(a, av), cv(b, bv), Condition::Conflict, &[]);
    }

    #[test]
    fn test_dont_care_is_identity() {
        let a = cv(Condition::Is, &[1, 2, 3]).with_priority(20);
        assert_eq!(a.clone() + Cv::dont_care(), a);
        assert_eq!(Cv::dont_care() + a.clone(), a);
    }

    #[test]
    fn test_priority_breaks_is_ties() {
        let low = cv(Condition::Is, &[]).with_priority(5);
        let high = cv(Condition::Is, &[7]).with_priority(30);

        let merged = low.clone() + high.clone();
        assert_eq!(merged.condition, Condition::Is);
        assert_eq!(merged.value, set(&[7]));
        assert_eq!(merged.priority, 30);
        assert_eq!(merged, high + low);
    }

    #[test]
    fn test_priority_resolves_is_exclude_overlap() {
        let is = cv(Condition::Is, &[1, 2, 3]).with_priority(20);
        let exclude = cv(Condition::Exclude, &[2]).with_priority(10);
        assert_merge(is, exclude, Condition::Is, &[1, 3]);
    }

    #[test]
    fn test_stronger_exclude_conflicts_with_is() {
        let is = cv(Condition::Is, &[1, 2, 3]).with_priority(10);
        let exclude = cv(Condition::Exclude, &[2]).with_priority(20);
        assert_merge(is, exclude, Condition::Conflict, &[]);
    }

    #[test]
    fn test_summation() {
        let parts = vec![
            cv(Condition::Include, &[1, 2]),
            cv(Condition::Include, &[2, 3]),
            cv(Condition::Included, &[1, 2, 3, 4]),
            cv(Condition::Exclude, &[4]),
        ];
        let total: Cv = parts.into_iter().sum();
        assert_eq!(total.condition, Condition::Include);
        assert_eq!(total.value, set(&[1, 2, 3]));
    }

    #[test]
    fn test_to_value() {
        let current = set(&[1, 2, 5]);
        assert_eq!(Cv::dont_care().to_value(&current), Some(current.clone()));
        assert_eq!(cv(Condition::Is, &[9]).to_value(&current), Some(set(&[9])));
        assert_eq!(cv(Condition::Include, &[1, 9]).to_value(&current), Some(set(&[1, 9])));
        assert_eq!(cv(Condition::Included, &[1, 2]).to_value(&current), Some(set(&[1, 2])));
        assert_eq!(cv(Condition::Exclude, &[5]).to_value(&current), Some(set(&[1, 2])));
        assert_eq!(Cv::conflict().to_value(&current), None);
    }

    #[test]
    fn test_scalar_helpers() {
        assert!(!ConditionalValue::is([false]).to_flag(true));
        assert!(ConditionalValue::<bool>::dont_care().to_flag(true));

        assert_eq!(ConditionalValue::<String>::is_absent().to_text("uplink"), "");
        assert_eq!(
            ConditionalValue::is(["core".to_string()]).to_text(""),
            "core".to_string()
        );
        assert_eq!(ConditionalValue::<String>::dont_care().to_text("keep"), "keep");

        assert_eq!(cv(Condition::Is, &[1, 2]).to_scalar(Some(&1)), None);
        assert_eq!(Cv::dont_care().to_scalar(Some(&4)), Some(4));
    }
}
