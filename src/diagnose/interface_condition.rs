// Copyright (c) 2025 - Cowboy AI, Inc.
//! Per-Interface Requirements
//!
//! An [`InterfaceCondition`] is one rule's complete requirement on one
//! interface: a [`ConditionalValue`] per reconciled field plus the rule
//! name(s) it stands for. Conditions from several rules merge field-wise
//! with `+` into the single requirement the interface is resolved against.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use crate::condition::ConditionalValue;
use crate::domain::{InterfaceMode, InterfaceState, ObjectId, Tag};

/// Relative rule priorities
pub mod priority {
    pub const CLEANUP: i32 = 5;
    pub const DEFAULT: i32 = 10;
    pub const MIRROR: i32 = 20;
    pub const TERMINATION: i32 = 30;
}

/// One rule's requirement on every reconciled field of an interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceCondition {
    pub arguments: Vec<String>,
    pub manual_repair: bool,
    pub is_enabled: ConditionalValue<bool>,
    pub description: ConditionalValue<String>,
    pub tags: ConditionalValue<Tag>,
    pub interface_mode: ConditionalValue<InterfaceMode>,
    pub tagged_object_ids: ConditionalValue<ObjectId>,
    pub untagged_object_id: ConditionalValue<ObjectId>,
    pub delete: ConditionalValue<bool>,
}

impl Default for InterfaceCondition {
    fn default() -> Self {
        Self {
            arguments: Vec::new(),
            manual_repair: false,
            is_enabled: ConditionalValue::dont_care(),
            description: ConditionalValue::dont_care(),
            tags: ConditionalValue::dont_care(),
            interface_mode: ConditionalValue::dont_care(),
            tagged_object_ids: ConditionalValue::dont_care(),
            untagged_object_id: ConditionalValue::dont_care(),
            delete: ConditionalValue::dont_care(),
        }
    }
}

impl InterfaceCondition {
    /// Unconstrained condition on behalf of `argument`
    pub fn new(argument: impl Into<String>) -> Self {
        Self {
            arguments: vec![argument.into()],
            ..Self::default()
        }
    }

    pub fn manual(mut self) -> Self {
        self.manual_repair = true;
        self
    }

    /// Stamp `priority` on every field
    pub fn at_priority(mut self, priority: i32) -> Self {
        self.is_enabled.priority = priority;
        self.description.priority = priority;
        self.tags.priority = priority;
        self.interface_mode.priority = priority;
        self.tagged_object_ids.priority = priority;
        self.untagged_object_id.priority = priority;
        self.delete.priority = priority;
        self
    }

    /// Requirement that the interface be wiped back to a blank, disabled port
    pub fn cleared(argument: impl Into<String>) -> Self {
        Self {
            is_enabled: ConditionalValue::is([false]),
            description: ConditionalValue::is_absent(),
            tags: ConditionalValue::is_absent(),
            interface_mode: ConditionalValue::is_absent(),
            tagged_object_ids: ConditionalValue::is_absent(),
            untagged_object_id: ConditionalValue::is_absent(),
            ..Self::new(argument)
        }
    }

    /// Whether `state` meets every field requirement
    pub fn is_satisfied_by(&self, state: &InterfaceState) -> bool {
        self.is_enabled.is_satisfied_by_scalar(Some(&state.is_enabled))
            && self.description.is_satisfied_by(&text_set(&state.description))
            && self.tags.is_satisfied_by(&state.tags)
            && self
                .interface_mode
                .is_satisfied_by_scalar(state.interface_mode.as_ref())
            && self.tagged_object_ids.is_satisfied_by(&state.tagged_object_ids)
            && self
                .untagged_object_id
                .is_satisfied_by_scalar(state.untagged_object_id.as_ref())
            && self.delete.is_satisfied_by_scalar(Some(&state.delete))
    }

    /// Names of the fields whose requirements contradict each other
    pub fn conflicting_fields(&self) -> Vec<&'static str> {
        [
            ("is_enabled", self.is_enabled.is_conflict()),
            ("description", self.description.is_conflict()),
            ("tags", self.tags.is_conflict()),
            ("interface_mode", self.interface_mode.is_conflict()),
            ("tagged_object_ids", self.tagged_object_ids.is_conflict()),
            ("untagged_object_id", self.untagged_object_id.is_conflict()),
            ("delete", self.delete.is_conflict()),
        ]
        .into_iter()
        .filter_map(|(field, conflict)| conflict.then_some(field))
        .collect()
    }

    /// Desired state closest to `current`; `None` if any field is in conflict
    pub fn resolve(&self, current: &InterfaceState) -> Option<InterfaceState> {
        if !self.conflicting_fields().is_empty() {
            return None;
        }

        Some(InterfaceState {
            object_id: current.object_id,
            name: current.name.clone(),
            is_enabled: self.is_enabled.to_flag(current.is_enabled),
            description: self.description.to_text(&current.description),
            tags: self.tags.to_value(&current.tags)?,
            interface_mode: self.interface_mode.to_scalar(current.interface_mode.as_ref()),
            tagged_object_ids: self.tagged_object_ids.to_value(&current.tagged_object_ids)?,
            untagged_object_id: self
                .untagged_object_id
                .to_scalar(current.untagged_object_id.as_ref()),
            is_lag_member: current.is_lag_member,
            delete: self.delete.to_flag(current.delete),
        })
    }
}

fn text_set(text: &str) -> BTreeSet<String> {
    if text.is_empty() {
        BTreeSet::new()
    } else {
        [text.to_string()].into_iter().collect()
    }
}

impl Add for InterfaceCondition {
    type Output = InterfaceCondition;

    fn add(self, other: Self) -> Self::Output {
        let mut arguments = self.arguments;
        arguments.extend(other.arguments);

        Self {
            arguments,
            manual_repair: self.manual_repair || other.manual_repair,
            is_enabled: self.is_enabled + other.is_enabled,
            description: self.description + other.description,
            tags: self.tags + other.tags,
            interface_mode: self.interface_mode + other.interface_mode,
            tagged_object_ids: self.tagged_object_ids + other.tagged_object_ids,
            untagged_object_id: self.untagged_object_id + other.untagged_object_id,
            delete: self.delete + other.delete,
        }
    }
}

impl Sum for InterfaceCondition {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl fmt::Display for InterfaceCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.arguments.join(", "))?;
        if self.manual_repair {
            write!(f, " manual")?;
        }
        write!(
            f,
            " enabled={} desc={} tags={} mode={} tagged={} untagged={} delete={}",
            self.is_enabled,
            self.description,
            self.tags,
            self.interface_mode,
            self.tagged_object_ids,
            self.untagged_object_id,
            self.delete
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;
    use pretty_assertions::assert_eq;

    fn oid(id: u64) -> ObjectId {
        ObjectId::new(id)
    }

    fn access_port() -> InterfaceState {
        let mut state = InterfaceState::new(oid(1), "ge-0/0/1");
        state.is_enabled = true;
        state.description = "printer".to_string();
        state.interface_mode = Some(InterfaceMode::Access);
        state.untagged_object_id = Some(oid(10));
        state
    }

    #[test]
    fn test_default_is_satisfied_by_anything() {
        assert!(InterfaceCondition::default().is_satisfied_by(&access_port()));
    }

    #[test]
    fn test_cleared_resolves_to_blank_port() {
        let current = access_port();
        let condition = InterfaceCondition::cleared("cleanup").at_priority(priority::CLEANUP);

        assert!(!condition.is_satisfied_by(&current));
        let desired = condition.resolve(&current).unwrap();
        assert_eq!(desired, InterfaceState::new(oid(1), "ge-0/0/1"));
    }

    #[test]
    fn test_merge_concatenates_arguments_and_ors_manual() {
        let a = InterfaceCondition::new("a");
        let b = InterfaceCondition::new("b").manual();
        let merged = a + b;
        assert_eq!(merged.arguments, vec!["a".to_string(), "b".to_string()]);
        assert!(merged.manual_repair);
    }

    #[test]
    fn test_conflicting_fields_block_resolution() {
        let mut a = InterfaceCondition::new("a");
        a.is_enabled = ConditionalValue::is([true]);
        let mut b = InterfaceCondition::new("b");
        b.is_enabled = ConditionalValue::is([false]);

        let merged: InterfaceCondition = vec![a, b].into_iter().sum();
        assert_eq!(merged.is_enabled.condition, Condition::Conflict);
        assert_eq!(merged.conflicting_fields(), vec!["is_enabled"]);
        assert_eq!(merged.resolve(&access_port()), None);
    }

    #[test]
    fn test_resolve_keeps_unconstrained_fields() {
        let current = access_port();
        let mut condition = InterfaceCondition::new("tagged");
        condition.interface_mode = ConditionalValue::is([InterfaceMode::Tagged]);
        condition.tagged_object_ids = ConditionalValue::include([oid(20)]);

        let desired = condition.resolve(&current).unwrap();
        assert_eq!(desired.interface_mode, Some(InterfaceMode::Tagged));
        assert_eq!(desired.description, "printer");
        assert_eq!(desired.untagged_object_id, Some(oid(10)));
        assert_eq!(desired.tagged_object_ids, [oid(20)].into_iter().collect());
    }
}
