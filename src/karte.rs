// Copyright (c) 2025 - Cowboy AI, Inc.
//! Diagnosis Report Model
//!
//! A [`Karte`] is the ordered list of [`Assessment`]s one diagnosis run
//! produced. Each assessment pairs the current state of a device or an
//! interface with the desired state (when one could be computed), the rules
//! it violates, and free-form [`Annotation`]s.
//!
//! ```text
//! Karte (run_id, generated_at)
//!   ├── minami3                 WARN    neglected edge
//!   ├── minami3 / ge-0/0/1      UPDATE  Hosting tag consistency
//!   └── core-a / irb.200        DELETE  empty IRB cleanup
//! ```
//!
//! Entries are ordered by hostname; per host the device entry comes first,
//! then interfaces by name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::{DeviceState, InterfaceState};

/// How serious an annotation is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Fatal => "FATAL",
        })
    }
}

/// Free-form remark attached to a device or an interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub message: String,
    pub severity: Severity,
}

impl Annotation {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Info)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Warn)
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Fatal)
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.severity)
    }
}

/// What the repair layer should do with an assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    /// Report only
    Warn,
    Create,
    Update,
    Delete,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Warn => "WARN",
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        })
    }
}

/// Object an assessment is about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "state", rename_all = "lowercase")]
pub enum Current {
    Device(DeviceState),
    Interface(InterfaceState),
}

/// One finding about one device or interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub category: Category,
    pub hostname: String,
    pub interface_name: Option<String>,
    pub current: Current,
    pub desired: Option<InterfaceState>,
    pub violated_arguments: Vec<String>,
    pub annotations: Vec<Annotation>,
    pub manual_repair: bool,
    pub delete: bool,
}

impl Assessment {
    /// Device-level warning
    pub fn device(device: &DeviceState, annotations: Vec<Annotation>) -> Self {
        Self {
            category: Category::Warn,
            hostname: device.hostname.clone(),
            interface_name: None,
            current: Current::Device(device.clone()),
            desired: None,
            violated_arguments: Vec::new(),
            annotations,
            manual_repair: false,
            delete: false,
        }
    }

    /// Interface-level warning without a desired state
    pub fn interface_warning(
        hostname: &str,
        current: &InterfaceState,
        violated_arguments: Vec<String>,
        annotations: Vec<Annotation>,
    ) -> Self {
        Self {
            category: Category::Warn,
            hostname: hostname.to_string(),
            interface_name: Some(current.name.clone()),
            current: Current::Interface(current.clone()),
            desired: None,
            violated_arguments,
            annotations,
            manual_repair: false,
            delete: false,
        }
    }

    /// Interface change towards `desired`
    pub fn interface_change(
        hostname: &str,
        current: &InterfaceState,
        desired: InterfaceState,
        violated_arguments: Vec<String>,
        annotations: Vec<Annotation>,
    ) -> Self {
        let delete = desired.delete;
        Self {
            category: if delete {
                Category::Delete
            } else {
                Category::Update
            },
            hostname: hostname.to_string(),
            interface_name: Some(current.name.clone()),
            current: Current::Interface(current.clone()),
            desired: Some(desired),
            violated_arguments,
            annotations,
            manual_repair: false,
            delete,
        }
    }

    pub fn with_manual_repair(mut self) -> Self {
        self.manual_repair = true;
        self
    }

    /// Whether the repair layer has something to apply
    pub fn is_repairable(&self) -> bool {
        self.interface_name.is_some() && self.desired.is_some() && !self.manual_repair
    }

    pub fn current_interface(&self) -> Option<&InterfaceState> {
        match &self.current {
            Current::Interface(state) => Some(state),
            Current::Device(_) => None,
        }
    }
}

impl fmt::Display for Assessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}] {}", self.category, self.hostname)?;
        if let Some(name) = &self.interface_name {
            writeln!(f, "  interface:   {}", name)?;
        }
        match &self.current {
            Current::Device(device) => writeln!(f, "  current:     {}", device)?,
            Current::Interface(state) => writeln!(f, "  current:     {}", state)?,
        }
        match &self.desired {
            Some(desired) => writeln!(f, "  desired:     {}", desired)?,
            None => writeln!(f, "  desired:     -")?,
        }
        for (i, argument) in self.violated_arguments.iter().enumerate() {
            writeln!(f, "  violated {}) {}", i + 1, argument)?;
        }
        for (i, annotation) in self.annotations.iter().enumerate() {
            writeln!(f, "  note {})     {}", i + 1, annotation)?;
        }
        Ok(())
    }
}

/// Ordered report of one diagnosis run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Karte {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    entries: Vec<Assessment>,
}

impl Karte {
    pub fn new(entries: Vec<Assessment>) -> Self {
        Self {
            run_id: Uuid::now_v7(),
            generated_at: Utc::now(),
            entries,
        }
    }

    fn derived(&self, entries: Vec<Assessment>) -> Self {
        Self {
            run_id: self.run_id,
            generated_at: self.generated_at,
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Assessment> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[Assessment] {
        &self.entries
    }

    /// Device-level entry of `hostname`
    pub fn get(&self, hostname: &str) -> Option<&Assessment> {
        self.entries
            .iter()
            .find(|a| a.hostname == hostname && a.interface_name.is_none())
    }

    pub fn get_interface(&self, hostname: &str, interface_name: &str) -> Option<&Assessment> {
        self.entries.iter().find(|a| {
            a.hostname == hostname && a.interface_name.as_deref() == Some(interface_name)
        })
    }

    /// Split into (repairable, annotation-only) reports, preserving order
    pub fn partition(&self) -> (Karte, Karte) {
        let (repairable, remarks): (Vec<Assessment>, Vec<Assessment>) =
            self.entries.iter().cloned().partition(Assessment::is_repairable);
        (self.derived(repairable), self.derived(remarks))
    }

    /// Drop the entries at the given zero-based positions
    pub fn exclude(&self, indices: &[usize]) -> Karte {
        let kept = self
            .entries
            .iter()
            .enumerate()
            .filter(|(i, _)| !indices.contains(i))
            .map(|(_, a)| a.clone())
            .collect();
        self.derived(kept)
    }

    /// Number of entries per category, for summaries
    pub fn count(&self, category: Category) -> usize {
        self.entries.iter().filter(|a| a.category == category).count()
    }
}

impl<'a> IntoIterator for &'a Karte {
    type Item = &'a Assessment;
    type IntoIter = std::slice::Iter<'a, Assessment>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for Karte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Karte {} ({}) - {} entries",
            self.run_id,
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.entries.len()
        )?;
        for (i, assessment) in self.entries.iter().enumerate() {
            write!(f, "#{} {}", i, assessment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ObjectId;
    use std::collections::BTreeSet;

    fn device(hostname: &str) -> DeviceState {
        DeviceState {
            hostname: hostname.to_string(),
            role: None,
            region: None,
            site_group: None,
            tags: BTreeSet::new(),
        }
    }

    fn karte() -> Karte {
        let current = InterfaceState::new(ObjectId::new(1), "ge-0/0/1");
        let mut desired = current.clone();
        desired.is_enabled = true;

        Karte::new(vec![
            Assessment::device(&device("minami3"), vec![Annotation::warn("neglected edge")]),
            Assessment::interface_change(
                "minami3",
                &current,
                desired,
                vec!["Hosting tag consistency".to_string()],
                Vec::new(),
            ),
            Assessment::interface_warning("minami3", &current, Vec::new(), vec![Annotation::info("x")]),
        ])
    }

    #[test]
    fn test_lookup() {
        let karte = karte();
        assert_eq!(karte.len(), 3);
        assert!(karte.get("minami3").is_some());
        assert_eq!(
            karte.get_interface("minami3", "ge-0/0/1").map(|a| a.category),
            Some(Category::Update)
        );
        assert!(karte.get_interface("minami3", "ge-0/0/2").is_none());
    }

    #[test]
    fn test_partition_keeps_run_id() {
        let karte = karte();
        let (repairable, remarks) = karte.partition();
        assert_eq!(repairable.len(), 1);
        assert_eq!(remarks.len(), 2);
        assert_eq!(repairable.run_id, karte.run_id);
    }

    #[test]
    fn test_exclude() {
        let karte = karte().exclude(&[1]);
        assert_eq!(karte.len(), 2);
        assert_eq!(karte.count(Category::Update), 0);
    }

    #[test]
    fn test_display_lists_arguments() {
        let rendered = karte().to_string();
        assert!(rendered.contains("[UPDATE] minami3"));
        assert!(rendered.contains("violated 1) Hosting tag consistency"));
        assert!(rendered.contains("neglected edge (WARN)"));
    }

    #[test]
    fn test_manual_repair_is_not_repairable() {
        let current = InterfaceState::new(ObjectId::new(1), "ge-0/0/1");
        let assessment =
            Assessment::interface_warning("sw", &current, Vec::new(), Vec::new()).with_manual_repair();
        assert!(!assessment.is_repairable());
    }
}
