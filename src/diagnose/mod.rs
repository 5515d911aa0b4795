// Copyright (c) 2025 - Cowboy AI, Inc.
//! Diagnosis Engine
//!
//! Runs the rule catalogue over every interface of a [`Snapshot`] and turns
//! the accumulated requirements into a [`Karte`].
//!
//! ```text
//! Snapshot ──► stage 1 ──► resolve ──► stage 2 ──► resolve ──► stage 3
//!                 │                       │                       │
//!                 └───────── conditions + annotations ────────────┘
//!                                         │
//!                                   summarize()
//!                                         │
//!                                         ▼
//!                                       Karte
//! ```
//!
//! Diagnosis is pure: it never fails and never touches the source of truth.
//! Conflicts, missing references and manual-repair cases all end up as
//! assessments.

mod catalog;
mod interface_condition;
mod rules;

pub use catalog::{VlanCatalog, WifiVlans};
pub use interface_condition::{priority, InterfaceCondition};
pub use rules::{
    builtin_catalogue, EdgeCoreConsistency, EmptyIrbCleanup, ExclusiveTagConflict,
    HostingTagConsistency, IncompleteInterfaceCleanup, MasterBackupMirroring,
    ObsoletedTermination, Rule, RuleOutcome, Stage, VlanGroupMembership, WifiTagConsistency,
};

use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::config::Policy;
use crate::domain::{DeviceState, InterfaceState};
use crate::karte::{Annotation, Assessment, Category, Karte};
use crate::snapshot::Snapshot;

/// Interface states as resolved so far, keyed like the snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedStates(BTreeMap<String, BTreeMap<String, InterfaceState>>);

impl ResolvedStates {
    /// Every interface at its current state
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self(snapshot.interfaces.clone())
    }

    pub fn get(&self, hostname: &str, name: &str) -> Option<&InterfaceState> {
        self.0.get(hostname).and_then(|ifs| ifs.get(name))
    }

    pub fn device_interfaces(&self, hostname: &str) -> impl Iterator<Item = &InterfaceState> {
        self.0.get(hostname).into_iter().flat_map(|ifs| ifs.values())
    }

    fn set(&mut self, hostname: &str, state: InterfaceState) {
        self.0
            .entry(hostname.to_string())
            .or_default()
            .insert(state.name.clone(), state);
    }
}

/// Everything a rule may read
pub struct RuleContext<'a> {
    pub snapshot: &'a Snapshot,
    pub policy: &'a Policy,
    pub catalog: &'a VlanCatalog,
    pub resolved: &'a ResolvedStates,
}

impl<'a> RuleContext<'a> {
    /// State of an interface as resolved by the earlier stages
    pub fn resolved(&self, hostname: &str, name: &str) -> Option<&'a InterfaceState> {
        self.resolved.get(hostname, name)
    }

    pub fn resolved_interfaces(&self, hostname: &str) -> impl Iterator<Item = &'a InterfaceState> {
        self.resolved.device_interfaces(hostname)
    }
}

/// Conditions and annotations accumulated for one interface
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Finding {
    pub conditions: Vec<InterfaceCondition>,
    pub annotations: Vec<Annotation>,
    /// A rule asked to skip the remaining rules
    pub stopped: bool,
}

/// What a finding amounts to for its current state
#[derive(Debug, Clone, PartialEq, Eq)]
enum Verdict {
    /// Every condition holds
    Satisfied,
    /// A violated condition only a human may fix
    Manual { violated: Vec<String> },
    /// Merged requirements contradict each other
    Conflict {
        violated: Vec<String>,
        fields: Vec<&'static str>,
    },
    /// Resolution lands where the interface already is
    Unchanged { violated: Vec<String> },
    Change {
        violated: Vec<String>,
        desired: InterfaceState,
    },
}

impl Finding {
    fn verdict(&self, current: &InterfaceState) -> Verdict {
        let violated_conditions: Vec<&InterfaceCondition> = self
            .conditions
            .iter()
            .filter(|c| !c.is_satisfied_by(current))
            .collect();

        if violated_conditions.is_empty() {
            return Verdict::Satisfied;
        }

        let violated: Vec<String> = violated_conditions
            .iter()
            .flat_map(|c| c.arguments.iter().cloned())
            .collect();

        // only manual bounds are violated
        if violated_conditions.iter().all(|c| c.manual_repair) {
            return Verdict::Manual { violated };
        }

        let merged: InterfaceCondition = self.conditions.iter().cloned().sum();
        let Some(desired) = merged.resolve(current) else {
            return Verdict::Conflict {
                violated,
                fields: merged.conflicting_fields(),
            };
        };

        let manual_unmet = self
            .conditions
            .iter()
            .any(|c| c.manual_repair && !c.is_satisfied_by(&desired));
        if manual_unmet {
            Verdict::Manual { violated }
        } else if &desired == current {
            Verdict::Unchanged { violated }
        } else {
            Verdict::Change { violated, desired }
        }
    }
}

/// The diagnosis engine for one snapshot
pub struct Diagnose<'a> {
    snapshot: &'a Snapshot,
    policy: &'a Policy,
    catalog: VlanCatalog,
    stages: Vec<Stage>,
}

impl<'a> Diagnose<'a> {
    /// Engine with the built-in catalogue
    pub fn new(snapshot: &'a Snapshot, policy: &'a Policy) -> Self {
        Self::with_stages(snapshot, policy, builtin_catalogue())
    }

    pub fn with_stages(snapshot: &'a Snapshot, policy: &'a Policy, stages: Vec<Stage>) -> Self {
        Self {
            snapshot,
            policy,
            catalog: VlanCatalog::build(snapshot, policy),
            stages,
        }
    }

    pub fn catalog(&self) -> &VlanCatalog {
        &self.catalog
    }

    /// Evaluate every stage in order
    pub fn run(&self) -> Diagnosis<'a> {
        let mut findings: BTreeMap<(String, String), Finding> = BTreeMap::new();
        let mut device_annotations: BTreeMap<String, Vec<Annotation>> = BTreeMap::new();
        let mut resolved = ResolvedStates::from_snapshot(self.snapshot);

        for (n, stage) in self.stages.iter().enumerate() {
            info!(
                "Running stage {} of {} ({}, {} rules)",
                n + 1,
                self.stages.len(),
                stage.name,
                stage.rules.len()
            );

            let ctx = RuleContext {
                snapshot: self.snapshot,
                policy: self.policy,
                catalog: &self.catalog,
                resolved: &resolved,
            };

            for (device, interface) in self.snapshot.iter_interfaces() {
                let finding = findings
                    .entry((device.hostname.clone(), interface.name.clone()))
                    .or_default();

                for rule in &stage.rules {
                    if finding.stopped {
                        break;
                    }

                    let outcome = rule.evaluate(&ctx, device, interface);
                    if let Some(condition) = outcome.condition {
                        debug!("{} {}: {}", device.hostname, interface.name, condition);
                        finding.conditions.push(condition);
                    }
                    finding.annotations.extend(outcome.annotations);
                    finding.stopped |= outcome.stop;
                }
            }

            for device in self.snapshot.devices.values() {
                for rule in &stage.rules {
                    let annotations = rule.inspect_device(&ctx, device);
                    if !annotations.is_empty() {
                        device_annotations
                            .entry(device.hostname.clone())
                            .or_default()
                            .extend(annotations);
                    }
                }
            }

            resolved = self.resolve(&findings);
        }

        Diagnosis {
            snapshot: self.snapshot,
            findings,
            device_annotations,
        }
    }

    fn resolve(&self, findings: &BTreeMap<(String, String), Finding>) -> ResolvedStates {
        let mut resolved = ResolvedStates::from_snapshot(self.snapshot);
        for ((hostname, name), finding) in findings {
            let Some(current) = self.snapshot.interface(hostname, name) else {
                continue;
            };
            if let Verdict::Change { desired, .. } = finding.verdict(current) {
                resolved.set(hostname, desired);
            }
        }
        resolved
    }
}

/// Raw result of a run, before summarizing
pub struct Diagnosis<'a> {
    snapshot: &'a Snapshot,
    findings: BTreeMap<(String, String), Finding>,
    device_annotations: BTreeMap<String, Vec<Annotation>>,
}

impl<'a> Diagnosis<'a> {
    pub fn finding(&self, hostname: &str, name: &str) -> Option<&Finding> {
        self.findings.get(&(hostname.to_string(), name.to_string()))
    }

    pub fn device_annotations(&self, hostname: &str) -> &[Annotation] {
        self.device_annotations
            .get(hostname)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Merge, resolve and diff every finding into an ordered report
    pub fn summarize(&self) -> Karte {
        let mut entries = Vec::new();

        for (hostname, device) in &self.snapshot.devices {
            if let Some(annotations) = self.device_annotations.get(hostname) {
                entries.push(Assessment::device(device, annotations.clone()));
            }

            let Some(interfaces) = self.snapshot.interfaces.get(hostname) else {
                continue;
            };
            for (name, current) in interfaces {
                let Some(finding) = self.findings.get(&(hostname.clone(), name.clone())) else {
                    continue;
                };
                if let Some(assessment) = assess(device, current, finding) {
                    entries.push(assessment);
                }
            }
        }

        let karte = Karte::new(entries);
        info!(
            "Diagnosis {}: {} entries ({} update, {} delete, {} warn) over {} interfaces",
            karte.run_id,
            karte.len(),
            karte.count(Category::Update),
            karte.count(Category::Delete),
            karte.count(Category::Warn),
            self.snapshot.interface_count()
        );
        karte
    }
}

fn assess(device: &DeviceState, current: &InterfaceState, finding: &Finding) -> Option<Assessment> {
    if finding.conditions.is_empty() && finding.annotations.is_empty() {
        return None;
    }

    let hostname = device.hostname.as_str();
    let mut annotations = finding.annotations.clone();

    match finding.verdict(current) {
        Verdict::Satisfied if annotations.is_empty() => None,
        Verdict::Satisfied => Some(Assessment::interface_warning(
            hostname,
            current,
            Vec::new(),
            annotations,
        )),
        Verdict::Manual { violated } => {
            annotations.push(Annotation::warn(format!(
                "manual repair required: {}",
                violated.join(", ")
            )));
            Some(
                Assessment::interface_warning(hostname, current, violated, annotations)
                    .with_manual_repair(),
            )
        }
        Verdict::Conflict { violated, fields } => {
            annotations.push(Annotation::fatal(format!(
                "conflicting requirements on {}",
                fields.join(", ")
            )));
            Some(Assessment::interface_warning(
                hostname,
                current,
                violated,
                annotations,
            ))
        }
        // an overridden rule is not worth reporting on its own
        Verdict::Unchanged { .. } if annotations.is_empty() => None,
        Verdict::Unchanged { violated } => Some(Assessment::interface_warning(
            hostname,
            current,
            violated,
            annotations,
        )),
        Verdict::Change { violated, desired } => Some(Assessment::interface_change(
            hostname,
            current,
            desired,
            violated,
            annotations,
        )),
    }
}
