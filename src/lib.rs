// Copyright (c) 2025 - Cowboy AI, Inc.
//! Policy-driven reconciliation of switch interfaces against NetBox
//!
//! A run reads a [`Snapshot`] of VLANs, devices and interfaces, lets an
//! ordered catalogue of rules each state what it requires of every
//! interface, merges those requirements with the [`ConditionalValue`]
//! algebra and reports the differences as a [`Karte`]. [`Repair`] then
//! applies the repairable entries through a [`SourceOfTruth`].
//!
//! ```text
//! Snapshot ──► Diagnose (stages of rules) ──► Karte ──► Repair ──► NetBox
//! ```

pub mod adapters;
pub mod condition;
pub mod config;
pub mod diagnose;
pub mod domain;
pub mod errors;
pub mod karte;
pub mod repair;
pub mod snapshot;

// Re-export commonly used types
pub use condition::{Condition, ConditionalValue};
pub use config::{DoctorConfig, NetBoxConfig, Policy};
pub use diagnose::{Diagnose, Diagnosis, InterfaceCondition, Rule, RuleContext, RuleOutcome};
pub use domain::{DeviceState, InterfaceState, ObjectId, Tag, VlanState};
pub use errors::{DoctorError, DoctorResult, TransportError};
pub use karte::{Annotation, Assessment, Category, Karte, Severity};
pub use repair::{Repair, RepairConfig, RepairOutcome, RepairRequest, RepairStatus, SourceOfTruth};
pub use snapshot::Snapshot;
