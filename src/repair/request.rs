// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Repair Requests
//!
//! Requests are plain data computed from an [`Assessment`]; nothing here
//! performs I/O. The executor hands them to a
//! [`SourceOfTruth`](super::SourceOfTruth).
//!
//! ```text
//! Assessment (desired state) ──► from_assessment() ──► RepairRequest
//!                                                        ├── Update(InterfaceUpdate)  PATCH
//!                                                        └── Delete { id }            DELETE
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{InterfaceMode, ObjectId};
use crate::karte::Assessment;
use crate::snapshot::SlugRef;

/// Interface body in NetBox PATCH shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceUpdate {
    pub id: ObjectId,
    pub description: String,
    pub enabled: bool,
    pub mode: Option<InterfaceMode>,
    pub untagged_vlan: Option<ObjectId>,
    pub tagged_vlans: Vec<ObjectId>,
    pub tags: Vec<SlugRef>,
}

/// One call against the source of truth
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum RepairRequest {
    Update(InterfaceUpdate),
    Delete { id: ObjectId },
}

impl RepairRequest {
    /// Request realizing an assessment's desired state
    ///
    /// Device-level, desired-less and manual-repair assessments yield `None`.
    pub fn from_assessment(assessment: &Assessment) -> Option<Self> {
        if !assessment.is_repairable() {
            return None;
        }
        let desired = assessment.desired.as_ref()?;

        if assessment.delete || desired.delete {
            return Some(Self::Delete {
                id: desired.object_id,
            });
        }

        Some(Self::Update(InterfaceUpdate {
            id: desired.object_id,
            description: desired.description.clone(),
            enabled: desired.is_enabled,
            mode: desired.interface_mode,
            untagged_vlan: desired.untagged_object_id,
            tagged_vlans: desired.tagged_object_ids.iter().copied().collect(),
            tags: desired
                .tags
                .iter()
                .map(|t| SlugRef {
                    slug: t.as_str().to_string(),
                })
                .collect(),
        }))
    }

    pub fn object_id(&self) -> ObjectId {
        match self {
            Self::Update(update) => update.id,
            Self::Delete { id } => *id,
        }
    }
}

impl fmt::Display for RepairRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Update(update) => write!(f, "update interface {}", update.id),
            Self::Delete { id } => write!(f, "delete interface {}", id),
        }
    }
}
