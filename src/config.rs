// Copyright (c) 2025 - Cowboy AI, Inc.
//! Run Configuration
//!
//! Everything a run needs besides the snapshot itself. All sections are
//! serde structs with defaults, so a partial JSON document or an empty
//! environment still yields a usable configuration (except for the NetBox
//! token, which has no sensible default).
//!
//! # Environment
//!
//! | Variable                     | Field                        |
//! |------------------------------|------------------------------|
//! | `NETBOX_URL`                 | `netbox.base_url`            |
//! | `NETBOX_API_TOKEN`           | `netbox.api_token` (required)|
//! | `FLEET_DOCTOR_SNAPSHOT`      | `snapshot_path`              |
//! | `FLEET_DOCTOR_DIAGNOSE_ONLY` | `diagnose_only`              |
//! | `FLEET_DOCTOR_CONCURRENCY`   | `repair.concurrency`         |
//! | `FLEET_DOCTOR_TIMEOUT_SECS`  | `repair.timeout_secs`        |
//! | `FLEET_DOCTOR_RETRIES`       | `repair.max_retries`         |

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::str::FromStr;

use crate::domain::{McLagPair, Tag, VlanGroup};
use crate::errors::{DoctorError, DoctorResult};
use crate::repair::RepairConfig;

/// Fleet-wide policy knobs the rules read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// VLAN group whose VLANs this tool manages
    #[serde(default = "default_managed_vlan_group")]
    pub managed_vlan_group: VlanGroup,

    /// Tags no interface may carry more than one of
    #[serde(default = "default_exclusive_tags")]
    pub exclusive_tags: BTreeSet<Tag>,
}

fn default_managed_vlan_group() -> VlanGroup {
    VlanGroup::Titanet
}

fn default_exclusive_tags() -> BTreeSet<Tag> {
    let mut tags: BTreeSet<Tag> = [Tag::Wifi, Tag::Hosting].into_iter().collect();
    for pair in McLagPair::ALL {
        tags.insert(pair.master_tag());
        tags.insert(pair.backup_tag());
    }
    tags
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            managed_vlan_group: default_managed_vlan_group(),
            exclusive_tags: default_exclusive_tags(),
        }
    }
}

/// Configuration for NetBox connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetBoxConfig {
    /// NetBox base URL (e.g., "https://netbox.example.net")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API token for authentication
    pub api_token: String,

    /// Client-level request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for NetBoxConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: String::new(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Complete configuration of one `fleet-doctor` run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoctorConfig {
    #[serde(default)]
    pub netbox: NetBoxConfig,

    #[serde(default)]
    pub policy: Policy,

    #[serde(default)]
    pub repair: RepairConfig,

    /// Snapshot document to diagnose
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    /// Stop after reporting
    #[serde(default)]
    pub diagnose_only: bool,
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("snapshot.json")
}

impl DoctorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> DoctorResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key/value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DoctorResult<Self> {
        let api_token = lookup("NETBOX_API_TOKEN").ok_or_else(|| {
            DoctorError::Configuration("NETBOX_API_TOKEN not set".to_string())
        })?;

        let netbox = NetBoxConfig {
            base_url: lookup("NETBOX_URL").unwrap_or_else(default_base_url),
            api_token,
            timeout_secs: default_timeout(),
        };

        let mut repair = RepairConfig::default();
        if let Some(concurrency) = parse_var::<usize>(&lookup, "FLEET_DOCTOR_CONCURRENCY")? {
            if concurrency == 0 {
                return Err(DoctorError::Configuration(
                    "FLEET_DOCTOR_CONCURRENCY must be at least 1".to_string(),
                ));
            }
            repair.concurrency = concurrency;
        }
        if let Some(timeout_secs) = parse_var(&lookup, "FLEET_DOCTOR_TIMEOUT_SECS")? {
            repair.timeout_secs = timeout_secs;
        }
        if let Some(retries) = parse_var(&lookup, "FLEET_DOCTOR_RETRIES")? {
            repair.max_retries = retries;
        }

        let diagnose_only = match lookup("FLEET_DOCTOR_DIAGNOSE_ONLY") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                DoctorError::Configuration(format!(
                    "FLEET_DOCTOR_DIAGNOSE_ONLY: not a boolean: {}",
                    raw
                ))
            })?,
            None => false,
        };

        Ok(Self {
            netbox,
            policy: Policy::default(),
            repair,
            snapshot_path: lookup("FLEET_DOCTOR_SNAPSHOT")
                .map(PathBuf::from)
                .unwrap_or_else(default_snapshot_path),
            diagnose_only,
        })
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> DoctorResult<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| DoctorError::Configuration(format!("{}: {}", key, e))),
        None => Ok(None),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
