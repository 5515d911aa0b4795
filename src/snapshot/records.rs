// Copyright (c) 2025 - Cowboy AI, Inc.
//! NetBox Wire Records
//!
//! Shapes of the objects the REST API returns, reduced to the fields the
//! engine reads. Decoding folds them into typed states:
//!
//! - tags are flattened to slugs (`[{"slug": "wifi"}]` and `["wifi"]` both work)
//! - stacked edge chassis (`minami3 (1)`, `minami3 (2)`) fold into one hostname
//! - region and site group come from the device's site
//! - LAG membership comes from the `lag` reference

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, warn};

use super::Snapshot;
use crate::domain::{
    DeviceState, InterfaceMode, InterfaceState, ObjectId, Region, Role, SiteGroup, Tag, VlanGroup,
    VlanId, VlanState,
};
use crate::errors::{DoctorError, DoctorResult};

/// `{"slug": ...}` reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlugRef {
    pub slug: String,
}

/// `{"name": ...}` reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameRef {
    pub name: String,
}

/// `{"value": ...}` choice field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueRef {
    pub value: String,
}

/// `{"id": ...}` VLAN reference nested in an interface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlanRef {
    pub id: u64,
}

/// Tag as found on the wire, nested or already flattened
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagRecord {
    Slug(String),
    Nested(SlugRef),
}

impl TagRecord {
    fn into_tag(self) -> Tag {
        match self {
            TagRecord::Slug(slug) => Tag::from(slug),
            TagRecord::Nested(r) => Tag::from(r.slug),
        }
    }
}

fn tag_set(records: Vec<TagRecord>) -> BTreeSet<Tag> {
    records.into_iter().map(TagRecord::into_tag).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlanRecord {
    pub id: u64,
    pub vid: u16,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tags: Vec<TagRecord>,
    #[serde(default)]
    pub group: Option<SlugRef>,
    #[serde(default)]
    pub status: Option<ValueRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteRecord {
    pub slug: String,
    #[serde(default)]
    pub region: Option<SlugRef>,
    #[serde(default)]
    pub group: Option<SlugRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub id: u64,
    pub name: String,
    #[serde(default, alias = "device_role")]
    pub role: Option<SlugRef>,
    #[serde(default)]
    pub site: Option<SlugRef>,
    #[serde(default)]
    pub tags: Vec<TagRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceRecord {
    pub id: u64,
    pub name: String,
    pub device: NameRef,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<TagRecord>,
    #[serde(default)]
    pub mode: Option<ValueRef>,
    #[serde(default)]
    pub tagged_vlans: Vec<VlanRef>,
    #[serde(default)]
    pub untagged_vlan: Option<VlanRef>,
    #[serde(default)]
    pub lag: Option<serde_json::Value>,
}

/// Everything one run needs, as fetched from the source of truth
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotDocument {
    #[serde(default)]
    pub vlans: Vec<VlanRecord>,
    #[serde(default)]
    pub sites: Vec<SiteRecord>,
    #[serde(default)]
    pub devices: Vec<DeviceRecord>,
    #[serde(default)]
    pub interfaces: Vec<InterfaceRecord>,
}

/// Hostname of a device; stacked edge members are named `<hostname> (<chassis>)`
fn hostname_of<'a>(name: &'a str, role: Option<&Role>) -> &'a str {
    if role != Some(&Role::EdgeSw) {
        return name;
    }

    match name.rsplit_once(" (") {
        Some((host, chassis))
            if chassis.ends_with(')')
                && chassis.len() > 1
                && chassis[..chassis.len() - 1].chars().all(|c| c.is_ascii_digit()) =>
        {
            host
        }
        _ => name,
    }
}

impl SnapshotDocument {
    pub(super) fn into_snapshot(self) -> DoctorResult<Snapshot> {
        let mut vlans = BTreeMap::new();
        for record in self.vlans {
            let vid = VlanId::new(record.vid).map_err(|e| {
                DoctorError::Snapshot(format!("VLAN object {}: {}", record.id, e))
            })?;
            let is_active = record
                .status
                .as_ref()
                .map_or(true, |s| s.value.eq_ignore_ascii_case("active"));

            vlans.insert(
                ObjectId::new(record.id),
                VlanState {
                    object_id: ObjectId::new(record.id),
                    vid,
                    name: record.name,
                    tags: tag_set(record.tags),
                    group: record.group.map(|g| VlanGroup::from(g.slug)),
                    is_active,
                },
            );
        }

        let sites: HashMap<String, SiteRecord> = self
            .sites
            .into_iter()
            .map(|s| (s.slug.clone(), s))
            .collect();

        // device name -> hostname, for interfaces that reference chassis names
        let mut hostnames: HashMap<String, String> = HashMap::new();
        let mut devices = BTreeMap::new();
        for record in self.devices {
            let role = record.role.map(|r| Role::from(r.slug));
            let hostname = hostname_of(&record.name, role.as_ref()).to_string();
            let site = record.site.as_ref().and_then(|s| sites.get(&s.slug));

            hostnames.insert(record.name.clone(), hostname.clone());

            if devices.contains_key(&hostname) {
                debug!("Folding chassis {} into {}", record.name, hostname);
                continue;
            }

            devices.insert(
                hostname.clone(),
                DeviceState {
                    hostname,
                    role,
                    region: site
                        .and_then(|s| s.region.as_ref())
                        .map(|r| Region::from(r.slug.as_str())),
                    site_group: site
                        .and_then(|s| s.group.as_ref())
                        .map(|g| SiteGroup::from(g.slug.as_str())),
                    tags: tag_set(record.tags),
                },
            );
        }

        let mut interfaces: BTreeMap<String, BTreeMap<String, InterfaceState>> = BTreeMap::new();
        for record in self.interfaces {
            let Some(hostname) = hostnames.get(&record.device.name) else {
                debug!(
                    "Skipping interface {} on unknown device {}",
                    record.name, record.device.name
                );
                continue;
            };

            let interface_mode = match record.mode {
                Some(mode) => Some(mode.value.parse::<InterfaceMode>().map_err(|e| {
                    DoctorError::Snapshot(format!("interface object {}: {}", record.id, e))
                })?),
                None => None,
            };

            let state = InterfaceState {
                object_id: ObjectId::new(record.id),
                name: record.name,
                is_enabled: record.enabled,
                description: record.description.unwrap_or_default(),
                tags: tag_set(record.tags),
                interface_mode,
                tagged_object_ids: record
                    .tagged_vlans
                    .into_iter()
                    .map(|v| ObjectId::new(v.id))
                    .collect(),
                // native VLAN only means something in access and tagged mode
                untagged_object_id: match interface_mode {
                    Some(InterfaceMode::Access | InterfaceMode::Tagged) => {
                        record.untagged_vlan.map(|v| ObjectId::new(v.id))
                    }
                    _ => None,
                },
                is_lag_member: record.lag.as_ref().is_some_and(|l| !l.is_null()),
                delete: false,
            };

            let per_device = interfaces.entry(hostname.clone()).or_default();
            if per_device.contains_key(&state.name) {
                warn!(
                    "Duplicate interface {} on {}; keeping the first",
                    state.name, hostname
                );
                continue;
            }
            per_device.insert(state.name.clone(), state);
        }

        Ok(Snapshot::new(vlans, devices, interfaces))
    }
}
