// Copyright (c) 2025 - Cowboy AI, Inc.
//! One Consistent Snapshot of the Source of Truth
//!
//! Three maps, all keyed deterministically:
//!
//! ```text
//! vlans:      ObjectId -> VlanState
//! devices:    hostname -> DeviceState
//! interfaces: hostname -> (interface name -> InterfaceState)
//! ```
//!
//! The grouping and filtering helpers below are the only way rules look
//! things up, so every rule sees the same ordering.

mod records;

pub use records::{
    DeviceRecord, InterfaceRecord, NameRef, SiteRecord, SlugRef, SnapshotDocument, TagRecord,
    ValueRef, VlanRecord, VlanRef,
};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::domain::{DeviceState, InterfaceState, ObjectId, Role, Tag, VlanGroup, VlanState};
use crate::errors::DoctorResult;

/// Immutable, fully materialized inventory for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub vlans: BTreeMap<ObjectId, VlanState>,
    pub devices: BTreeMap<String, DeviceState>,
    pub interfaces: BTreeMap<String, BTreeMap<String, InterfaceState>>,
}

impl Snapshot {
    pub fn new(
        vlans: BTreeMap<ObjectId, VlanState>,
        devices: BTreeMap<String, DeviceState>,
        interfaces: BTreeMap<String, BTreeMap<String, InterfaceState>>,
    ) -> Self {
        Self {
            vlans,
            devices,
            interfaces,
        }
    }

    /// Read a snapshot document (NetBox-shaped JSON records) from disk
    pub fn load(path: impl AsRef<Path>) -> DoctorResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let document: SnapshotDocument = serde_json::from_str(&raw)?;
        document.into_snapshot()
    }

    /// Decode already-fetched wire records
    pub fn from_records(document: SnapshotDocument) -> DoctorResult<Self> {
        document.into_snapshot()
    }

    pub fn with_vlan(mut self, vlan: VlanState) -> Self {
        self.vlans.insert(vlan.object_id, vlan);
        self
    }

    pub fn with_device(mut self, device: DeviceState) -> Self {
        self.devices.insert(device.hostname.clone(), device);
        self
    }

    pub fn with_interface(mut self, hostname: impl Into<String>, interface: InterfaceState) -> Self {
        self.interfaces
            .entry(hostname.into())
            .or_default()
            .insert(interface.name.clone(), interface);
        self
    }

    // ------------------------------------------------------------------
    // VLANs
    // ------------------------------------------------------------------

    /// VLANs carrying every one of `tags`, in VLAN ID order
    pub fn vlans_with_tags<'a>(&'a self, tags: &'a [Tag]) -> Vec<&'a VlanState> {
        let mut vlans: Vec<&VlanState> = self
            .vlans
            .values()
            .filter(|v| tags.iter().all(|t| v.has_tag(t)))
            .collect();
        vlans.sort_by_key(|v| v.vid);
        vlans
    }

    /// VLANs belonging to `group`, in VLAN ID order
    pub fn vlans_in_group(&self, group: &VlanGroup) -> Vec<&VlanState> {
        let mut vlans: Vec<&VlanState> =
            self.vlans.values().filter(|v| v.in_group(group)).collect();
        vlans.sort_by_key(|v| v.vid);
        vlans
    }

    pub fn vlan(&self, object_id: ObjectId) -> Option<&VlanState> {
        self.vlans.get(&object_id)
    }

    // ------------------------------------------------------------------
    // Devices
    // ------------------------------------------------------------------

    pub fn device(&self, hostname: &str) -> Option<&DeviceState> {
        self.devices.get(hostname)
    }

    /// Devices with `role`, in hostname order
    pub fn devices_with_role<'a>(&'a self, role: &'a Role) -> impl Iterator<Item = &'a DeviceState> {
        self.devices.values().filter(move |d| d.has_role(role))
    }

    // ------------------------------------------------------------------
    // Interfaces
    // ------------------------------------------------------------------

    pub fn interface(&self, hostname: &str, name: &str) -> Option<&InterfaceState> {
        self.interfaces.get(hostname).and_then(|ifs| ifs.get(name))
    }

    /// Every interface whose device is known, in (hostname, name) order
    pub fn iter_interfaces(&self) -> impl Iterator<Item = (&DeviceState, &InterfaceState)> {
        self.interfaces.iter().flat_map(move |(hostname, ifs)| {
            self.devices
                .get(hostname)
                .into_iter()
                .flat_map(move |device| ifs.values().map(move |iface| (device, iface)))
        })
    }

    /// Interfaces carrying `tag`, in (hostname, name) order
    pub fn interfaces_with_tag<'a>(
        &'a self,
        tag: &'a Tag,
    ) -> impl Iterator<Item = (&'a DeviceState, &'a InterfaceState)> {
        self.iter_interfaces().filter(move |(_, iface)| iface.has_tag(tag))
    }

    pub fn interface_count(&self) -> usize {
        self.interfaces.values().map(BTreeMap::len).sum()
    }
}

/// Object ids of a VLAN selection
pub fn object_ids<'a>(vlans: impl IntoIterator<Item = &'a VlanState>) -> BTreeSet<ObjectId> {
    vlans.into_iter().map(|v| v.object_id).collect()
}
