// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for fleet-doctor
//!
//! Deterministic campus inventory shared by the scenario tests. Object ids
//! are fixed constants so assertions can name them.
//!
//! ```text
//! VLAN object  vid  tags                    group
//! 1            10   hosting                 titanet
//! 2            20   hosting                 titanet
//! 3            30   -                       titanet
//! 4            100  wifi, vlan-o            titanet
//! 5            900  wlan-mgmt-vlan-o2       titanet
//! ```

#![allow(dead_code)]

use std::collections::BTreeSet;

use fleet_doctor::domain::{
    DeviceState, InterfaceMode, InterfaceState, ObjectId, Role, SiteGroup, Tag, VlanGroup,
    VlanId, VlanState,
};
use fleet_doctor::Snapshot;

pub const HOSTING_10: u64 = 1;
pub const HOSTING_20: u64 = 2;
pub const PLAIN_30: u64 = 3;
pub const WIFI_DATA: u64 = 4;
pub const WIFI_MGMT: u64 = 5;

pub const CORE_A: &str = "core-a";
pub const CORE_B: &str = "core-b";
pub const EDGE: &str = "minami3";

pub fn oid(id: u64) -> ObjectId {
    ObjectId::new(id)
}

pub fn oids(ids: &[u64]) -> BTreeSet<ObjectId> {
    ids.iter().copied().map(ObjectId::new).collect()
}

fn vlan(id: u64, vid: u16, tags: &[Tag]) -> VlanState {
    VlanState {
        object_id: oid(id),
        vid: VlanId::new(vid).expect("fixture vid in range"),
        name: format!("vlan{}", vid),
        tags: tags.iter().cloned().collect(),
        group: Some(VlanGroup::Titanet),
        is_active: true,
    }
}

pub fn core(hostname: &str) -> DeviceState {
    DeviceState {
        hostname: hostname.to_string(),
        role: Some(Role::CoreSw),
        region: None,
        site_group: None,
        tags: BTreeSet::new(),
    }
}

/// Edge switch in an O2 Wi-Fi area
pub fn edge(hostname: &str) -> DeviceState {
    DeviceState {
        hostname: hostname.to_string(),
        role: Some(Role::EdgeSw),
        region: None,
        site_group: Some(SiteGroup::OokayamaSouth),
        tags: BTreeSet::new(),
    }
}

/// The VLAN table and one core plus one edge switch, without interfaces
pub fn campus() -> Snapshot {
    Snapshot::default()
        .with_vlan(vlan(HOSTING_10, 10, &[Tag::Hosting]))
        .with_vlan(vlan(HOSTING_20, 20, &[Tag::Hosting]))
        .with_vlan(vlan(PLAIN_30, 30, &[]))
        .with_vlan(vlan(WIFI_DATA, 100, &[Tag::Wifi, Tag::VlanOokayama]))
        .with_vlan(vlan(WIFI_MGMT, 900, &[Tag::WifiMgmtVlanOokayama2]))
        .with_device(core(CORE_A))
        .with_device(edge(EDGE))
}

pub fn interface(id: u64, name: &str) -> InterfaceState {
    InterfaceState::new(oid(id), name)
}

pub fn access_port(id: u64, name: &str, vlan: u64, tags: &[Tag]) -> InterfaceState {
    let mut iface = interface(id, name);
    iface.interface_mode = Some(InterfaceMode::Access);
    iface.untagged_object_id = Some(oid(vlan));
    iface.tags = tags.iter().cloned().collect();
    iface
}

pub fn trunk_port(id: u64, name: &str, vlans: &[u64], tags: &[Tag]) -> InterfaceState {
    let mut iface = interface(id, name);
    iface.is_enabled = true;
    iface.interface_mode = Some(InterfaceMode::Tagged);
    iface.tagged_object_ids = oids(vlans);
    iface.tags = tags.iter().cloned().collect();
    iface
}

/// Core downlink facing `edge`
pub fn downlink(id: u64, name: &str, edge: &str, vlans: &[u64]) -> InterfaceState {
    let mut iface = trunk_port(id, name, vlans, &[Tag::CoreDownstream]);
    iface.description = edge.to_string();
    iface
}
