// Copyright (c) 2025 - Cowboy AI, Inc.
//! VLAN Selections Computed Once per Run
//!
//! Rules never scan the VLAN table themselves; they read the sets below,
//! which are derived from the snapshot and the policy before any rule runs.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::Policy;
use crate::domain::{ObjectId, Tag, WifiArea};
use crate::snapshot::{object_ids, Snapshot};

/// Wi-Fi VLANs served to one area
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WifiVlans {
    /// Active data-plane VLANs (`wifi` plus the area's region tag)
    pub data_plane: BTreeSet<ObjectId>,
    /// VLANs carrying the area's management tag; exactly one is expected
    pub management: BTreeSet<ObjectId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VlanCatalog {
    /// Active VLANs tagged `hosting`
    pub hosting: BTreeSet<ObjectId>,
    /// VLANs of the managed VLAN group
    pub managed: BTreeSet<ObjectId>,
    pub wifi: BTreeMap<WifiArea, WifiVlans>,
}

impl VlanCatalog {
    pub fn build(snapshot: &Snapshot, policy: &Policy) -> Self {
        let hosting = object_ids(
            snapshot
                .vlans_with_tags(&[Tag::Hosting])
                .into_iter()
                .filter(|v| v.is_active),
        );
        let managed = object_ids(snapshot.vlans_in_group(&policy.managed_vlan_group));

        let wifi = [WifiArea::O1, WifiArea::O2, WifiArea::S]
            .into_iter()
            .map(|area| {
                let data_plane_tags = [Tag::Wifi, area.data_plane_tag()];
                let vlans = WifiVlans {
                    data_plane: object_ids(
                        snapshot
                            .vlans_with_tags(&data_plane_tags)
                            .into_iter()
                            .filter(|v| v.is_active),
                    ),
                    management: object_ids(snapshot.vlans_with_tags(&[area.management_tag()])),
                };
                (area, vlans)
            })
            .collect();

        Self {
            hosting,
            managed,
            wifi,
        }
    }

    pub fn wifi(&self, area: WifiArea) -> Option<&WifiVlans> {
        self.wifi.get(&area)
    }
}
