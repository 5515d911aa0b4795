// Copyright (c) 2025 - Cowboy AI, Inc.
//! Typed Views over Source-of-Truth Objects
//!
//! States are built once per run from one consistent snapshot and never
//! mutated afterwards. Set-valued fields are `BTreeSet`s, so equality
//! ignores order and multiplicity, and an absent list equals an empty one.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::network::{InterfaceMode, ObjectId, VlanId};
use super::slug::{Region, Role, SiteGroup, Tag, VlanGroup, WifiArea};

/// A VLAN as known to the source of truth
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VlanState {
    pub object_id: ObjectId,
    pub vid: VlanId,
    pub name: String,
    pub tags: BTreeSet<Tag>,
    pub group: Option<VlanGroup>,
    pub is_active: bool,
}

impl VlanState {
    pub fn has_tag(&self, tag: &Tag) -> bool {
        self.tags.contains(tag)
    }

    pub fn in_group(&self, group: &VlanGroup) -> bool {
        self.group.as_ref() == Some(group)
    }
}

/// A device, used to scope which rules apply to its interfaces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceState {
    pub hostname: String,
    pub role: Option<Role>,
    pub region: Option<Region>,
    pub site_group: Option<SiteGroup>,
    pub tags: BTreeSet<Tag>,
}

impl DeviceState {
    pub fn has_role(&self, role: &Role) -> bool {
        self.role.as_ref() == Some(role)
    }

    pub fn is_core(&self) -> bool {
        self.has_role(&Role::CoreSw)
    }

    pub fn is_edge(&self) -> bool {
        self.has_role(&Role::EdgeSw)
    }

    /// Wi-Fi management area derived from the site group
    pub fn wifi_area(&self) -> WifiArea {
        WifiArea::of_site_group(self.site_group.as_ref())
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hostname)?;
        if let Some(role) = &self.role {
            write!(f, " role={}", role)?;
        }
        if let Some(group) = &self.site_group {
            write!(f, " site-group={}", group)?;
        }
        Ok(())
    }
}

/// The unit the engine reconciles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceState {
    pub object_id: ObjectId,
    pub name: String,
    pub is_enabled: bool,
    /// Empty string means no description
    pub description: String,
    pub tags: BTreeSet<Tag>,
    pub interface_mode: Option<InterfaceMode>,
    /// Meaningful only in `tagged` mode
    pub tagged_object_ids: BTreeSet<ObjectId>,
    /// Access VLAN in `access` mode, native VLAN in `tagged` mode
    pub untagged_object_id: Option<ObjectId>,
    pub is_lag_member: bool,
    /// Pending deletion marker, distinct from `is_enabled = false`
    #[serde(default)]
    pub delete: bool,
}

impl InterfaceState {
    /// Blank, disabled interface
    pub fn new(object_id: ObjectId, name: impl Into<String>) -> Self {
        Self {
            object_id,
            name: name.into(),
            is_enabled: false,
            description: String::new(),
            tags: BTreeSet::new(),
            interface_mode: None,
            tagged_object_ids: BTreeSet::new(),
            untagged_object_id: None,
            is_lag_member: false,
            delete: false,
        }
    }

    pub fn has_tag(&self, tag: &Tag) -> bool {
        self.tags.contains(tag)
    }

    /// Virtual routed interface (`irb.<unit>`)
    pub fn is_irb(&self) -> bool {
        self.name.starts_with("irb.")
    }

    /// Whether any VLAN is attached, tagged or native
    pub fn has_vlans(&self) -> bool {
        !self.tagged_object_ids.is_empty() || self.untagged_object_id.is_some()
    }

    /// Tagged and native VLANs together
    pub fn all_object_ids(&self) -> BTreeSet<ObjectId> {
        let mut all = self.tagged_object_ids.clone();
        all.extend(self.untagged_object_id);
        all
    }
}

impl fmt::Display for InterfaceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.delete {
            return write!(f, "{} (deleted)", self.name);
        }

        write!(
            f,
            "{} {}",
            self.name,
            if self.is_enabled { "enabled" } else { "disabled" }
        )?;
        if !self.description.is_empty() {
            write!(f, " desc={:?}", self.description)?;
        }
        if let Some(mode) = self.interface_mode {
            write!(f, " mode={}", mode)?;
        }
        if !self.tagged_object_ids.is_empty() {
            let ids: Vec<String> = self.tagged_object_ids.iter().map(|o| o.to_string()).collect();
            write!(f, " tagged=[{}]", ids.join(","))?;
        }
        if let Some(native) = self.untagged_object_id {
            write!(f, " untagged={}", native)?;
        }
        if !self.tags.is_empty() {
            let tags: Vec<&str> = self.tags.iter().map(|t| t.as_str()).collect();
            write!(f, " tags=[{}]", tags.join(","))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(id: u64) -> ObjectId {
        ObjectId::new(id)
    }

    #[test]
    fn test_interface_equality_ignores_order() {
        let mut a = InterfaceState::new(oid(1), "ge-0/0/1");
        a.tagged_object_ids = [oid(3), oid(2), oid(2)].into_iter().collect();
        a.tags = [Tag::Hosting, Tag::Wifi].into_iter().collect();

        let mut b = InterfaceState::new(oid(1), "ge-0/0/1");
        b.tagged_object_ids = [oid(2), oid(3)].into_iter().collect();
        b.tags = [Tag::Wifi, Tag::Hosting].into_iter().collect();

        assert_eq!(a, b);
    }

    #[test]
    fn test_interface_equality_detects_difference() {
        let a = InterfaceState::new(oid(1), "ge-0/0/1");
        let mut b = a.clone();
        b.delete = true;
        assert_ne!(a, b);
    }

    #[test]
    fn test_all_object_ids() {
        let mut iface = InterfaceState::new(oid(1), "ge-0/0/1");
        iface.tagged_object_ids = [oid(10), oid(20)].into_iter().collect();
        iface.untagged_object_id = Some(oid(30));

        assert!(iface.has_vlans());
        assert_eq!(iface.all_object_ids().len(), 3);
    }

    #[test]
    fn test_irb_detection() {
        assert!(InterfaceState::new(oid(1), "irb.200").is_irb());
        assert!(!InterfaceState::new(oid(1), "irb").is_irb());
        assert!(!InterfaceState::new(oid(1), "ge-0/0/1").is_irb());
    }

    #[test]
    fn test_device_roles() {
        let device = DeviceState {
            hostname: "minami3".to_string(),
            role: Some(Role::EdgeSw),
            region: Some(Region::Ookayama),
            site_group: Some(SiteGroup::OokayamaSouth),
            tags: BTreeSet::new(),
        };

        assert!(device.is_edge());
        assert!(!device.is_core());
        assert_eq!(device.wifi_area(), WifiArea::O2);
    }
}
