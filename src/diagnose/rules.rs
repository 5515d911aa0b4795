// Copyright (c) 2025 - Cowboy AI, Inc.
//! Built-in Rule Catalogue
//!
//! Each rule inspects one interface (and optionally one device) and returns
//! a [`RuleOutcome`]. Rules are plain data behind the [`Rule`] trait; the
//! catalogue is an ordered list of stages, and rules of a later stage see
//! the states resolved from every earlier stage.
//!
//! ```text
//! stage 1 (local)    exclusive tags, cleanup, termination, Wi-Fi, Hosting,
//!                    VLAN group, empty IRB
//! stage 2 (uplinks)  edge/core uplink consistency
//! stage 3 (mirror)   master/backup mirroring
//! ```

use std::collections::BTreeSet;

use super::interface_condition::{priority, InterfaceCondition};
use super::RuleContext;
use crate::condition::ConditionalValue;
use crate::domain::{DeviceState, InterfaceMode, InterfaceState, McLagPair, Tag};
use crate::karte::Annotation;

/// What one rule concluded about one interface
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleOutcome {
    pub condition: Option<InterfaceCondition>,
    pub annotations: Vec<Annotation>,
    /// Skip every remaining rule for this interface
    pub stop: bool,
}

impl RuleOutcome {
    /// Rule does not apply
    pub fn skip() -> Self {
        Self::default()
    }

    pub fn require(condition: InterfaceCondition) -> Self {
        Self {
            condition: Some(condition),
            ..Self::default()
        }
    }

    pub fn annotate(annotation: Annotation) -> Self {
        Self {
            annotations: vec![annotation],
            ..Self::default()
        }
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn and_stop(mut self) -> Self {
        self.stop = true;
        self
    }
}

/// A policy rule
pub trait Rule: Send + Sync {
    /// Name reported as the violated argument
    fn name(&self) -> &'static str;

    fn evaluate(
        &self,
        ctx: &RuleContext<'_>,
        device: &DeviceState,
        interface: &InterfaceState,
    ) -> RuleOutcome;

    /// Device-level findings, run once per device after the interfaces
    fn inspect_device(&self, _ctx: &RuleContext<'_>, _device: &DeviceState) -> Vec<Annotation> {
        Vec::new()
    }
}

/// Rules whose conditions are resolved together before the next stage runs
pub struct Stage {
    pub name: &'static str,
    pub rules: Vec<Box<dyn Rule>>,
}

impl Stage {
    pub fn new(name: &'static str, rules: Vec<Box<dyn Rule>>) -> Self {
        Self { name, rules }
    }
}

/// Default catalogue, in evaluation order
pub fn builtin_catalogue() -> Vec<Stage> {
    vec![
        Stage::new(
            "local",
            vec![
                Box::new(ExclusiveTagConflict),
                Box::new(IncompleteInterfaceCleanup),
                Box::new(ObsoletedTermination),
                Box::new(WifiTagConsistency),
                Box::new(HostingTagConsistency),
                Box::new(VlanGroupMembership),
                Box::new(EmptyIrbCleanup),
            ],
        ),
        Stage::new("uplinks", vec![Box::new(EdgeCoreConsistency)]),
        Stage::new("mirror", vec![Box::new(MasterBackupMirroring)]),
    ]
}

fn text(value: &str) -> ConditionalValue<String> {
    if value.is_empty() {
        ConditionalValue::is_absent()
    } else {
        ConditionalValue::is([value.to_string()])
    }
}

fn tag_list(tags: &BTreeSet<Tag>) -> String {
    tags.iter().map(Tag::as_str).collect::<Vec<_>>().join(", ")
}

// ----------------------------------------------------------------------
// 1. Exclusive tags
// ----------------------------------------------------------------------

/// More than one tag of the exclusive group: a human has to pick one
pub struct ExclusiveTagConflict;

impl Rule for ExclusiveTagConflict {
    fn name(&self) -> &'static str {
        "exclusive tag conflict"
    }

    fn evaluate(
        &self,
        ctx: &RuleContext<'_>,
        _device: &DeviceState,
        interface: &InterfaceState,
    ) -> RuleOutcome {
        let conflicting: BTreeSet<Tag> = interface
            .tags
            .intersection(&ctx.policy.exclusive_tags)
            .cloned()
            .collect();

        if conflicting.len() < 2 {
            return RuleOutcome::skip();
        }

        let message = format!("mutually exclusive tags: {}", tag_list(&conflicting));
        let mut condition = InterfaceCondition::new(self.name()).manual();
        condition.tags = ConditionalValue::exclude(conflicting);

        RuleOutcome::require(condition.at_priority(priority::DEFAULT))
            .with_annotation(Annotation::fatal(message))
            .and_stop()
    }
}

// ----------------------------------------------------------------------
// 2. Incomplete interfaces
// ----------------------------------------------------------------------

/// Half-configured ports (enabled or moded, but no VLAN) are wiped
pub struct IncompleteInterfaceCleanup;

impl IncompleteInterfaceCleanup {
    fn is_exempt(ctx: &RuleContext<'_>, interface: &InterfaceState) -> bool {
        interface.interface_mode == Some(InterfaceMode::TaggedAll)
            || interface.is_lag_member
            || interface.has_tag(&Tag::Protect)
            || interface.has_tag(&Tag::CoreDownstream)
            || interface.has_tag(&Tag::EdgeUpstream)
            || interface
                .tags
                .iter()
                .any(|t| ctx.policy.exclusive_tags.contains(t))
    }
}

impl Rule for IncompleteInterfaceCleanup {
    fn name(&self) -> &'static str {
        "incomplete interface cleanup"
    }

    fn evaluate(
        &self,
        ctx: &RuleContext<'_>,
        _device: &DeviceState,
        interface: &InterfaceState,
    ) -> RuleOutcome {
        let incomplete = !interface.has_vlans()
            && (interface.is_enabled || interface.interface_mode.is_some())
            && !Self::is_exempt(ctx, interface);

        if !incomplete && !interface.has_tag(&Tag::Obsoleted) {
            return RuleOutcome::skip();
        }

        RuleOutcome::require(InterfaceCondition::cleared(self.name()).at_priority(priority::CLEANUP))
    }
}

// ----------------------------------------------------------------------
// 3. Obsoleted interfaces
// ----------------------------------------------------------------------

/// `obsoleted` ports are wiped, overriding every other rule
pub struct ObsoletedTermination;

impl Rule for ObsoletedTermination {
    fn name(&self) -> &'static str {
        "obsoleted interface termination"
    }

    fn evaluate(
        &self,
        _ctx: &RuleContext<'_>,
        _device: &DeviceState,
        interface: &InterfaceState,
    ) -> RuleOutcome {
        if !interface.has_tag(&Tag::Obsoleted) {
            return RuleOutcome::skip();
        }

        RuleOutcome::require(
            InterfaceCondition::cleared(self.name()).at_priority(priority::TERMINATION),
        )
    }
}

// ----------------------------------------------------------------------
// 4. Wi-Fi
// ----------------------------------------------------------------------

/// Access-point ports on edge switches carry the area's Wi-Fi VLANs
pub struct WifiTagConsistency;

impl Rule for WifiTagConsistency {
    fn name(&self) -> &'static str {
        "Wi-Fi tag consistency"
    }

    fn evaluate(
        &self,
        ctx: &RuleContext<'_>,
        device: &DeviceState,
        interface: &InterfaceState,
    ) -> RuleOutcome {
        if !device.is_edge() || !interface.has_tag(&Tag::Wifi) {
            return RuleOutcome::skip();
        }

        let area = device.wifi_area();
        let vlans = ctx.catalog.wifi(area).cloned().unwrap_or_default();

        let mut condition = InterfaceCondition::new(self.name());
        condition.is_enabled = ConditionalValue::is([true]);
        condition.interface_mode = ConditionalValue::is([InterfaceMode::Tagged]);
        condition.tagged_object_ids = ConditionalValue::include(vlans.data_plane);

        let mut annotations = Vec::new();
        match vlans.management.len() {
            1 => condition.untagged_object_id = ConditionalValue::is(vlans.management),
            0 => annotations.push(Annotation::warn(format!(
                "no Wi-Fi management VLAN for area {:?}",
                area
            ))),
            n => annotations.push(Annotation::warn(format!(
                "{} Wi-Fi management VLANs for area {:?}",
                n, area
            ))),
        }

        RuleOutcome {
            condition: Some(condition.at_priority(priority::DEFAULT)),
            annotations,
            stop: false,
        }
    }
}

// ----------------------------------------------------------------------
// 5. Hosting
// ----------------------------------------------------------------------

/// Hosting ports trunk exactly the hosting VLANs
pub struct HostingTagConsistency;

impl Rule for HostingTagConsistency {
    fn name(&self) -> &'static str {
        "Hosting tag consistency"
    }

    fn evaluate(
        &self,
        ctx: &RuleContext<'_>,
        _device: &DeviceState,
        interface: &InterfaceState,
    ) -> RuleOutcome {
        if !interface.has_tag(&Tag::Hosting) {
            return RuleOutcome::skip();
        }

        let mut condition = InterfaceCondition::new(self.name());
        condition.is_enabled = ConditionalValue::is([true]);
        condition.interface_mode = ConditionalValue::is([InterfaceMode::Tagged]);
        condition.tagged_object_ids = ConditionalValue::is(ctx.catalog.hosting.iter().copied());
        condition.untagged_object_id = ConditionalValue::is_absent();

        RuleOutcome::require(condition.at_priority(priority::DEFAULT))
    }
}

// ----------------------------------------------------------------------
// 6. VLAN group
// ----------------------------------------------------------------------

/// Switch ports only carry VLANs of the managed group
pub struct VlanGroupMembership;

impl Rule for VlanGroupMembership {
    fn name(&self) -> &'static str {
        "VLAN group membership"
    }

    fn evaluate(
        &self,
        ctx: &RuleContext<'_>,
        device: &DeviceState,
        _interface: &InterfaceState,
    ) -> RuleOutcome {
        if !device.is_core() && !device.is_edge() {
            return RuleOutcome::skip();
        }

        let mut condition = InterfaceCondition::new(self.name()).manual();
        condition.tagged_object_ids = ConditionalValue::included(ctx.catalog.managed.iter().copied());
        condition.untagged_object_id =
            ConditionalValue::included(ctx.catalog.managed.iter().copied());

        RuleOutcome::require(condition.at_priority(priority::DEFAULT))
    }
}

// ----------------------------------------------------------------------
// 7. Empty IRB
// ----------------------------------------------------------------------

/// Routed `irb.*` units without a VLAN are deleted
pub struct EmptyIrbCleanup;

impl Rule for EmptyIrbCleanup {
    fn name(&self) -> &'static str {
        "empty IRB cleanup"
    }

    fn evaluate(
        &self,
        _ctx: &RuleContext<'_>,
        _device: &DeviceState,
        interface: &InterfaceState,
    ) -> RuleOutcome {
        if !interface.is_irb() || interface.has_vlans() {
            return RuleOutcome::skip();
        }

        let mut condition = InterfaceCondition::new(self.name());
        condition.delete = ConditionalValue::is([true]);

        RuleOutcome::require(condition.at_priority(priority::DEFAULT))
    }
}

// ----------------------------------------------------------------------
// 8. Edge/Core uplinks
// ----------------------------------------------------------------------

/// Core downlinks trunk exactly the VLANs the edge they face uses
pub struct EdgeCoreConsistency;

impl EdgeCoreConsistency {
    fn is_described_by_downlink(ctx: &RuleContext<'_>, hostname: &str) -> bool {
        ctx.snapshot
            .interfaces_with_tag(&Tag::CoreDownstream)
            .any(|(device, iface)| device.is_core() && iface.description.trim() == hostname)
    }
}

impl Rule for EdgeCoreConsistency {
    fn name(&self) -> &'static str {
        "edge/core uplink consistency"
    }

    fn evaluate(
        &self,
        ctx: &RuleContext<'_>,
        device: &DeviceState,
        interface: &InterfaceState,
    ) -> RuleOutcome {
        if !device.is_core() || !interface.has_tag(&Tag::CoreDownstream) {
            return RuleOutcome::skip();
        }

        let edge_name = interface.description.trim();
        let Some(edge) = ctx.snapshot.device(edge_name).filter(|d| d.is_edge()) else {
            return RuleOutcome::annotate(Annotation::warn(format!(
                "downlink names unknown edge {:?}",
                edge_name
            )));
        };

        let vlans: BTreeSet<_> = ctx
            .resolved_interfaces(&edge.hostname)
            .filter(|iface| !iface.delete)
            .flat_map(|iface| iface.all_object_ids())
            .filter(|oid| ctx.catalog.managed.contains(oid))
            .collect();

        let mut condition = InterfaceCondition::new(self.name());
        condition.is_enabled = ConditionalValue::is([true]);
        condition.interface_mode = ConditionalValue::is([InterfaceMode::Tagged]);
        condition.tagged_object_ids = ConditionalValue::is(vlans);
        condition.untagged_object_id = ConditionalValue::is_absent();

        RuleOutcome::require(condition.at_priority(priority::DEFAULT))
    }

    fn inspect_device(&self, ctx: &RuleContext<'_>, device: &DeviceState) -> Vec<Annotation> {
        if !device.is_edge() || Self::is_described_by_downlink(ctx, &device.hostname) {
            return Vec::new();
        }

        vec![Annotation::warn(format!(
            "neglected edge: no core downlink faces {}",
            device.hostname
        ))]
    }
}

// ----------------------------------------------------------------------
// 9. Master/Backup
// ----------------------------------------------------------------------

/// MCLAG backup ports mirror the master port of the same name
pub struct MasterBackupMirroring;

impl Rule for MasterBackupMirroring {
    fn name(&self) -> &'static str {
        "master/backup mirroring"
    }

    fn evaluate(
        &self,
        ctx: &RuleContext<'_>,
        device: &DeviceState,
        interface: &InterfaceState,
    ) -> RuleOutcome {
        if !device.is_core() {
            return RuleOutcome::skip();
        }

        let Some(pair) = interface.tags.iter().find_map(Tag::mclag_backup_of) else {
            return RuleOutcome::skip();
        };
        let master_tag = pair.master_tag();

        let masters: Vec<(&DeviceState, &InterfaceState)> = ctx
            .snapshot
            .iter_interfaces()
            .filter(|(d, i)| {
                d.is_core()
                    && d.hostname != device.hostname
                    && i.name == interface.name
                    && i.has_tag(&master_tag)
            })
            .collect();

        let (master_device, master) = match masters.as_slice() {
            [only] => *only,
            [] => {
                return RuleOutcome::annotate(Annotation::warn(format!(
                    "{} set but no {} interface {} on another core",
                    pair.backup_tag(),
                    master_tag,
                    interface.name
                )))
            }
            many => {
                let hosts: Vec<&str> = many.iter().map(|(d, _)| d.hostname.as_str()).collect();
                return RuleOutcome::annotate(Annotation::warn(format!(
                    "{} interface {} found on several cores: {}",
                    master_tag,
                    interface.name,
                    hosts.join(", ")
                )));
            }
        };

        let master = ctx
            .resolved(&master_device.hostname, &master.name)
            .unwrap_or(master);

        RuleOutcome::require(mirror_of(self.name(), master, pair))
    }
}

fn mirror_of(argument: &str, master: &InterfaceState, pair: McLagPair) -> InterfaceCondition {
    let mut tags = master.tags.clone();
    tags.remove(&pair.master_tag());
    tags.insert(pair.backup_tag());

    let mut condition = InterfaceCondition::new(argument);
    condition.is_enabled = ConditionalValue::is([master.is_enabled]);
    condition.description = text(&master.description);
    condition.tags = ConditionalValue::is(tags);
    condition.interface_mode = ConditionalValue::is(master.interface_mode);
    condition.tagged_object_ids = ConditionalValue::is(master.tagged_object_ids.iter().copied());
    condition.untagged_object_id = ConditionalValue::is(master.untagged_object_id);
    condition.at_priority(priority::MIRROR)
}
