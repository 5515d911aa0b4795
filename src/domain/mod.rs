// Copyright (c) 2025 - Cowboy AI, Inc.
//! Fleet Domain Models
//!
//! Typed views of what the source of truth records about a switch fleet.
//!
//! # Value Objects with Invariants
//!
//! - [`ObjectId`] - Source-of-truth primary key
//! - [`VlanId`] - IEEE 802.1Q VLAN ID (1-4094)
//! - [`InterfaceMode`] - `access` / `tagged` / `tagged-all`
//!
//! # Slug Vocabularies
//!
//! - [`Tag`], [`Role`], [`Region`], [`SiteGroup`], [`VlanGroup`]
//! - [`McLagPair`] and [`WifiArea`] derived groupings
//!
//! # States
//!
//! - [`VlanState`], [`DeviceState`], [`InterfaceState`]

pub mod network;
pub mod slug;
pub mod state;

pub use network::{InterfaceMode, NetworkError, ObjectId, VlanId};
pub use slug::{McLagPair, Region, Role, SiteGroup, Tag, VlanGroup, WifiArea};
pub use state::{DeviceState, InterfaceState, VlanState};
