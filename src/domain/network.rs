// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Value Objects with Validation Invariants

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Network validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Invalid VLAN ID: {0} (must be 1-4094)")]
    InvalidVlanId(u16),

    #[error("Invalid interface mode: {0}")]
    InvalidInterfaceMode(String),
}

/// Source-of-truth object identifier
///
/// The internal primary key NetBox assigns to every object. Distinct from
/// the 802.1Q [`VlanId`]: interfaces reference VLANs by object id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(u64);

impl ObjectId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for ObjectId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// VLAN ID value object
///
/// Represents a VLAN ID (IEEE 802.1Q) with validation.
/// Invariants:
/// - Valid VLAN ID range (1-4094)
/// - VLAN 0 and 4095 are reserved
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct VlanId(u16);

impl VlanId {
    /// Minimum valid VLAN ID
    pub const MIN: u16 = 1;

    /// Maximum valid VLAN ID
    pub const MAX: u16 = 4094;

    /// Create a new VLAN ID with validation
    pub fn new(id: u16) -> Result<Self, NetworkError> {
        if !(Self::MIN..=Self::MAX).contains(&id) {
            return Err(NetworkError::InvalidVlanId(id));
        }

        Ok(Self(id))
    }

    /// Get the VLAN ID value
    pub fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for VlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for VlanId {
    type Error = NetworkError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VlanId> for u16 {
    fn from(vid: VlanId) -> Self {
        vid.0
    }
}

/// 802.1Q mode of a switch port as recorded in the source of truth
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InterfaceMode {
    /// Single untagged VLAN
    #[serde(rename = "access")]
    Access,
    /// Explicit tagged VLAN list plus optional native VLAN
    #[serde(rename = "tagged")]
    Tagged,
    /// Trunk carrying every VLAN
    #[serde(rename = "tagged-all")]
    TaggedAll,
}

impl InterfaceMode {
    /// Wire value used by the source of truth
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Tagged => "tagged",
            Self::TaggedAll => "tagged-all",
        }
    }
}

impl fmt::Display for InterfaceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterfaceMode {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "access" => Ok(Self::Access),
            // "trunk" is the vendor spelling some exports carry
            "tagged" | "trunk" => Ok(Self::Tagged),
            "tagged-all" => Ok(Self::TaggedAll),
            _ => Err(NetworkError::InvalidInterfaceMode(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vlan_id() {
        assert!(VlanId::new(100).is_ok());
        assert!(VlanId::new(0).is_err()); // Reserved
        assert!(VlanId::new(4095).is_err()); // Reserved
        assert!(VlanId::new(5000).is_err()); // Out of range
    }

    #[test]
    fn test_vlan_id_deserialize_validates() {
        let vid: VlanId = serde_json::from_str("200").unwrap();
        assert_eq!(vid.value(), 200);
        assert!(serde_json::from_str::<VlanId>("4095").is_err());
    }

    #[test]
    fn test_interface_mode_parsing() {
        assert_eq!("access".parse::<InterfaceMode>().unwrap(), InterfaceMode::Access);
        assert_eq!("Tagged".parse::<InterfaceMode>().unwrap(), InterfaceMode::Tagged);
        assert_eq!("trunk".parse::<InterfaceMode>().unwrap(), InterfaceMode::Tagged);
        assert_eq!(
            "tagged-all".parse::<InterfaceMode>().unwrap(),
            InterfaceMode::TaggedAll
        );
        assert!("routed".parse::<InterfaceMode>().is_err());
    }

    #[test]
    fn test_interface_mode_wire_format() {
        let json = serde_json::to_string(&InterfaceMode::TaggedAll).unwrap();
        assert_eq!(json, "\"tagged-all\"");
    }

    #[test]
    fn test_object_id_display() {
        assert_eq!(ObjectId::new(42).to_string(), "#42");
    }
}
