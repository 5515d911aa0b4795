// Copyright (c) 2025 - Cowboy AI, Inc.
//! Source-of-Truth Slug Vocabulary
//!
//! Tags, device roles, regions, site groups and VLAN groups are identified
//! by slugs on the wire. Each vocabulary is a closed enumeration with an
//! explicit slug mapping so that rules refer to variants instead of raw
//! strings. Slugs outside the vocabulary are kept verbatim in `Other` so
//! that nothing an operator attached is lost on a round trip.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! slug_vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $slug:literal, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )*
            /// Slug outside the known vocabulary
            Other(String),
        }

        impl $name {
            /// Wire slug
            pub fn as_str(&self) -> &str {
                match self {
                    $( Self::$variant => $slug, )*
                    Self::Other(slug) => slug.as_str(),
                }
            }

            /// Whether this slug belongs to the known vocabulary
            pub fn is_known(&self) -> bool {
                !matches!(self, Self::Other(_))
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(match s {
                    $( $slug => Self::$variant, )*
                    other => Self::Other(other.to_string()),
                })
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                match s.parse() {
                    Ok(v) => v,
                    Err(never) => match never {},
                }
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::from(s.to_string())
            }
        }

        impl From<$name> for String {
            fn from(v: $name) -> Self {
                v.as_str().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

slug_vocabulary! {
    /// Tags attached to interfaces and VLANs
    Tag {
        /// Access-point facing port (interfaces) / Wi-Fi VLAN (vlans)
        Wifi => "wifi",
        /// Hosting service port (interfaces) / hosting VLAN (vlans)
        Hosting => "hosting",
        /// Interface scheduled for termination
        Obsoleted => "obsoleted",
        /// Interface excluded from automatic handling
        Protect => "protect",
        /// Core port facing an edge switch; description names the edge
        CoreDownstream => "downlink",
        /// Edge port facing the core
        EdgeUpstream => "uplink",
        CoreMaster => "mclag-master-core",
        CoreSlave => "mclag-slave-core",
        CoreOokayamaMaster => "mclag-master-co",
        CoreOokayamaSlave => "mclag-slave-co",
        CoreSuzukakeMaster => "mclag-master-cs",
        CoreSuzukakeSlave => "mclag-slave-cs",
        VlanOokayama => "vlan-o",
        VlanSuzukake => "vlan-s",
        WifiMgmtVlanOokayama1 => "wlan-mgmt-vlan-o1",
        WifiMgmtVlanOokayama2 => "wlan-mgmt-vlan-o2",
        WifiMgmtVlanSuzukake => "wlan-mgmt-vlan-s",
    }
}

slug_vocabulary! {
    /// Device role
    Role {
        CoreSw => "core_sw",
        EdgeSw => "edge_sw",
    }
}

slug_vocabulary! {
    /// Campus region
    Region {
        Ookayama => "ookayama",
        Suzukake => "suzukake",
        Tamachi => "tamachi",
    }
}

slug_vocabulary! {
    /// Site group a device's site belongs to
    SiteGroup {
        Ishikawadai => "ishikawadai",
        Midorigaoka => "midorigaoka",
        OokayamaEast => "ookayama-e",
        OokayamaNorth => "ookayama-n",
        OokayamaSouth => "ookayama-s",
        OokayamaWest => "ookayama-w",
        Tamachi => "tamachi",
    }
}

slug_vocabulary! {
    /// VLAN group
    VlanGroup {
        /// Campus backbone group managed by this tool
        Titanet => "titanet",
    }
}

/// MCLAG core pair whose interfaces mirror each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum McLagPair {
    Core,
    Ookayama,
    Suzukake,
}

impl McLagPair {
    pub const ALL: [McLagPair; 3] = [McLagPair::Core, McLagPair::Ookayama, McLagPair::Suzukake];

    pub fn master_tag(&self) -> Tag {
        match self {
            Self::Core => Tag::CoreMaster,
            Self::Ookayama => Tag::CoreOokayamaMaster,
            Self::Suzukake => Tag::CoreSuzukakeMaster,
        }
    }

    pub fn backup_tag(&self) -> Tag {
        match self {
            Self::Core => Tag::CoreSlave,
            Self::Ookayama => Tag::CoreOokayamaSlave,
            Self::Suzukake => Tag::CoreSuzukakeSlave,
        }
    }
}

impl Tag {
    /// MCLAG pair this tag marks as master, if any
    pub fn mclag_master_of(&self) -> Option<McLagPair> {
        McLagPair::ALL.into_iter().find(|p| &p.master_tag() == self)
    }

    /// MCLAG pair this tag marks as backup, if any
    pub fn mclag_backup_of(&self) -> Option<McLagPair> {
        McLagPair::ALL.into_iter().find(|p| &p.backup_tag() == self)
    }
}

/// Wi-Fi management area a device is served from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WifiArea {
    O1,
    O2,
    S,
}

impl WifiArea {
    /// Area of a site group; sites outside both Ookayama areas are served from Suzukake
    pub fn of_site_group(group: Option<&SiteGroup>) -> Self {
        match group {
            Some(
                SiteGroup::OokayamaNorth
                | SiteGroup::OokayamaWest
                | SiteGroup::Midorigaoka
                | SiteGroup::Tamachi,
            ) => Self::O1,
            Some(SiteGroup::OokayamaEast | SiteGroup::OokayamaSouth | SiteGroup::Ishikawadai) => {
                Self::O2
            }
            _ => Self::S,
        }
    }

    /// Tag marking the management (native) VLAN of this area
    pub fn management_tag(&self) -> Tag {
        match self {
            Self::O1 => Tag::WifiMgmtVlanOokayama1,
            Self::O2 => Tag::WifiMgmtVlanOokayama2,
            Self::S => Tag::WifiMgmtVlanSuzukake,
        }
    }

    /// Tag marking the data-plane VLANs of this area (combined with [`Tag::Wifi`])
    pub fn data_plane_tag(&self) -> Tag {
        match self {
            Self::O1 | Self::O2 => Tag::VlanOokayama,
            Self::S => Tag::VlanSuzukake,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_slugs_round_trip() {
        assert_eq!(Tag::from("mclag-slave-core"), Tag::CoreSlave);
        assert_eq!(Tag::CoreSlave.as_str(), "mclag-slave-core");
        assert_eq!(Role::from("edge_sw"), Role::EdgeSw);
        assert_eq!(VlanGroup::from("titanet"), VlanGroup::Titanet);
    }

    #[test]
    fn test_unknown_slug_is_preserved() {
        let tag = Tag::from("bpdu-filter");
        assert_eq!(tag, Tag::Other("bpdu-filter".to_string()));
        assert!(!tag.is_known());
        assert_eq!(String::from(tag), "bpdu-filter");
    }

    #[test]
    fn test_tag_serializes_as_slug() {
        let json = serde_json::to_string(&vec![Tag::Hosting, Tag::from("poe")]).unwrap();
        assert_eq!(json, r#"["hosting","poe"]"#);

        let tags: Vec<Tag> = serde_json::from_str(r#"["wifi","storm-5m"]"#).unwrap();
        assert_eq!(tags, vec![Tag::Wifi, Tag::Other("storm-5m".to_string())]);
    }

    #[test]
    fn test_mclag_pairs() {
        assert_eq!(Tag::CoreOokayamaMaster.mclag_master_of(), Some(McLagPair::Ookayama));
        assert_eq!(Tag::CoreSuzukakeSlave.mclag_backup_of(), Some(McLagPair::Suzukake));
        assert_eq!(Tag::Wifi.mclag_master_of(), None);
        assert_eq!(McLagPair::Core.backup_tag(), Tag::CoreSlave);
    }

    #[test]
    fn test_wifi_area_of_site_group() {
        assert_eq!(WifiArea::of_site_group(Some(&SiteGroup::Tamachi)), WifiArea::O1);
        assert_eq!(WifiArea::of_site_group(Some(&SiteGroup::Ishikawadai)), WifiArea::O2);
        assert_eq!(
            WifiArea::of_site_group(Some(&SiteGroup::Other("suzukake-g".to_string()))),
            WifiArea::S
        );
        assert_eq!(WifiArea::of_site_group(None), WifiArea::S);
        assert_eq!(WifiArea::O2.data_plane_tag(), Tag::VlanOokayama);
    }
}
