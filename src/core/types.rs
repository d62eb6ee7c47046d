//! Core type definitions used throughout the codebase

use std::fmt;

use serde::{Deserialize, Serialize};

/// Simulation-assigned identity of a unit (stable for the unit's lifetime)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitTag(pub u64);

impl fmt::Display for UnitTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Game loop counter (simulation time unit)
pub type Tick = u64;

/// 2D map position
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: &Self) -> f32 {
        self.distance_squared(other).sqrt()
    }
}

impl std::ops::Add for Point2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl std::ops::Sub for Point2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl fmt::Display for Point2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// Declares a numeric id newtype with named constants and a name table
macro_rules! named_ids {
    ($(#[$meta:meta])* $name:ident { $($konst:ident = $value:expr),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            $(pub const $konst: $name = $name($value);)*

            const NAMES: &'static [(&'static str, $name)] = &[$((stringify!($konst), $name($value))),*];

            /// Look up a constant by its upper-case name
            pub fn from_name(name: &str) -> Option<Self> {
                Self::NAMES
                    .iter()
                    .find(|(n, _)| n.eq_ignore_ascii_case(name))
                    .map(|(_, id)| *id)
            }

            /// Name of the constant, if this id has one
            pub fn name(&self) -> Option<&'static str> {
                Self::NAMES.iter().find(|(_, id)| id == self).map(|(n, _)| *n)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.name() {
                    Some(name) => f.write_str(name),
                    None => write!(f, "{}({})", stringify!($name), self.0),
                }
            }
        }
    };
}

named_ids! {
    /// Unit kind as reported by the simulation
    UnitTypeId {
        TERRAN_COMMANDCENTER = 18,
        TERRAN_SUPPLYDEPOT = 19,
        TERRAN_REFINERY = 20,
        TERRAN_BARRACKS = 21,
        TERRAN_MISSILETURRET = 23,
        TERRAN_BUNKER = 24,
        TERRAN_COMMANDCENTERFLYING = 36,
        TERRAN_SCV = 45,
        TERRAN_MARINE = 48,
        TERRAN_PLANETARYFORTRESS = 130,
        TERRAN_ORBITALCOMMAND = 132,
        TERRAN_ORBITALCOMMANDFLYING = 134,
        TERRAN_REFINERYRICH = 1943,
        PROTOSS_NEXUS = 59,
        PROTOSS_PYLON = 60,
        PROTOSS_ASSIMILATOR = 61,
        PROTOSS_GATEWAY = 62,
        PROTOSS_PHOTONCANNON = 66,
        PROTOSS_ZEALOT = 73,
        PROTOSS_STALKER = 74,
        PROTOSS_CYBERNETICSCORE = 72,
        PROTOSS_PROBE = 84,
        PROTOSS_ASSIMILATORRICH = 1994,
        ZERG_HATCHERY = 86,
        ZERG_EXTRACTOR = 88,
        ZERG_SPINECRAWLER = 98,
        ZERG_SPORECRAWLER = 99,
        ZERG_LAIR = 100,
        ZERG_HIVE = 101,
        ZERG_DRONE = 104,
        ZERG_ZERGLING = 105,
        ZERG_EXTRACTORRICH = 1995,
        NEUTRAL_RICHMINERALFIELD = 146,
        NEUTRAL_RICHMINERALFIELD750 = 147,
        NEUTRAL_MINERALFIELD = 341,
        NEUTRAL_VESPENEGEYSER = 342,
        NEUTRAL_SPACEPLATFORMGEYSER = 343,
        NEUTRAL_RICHVESPENEGEYSER = 344,
        NEUTRAL_MINERALFIELD750 = 483,
        NEUTRAL_PURIFIERVESPENEGEYSER = 608,
        NEUTRAL_LABMINERALFIELD = 665,
        NEUTRAL_LABMINERALFIELD750 = 666,
        NEUTRAL_PURIFIERRICHMINERALFIELD = 796,
        NEUTRAL_PURIFIERRICHMINERALFIELD750 = 797,
        NEUTRAL_PROTOSSVESPENEGEYSER = 880,
        NEUTRAL_SHAKURASVESPENEGEYSER = 881,
        NEUTRAL_PURIFIERMINERALFIELD = 884,
        NEUTRAL_PURIFIERMINERALFIELD750 = 885,
        NEUTRAL_BATTLESTATIONMINERALFIELD = 886,
        NEUTRAL_BATTLESTATIONMINERALFIELD750 = 887,
    }
}

named_ids! {
    /// Ability (command) identifier understood by the simulation
    AbilityId {
        SMART = 1,
        BUILD_SUPPLYDEPOT = 319,
        BUILD_REFINERY = 320,
        BUILD_BARRACKS = 321,
        TRAIN_SCV = 524,
        TRAIN_MARINE = 560,
        BUILD_NEXUS = 880,
        BUILD_PYLON = 881,
        BUILD_ASSIMILATOR = 882,
        BUILD_GATEWAY = 883,
        BUILD_PHOTONCANNON = 887,
        BUILD_CYBERNETICSCORE = 894,
        TRAIN_ZEALOT = 916,
        TRAIN_STALKER = 917,
        TRAIN_PROBE = 1006,
        BUILD_HATCHERY = 1152,
        BUILD_EXTRACTOR = 1154,
        TRAIN_DRONE = 1342,
        STOP = 3665,
        HARVEST_GATHER = 3666,
        ATTACK = 3674,
        EFFECT_BLINK = 3687,
        EFFECT_CHRONOBOOSTENERGYCOST = 3755,
        MOVE = 3794,
    }
}

named_ids! {
    /// Researched upgrade identifier
    UpgradeId {
        BLINKTECH = 87,
        WARPGATERESEARCH = 84,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance_squared() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(3.0, 4.0);
        assert_eq!(a.distance_squared(&b), 25.0);
        assert_eq!(a.distance(&b), 5.0);
    }

    #[test]
    fn test_unit_type_name_lookup() {
        assert_eq!(UnitTypeId::from_name("PROTOSS_PROBE"), Some(UnitTypeId::PROTOSS_PROBE));
        assert_eq!(UnitTypeId::from_name("protoss_probe"), Some(UnitTypeId::PROTOSS_PROBE));
        assert_eq!(UnitTypeId::from_name("NOT_A_UNIT"), None);
        assert_eq!(UnitTypeId::PROTOSS_NEXUS.to_string(), "PROTOSS_NEXUS");
        assert_eq!(UnitTypeId(9999).to_string(), "UnitTypeId(9999)");
    }

    #[test]
    fn test_ability_name_lookup() {
        assert_eq!(AbilityId::from_name("BUILD_PYLON"), Some(AbilityId::BUILD_PYLON));
        assert_eq!(AbilityId::HARVEST_GATHER.name(), Some("HARVEST_GATHER"));
    }

    #[test]
    fn test_unit_tag_ordering() {
        assert!(UnitTag(1) < UnitTag(2));
        assert_eq!(UnitTag(7).to_string(), "#7");
    }
}
