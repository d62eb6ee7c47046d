//! Lazily resolved order targets
//!
//! An order keeps *how* to find its location rather than a frozen point, so
//! a rule that fires late in the game still aims at the current frontline.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{Point2, UnitTag, UnitTypeId};
use crate::sim::location::LocationService;
use crate::sim::snapshot::{UnitSnapshot, WorldSnapshot};

/// Named locations and unit types a strategy can refer to
#[derive(Debug, Clone, Default)]
pub struct Blackboard {
    locations: AHashMap<String, Point2>,
    unit_types: AHashMap<String, UnitTypeId>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store_location(&mut self, name: impl Into<String>, location: Point2) {
        self.locations.insert(name.into(), location);
    }

    pub fn location(&self, name: &str) -> Option<Point2> {
        self.locations.get(name).copied()
    }

    pub fn store_unit_type(&mut self, name: impl Into<String>, unit_type: UnitTypeId) {
        self.unit_types.insert(name.into(), unit_type);
    }

    pub fn unit_type(&self, name: &str) -> Option<UnitTypeId> {
        self.unit_types.get(name).copied()
    }
}

/// Where an order's location comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    Literal(Point2),
    StartLocation,
    ProxyLocation,
    Townhall { base: usize },
    BuildArea { base: usize, index: usize },
    DefendPoint { base: usize, index: usize },
    RallyPoint { base: usize },
    /// Townhall of the highest-index active base
    NewestActiveBase,
    /// A location stored on the blackboard
    Stored(String),
}

impl LocationSource {
    pub fn resolve(&self, locations: &dyn LocationService, blackboard: &Blackboard) -> Option<Point2> {
        match self {
            LocationSource::Literal(point) => Some(*point),
            LocationSource::StartLocation => Some(locations.start_location()),
            LocationSource::ProxyLocation => Some(locations.proxy_location()),
            LocationSource::Townhall { base } => locations.base(*base).map(|b| b.townhall),
            LocationSource::BuildArea { base, index } => {
                locations.base(*base).and_then(|b| b.build_area(*index))
            }
            LocationSource::DefendPoint { base, index } => {
                locations.base(*base).and_then(|b| b.defend_point(*index))
            }
            LocationSource::RallyPoint { base } => locations.base(*base).map(|b| b.rally_point()),
            LocationSource::NewestActiveBase => locations
                .newest_active_base()
                .and_then(|i| locations.base(i))
                .map(|b| b.townhall),
            LocationSource::Stored(name) => blackboard.location(name),
        }
    }
}

impl From<Point2> for LocationSource {
    fn from(point: Point2) -> Self {
        LocationSource::Literal(point)
    }
}

/// Which unit a target-entity order aims at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitTarget {
    Tag(UnitTag),
    /// Smallest-tag finished friendly unit of the type
    OfType(UnitTypeId),
    /// Like `OfType`, with the type read from the blackboard
    StoredType(String),
}

impl UnitTarget {
    pub fn resolve<'a>(&self, snapshot: &'a WorldSnapshot, blackboard: &Blackboard) -> Option<&'a UnitSnapshot> {
        let unit_type = match self {
            UnitTarget::Tag(tag) => return snapshot.unit(*tag),
            UnitTarget::OfType(unit_type) => *unit_type,
            UnitTarget::StoredType(name) => blackboard.unit_type(name)?,
        };
        snapshot
            .own_units()
            .filter(|u| u.unit_type == unit_type && u.is_complete())
            .min_by_key(|u| u.tag)
    }
}
