//! Read-only view of the simulation for one tick

use serde::{Deserialize, Serialize};

use crate::core::types::{AbilityId, Point2, Tick, UnitTag, UnitTypeId, UpgradeId};
use crate::sim::command::CommandTarget;

/// Which side a unit belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alliance {
    #[default]
    Own,
    Ally,
    Neutral,
    Enemy,
}

/// An order a unit is already carrying out (or has queued)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitOrder {
    pub ability: AbilityId,
    #[serde(default)]
    pub target: CommandTarget,
}

impl UnitOrder {
    pub fn new(ability: AbilityId) -> Self {
        Self { ability, target: CommandTarget::None }
    }
}

/// One unit as seen this tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub tag: UnitTag,
    pub unit_type: UnitTypeId,
    #[serde(default)]
    pub alliance: Alliance,
    pub pos: Point2,
    #[serde(default)]
    pub orders: Vec<UnitOrder>,
    #[serde(default = "full_health")]
    pub health: f32,
    #[serde(default = "full_health")]
    pub health_max: f32,
    #[serde(default)]
    pub is_flying: bool,
    #[serde(default)]
    pub is_structure: bool,
    #[serde(default = "complete")]
    pub build_progress: f32,
    /// Abilities currently usable (off cooldown, enough energy)
    #[serde(default)]
    pub available_abilities: Vec<AbilityId>,
}

fn full_health() -> f32 {
    100.0
}

fn complete() -> f32 {
    1.0
}

impl UnitSnapshot {
    /// A friendly, complete, order-free unit at `pos`
    pub fn new(tag: UnitTag, unit_type: UnitTypeId, pos: Point2) -> Self {
        Self {
            tag,
            unit_type,
            alliance: Alliance::Own,
            pos,
            orders: Vec::new(),
            health: full_health(),
            health_max: full_health(),
            is_flying: false,
            is_structure: false,
            build_progress: complete(),
            available_abilities: Vec::new(),
        }
    }

    pub fn with_alliance(mut self, alliance: Alliance) -> Self {
        self.alliance = alliance;
        self
    }

    pub fn with_order(mut self, order: UnitOrder) -> Self {
        self.orders.push(order);
        self
    }

    pub fn structure(mut self) -> Self {
        self.is_structure = true;
        self
    }

    pub fn has_order(&self, ability: AbilityId) -> bool {
        self.orders.iter().any(|o| o.ability == ability)
    }

    pub fn is_complete(&self) -> bool {
        self.build_progress >= 1.0
    }

    pub fn health_fraction(&self) -> f32 {
        if self.health_max <= 0.0 {
            return 0.0;
        }
        self.health / self.health_max
    }
}

/// World state for the current tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub game_loop: Tick,
    pub minerals: u32,
    pub vespene: u32,
    pub food_used: u32,
    pub food_cap: u32,
    #[serde(default)]
    pub upgrades: Vec<UpgradeId>,
    #[serde(default)]
    pub units: Vec<UnitSnapshot>,
}

impl WorldSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a snapshot from JSON
    pub fn from_json(content: &str) -> crate::core::error::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn own_units(&self) -> impl Iterator<Item = &UnitSnapshot> + '_ {
        self.units.iter().filter(|u| u.alliance == Alliance::Own)
    }

    pub fn neutral_units(&self) -> impl Iterator<Item = &UnitSnapshot> + '_ {
        self.units.iter().filter(|u| u.alliance == Alliance::Neutral)
    }

    pub fn unit(&self, tag: UnitTag) -> Option<&UnitSnapshot> {
        self.units.iter().find(|u| u.tag == tag)
    }

    pub fn has_upgrade(&self, upgrade: UpgradeId) -> bool {
        self.upgrades.contains(&upgrade)
    }

    /// Supply still available before hitting the cap (negative when over cap)
    pub fn food_headroom(&self) -> i64 {
        i64::from(self.food_cap) - i64::from(self.food_used)
    }
}
