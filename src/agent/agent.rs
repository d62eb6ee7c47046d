//! Controlled entities and their capability flags

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::types::{Point2, UnitTag, UnitTypeId};
use crate::order::OrderId;

/// Broad role of a controlled entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentCategory {
    Worker,
    Army,
    Structure,
    Townhall,
}

/// Transient role tags used to address agents by what they are doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityFlag {
    Worker,
    Army,
    Structure,
    Townhall,
    MineralGatherer,
    GasGatherer,
    BuildingGas,
    Flying,
    Defense,
}

pub type FlagSet = BTreeSet<CapabilityFlag>;

/// A controlled simulation entity
#[derive(Debug, Clone)]
pub struct Agent {
    pub tag: UnitTag,
    pub unit_type: UnitTypeId,
    pub category: AgentCategory,
    pub position: Point2,
    pub home_location: Point2,
    pub assigned_location: Point2,
    flags: FlagSet,
    groups: BTreeSet<String>,
    current_order: Option<OrderId>,
    bundled_order: Option<OrderId>,
    default_order: Option<OrderId>,
    idle: bool,
}

impl Agent {
    /// New agent carrying the flag matching its category; starts idle
    pub fn new(tag: UnitTag, unit_type: UnitTypeId, category: AgentCategory, position: Point2) -> Self {
        let mut flags = FlagSet::new();
        match category {
            AgentCategory::Worker => {
                flags.insert(CapabilityFlag::Worker);
                flags.insert(CapabilityFlag::MineralGatherer);
            }
            AgentCategory::Army => {
                flags.insert(CapabilityFlag::Army);
            }
            AgentCategory::Structure => {
                flags.insert(CapabilityFlag::Structure);
            }
            AgentCategory::Townhall => {
                flags.insert(CapabilityFlag::Structure);
                flags.insert(CapabilityFlag::Townhall);
            }
        }

        Self {
            tag,
            unit_type,
            category,
            position,
            home_location: position,
            assigned_location: position,
            flags,
            groups: BTreeSet::new(),
            current_order: None,
            bundled_order: None,
            default_order: None,
            idle: true,
        }
    }

    pub fn has_flag(&self, flag: CapabilityFlag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn has_all_flags(&self, flags: &FlagSet) -> bool {
        flags.is_subset(&self.flags)
    }

    pub fn has_any_flag(&self, flags: &FlagSet) -> bool {
        !self.flags.is_disjoint(flags)
    }

    pub fn set_flag(&mut self, flag: CapabilityFlag) {
        self.flags.insert(flag);
    }

    pub fn remove_flag(&mut self, flag: CapabilityFlag) {
        self.flags.remove(&flag);
    }

    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }

    pub fn in_group(&self, group: &str) -> bool {
        self.groups.contains(group)
    }

    /// Returns true if membership changed
    pub fn join_group(&mut self, group: &str) -> bool {
        self.groups.insert(group.to_string())
    }

    /// Returns true if membership changed
    pub fn leave_group(&mut self, group: &str) -> bool {
        self.groups.remove(group)
    }

    pub fn is_idle(&self) -> bool {
        self.idle
    }

    pub fn set_idle(&mut self, idle: bool) {
        self.idle = idle;
    }

    pub fn current_order(&self) -> Option<OrderId> {
        self.current_order
    }

    pub fn default_order(&self) -> Option<OrderId> {
        self.default_order
    }

    pub fn set_default_order(&mut self, order: OrderId) {
        self.default_order = Some(order);
    }

    pub fn bundled_order(&self) -> Option<OrderId> {
        self.bundled_order
    }

    pub fn has_bundled_order(&self) -> bool {
        self.bundled_order.is_some()
    }

    /// Attach a one-shot follow-up; returns false if one is already waiting
    pub fn bundle_order(&mut self, order: OrderId) -> bool {
        if self.bundled_order.is_some() {
            return false;
        }
        self.bundled_order = Some(order);
        true
    }

    /// Remove and return the waiting follow-up
    pub fn pop_bundled_order(&mut self) -> Option<OrderId> {
        self.bundled_order.take()
    }

    /// Point at a new current order, returning the one it replaced
    pub(crate) fn assign_order(&mut self, order: OrderId) -> Option<OrderId> {
        self.current_order.replace(order)
    }

    pub(crate) fn unassign_order(&mut self) -> Option<OrderId> {
        self.current_order.take()
    }
}
