//! Agent registry - owns every controlled entity
//!
//! Agents are keyed by their simulation tag and iterated in tag order, so
//! every roster query returns a stable ordering.

use std::collections::BTreeMap;

use crate::agent::agent::{Agent, CapabilityFlag, FlagSet};
use crate::core::error::{CommanderError, Result};
use crate::core::types::UnitTag;
use crate::order::OrderId;
use crate::sim::snapshot::WorldSnapshot;

#[derive(Debug, Default)]
pub struct AgentRegistry {
    agents: BTreeMap<UnitTag, Agent>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent; returns false (and keeps the existing one) on a duplicate tag
    pub fn add(&mut self, agent: Agent) -> bool {
        if self.agents.contains_key(&agent.tag) {
            return false;
        }
        tracing::debug!(tag = %agent.tag, unit_type = %agent.unit_type, category = ?agent.category, "agent registered");
        self.agents.insert(agent.tag, agent);
        true
    }

    pub fn contains(&self, tag: UnitTag) -> bool {
        self.agents.contains_key(&tag)
    }

    pub fn get(&self, tag: UnitTag) -> Result<&Agent> {
        self.agents.get(&tag).ok_or(CommanderError::AgentNotFound(tag))
    }

    pub fn get_mut(&mut self, tag: UnitTag) -> Result<&mut Agent> {
        self.agents.get_mut(&tag).ok_or(CommanderError::AgentNotFound(tag))
    }

    /// Remove an agent; the caller releases its order references first
    pub fn remove(&mut self, tag: UnitTag) -> Result<Agent> {
        let agent = self.agents.remove(&tag).ok_or(CommanderError::AgentNotFound(tag))?;
        tracing::debug!(%tag, "agent removed");
        Ok(agent)
    }

    pub fn set_idle(&mut self, tag: UnitTag, idle: bool) -> Result<()> {
        self.get_mut(tag)?.set_idle(idle);
        Ok(())
    }

    /// Make `order` the agent's current order and mark it busy
    ///
    /// Returns the order it was previously assigned to, if any.
    pub fn assign_order(&mut self, tag: UnitTag, order: OrderId) -> Result<Option<OrderId>> {
        let agent = self.get_mut(tag)?;
        agent.set_idle(false);
        Ok(agent.assign_order(order))
    }

    /// Clear the agent's current order, returning it
    pub fn clear_order(&mut self, tag: UnitTag) -> Result<Option<OrderId>> {
        Ok(self.get_mut(tag)?.unassign_order())
    }

    /// Tags of all agents flagged idle, taken as a snapshot
    pub fn idle_agents(&self) -> Vec<UnitTag> {
        self.agents.values().filter(|a| a.is_idle()).map(|a| a.tag).collect()
    }

    pub fn with_flag(&self, flag: CapabilityFlag) -> Vec<UnitTag> {
        self.agents.values().filter(|a| a.has_flag(flag)).map(|a| a.tag).collect()
    }

    pub fn with_all_flags(&self, flags: &FlagSet) -> Vec<UnitTag> {
        self.agents.values().filter(|a| a.has_all_flags(flags)).map(|a| a.tag).collect()
    }

    pub fn with_any_flag(&self, flags: &FlagSet) -> Vec<UnitTag> {
        self.agents.values().filter(|a| a.has_any_flag(flags)).map(|a| a.tag).collect()
    }

    pub fn in_group(&self, group: &str) -> Vec<UnitTag> {
        self.agents.values().filter(|a| a.in_group(group)).map(|a| a.tag).collect()
    }

    /// Refresh positions of agents present in the snapshot
    pub fn sync_positions(&mut self, snapshot: &WorldSnapshot) {
        for unit in snapshot.own_units() {
            if let Some(agent) = self.agents.get_mut(&unit.tag) {
                agent.position = unit.pos;
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.agents.values()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::agent::AgentCategory;
    use crate::core::types::{Point2, UnitTypeId};
    use crate::sim::snapshot::UnitSnapshot;

    fn registry_with_workers(n: u64) -> AgentRegistry {
        let mut registry = AgentRegistry::new();
        for i in 1..=n {
            registry.add(Agent::new(
                UnitTag(i),
                UnitTypeId::PROTOSS_PROBE,
                AgentCategory::Worker,
                Point2::new(i as f32, 0.0),
            ));
        }
        registry
    }

    #[test]
    fn test_lookup_unknown_agent_fails() {
        let registry = AgentRegistry::new();
        assert!(matches!(registry.get(UnitTag(5)), Err(CommanderError::AgentNotFound(UnitTag(5)))));
    }

    #[test]
    fn test_duplicate_add_is_ignored() {
        let mut registry = registry_with_workers(1);
        let dup = Agent::new(UnitTag(1), UnitTypeId::PROTOSS_ZEALOT, AgentCategory::Army, Point2::default());
        assert!(!registry.add(dup));
        assert_eq!(registry.get(UnitTag(1)).unwrap().unit_type, UnitTypeId::PROTOSS_PROBE);
    }

    #[test]
    fn test_assign_marks_busy_and_returns_previous() {
        let mut registry = registry_with_workers(1);
        assert_eq!(registry.assign_order(UnitTag(1), OrderId(3)).unwrap(), None);
        assert!(!registry.get(UnitTag(1)).unwrap().is_idle());
        assert_eq!(registry.assign_order(UnitTag(1), OrderId(4)).unwrap(), Some(OrderId(3)));
        assert_eq!(registry.clear_order(UnitTag(1)).unwrap(), Some(OrderId(4)));
        assert_eq!(registry.get(UnitTag(1)).unwrap().current_order(), None);
    }

    #[test]
    fn test_idle_agents_in_tag_order() {
        let mut registry = registry_with_workers(3);
        registry.set_idle(UnitTag(2), false).unwrap();
        assert_eq!(registry.idle_agents(), vec![UnitTag(1), UnitTag(3)]);
    }

    #[test]
    fn test_flag_filters() {
        let mut registry = registry_with_workers(3);
        registry.get_mut(UnitTag(2)).unwrap().set_flag(CapabilityFlag::BuildingGas);

        let wanted: FlagSet = [CapabilityFlag::Worker, CapabilityFlag::BuildingGas].into_iter().collect();
        assert_eq!(registry.with_all_flags(&wanted), vec![UnitTag(2)]);
        assert_eq!(registry.with_any_flag(&wanted).len(), 3);
        assert_eq!(registry.with_flag(CapabilityFlag::BuildingGas), vec![UnitTag(2)]);
    }

    #[test]
    fn test_sync_positions() {
        let mut registry = registry_with_workers(1);
        let mut snapshot = WorldSnapshot::new();
        snapshot.units.push(UnitSnapshot::new(UnitTag(1), UnitTypeId::PROTOSS_PROBE, Point2::new(9.0, 9.0)));
        registry.sync_positions(&snapshot);
        assert_eq!(registry.get(UnitTag(1)).unwrap().position, Point2::new(9.0, 9.0));
    }

    #[test]
    fn test_remove() {
        let mut registry = registry_with_workers(2);
        assert!(registry.remove(UnitTag(1)).is_ok());
        assert!(registry.remove(UnitTag(1)).is_err());
        assert_eq!(registry.len(), 1);
    }
}
