//! Shared state for one order execution pass
//!
//! Borrowed views of everything an order touches while dispatching: the
//! tick's snapshot, map knowledge, the agent roster and the command buffer.
//! The order registry is not part of it, since the executing order is
//! borrowed out of the registry. Reassignments that affect other orders are
//! collected as releases and applied by the caller afterwards.

use rand_chacha::ChaCha8Rng;

use crate::agent::AgentRegistry;
use crate::core::types::{AbilityId, UnitTag};
use crate::order::location::Blackboard;
use crate::order::OrderId;
use crate::sim::catalog;
use crate::sim::command::{Command, CommandBuffer, CommandTarget};
use crate::sim::location::LocationService;
use crate::sim::snapshot::{UnitSnapshot, WorldSnapshot};

pub struct DispatchContext<'a> {
    pub snapshot: &'a WorldSnapshot,
    pub locations: &'a dyn LocationService,
    pub blackboard: &'a Blackboard,
    pub agents: &'a mut AgentRegistry,
    pub commands: &'a mut CommandBuffer,
    pub rng: &'a mut ChaCha8Rng,
    /// Distance within which a gas structure claims a geyser
    pub geyser_claim_radius: f32,
    released: Vec<(OrderId, UnitTag)>,
}

impl<'a> DispatchContext<'a> {
    pub fn new(
        snapshot: &'a WorldSnapshot,
        locations: &'a dyn LocationService,
        blackboard: &'a Blackboard,
        agents: &'a mut AgentRegistry,
        commands: &'a mut CommandBuffer,
        rng: &'a mut ChaCha8Rng,
    ) -> Self {
        Self {
            snapshot,
            locations,
            blackboard,
            agents,
            commands,
            rng,
            geyser_claim_radius: 1.0,
            released: Vec::new(),
        }
    }

    pub fn with_geyser_claim_radius(mut self, radius: f32) -> Self {
        self.geyser_claim_radius = radius;
        self
    }

    /// Whether any friendly unit is executing `ability`, or was told to this tick
    pub fn ability_in_flight(&self, ability: AbilityId) -> bool {
        self.snapshot.own_units().any(|u| u.has_order(ability)) || self.commands.any_with_ability(ability)
    }

    /// Orders the unit carries plus commands buffered for it this tick
    pub fn pending_count(&self, unit: &UnitSnapshot) -> usize {
        unit.orders.len() + self.commands.count_for(unit.tag)
    }

    /// Whether the unit is on its way to place a structure
    pub fn is_constructing(&self, unit: &UnitSnapshot) -> bool {
        unit.orders.iter().any(|o| catalog::is_build_ability(o.ability))
            || self
                .commands
                .commands()
                .iter()
                .any(|c| c.involves(unit.tag) && catalog::is_build_ability(c.ability))
    }

    pub(crate) fn issue(&mut self, unit: UnitTag, ability: AbilityId, target: CommandTarget) {
        self.commands.issue(Command::new(unit, ability, target));
    }

    /// Point the agent at `order`, remembering which order it left
    ///
    /// Unregistered units are commanded but not tracked.
    pub(crate) fn record_assignment(&mut self, order: OrderId, bundle: Option<OrderId>, tag: UnitTag) -> bool {
        let previous = match self.agents.assign_order(tag, order) {
            Ok(previous) => previous,
            Err(_) => return false,
        };
        if let Some(previous) = previous.filter(|p| *p != order) {
            self.released.push((previous, tag));
        }
        if let Some(bundle) = bundle {
            if let Ok(agent) = self.agents.get_mut(tag) {
                agent.bundle_order(bundle);
            }
        }
        true
    }

    /// Drain the (order, agent) pairs whose assignment was replaced
    pub fn take_releases(&mut self) -> Vec<(OrderId, UnitTag)> {
        std::mem::take(&mut self.released)
    }
}
