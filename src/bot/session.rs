//! Bot session - the per-game owner of agents, orders and strategy
//!
//! The simulation drives the session through its callbacks. Each callback
//! updates the registries, buffers whatever commands it decides on, and
//! flushes them to the caller's [`CommandSink`] before returning.
//!
//! Tick order inside [`Bot::on_step`]:
//! 1. Agent positions are refreshed from the snapshot
//! 2. Every agent idle at the start of the tick runs its bundled order if it
//!    has one, otherwise its default order
//! 3. Strategy rules are evaluated and every firing rule's order executes
//!
//! Commands issued in step 2 are visible to the exclusivity checks of step 3.

use std::path::Path;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::agent::{Agent, AgentCategory, AgentRegistry, CapabilityFlag, FlagSet};
use crate::core::config::BotConfig;
use crate::core::error::Result;
use crate::core::geometry::{nearest_to, uniform_point_in_disk};
use crate::core::types::{AbilityId, Point2, Tick, UnitTag, UnitTypeId, UpgradeId};
use crate::order::{Blackboard, DispatchContext, LocationSource, Order, OrderId, OrderRegistry};
use crate::sim::catalog;
use crate::sim::command::{Command, CommandBuffer, CommandSink, CommandTarget};
use crate::sim::location::LocationService;
use crate::sim::snapshot::{Alliance, UnitSnapshot, WorldSnapshot};
use crate::strategy::RuleSet;

/// What happened during one step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub game_loop: Tick,
    /// Idle agents that had a bundled or default order to run
    pub idle_processed: usize,
    pub rules_fired: usize,
    /// Executions (idle and rule-driven) that issued at least one command
    pub orders_succeeded: usize,
    pub commands_issued: usize,
}

pub struct Bot {
    config: BotConfig,
    agents: AgentRegistry,
    orders: OrderRegistry,
    strategy: Option<RuleSet>,
    locations: Box<dyn LocationService>,
    blackboard: Blackboard,
    rng: ChaCha8Rng,
    buffer: CommandBuffer,
}

impl Bot {
    pub fn new(config: BotConfig, locations: Box<dyn LocationService>) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self {
            config,
            agents: AgentRegistry::new(),
            orders: OrderRegistry::new(),
            strategy: None,
            locations,
            blackboard: Blackboard::new(),
            rng,
            buffer: CommandBuffer::new(),
        }
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn agents(&self) -> &AgentRegistry {
        &self.agents
    }

    pub fn orders(&self) -> &OrderRegistry {
        &self.orders
    }

    /// Order registry, for building strategies and custom orders
    pub fn orders_mut(&mut self) -> &mut OrderRegistry {
        &mut self.orders
    }

    pub fn strategy(&self) -> Option<&RuleSet> {
        self.strategy.as_ref()
    }

    pub fn locations(&self) -> &dyn LocationService {
        self.locations.as_ref()
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn store_location(&mut self, name: impl Into<String>, location: Point2) {
        self.blackboard.store_location(name, location);
    }

    pub fn store_unit_type(&mut self, name: impl Into<String>, unit_type: UnitTypeId) {
        self.blackboard.store_unit_type(name, unit_type);
    }

    /// Install the session's strategy; only the first one is kept
    pub fn set_strategy(&mut self, strategy: RuleSet) -> bool {
        if let Some(current) = &self.strategy {
            tracing::warn!(current = %current.name, ignored = %strategy.name, "strategy already set");
            return false;
        }
        tracing::info!(strategy = %strategy.name, rules = strategy.len(), "strategy set");
        self.strategy = Some(strategy);
        true
    }

    /// Load a TOML strategy file into this session
    pub fn load_strategy(&mut self, path: &Path) -> Result<bool> {
        let content = std::fs::read_to_string(path)?;
        self.load_strategy_toml(&content)
    }

    /// Parse a TOML strategy into this session
    ///
    /// Returns `Ok(false)` without parsing when a strategy is already set.
    pub fn load_strategy_toml(&mut self, content: &str) -> Result<bool> {
        if self.strategy.is_some() {
            tracing::warn!("strategy already set, not loading another");
            return Ok(false);
        }
        let strategy = RuleSet::from_toml(content, &mut self.orders, self.config.default_radius)?;
        Ok(self.set_strategy(strategy))
    }

    fn flush(&mut self, sink: &mut dyn CommandSink) -> usize {
        self.buffer.flush_into(sink)
    }

    /// Run one stored order, either through its own selection or for one agent
    fn run_order(&mut self, snapshot: &WorldSnapshot, id: OrderId, agent: Option<UnitTag>) -> bool {
        let order = match self.orders.get_mut(id) {
            Ok(order) => order,
            Err(e) => {
                tracing::warn!(error = %e, "skipping order");
                return false;
            }
        };

        let mut ctx = DispatchContext::new(
            snapshot,
            self.locations.as_ref(),
            &self.blackboard,
            &mut self.agents,
            &mut self.buffer,
            &mut self.rng,
        )
        .with_geyser_claim_radius(self.config.geyser_claim_radius);

        let issued = match agent {
            Some(tag) => order.execute_for_agent(&mut ctx, tag),
            None => order.execute(&mut ctx),
        };

        for (previous, tag) in ctx.take_releases() {
            self.orders.unassign(previous, tag);
        }
        issued
    }

    fn classify(unit: &UnitSnapshot) -> AgentCategory {
        if catalog::is_townhall(unit.unit_type) {
            AgentCategory::Townhall
        } else if unit.is_structure {
            AgentCategory::Structure
        } else if catalog::is_worker(unit.unit_type) {
            AgentCategory::Worker
        } else {
            AgentCategory::Army
        }
    }

    fn mineral_order(&mut self, near: LocationSource) -> OrderId {
        let order = Order::harvest_minerals_near(near).with_radius(self.config.default_radius);
        self.orders.store(order)
    }

    /// Register everything already on the field and activate the start base
    pub fn on_game_start(&mut self, snapshot: &WorldSnapshot, sink: &mut dyn CommandSink) -> usize {
        for unit in snapshot.own_units() {
            if self.agents.contains(unit.tag) {
                continue;
            }
            let category = Self::classify(unit);
            let mut agent = Agent::new(unit.tag, unit.unit_type, category, unit.pos);
            if unit.is_flying {
                agent.set_flag(CapabilityFlag::Flying);
            }
            if category == AgentCategory::Worker {
                let id = self.mineral_order(LocationSource::StartLocation);
                agent.set_default_order(id);
            }
            self.agents.add(agent);
        }

        let start = self.locations.start_base_index();
        self.locations.activate_base(start);
        tracing::info!(
            agents = self.agents.len(),
            start = %self.locations.start_location(),
            "game started"
        );
        self.flush(sink)
    }

    /// One simulation tick: idle agents first, then strategy rules
    pub fn on_step(&mut self, snapshot: &WorldSnapshot, sink: &mut dyn CommandSink) -> StepReport {
        let mut report = StepReport {
            game_loop: snapshot.game_loop,
            ..StepReport::default()
        };
        self.agents.sync_positions(snapshot);

        for tag in self.agents.idle_agents() {
            let Ok(agent) = self.agents.get_mut(tag) else {
                continue;
            };
            let Some(id) = agent.pop_bundled_order().or_else(|| agent.default_order()) else {
                continue;
            };
            report.idle_processed += 1;
            if self.run_order(snapshot, id, Some(tag)) {
                report.orders_succeeded += 1;
            }
        }

        let firing = self
            .strategy
            .as_ref()
            .map(|s| s.firing(snapshot))
            .unwrap_or_default();
        for id in firing {
            report.rules_fired += 1;
            if self.run_order(snapshot, id, None) {
                report.orders_succeeded += 1;
            }
        }

        report.commands_issued = self.flush(sink);
        tracing::debug!(
            game_loop = report.game_loop,
            idle = report.idle_processed,
            fired = report.rules_fired,
            succeeded = report.orders_succeeded,
            commands = report.commands_issued,
            "step complete"
        );
        report
    }

    /// Register a newly created friendly unit
    pub fn on_unit_created(&mut self, unit: &UnitSnapshot, sink: &mut dyn CommandSink) -> usize {
        if unit.alliance != Alliance::Own || self.agents.contains(unit.tag) {
            return 0;
        }

        let category = Self::classify(unit);
        if category == AgentCategory::Structure && catalog::strands_builder(unit.unit_type) {
            self.release_gas_builder(unit.pos);
        }

        let base = self.locations.nearest_base_index(unit.pos);
        let home = base
            .and_then(|i| self.locations.base(i))
            .map_or(unit.pos, |b| b.townhall);

        let mut agent = Agent::new(unit.tag, unit.unit_type, category, unit.pos);
        if unit.is_flying {
            agent.set_flag(CapabilityFlag::Flying);
        }
        agent.home_location = home;
        agent.assigned_location = match category {
            AgentCategory::Army => uniform_point_in_disk(home, self.config.army_spawn_jitter, &mut self.rng),
            _ => home,
        };
        if category == AgentCategory::Worker {
            let near = base.map_or(LocationSource::Literal(home), |base| LocationSource::Townhall { base });
            let id = self.mineral_order(near);
            agent.set_default_order(id);
        }

        self.agents.add(agent);
        self.flush(sink)
    }

    /// Wake the builder a protoss gas structure leaves standing
    fn release_gas_builder(&mut self, near: Point2) {
        let builders = self
            .agents
            .iter()
            .filter(|a| a.has_flag(CapabilityFlag::BuildingGas))
            .map(|a| (a.tag, a.position));
        let Some(tag) = nearest_to(builders, near) else {
            return;
        };
        if let Ok(agent) = self.agents.get_mut(tag) {
            agent.remove_flag(CapabilityFlag::BuildingGas);
        }
        self.buffer.issue(Command::new(tag, AbilityId::STOP, CommandTarget::None));
        tracing::debug!(builder = %tag, "gas builder released");
    }

    pub fn on_building_construction_complete(&mut self, unit: &UnitSnapshot, sink: &mut dyn CommandSink) -> Result<usize> {
        if catalog::is_townhall(unit.unit_type) {
            if let Some(index) = self.locations.nearest_base_index(unit.pos) {
                self.locations.activate_base(index);
                tracing::info!(base = index, "expansion activated");
            }
        }
        if catalog::is_defense_structure(unit.unit_type) {
            self.agents.get_mut(unit.tag)?.set_flag(CapabilityFlag::Defense);
        }
        if catalog::is_gas_structure(unit.unit_type) {
            for _ in 0..self.config.gas_workers_per_structure {
                if !self.assign_worker_to_gas(unit) {
                    break;
                }
            }
        }
        Ok(self.flush(sink))
    }

    /// Move the closest mineral worker onto `structure`
    fn assign_worker_to_gas(&mut self, structure: &UnitSnapshot) -> bool {
        let miners: FlagSet = [CapabilityFlag::Worker, CapabilityFlag::MineralGatherer].into_iter().collect();
        let candidates = self
            .agents
            .iter()
            .filter(|a| a.has_all_flags(&miners))
            .map(|a| (a.tag, a.position));
        let Some(tag) = nearest_to(candidates, structure.pos) else {
            return false;
        };

        let gas = Order::harvest_gas_near(structure.pos).with_radius(self.config.default_radius);
        let gas = self.orders.store(gas);

        let previous = match self.agents.get_mut(tag) {
            Ok(agent) => {
                agent.remove_flag(CapabilityFlag::MineralGatherer);
                agent.set_flag(CapabilityFlag::GasGatherer);
                agent.set_default_order(gas);
                self.agents.assign_order(tag, gas).ok().flatten()
            }
            Err(_) => return false,
        };
        if let Some(previous) = previous {
            self.orders.unassign(previous, tag);
        }
        if let Ok(order) = self.orders.get_mut(gas) {
            order.assign_agent(tag);
        }

        self.buffer
            .issue(Command::new(tag, AbilityId::HARVEST_GATHER, CommandTarget::Unit(structure.tag)));
        tracing::debug!(worker = %tag, structure = %structure.tag, "worker moved to gas");
        true
    }

    /// Blink a hurt blink-capable unit back to the start townhall
    pub fn on_unit_damaged(&mut self, snapshot: &WorldSnapshot, unit: &UnitSnapshot, sink: &mut dyn CommandSink) -> usize {
        let should_blink = catalog::can_blink(unit.unit_type)
            && snapshot.has_upgrade(UpgradeId::BLINKTECH)
            && unit.health_fraction() < self.config.blink_health_fraction
            && unit.available_abilities.contains(&AbilityId::EFFECT_BLINK);
        if should_blink {
            let home = self.locations.start_location();
            self.buffer
                .issue(Command::new(unit.tag, AbilityId::EFFECT_BLINK, CommandTarget::Point(home)));
            tracing::debug!(unit = %unit.tag, "blinking home");
        }
        self.flush(sink)
    }

    /// Mark the agent idle and release it from its current order
    pub fn on_unit_idle(&mut self, tag: UnitTag) -> Result<()> {
        self.agents.set_idle(tag, true)?;
        if let Some(previous) = self.agents.clear_order(tag)? {
            self.orders.unassign(previous, tag);
        }
        Ok(())
    }

    /// Drop a destroyed friendly unit after releasing its order references
    pub fn on_unit_destroyed(&mut self, unit: &UnitSnapshot) -> Result<()> {
        if unit.alliance != Alliance::Own {
            return Ok(());
        }
        self.agents.clear_order(unit.tag)?;
        self.orders.release_agent(unit.tag);
        self.agents.remove(unit.tag)?;
        Ok(())
    }
}
