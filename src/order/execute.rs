//! Order execution: candidate selection, jitter and exclusivity
//!
//! `execute` is the rule-driven path: it picks its own executors from the
//! snapshot or the roster. `execute_for_agent` is the direct path used by
//! the idle loop for default and bundled orders. Both return whether at
//! least one command was issued; "nothing to do" is never an error.

use crate::agent::CapabilityFlag;
use crate::core::geometry::{nearest_to, uniform_point_in_disk};
use crate::core::types::{Point2, UnitTag, UnitTypeId};
use crate::order::dispatch::DispatchContext;
use crate::order::location::LocationSource;
use crate::order::order::{Action, Assignee, GroupEdit, Order};
use crate::sim::catalog;
use crate::sim::command::CommandTarget;
use crate::sim::resources;

/// Resolved command target plus the point candidates are ranked against
#[derive(Debug, Clone, Copy)]
struct Aim {
    target: CommandTarget,
    point: Point2,
}

/// Area that candidate executors must stand in
#[derive(Debug, Clone, Copy)]
enum Scope {
    Everywhere,
    Within(Point2, f32),
    /// The scope location could not be resolved; nothing qualifies
    Unresolved,
}

impl Scope {
    fn contains(&self, pos: Point2) -> bool {
        match *self {
            Scope::Everywhere => true,
            Scope::Within(center, radius) => pos.distance_squared(&center) < radius * radius,
            Scope::Unresolved => false,
        }
    }
}

impl Order {
    /// Dispatch the order to whichever units it addresses
    pub fn execute(&mut self, ctx: &mut DispatchContext<'_>) -> bool {
        if let Action::GroupEdit { group, edit } = &self.action {
            let changed = self.edit_group(ctx, group, *edit);
            tracing::debug!(order = %self.id, group = %group, ?edit, changed, "group edit executed");
            return changed;
        }

        let commanded = match &self.assignee {
            Assignee::Default => {
                tracing::trace!(order = %self.id, "default orders only run for a specific agent");
                Vec::new()
            }
            Assignee::UnitType(unit_type) => self.dispatch_unit_type(ctx, *unit_type).into_iter().collect(),
            Assignee::Flags(flags) => {
                let tags = ctx.agents.with_all_flags(flags);
                self.dispatch_each(ctx, tags)
            }
            Assignee::Group(group) => {
                let tags = ctx.agents.in_group(group);
                self.dispatch_each(ctx, tags)
            }
        };

        let issued = !commanded.is_empty();
        for tag in commanded {
            self.track(ctx, tag);
        }
        tracing::debug!(order = %self.id, ability = %self.ability, issued, "order executed");
        issued
    }

    /// Dispatch the order to one specific agent, bypassing candidate selection
    pub fn execute_for_agent(&mut self, ctx: &mut DispatchContext<'_>, tag: UnitTag) -> bool {
        if let Action::GroupEdit { group, edit } = &self.action {
            return edit_member(ctx, tag, group, *edit);
        }

        let exclusive = matches!(
            self.action,
            Action::ExactLocation(_) | Action::NearLocation(_) | Action::TargetUnit(_)
        );
        if exclusive && !self.allows_multiple() && ctx.ability_in_flight(self.ability) {
            tracing::trace!(order = %self.id, agent = %tag, ability = %self.ability, "ability already in flight");
            return false;
        }

        let issued = self.command_agent(ctx, tag);
        if issued {
            self.track(ctx, tag);
        }
        tracing::debug!(order = %self.id, agent = %tag, ability = %self.ability, issued, "order executed for agent");
        issued
    }

    fn track(&mut self, ctx: &mut DispatchContext<'_>, tag: UnitTag) {
        if !ctx.record_assignment(self.id, self.bundle, tag) {
            return;
        }
        self.assigned.insert(tag);
        if catalog::is_gas_building_ability(self.ability) {
            if let Ok(agent) = ctx.agents.get_mut(tag) {
                agent.set_flag(CapabilityFlag::BuildingGas);
            }
        }
    }

    fn scope(&self, ctx: &DispatchContext<'_>) -> Scope {
        match &self.assignee_scope {
            None => Scope::Everywhere,
            Some(scope) => match scope.location.resolve(ctx.locations, ctx.blackboard) {
                Some(center) => Scope::Within(center, scope.radius),
                None => Scope::Unresolved,
            },
        }
    }

    fn aim_at_location(&self, ctx: &mut DispatchContext<'_>, source: &LocationSource) -> Option<Aim> {
        let center = source.resolve(ctx.locations, ctx.blackboard)?;

        if catalog::is_gas_building_ability(self.ability) {
            let geyser = resources::nearest_free_geyser(ctx.snapshot, center, ctx.geyser_claim_radius)?;
            return Some(Aim {
                target: CommandTarget::Unit(geyser.tag),
                point: geyser.pos,
            });
        }

        let point = match self.action {
            Action::NearLocation(_) => uniform_point_in_disk(center, self.proximity, &mut *ctx.rng),
            _ => center,
        };
        Some(Aim {
            target: CommandTarget::Point(point),
            point,
        })
    }

    fn dispatch_unit_type(&self, ctx: &mut DispatchContext<'_>, unit_type: UnitTypeId) -> Option<UnitTag> {
        let snapshot = ctx.snapshot;
        let aim = match &self.action {
            Action::ExactLocation(source) | Action::NearLocation(source) => self.aim_at_location(ctx, source)?,
            Action::TargetUnit(target) => {
                let unit = target.resolve(snapshot, ctx.blackboard)?;
                Aim {
                    target: CommandTarget::Unit(unit.tag),
                    point: unit.pos,
                }
            }
            Action::Simple => return self.pick_free(ctx, unit_type),
            Action::HarvestMineralsNear(_) | Action::HarvestGasNear(_) | Action::GroupEdit { .. } => return None,
        };
        self.pick_closest(ctx, unit_type, aim)
    }

    /// Closest eligible unit of the type, unless the ability is already in flight
    fn pick_closest(&self, ctx: &mut DispatchContext<'_>, unit_type: UnitTypeId, aim: Aim) -> Option<UnitTag> {
        if !self.allows_multiple() && ctx.ability_in_flight(self.ability) {
            tracing::trace!(order = %self.id, ability = %self.ability, "ability already in flight");
            return None;
        }

        let snapshot = ctx.snapshot;
        let scope = self.scope(ctx);
        let candidates = snapshot
            .own_units()
            .filter(|u| u.unit_type == unit_type && u.is_complete())
            .filter(|u| scope.contains(u.pos))
            .filter(|u| !ctx.is_constructing(u))
            .map(|u| (u.tag, u.pos));

        let tag = nearest_to(candidates, aim.point)?;
        ctx.issue(tag, self.ability, aim.target);
        Some(tag)
    }

    /// Smallest-tag unit of the type with nothing pending
    fn pick_free(&self, ctx: &mut DispatchContext<'_>, unit_type: UnitTypeId) -> Option<UnitTag> {
        let snapshot = ctx.snapshot;
        let scope = self.scope(ctx);
        let tag = snapshot
            .own_units()
            .filter(|u| u.unit_type == unit_type && u.is_complete())
            .filter(|u| scope.contains(u.pos) && ctx.pending_count(u) == 0)
            .map(|u| u.tag)
            .min()?;

        ctx.issue(tag, self.ability, CommandTarget::None);
        Some(tag)
    }

    /// Command every listed agent that has nothing pending
    fn dispatch_each(&self, ctx: &mut DispatchContext<'_>, tags: Vec<UnitTag>) -> Vec<UnitTag> {
        let snapshot = ctx.snapshot;
        let scope = self.scope(ctx);
        let mut commanded = Vec::new();

        for tag in tags {
            let Some(unit) = snapshot.unit(tag) else {
                continue;
            };
            if ctx.pending_count(unit) > 0 || !scope.contains(unit.pos) {
                continue;
            }
            if self.command_agent(ctx, tag) {
                commanded.push(tag);
            }
        }
        commanded
    }

    /// Resolve the action's target for one agent and issue the command
    fn command_agent(&self, ctx: &mut DispatchContext<'_>, tag: UnitTag) -> bool {
        let snapshot = ctx.snapshot;
        let target = match &self.action {
            Action::HarvestMineralsNear(source) => {
                let patch = source
                    .resolve(ctx.locations, ctx.blackboard)
                    .and_then(|center| resources::nearest_mineral_patch(snapshot, center));
                match patch {
                    Some(patch) => CommandTarget::Unit(patch.tag),
                    None => return false,
                }
            }
            Action::HarvestGasNear(source) => {
                let structure = source
                    .resolve(ctx.locations, ctx.blackboard)
                    .and_then(|center| resources::nearest_gas_structure(snapshot, center));
                match structure {
                    Some(structure) => CommandTarget::Unit(structure.tag),
                    None => return false,
                }
            }
            Action::ExactLocation(source) | Action::NearLocation(source) => match self.aim_at_location(ctx, source) {
                Some(aim) => aim.target,
                None => return false,
            },
            Action::TargetUnit(target) => match target.resolve(snapshot, ctx.blackboard) {
                Some(unit) => CommandTarget::Unit(unit.tag),
                None => return false,
            },
            Action::Simple => CommandTarget::None,
            Action::GroupEdit { .. } => return false,
        };

        ctx.issue(tag, self.ability, target);
        true
    }

    /// Apply a membership edit to every agent of the type inside the scope
    fn edit_group(&self, ctx: &mut DispatchContext<'_>, group: &str, edit: GroupEdit) -> bool {
        let Assignee::UnitType(unit_type) = &self.assignee else {
            return false;
        };
        let scope = self.scope(ctx);
        let tags: Vec<UnitTag> = ctx
            .agents
            .iter()
            .filter(|a| a.unit_type == *unit_type && scope.contains(a.position))
            .map(|a| a.tag)
            .collect();

        let mut changed = false;
        for tag in tags {
            changed |= edit_member(ctx, tag, group, edit);
        }
        changed
    }
}

fn edit_member(ctx: &mut DispatchContext<'_>, tag: UnitTag, group: &str, edit: GroupEdit) -> bool {
    match ctx.agents.get_mut(tag) {
        Ok(agent) => match edit {
            GroupEdit::Add => agent.join_group(group),
            GroupEdit::Remove => agent.leave_group(group),
        },
        Err(_) => false,
    }
}
