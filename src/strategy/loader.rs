//! Load strategies from TOML files
//!
//! A strategy file is a list of `[[rules]]`, each with one or more
//! `[[rules.triggers]]` and an `[rules.order]` table. Every order (bundles
//! included) is validated before any of them is stored, so a rejected file
//! leaves the order registry untouched.

use std::path::Path;

use serde::Deserialize;

use crate::agent::CapabilityFlag;
use crate::core::error::{CommanderError, Result};
use crate::core::types::{AbilityId, Point2, UnitTag, UnitTypeId};
use crate::order::{Action, ActionKind, Assignee, AssigneeKind, GroupEdit, LocationSource, Order, OrderId, OrderRegistry, UnitTarget};
use crate::strategy::rule::{RuleSet, StrategyRule};
use crate::strategy::trigger::{ConditionKind, Trigger, TriggerCondition};

/// Unit types and abilities may be written by name or numeric id
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum NameOrId {
    Id(u32),
    Name(String),
}

impl NameOrId {
    fn unit_type(&self) -> Result<UnitTypeId> {
        match self {
            NameOrId::Id(id) => Ok(UnitTypeId(*id)),
            NameOrId::Name(name) => UnitTypeId::from_name(name)
                .ok_or_else(|| CommanderError::Strategy(format!("unknown unit type '{}'", name))),
        }
    }

    fn ability(&self) -> Result<AbilityId> {
        match self {
            NameOrId::Id(id) => Ok(AbilityId(*id)),
            NameOrId::Name(name) => AbilityId::from_name(name)
                .ok_or_else(|| CommanderError::Strategy(format!("unknown ability '{}'", name))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StrategyFile {
    #[serde(default)]
    name: String,
    #[serde(default)]
    rules: Vec<RuleDef>,
}

#[derive(Debug, Deserialize)]
struct RuleDef {
    name: String,
    #[serde(default)]
    triggers: Vec<TriggerDef>,
    order: OrderDef,
}

#[derive(Debug, Deserialize)]
struct TriggerDef {
    #[serde(default)]
    conditions: Vec<ConditionDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConditionDef {
    kind: ConditionKind,
    value: i64,
    unit_type: Option<NameOrId>,
    center: Option<Point2>,
    radius: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TargetDef {
    Tag(u64),
    OfType(NameOrId),
    StoredType(String),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct OrderDef {
    assignee: AssigneeKind,
    action: ActionKind,
    ability: Option<NameOrId>,
    unit_type: Option<NameOrId>,
    #[serde(default)]
    flags: Vec<CapabilityFlag>,
    group: Option<String>,
    edit: Option<GroupEdit>,
    location: Option<LocationSource>,
    radius: Option<f32>,
    target: Option<TargetDef>,
    assignee_location: Option<LocationSource>,
    assignee_radius: Option<f32>,
    #[serde(default)]
    allow_multiple: bool,
    #[serde(default)]
    lock: bool,
    bundle: Option<Box<OrderDef>>,
}

fn missing(rule: &str, field: &str) -> CommanderError {
    CommanderError::Strategy(format!("rule '{}': order needs '{}'", rule, field))
}

fn build_condition(rule: &str, def: &ConditionDef) -> Result<TriggerCondition> {
    if !def.kind.counts_units() {
        return Ok(TriggerCondition::new(def.kind, def.value));
    }

    let unit_type = def
        .unit_type
        .as_ref()
        .ok_or_else(|| CommanderError::Strategy(format!("rule '{}': {:?} needs a unit_type", rule, def.kind)))?
        .unit_type()?;
    let minimum = def.kind.is_minimum();

    if !def.kind.is_scoped() {
        return Ok(TriggerCondition::unit_count(minimum, def.value, unit_type));
    }
    match (def.center, def.radius) {
        (Some(center), Some(radius)) => Ok(TriggerCondition::unit_count_near(
            minimum, def.value, unit_type, center, radius,
        )),
        _ => Err(CommanderError::Strategy(format!(
            "rule '{}': {:?} needs center and radius",
            rule, def.kind
        ))),
    }
}

fn build_order(rule: &str, def: &OrderDef, default_radius: f32) -> Result<Order> {
    let location = || def.location.clone().ok_or_else(|| missing(rule, "location"));
    let group = || def.group.clone().ok_or_else(|| missing(rule, "group"));

    let assignee = match def.assignee {
        AssigneeKind::Default => Assignee::Default,
        AssigneeKind::UnitType => {
            let unit_type = def.unit_type.as_ref().ok_or_else(|| missing(rule, "unit_type"))?;
            Assignee::UnitType(unit_type.unit_type()?)
        }
        AssigneeKind::Flags => Assignee::Flags(def.flags.iter().copied().collect()),
        AssigneeKind::Group => Assignee::Group(group()?),
    };

    let action = match def.action {
        ActionKind::Simple => Action::Simple,
        ActionKind::ExactLocation => Action::ExactLocation(location()?),
        ActionKind::NearLocation => Action::NearLocation(location()?),
        ActionKind::HarvestMineralsNear => Action::HarvestMineralsNear(location()?),
        ActionKind::HarvestGasNear => Action::HarvestGasNear(location()?),
        ActionKind::TargetUnit => {
            let target = match def.target.as_ref().ok_or_else(|| missing(rule, "target"))? {
                TargetDef::Tag(tag) => UnitTarget::Tag(UnitTag(*tag)),
                TargetDef::OfType(unit_type) => UnitTarget::OfType(unit_type.unit_type()?),
                TargetDef::StoredType(name) => UnitTarget::StoredType(name.clone()),
            };
            Action::TargetUnit(target)
        }
        ActionKind::GroupEdit => Action::GroupEdit {
            group: group()?,
            edit: def.edit.unwrap_or(GroupEdit::Add),
        },
    };

    let ability = match (&def.ability, def.action) {
        (Some(ability), _) => ability.ability()?,
        (None, ActionKind::HarvestMineralsNear | ActionKind::GroupEdit) => AbilityId::SMART,
        (None, ActionKind::HarvestGasNear) => AbilityId::HARVEST_GATHER,
        (None, _) => return Err(missing(rule, "ability")),
    };

    let mut order = Order::new(assignee, action, ability)?.with_radius(def.radius.unwrap_or(default_radius));
    if let Some(scope) = &def.assignee_location {
        order = order.with_assignee_scope(scope.clone(), def.assignee_radius.unwrap_or(default_radius));
    }
    if def.allow_multiple {
        order.allow_multiple(true)?;
    }
    Ok(order)
}

/// Build an order and its bundle chain into `out`, innermost first
fn build_chain(rule: &str, def: &OrderDef, default_radius: f32, out: &mut Vec<Order>) -> Result<OrderId> {
    let mut order = build_order(rule, def, default_radius)?;
    if let Some(inner) = &def.bundle {
        let inner_id = build_chain(rule, inner, default_radius, out)?;
        order.bundle_directive(inner_id)?;
    }
    if def.lock {
        order.lock();
    }
    let id = order.id();
    out.push(order);
    Ok(id)
}

impl RuleSet {
    /// Parse a strategy and store its orders in `orders`
    pub fn from_toml(content: &str, orders: &mut OrderRegistry, default_radius: f32) -> Result<Self> {
        let file: StrategyFile = toml::from_str(content)?;
        let mut built = Vec::new();
        let mut rule_set = RuleSet::new(file.name);

        for def in &file.rules {
            let order = build_chain(&def.name, &def.order, default_radius, &mut built)?;
            let mut rule = StrategyRule::new(def.name.clone(), order);
            for trigger_def in &def.triggers {
                let mut trigger = Trigger::new();
                for condition in &trigger_def.conditions {
                    trigger.add_condition(build_condition(&def.name, condition)?);
                }
                rule.add_trigger(trigger);
            }
            rule_set.add(rule);
        }

        for order in built {
            orders.store(order);
        }
        tracing::info!(strategy = %rule_set.name, rules = rule_set.len(), "strategy loaded");
        Ok(rule_set)
    }

    /// Load a strategy file and store its orders in `orders`
    pub fn load(path: &Path, orders: &mut OrderRegistry, default_radius: f32) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content, orders, default_radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::DEFAULT_RADIUS;
    use crate::sim::snapshot::WorldSnapshot;

    const OPENING: &str = r#"
        name = "test_opening"

        [[rules]]
        name = "pylon"

        [[rules.triggers]]
        conditions = [
            { kind = "MIN_MINERALS", value = 100 },
            { kind = "MAX_UNIT_OF_TYPE", value = 0, unit_type = "PROTOSS_PYLON" },
        ]

        [rules.order]
        assignee = "unit_type"
        unit_type = "PROTOSS_PROBE"
        action = "near_location"
        ability = "BUILD_PYLON"
        location = { build_area = { base = 0, index = 0 } }
        radius = 3.0

        [rules.order.bundle]
        assignee = "default"
        action = "harvest_minerals_near"
        location = "start_location"

        [[rules]]
        name = "probes"

        [[rules.triggers]]
        conditions = [ { kind = "MIN_MINERALS", value = 50 } ]

        [rules.order]
        assignee = "unit_type"
        unit_type = 59
        action = "simple"
        ability = 1006
    "#;

    #[test]
    fn test_parse_rules_and_store_orders() {
        let mut orders = OrderRegistry::new();
        let set = RuleSet::from_toml(OPENING, &mut orders, DEFAULT_RADIUS).unwrap();

        assert_eq!(set.name, "test_opening");
        assert_eq!(set.len(), 2);
        assert_eq!(orders.len(), 3);

        let pylon = orders.get(set.rules()[0].order()).unwrap();
        assert_eq!(pylon.ability(), AbilityId::BUILD_PYLON);
        assert_eq!(pylon.proximity(), 3.0);
        let bundle = orders.get(pylon.bundle().unwrap()).unwrap();
        assert_eq!(bundle.assignee(), &Assignee::Default);
        assert_eq!(bundle.ability(), AbilityId::SMART);

        let probes = orders.get(set.rules()[1].order()).unwrap();
        assert_eq!(probes.assignee(), &Assignee::UnitType(UnitTypeId::PROTOSS_NEXUS));
        assert_eq!(probes.ability(), AbilityId::TRAIN_PROBE);
    }

    #[test]
    fn test_loaded_triggers_evaluate() {
        let mut orders = OrderRegistry::new();
        let set = RuleSet::from_toml(OPENING, &mut orders, DEFAULT_RADIUS).unwrap();
        let snapshot = WorldSnapshot {
            minerals: 75,
            ..WorldSnapshot::default()
        };
        assert_eq!(set.firing(&snapshot), vec![set.rules()[1].order()]);
    }

    #[test]
    fn test_invalid_pairing_rejects_whole_file() {
        let content = r#"
            [[rules]]
            name = "fine"
            [rules.order]
            assignee = "unit_type"
            unit_type = "PROTOSS_NEXUS"
            action = "simple"
            ability = "TRAIN_PROBE"

            [[rules]]
            name = "broken"
            [rules.order]
            assignee = "default"
            action = "exact_location"
            ability = "MOVE"
            location = "start_location"
        "#;
        let mut orders = OrderRegistry::new();
        let err = RuleSet::from_toml(content, &mut orders, DEFAULT_RADIUS).unwrap_err();
        assert!(matches!(err, CommanderError::InvalidPairing { .. }));
        assert!(orders.is_empty());
    }

    #[test]
    fn test_unknown_names_rejected() {
        let content = r#"
            [[rules]]
            name = "bad"
            [rules.order]
            assignee = "unit_type"
            unit_type = "PROTOSS_MOTHERSHIP_DELUXE"
            action = "simple"
            ability = "STOP"
        "#;
        let mut orders = OrderRegistry::new();
        assert!(matches!(
            RuleSet::from_toml(content, &mut orders, DEFAULT_RADIUS),
            Err(CommanderError::Strategy(_))
        ));
    }

    #[test]
    fn test_scoped_count_needs_center() {
        let content = r#"
            [[rules]]
            name = "scoped"
            [[rules.triggers]]
            conditions = [ { kind = "MIN_UNIT_OF_TYPE_NEAR_LOCATION", value = 1, unit_type = "PROTOSS_PYLON" } ]
            [rules.order]
            assignee = "unit_type"
            unit_type = "PROTOSS_NEXUS"
            action = "simple"
            ability = "TRAIN_PROBE"
        "#;
        let mut orders = OrderRegistry::new();
        assert!(RuleSet::from_toml(content, &mut orders, DEFAULT_RADIUS).is_err());
    }

    #[test]
    fn test_flags_group_and_lock() {
        let content = r#"
            [[rules]]
            name = "rally"
            [rules.order]
            assignee = "flags"
            flags = ["army"]
            action = "near_location"
            ability = "ATTACK"
            location = "proxy_location"
            allow_multiple = true
            lock = true

            [[rules]]
            name = "squad"
            [rules.order]
            assignee = "unit_type"
            unit_type = "PROTOSS_STALKER"
            action = "group_edit"
            group = "harass"
            edit = "add"
            assignee_location = "start_location"
            assignee_radius = 20.0
        "#;
        let mut orders = OrderRegistry::new();
        let set = RuleSet::from_toml(content, &mut orders, DEFAULT_RADIUS).unwrap();

        let rally = orders.get(set.rules()[0].order()).unwrap();
        assert!(rally.is_locked());
        assert!(rally.allows_multiple());
        assert_eq!(rally.proximity(), DEFAULT_RADIUS);

        let squad = orders.get(set.rules()[1].order()).unwrap();
        assert_eq!(squad.assignee_scope().map(|s| s.radius), Some(20.0));
        assert!(matches!(squad.action(), Action::GroupEdit { edit: GroupEdit::Add, .. }));
    }
}
