//! Built-in strategies

use crate::agent::{CapabilityFlag, FlagSet};
use crate::core::error::Result;
use crate::core::types::{AbilityId, UnitTypeId};
use crate::order::{LocationSource, Order, OrderRegistry, UnitTarget};
use crate::strategy::rule::{RuleSet, StrategyRule};
use crate::strategy::trigger::{ConditionKind, Trigger, TriggerCondition};

fn when(conditions: impl IntoIterator<Item = TriggerCondition>) -> Trigger {
    conditions.into_iter().fold(Trigger::new(), Trigger::with_condition)
}

fn at_least(kind: ConditionKind, value: i64) -> TriggerCondition {
    TriggerCondition::new(kind, value)
}

fn have_at_least(count: i64, unit_type: UnitTypeId) -> TriggerCondition {
    TriggerCondition::unit_count(true, count, unit_type)
}

fn have_at_most(count: i64, unit_type: UnitTypeId) -> TriggerCondition {
    TriggerCondition::unit_count(false, count, unit_type)
}

/// Single-gateway protoss opening: probes, pylons, one gateway, one
/// assimilator, then zealots that gather at the natural defend point and
/// push to the proxy location once eight are out
pub fn protoss_gateway_opening(orders: &mut OrderRegistry) -> Result<RuleSet> {
    let mut set = RuleSet::new("protoss_gateway_opening");
    let main_build_area = LocationSource::BuildArea { base: 0, index: 0 };
    let back_to_mining = Order::harvest_minerals_near(LocationSource::StartLocation);

    let probes = orders.store(Order::unit_type_simple(UnitTypeId::PROTOSS_NEXUS, AbilityId::TRAIN_PROBE));
    set.add(StrategyRule::new("train probes", probes).with_trigger(when([
        at_least(ConditionKind::MinMinerals, 50),
        at_least(ConditionKind::MinFoodHeadroom, 1),
        have_at_most(21, UnitTypeId::PROTOSS_PROBE),
    ])));

    let mut first_pylon = Order::unit_type_near(UnitTypeId::PROTOSS_PROBE, AbilityId::BUILD_PYLON, main_build_area.clone(), 3.0);
    first_pylon.bundle_directive(back_to_mining.id())?;
    let first_pylon = orders.store(first_pylon);
    orders.store(back_to_mining);
    set.add(StrategyRule::new("first pylon", first_pylon).with_trigger(when([
        at_least(ConditionKind::MinMinerals, 100),
        at_least(ConditionKind::MinFood, 13),
        have_at_most(0, UnitTypeId::PROTOSS_PYLON),
    ])));

    let supply = orders.store(Order::unit_type_near(
        UnitTypeId::PROTOSS_PROBE,
        AbilityId::BUILD_PYLON,
        LocationSource::StartLocation,
        10.0,
    ));
    set.add(StrategyRule::new("supply pylon", supply).with_trigger(when([
        at_least(ConditionKind::MinMinerals, 100),
        TriggerCondition::new(ConditionKind::MaxFoodHeadroom, 2),
        have_at_least(1, UnitTypeId::PROTOSS_PYLON),
    ])));

    let gateway = orders.store(Order::unit_type_near(
        UnitTypeId::PROTOSS_PROBE,
        AbilityId::BUILD_GATEWAY,
        main_build_area,
        5.0,
    ));
    set.add(StrategyRule::new("gateway", gateway).with_trigger(when([
        at_least(ConditionKind::MinMinerals, 150),
        have_at_least(1, UnitTypeId::PROTOSS_PYLON),
        have_at_most(0, UnitTypeId::PROTOSS_GATEWAY),
    ])));

    let assimilator = orders.store(Order::unit_type_near(
        UnitTypeId::PROTOSS_PROBE,
        AbilityId::BUILD_ASSIMILATOR,
        LocationSource::StartLocation,
        8.0,
    ));
    set.add(StrategyRule::new("assimilator", assimilator).with_trigger(when([
        at_least(ConditionKind::MinMinerals, 75),
        have_at_least(1, UnitTypeId::PROTOSS_GATEWAY),
        have_at_most(0, UnitTypeId::PROTOSS_ASSIMILATOR),
    ])));

    let chrono = orders.store(Order::unit_type_on_target(
        UnitTypeId::PROTOSS_NEXUS,
        AbilityId::EFFECT_CHRONOBOOSTENERGYCOST,
        UnitTarget::OfType(UnitTypeId::PROTOSS_GATEWAY),
    ));
    set.add(StrategyRule::new("chrono gateway", chrono).with_trigger(when([
        have_at_least(1, UnitTypeId::PROTOSS_GATEWAY),
        at_least(ConditionKind::MinTime, 2000),
    ])));

    let mut zealots = Order::unit_type_simple(UnitTypeId::PROTOSS_GATEWAY, AbilityId::TRAIN_ZEALOT);
    zealots.allow_multiple(true)?;
    let zealots = orders.store(zealots);
    set.add(StrategyRule::new("zealots", zealots).with_trigger(when([
        at_least(ConditionKind::MinMinerals, 100),
        at_least(ConditionKind::MinFoodHeadroom, 2),
    ])));

    let army: FlagSet = [CapabilityFlag::Army].into_iter().collect();

    let mut gather = Order::flags_near(army.clone(), AbilityId::ATTACK, LocationSource::DefendPoint { base: 0, index: 0 }, 4.0);
    gather.allow_multiple(true)?;
    let gather = orders.store(gather);
    set.add(StrategyRule::new("gather army", gather).with_trigger(when([
        have_at_least(1, UnitTypeId::PROTOSS_ZEALOT),
        have_at_most(7, UnitTypeId::PROTOSS_ZEALOT),
    ])));

    let mut push = Order::flags_near(army, AbilityId::ATTACK, LocationSource::ProxyLocation, 6.0);
    push.allow_multiple(true)?;
    push.lock();
    let push = orders.store(push);
    set.add(StrategyRule::new("push", push).with_trigger(when([have_at_least(8, UnitTypeId::PROTOSS_ZEALOT)])));

    tracing::info!(strategy = %set.name, rules = set.len(), "preset built");
    Ok(set)
}
