//! Integration tests for triggers, rules and strategy files

use std::path::Path;

use proptest::prelude::*;

use tick_commander::core::types::{AbilityId, Point2, UnitTag, UnitTypeId};
use tick_commander::order::{OrderRegistry, DEFAULT_RADIUS};
use tick_commander::sim::{UnitSnapshot, WorldSnapshot};
use tick_commander::strategy::{ConditionKind, RuleSet, Trigger, TriggerCondition};

fn with_minerals(minerals: u32) -> WorldSnapshot {
    WorldSnapshot {
        minerals,
        ..WorldSnapshot::default()
    }
}

/// Thresholds are inclusive on both sides
#[test]
fn test_trigger_boundaries() {
    let min = Trigger::new().with_condition(TriggerCondition::new(ConditionKind::MinMinerals, 100));
    assert!(!min.check_conditions(&with_minerals(99)));
    assert!(min.check_conditions(&with_minerals(100)));
    assert!(min.check_conditions(&with_minerals(101)));

    let max = Trigger::new().with_condition(TriggerCondition::new(ConditionKind::MaxTime, 500));
    let at = |game_loop| WorldSnapshot {
        game_loop,
        ..WorldSnapshot::default()
    };
    assert!(max.check_conditions(&at(500)));
    assert!(!max.check_conditions(&at(501)));
}

proptest! {
    #[test]
    fn prop_mineral_thresholds_inclusive(threshold in 0i64..10_000, minerals in 0u32..10_000) {
        let snapshot = with_minerals(minerals);
        let min = TriggerCondition::new(ConditionKind::MinMinerals, threshold);
        let max = TriggerCondition::new(ConditionKind::MaxMinerals, threshold);
        prop_assert_eq!(min.is_met(&snapshot), i64::from(minerals) >= threshold);
        prop_assert_eq!(max.is_met(&snapshot), i64::from(minerals) <= threshold);
    }
}

/// Unit counts near a location only see own units strictly inside the radius
#[test]
fn test_unit_count_near_location() {
    let mut snapshot = WorldSnapshot::new();
    for (tag, x) in [(1, 0.0), (2, 4.0), (3, 5.0)] {
        snapshot
            .units
            .push(UnitSnapshot::new(UnitTag(tag), UnitTypeId::PROTOSS_ZEALOT, Point2::new(x, 0.0)));
    }
    let condition = TriggerCondition::unit_count_near(true, 2, UnitTypeId::PROTOSS_ZEALOT, Point2::new(0.0, 0.0), 5.0);
    assert!(condition.is_met(&snapshot));

    let condition = TriggerCondition::unit_count_near(true, 3, UnitTypeId::PROTOSS_ZEALOT, Point2::new(0.0, 0.0), 5.0);
    assert!(!condition.is_met(&snapshot));
}

/// Three rules wanting the same build only ever produce one build
#[test]
fn test_competing_rules_issue_one_build() {
    let content = r#"
        name = "triple"

        [[rules]]
        name = "a"
        [[rules.triggers]]
        conditions = [ { kind = "MIN_MINERALS", value = 50 } ]
        [rules.order]
        assignee = "unit_type"
        unit_type = "PROTOSS_PROBE"
        action = "exact_location"
        ability = "BUILD_PYLON"
        location = { literal = { x = 10.0, y = 10.0 } }

        [[rules]]
        name = "b"
        [[rules.triggers]]
        conditions = [ { kind = "MIN_MINERALS", value = 50 } ]
        [rules.order]
        assignee = "unit_type"
        unit_type = "PROTOSS_PROBE"
        action = "near_location"
        ability = "BUILD_PYLON"
        location = "start_location"

        [[rules]]
        name = "c"
        [[rules.triggers]]
        conditions = [ { kind = "MIN_MINERALS", value = 50 } ]
        [rules.order]
        assignee = "unit_type"
        unit_type = "PROTOSS_PROBE"
        action = "exact_location"
        ability = "BUILD_PYLON"
        location = { literal = { x = 30.0, y = 10.0 } }
    "#;

    let mut bot = tick_commander::bot::Bot::new(
        Default::default(),
        Box::new(tick_commander::sim::StaticLocations::single_base(Point2::new(20.0, 20.0))),
    );
    assert!(bot.load_strategy_toml(content).unwrap());

    let mut snapshot = with_minerals(50);
    snapshot
        .units
        .push(UnitSnapshot::new(UnitTag(1), UnitTypeId::PROTOSS_PROBE, Point2::new(12.0, 12.0)));
    snapshot
        .units
        .push(UnitSnapshot::new(UnitTag(2), UnitTypeId::PROTOSS_PROBE, Point2::new(28.0, 12.0)));

    let mut sink = Vec::new();
    let report = bot.on_step(&snapshot, &mut sink);
    assert_eq!(report.rules_fired, 3);
    assert_eq!(report.orders_succeeded, 1);
    let builds: Vec<_> = sink.iter().filter(|c| c.ability == AbilityId::BUILD_PYLON).collect();
    assert_eq!(builds.len(), 1);
    assert_eq!(builds[0].units, vec![UnitTag(1)]);
}

/// The shipped strategy file parses and stores every order it names
#[test]
fn test_shipped_strategy_loads() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/strategies/protoss_opening.toml");
    let mut orders = OrderRegistry::new();
    let set = RuleSet::load(&path, &mut orders, DEFAULT_RADIUS).unwrap();

    assert_eq!(set.name, "protoss_opening");
    assert_eq!(set.len(), 7);
    // The first pylon's bundled follow-up is stored alongside the rule orders
    assert_eq!(orders.len(), 8);
    let push = orders.get(set.rules()[6].order()).unwrap();
    assert!(push.is_locked());
    assert!(push.allows_multiple());
}

/// A strategy with one bad order leaves the registry untouched
#[test]
fn test_bad_strategy_stores_nothing() {
    let content = r#"
        [[rules]]
        name = "ok"
        [rules.order]
        assignee = "unit_type"
        unit_type = "PROTOSS_NEXUS"
        action = "simple"
        ability = "TRAIN_PROBE"

        [[rules]]
        name = "bad"
        [rules.order]
        assignee = "default"
        action = "near_location"
        ability = "MOVE"
        location = "start_location"
    "#;
    let mut orders = OrderRegistry::new();
    assert!(RuleSet::from_toml(content, &mut orders, DEFAULT_RADIUS).is_err());
    assert!(orders.is_empty());
}
