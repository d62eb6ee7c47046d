//! Trigger conditions over the world snapshot
//!
//! Every comparison is inclusive at the threshold. A trigger is a
//! conjunction of conditions; an empty trigger always holds.

use serde::{Deserialize, Serialize};

use crate::core::types::{Point2, UnitTypeId};
use crate::sim::snapshot::WorldSnapshot;

/// Which snapshot metric a condition compares, and in which direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionKind {
    MinMinerals,
    MaxMinerals,
    MinGas,
    MaxGas,
    MinTime,
    MaxTime,
    MinFood,
    MaxFood,
    MinFoodCap,
    MaxFoodCap,
    MinFoodHeadroom,
    MaxFoodHeadroom,
    MinUnitOfType,
    MaxUnitOfType,
    MinUnitOfTypeNearLocation,
    MaxUnitOfTypeNearLocation,
}

impl ConditionKind {
    pub fn is_minimum(self) -> bool {
        matches!(
            self,
            ConditionKind::MinMinerals
                | ConditionKind::MinGas
                | ConditionKind::MinTime
                | ConditionKind::MinFood
                | ConditionKind::MinFoodCap
                | ConditionKind::MinFoodHeadroom
                | ConditionKind::MinUnitOfType
                | ConditionKind::MinUnitOfTypeNearLocation
        )
    }

    /// Whether the condition counts units of a type
    pub fn counts_units(self) -> bool {
        matches!(
            self,
            ConditionKind::MinUnitOfType
                | ConditionKind::MaxUnitOfType
                | ConditionKind::MinUnitOfTypeNearLocation
                | ConditionKind::MaxUnitOfTypeNearLocation
        )
    }

    pub fn is_scoped(self) -> bool {
        matches!(
            self,
            ConditionKind::MinUnitOfTypeNearLocation | ConditionKind::MaxUnitOfTypeNearLocation
        )
    }
}

/// Population filter for unit-count conditions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitCount {
    pub unit_type: UnitTypeId,
    /// Center and squared radius; only units strictly inside are counted
    pub within: Option<(Point2, f32)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TriggerCondition {
    kind: ConditionKind,
    value: i64,
    count: Option<UnitCount>,
}

impl TriggerCondition {
    /// Resource, time or food condition
    ///
    /// Unit-count kinds need [`TriggerCondition::unit_count`] or
    /// [`TriggerCondition::unit_count_near`]; built here they count nothing.
    pub fn new(kind: ConditionKind, value: i64) -> Self {
        Self { kind, value, count: None }
    }

    pub fn unit_count(minimum: bool, value: i64, unit_type: UnitTypeId) -> Self {
        let kind = if minimum {
            ConditionKind::MinUnitOfType
        } else {
            ConditionKind::MaxUnitOfType
        };
        Self {
            kind,
            value,
            count: Some(UnitCount { unit_type, within: None }),
        }
    }

    pub fn unit_count_near(minimum: bool, value: i64, unit_type: UnitTypeId, center: Point2, radius: f32) -> Self {
        let kind = if minimum {
            ConditionKind::MinUnitOfTypeNearLocation
        } else {
            ConditionKind::MaxUnitOfTypeNearLocation
        };
        Self {
            kind,
            value,
            count: Some(UnitCount {
                unit_type,
                within: Some((center, radius * radius)),
            }),
        }
    }

    pub fn kind(&self) -> ConditionKind {
        self.kind
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    /// The snapshot metric this condition compares
    fn metric(&self, snapshot: &WorldSnapshot) -> i64 {
        match self.kind {
            ConditionKind::MinMinerals | ConditionKind::MaxMinerals => i64::from(snapshot.minerals),
            ConditionKind::MinGas | ConditionKind::MaxGas => i64::from(snapshot.vespene),
            ConditionKind::MinTime | ConditionKind::MaxTime => snapshot.game_loop as i64,
            ConditionKind::MinFood | ConditionKind::MaxFood => i64::from(snapshot.food_used),
            ConditionKind::MinFoodCap | ConditionKind::MaxFoodCap => i64::from(snapshot.food_cap),
            ConditionKind::MinFoodHeadroom | ConditionKind::MaxFoodHeadroom => snapshot.food_headroom(),
            ConditionKind::MinUnitOfType
            | ConditionKind::MaxUnitOfType
            | ConditionKind::MinUnitOfTypeNearLocation
            | ConditionKind::MaxUnitOfTypeNearLocation => self.count_units(snapshot),
        }
    }

    fn count_units(&self, snapshot: &WorldSnapshot) -> i64 {
        let Some(count) = self.count else {
            return 0;
        };
        snapshot
            .own_units()
            .filter(|u| u.unit_type == count.unit_type)
            .filter(|u| match count.within {
                Some((center, radius_sq)) => u.pos.distance_squared(&center) < radius_sq,
                None => true,
            })
            .count() as i64
    }

    pub fn is_met(&self, snapshot: &WorldSnapshot) -> bool {
        let metric = self.metric(snapshot);
        if self.kind.is_minimum() {
            metric >= self.value
        } else {
            metric <= self.value
        }
    }
}

/// Conjunction of conditions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trigger {
    conditions: Vec<TriggerCondition>,
}

impl Trigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_condition(&mut self, condition: TriggerCondition) {
        self.conditions.push(condition);
    }

    pub fn with_condition(mut self, condition: TriggerCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn conditions(&self) -> &[TriggerCondition] {
        &self.conditions
    }

    pub fn check_conditions(&self, snapshot: &WorldSnapshot) -> bool {
        self.conditions.iter().all(|c| c.is_met(snapshot))
    }
}
