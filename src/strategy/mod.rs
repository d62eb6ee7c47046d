//! Trigger-driven strategy rules

pub mod loader;
pub mod presets;
pub mod rule;
pub mod trigger;

pub use rule::{RuleSet, StrategyRule};
pub use trigger::{ConditionKind, Trigger, TriggerCondition, UnitCount};
