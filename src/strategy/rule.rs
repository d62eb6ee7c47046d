//! Strategy rules: triggers paired with the order they fire

use crate::order::OrderId;
use crate::sim::snapshot::WorldSnapshot;
use crate::strategy::trigger::Trigger;

/// Fires its order on any tick where at least one trigger holds
///
/// There is no cooldown: a rule keeps firing while its trigger holds.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyRule {
    pub name: String,
    triggers: Vec<Trigger>,
    order: OrderId,
}

impl StrategyRule {
    pub fn new(name: impl Into<String>, order: OrderId) -> Self {
        Self {
            name: name.into(),
            triggers: Vec::new(),
            order,
        }
    }

    pub fn add_trigger(&mut self, trigger: Trigger) {
        self.triggers.push(trigger);
    }

    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.triggers.push(trigger);
        self
    }

    /// Replace all triggers with a single one
    pub fn set_trigger(&mut self, trigger: Trigger) {
        self.triggers.clear();
        self.triggers.push(trigger);
    }

    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    pub fn order(&self) -> OrderId {
        self.order
    }

    /// True iff any trigger's conditions all hold; false with no triggers
    pub fn check_trigger_conditions(&self, snapshot: &WorldSnapshot) -> bool {
        self.triggers.iter().any(|t| t.check_conditions(snapshot))
    }
}

/// Ordered collection of rules making up one strategy
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    pub name: String,
    rules: Vec<StrategyRule>,
}

impl RuleSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    pub fn add(&mut self, rule: StrategyRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[StrategyRule] {
        &self.rules
    }

    /// Orders of every rule whose triggers hold, in declaration order
    pub fn firing(&self, snapshot: &WorldSnapshot) -> Vec<OrderId> {
        self.rules
            .iter()
            .filter(|r| r.check_trigger_conditions(snapshot))
            .map(|r| r.order)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
