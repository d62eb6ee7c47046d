//! Order definitions: who is addressed, what they do, and under which policy
//!
//! An order pairs an [`Assignee`] with an [`Action`]. Only a fixed set of
//! pairings makes sense; [`Order::new`] rejects the rest before anything is
//! allocated, and the typed constructors can only build valid ones.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::agent::FlagSet;
use crate::core::error::{CommanderError, Result};
use crate::core::types::{AbilityId, UnitTag, UnitTypeId};
use crate::order::location::{LocationSource, UnitTarget};

/// Proximity radius used when an order does not name one
///
/// Also the default of `BotConfig::default_radius`; sessions override it
/// through the config for loaded and self-created orders.
pub const DEFAULT_RADIUS: f32 = 12.0;

static NEXT_ORDER_ID: AtomicU64 = AtomicU64::new(1);

/// Unique, monotonically assigned order identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl OrderId {
    fn next() -> Self {
        Self(NEXT_ORDER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "order-{}", self.0)
    }
}

/// Assignee variant without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssigneeKind {
    Default,
    UnitType,
    Flags,
    Group,
}

/// Action variant without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Simple,
    ExactLocation,
    NearLocation,
    TargetUnit,
    HarvestMineralsNear,
    HarvestGasNear,
    GroupEdit,
}

/// Who an order is given to
#[derive(Debug, Clone, PartialEq)]
pub enum Assignee {
    /// Idle fallback of a specific agent; only runs through the idle loop
    Default,
    UnitType(UnitTypeId),
    Flags(FlagSet),
    Group(String),
}

impl Assignee {
    pub fn kind(&self) -> AssigneeKind {
        match self {
            Assignee::Default => AssigneeKind::Default,
            Assignee::UnitType(_) => AssigneeKind::UnitType,
            Assignee::Flags(_) => AssigneeKind::Flags,
            Assignee::Group(_) => AssigneeKind::Group,
        }
    }
}

/// Membership change performed by a group-edit order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupEdit {
    Add,
    Remove,
}

/// What the addressed agents do
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Simple,
    ExactLocation(LocationSource),
    /// Aim at a point sampled uniformly inside `proximity` of the location
    NearLocation(LocationSource),
    TargetUnit(UnitTarget),
    HarvestMineralsNear(LocationSource),
    HarvestGasNear(LocationSource),
    GroupEdit { group: String, edit: GroupEdit },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Simple => ActionKind::Simple,
            Action::ExactLocation(_) => ActionKind::ExactLocation,
            Action::NearLocation(_) => ActionKind::NearLocation,
            Action::TargetUnit(_) => ActionKind::TargetUnit,
            Action::HarvestMineralsNear(_) => ActionKind::HarvestMineralsNear,
            Action::HarvestGasNear(_) => ActionKind::HarvestGasNear,
            Action::GroupEdit { .. } => ActionKind::GroupEdit,
        }
    }

    pub fn location(&self) -> Option<&LocationSource> {
        match self {
            Action::ExactLocation(loc)
            | Action::NearLocation(loc)
            | Action::HarvestMineralsNear(loc)
            | Action::HarvestGasNear(loc) => Some(loc),
            Action::Simple | Action::TargetUnit(_) | Action::GroupEdit { .. } => None,
        }
    }

    fn location_mut(&mut self) -> Option<&mut LocationSource> {
        match self {
            Action::ExactLocation(loc)
            | Action::NearLocation(loc)
            | Action::HarvestMineralsNear(loc)
            | Action::HarvestGasNear(loc) => Some(loc),
            Action::Simple | Action::TargetUnit(_) | Action::GroupEdit { .. } => None,
        }
    }
}

/// Check an assignee/action combination against the valid pairings
pub fn validate_pairing(assignee: &Assignee, action: &Action) -> Result<()> {
    let valid = match (assignee, action) {
        (
            Assignee::UnitType(_),
            Action::ExactLocation(_)
            | Action::NearLocation(_)
            | Action::TargetUnit(_)
            | Action::Simple
            | Action::GroupEdit { .. },
        ) => true,
        (Assignee::UnitType(_), Action::HarvestMineralsNear(_) | Action::HarvestGasNear(_)) => false,
        (Assignee::Default, Action::HarvestMineralsNear(_) | Action::HarvestGasNear(_)) => true,
        (
            Assignee::Default,
            Action::Simple
            | Action::ExactLocation(_)
            | Action::NearLocation(_)
            | Action::TargetUnit(_)
            | Action::GroupEdit { .. },
        ) => false,
        (Assignee::Flags(_) | Assignee::Group(_), action) => action.location().is_some(),
    };

    if valid {
        Ok(())
    } else {
        Err(CommanderError::InvalidPairing {
            assignee: assignee.kind(),
            action: action.kind(),
        })
    }
}

/// How many agents may carry the order's ability at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Multiplicity {
    /// At most one unit anywhere may be executing this ability
    #[default]
    Exclusive,
    AllowMultiple,
}

/// Restriction on which units are candidates, by distance from a location
#[derive(Debug, Clone, PartialEq)]
pub struct AssigneeScope {
    pub location: LocationSource,
    pub radius: f32,
}

/// A storable, executable command descriptor
///
/// Cloning copies every field including the id and the assigned tags.
#[derive(Debug, Clone)]
pub struct Order {
    pub(crate) id: OrderId,
    pub(crate) assignee: Assignee,
    pub(crate) action: Action,
    pub(crate) ability: AbilityId,
    pub(crate) proximity: f32,
    pub(crate) assignee_scope: Option<AssigneeScope>,
    pub(crate) multiplicity: Multiplicity,
    pub(crate) locked: bool,
    pub(crate) assigned: BTreeSet<UnitTag>,
    pub(crate) bundle: Option<OrderId>,
}

impl Order {
    /// Construct an order, rejecting invalid assignee/action pairings
    pub fn new(assignee: Assignee, action: Action, ability: AbilityId) -> Result<Self> {
        validate_pairing(&assignee, &action)?;
        Ok(Self::build(assignee, action, ability))
    }

    fn build(assignee: Assignee, action: Action, ability: AbilityId) -> Self {
        Self {
            id: OrderId::next(),
            assignee,
            action,
            ability,
            proximity: DEFAULT_RADIUS,
            assignee_scope: None,
            multiplicity: Multiplicity::Exclusive,
            locked: false,
            assigned: BTreeSet::new(),
            bundle: None,
        }
    }

    /// Closest unit of `unit_type` uses `ability` at exactly `location`
    pub fn unit_type_at(unit_type: UnitTypeId, ability: AbilityId, location: impl Into<LocationSource>) -> Self {
        Self::build(Assignee::UnitType(unit_type), Action::ExactLocation(location.into()), ability)
    }

    /// Closest unit of `unit_type` uses `ability` somewhere within `radius` of `location`
    pub fn unit_type_near(
        unit_type: UnitTypeId,
        ability: AbilityId,
        location: impl Into<LocationSource>,
        radius: f32,
    ) -> Self {
        Self::build(Assignee::UnitType(unit_type), Action::NearLocation(location.into()), ability)
            .with_radius(radius)
    }

    pub fn unit_type_on_target(unit_type: UnitTypeId, ability: AbilityId, target: UnitTarget) -> Self {
        Self::build(Assignee::UnitType(unit_type), Action::TargetUnit(target), ability)
    }

    /// Any order-free unit of `unit_type` uses an untargeted ability
    pub fn unit_type_simple(unit_type: UnitTypeId, ability: AbilityId) -> Self {
        Self::build(Assignee::UnitType(unit_type), Action::Simple, ability)
    }

    pub fn harvest_minerals_near(location: impl Into<LocationSource>) -> Self {
        Self::build(
            Assignee::Default,
            Action::HarvestMineralsNear(location.into()),
            AbilityId::SMART,
        )
    }

    pub fn harvest_gas_near(location: impl Into<LocationSource>) -> Self {
        Self::build(
            Assignee::Default,
            Action::HarvestGasNear(location.into()),
            AbilityId::HARVEST_GATHER,
        )
    }

    /// Every idle agent holding all `flags` uses `ability` at `location`
    pub fn flags_at(flags: FlagSet, ability: AbilityId, location: impl Into<LocationSource>) -> Self {
        Self::build(Assignee::Flags(flags), Action::ExactLocation(location.into()), ability)
    }

    pub fn flags_near(flags: FlagSet, ability: AbilityId, location: impl Into<LocationSource>, radius: f32) -> Self {
        Self::build(Assignee::Flags(flags), Action::NearLocation(location.into()), ability).with_radius(radius)
    }

    pub fn group_near(group: impl Into<String>, ability: AbilityId, location: impl Into<LocationSource>, radius: f32) -> Self {
        Self::build(Assignee::Group(group.into()), Action::NearLocation(location.into()), ability)
            .with_radius(radius)
    }

    /// Add or remove every agent of `unit_type` within `radius` of `around` to/from `group`
    pub fn group_edit(
        unit_type: UnitTypeId,
        group: impl Into<String>,
        edit: GroupEdit,
        around: impl Into<LocationSource>,
        radius: f32,
    ) -> Self {
        Self::build(
            Assignee::UnitType(unit_type),
            Action::GroupEdit { group: group.into(), edit },
            AbilityId::SMART,
        )
        .with_assignee_scope(around, radius)
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.proximity = radius;
        self
    }

    /// Only units within `radius` of `location` are candidates
    pub fn with_assignee_scope(mut self, location: impl Into<LocationSource>, radius: f32) -> Self {
        self.assignee_scope = Some(AssigneeScope {
            location: location.into(),
            radius,
        });
        self
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn assignee(&self) -> &Assignee {
        &self.assignee
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn ability(&self) -> AbilityId {
        self.ability
    }

    pub fn proximity(&self) -> f32 {
        self.proximity
    }

    pub fn assignee_scope(&self) -> Option<&AssigneeScope> {
        self.assignee_scope.as_ref()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn allows_multiple(&self) -> bool {
        self.multiplicity == Multiplicity::AllowMultiple
    }

    pub fn bundle(&self) -> Option<OrderId> {
        self.bundle
    }

    pub fn assigned_agents(&self) -> &BTreeSet<UnitTag> {
        &self.assigned
    }

    pub fn has_assigned_agent(&self) -> bool {
        !self.assigned.is_empty()
    }

    fn ensure_unlocked(&self) -> Result<()> {
        if self.locked {
            return Err(CommanderError::OrderLocked(self.id));
        }
        Ok(())
    }

    /// Freeze the order's intent against further changes
    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Turn the order into an idle fallback for the agents it is set on
    pub fn set_default(&mut self) -> Result<()> {
        self.ensure_unlocked()?;
        self.assignee = Assignee::Default;
        Ok(())
    }

    /// Attach a one-shot follow-up order (single slot)
    pub fn bundle_directive(&mut self, inner: OrderId) -> Result<()> {
        self.ensure_unlocked()?;
        if self.bundle.is_some() {
            return Err(CommanderError::BundleOccupied(self.id));
        }
        self.bundle = Some(inner);
        Ok(())
    }

    pub fn allow_multiple(&mut self, allow: bool) -> Result<()> {
        self.ensure_unlocked()?;
        self.multiplicity = if allow {
            Multiplicity::AllowMultiple
        } else {
            Multiplicity::Exclusive
        };
        Ok(())
    }

    /// Replace the target location with a source re-resolved at every execution
    pub fn set_target_location_function(&mut self, source: LocationSource) -> Result<()> {
        self.ensure_unlocked()?;
        let slot = self.action.location_mut().ok_or(CommanderError::NoLocation(self.id))?;
        *slot = source;
        Ok(())
    }

    /// Replace the candidate-selection location, keeping the current radius
    pub fn set_assignee_location_function(&mut self, source: LocationSource) -> Result<()> {
        self.ensure_unlocked()?;
        let radius = self.assignee_scope.as_ref().map_or(self.proximity, |s| s.radius);
        self.assignee_scope = Some(AssigneeScope {
            location: source,
            radius,
        });
        Ok(())
    }

    /// Returns false if the agent was already assigned
    pub fn assign_agent(&mut self, tag: UnitTag) -> bool {
        self.assigned.insert(tag)
    }

    /// Returns false if the agent was not assigned
    pub fn unassign_agent(&mut self, tag: UnitTag) -> bool {
        self.assigned.remove(&tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::CapabilityFlag;
    use crate::core::types::Point2;

    fn somewhere() -> LocationSource {
        LocationSource::Literal(Point2::new(5.0, 5.0))
    }

    #[test]
    fn test_valid_pairings_accepted() {
        let probe = Assignee::UnitType(UnitTypeId::PROTOSS_PROBE);
        let flags = Assignee::Flags([CapabilityFlag::Army].into_iter().collect());

        assert!(Order::new(probe.clone(), Action::ExactLocation(somewhere()), AbilityId::BUILD_PYLON).is_ok());
        assert!(Order::new(probe.clone(), Action::NearLocation(somewhere()), AbilityId::BUILD_PYLON).is_ok());
        assert!(Order::new(probe.clone(), Action::Simple, AbilityId::STOP).is_ok());
        assert!(Order::new(
            probe,
            Action::TargetUnit(UnitTarget::Tag(UnitTag(3))),
            AbilityId::SMART
        )
        .is_ok());
        assert!(Order::new(Assignee::Default, Action::HarvestGasNear(somewhere()), AbilityId::HARVEST_GATHER).is_ok());
        assert!(Order::new(flags, Action::NearLocation(somewhere()), AbilityId::ATTACK).is_ok());
    }

    #[test]
    fn test_invalid_pairings_rejected() {
        let flags = Assignee::Flags(FlagSet::new());

        let cases = vec![
            (Assignee::Default, Action::ExactLocation(somewhere())),
            (Assignee::Default, Action::Simple),
            (Assignee::UnitType(UnitTypeId::PROTOSS_PROBE), Action::HarvestMineralsNear(somewhere())),
            (flags.clone(), Action::Simple),
            (flags, Action::TargetUnit(UnitTarget::Tag(UnitTag(1)))),
            (Assignee::Group("g".into()), Action::GroupEdit { group: "g".into(), edit: GroupEdit::Add }),
        ];

        for (assignee, action) in cases {
            let expected = (assignee.kind(), action.kind());
            match Order::new(assignee, action, AbilityId::SMART) {
                Err(CommanderError::InvalidPairing { assignee, action }) => {
                    assert_eq!((assignee, action), expected);
                }
                other => panic!("expected InvalidPairing for {:?}, got {:?}", expected, other.map(|o| o.id())),
            }
        }
    }

    #[test]
    fn test_rejected_construction_consumes_no_id() {
        let before = Order::unit_type_simple(UnitTypeId::PROTOSS_NEXUS, AbilityId::TRAIN_PROBE).id();
        let _ = Order::new(Assignee::Default, Action::Simple, AbilityId::STOP);
        let after = Order::unit_type_simple(UnitTypeId::PROTOSS_NEXUS, AbilityId::TRAIN_PROBE).id();
        // Other tests allocate ids concurrently, so only monotonicity holds
        assert!(after > before);
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let a = Order::harvest_minerals_near(somewhere());
        let b = Order::harvest_minerals_near(somewhere());
        assert!(b.id() > a.id());
    }

    #[test]
    fn test_clone_keeps_id_and_assignments() {
        let mut order = Order::unit_type_at(UnitTypeId::PROTOSS_PROBE, AbilityId::MOVE, somewhere());
        order.assign_agent(UnitTag(1));
        let copy = order.clone();
        assert_eq!(copy.id(), order.id());
        assert!(copy.assigned_agents().contains(&UnitTag(1)));
    }

    #[test]
    fn test_bundle_is_single_slot() {
        let mut order = Order::unit_type_at(UnitTypeId::PROTOSS_PROBE, AbilityId::BUILD_PYLON, somewhere());
        assert!(order.bundle_directive(OrderId(900)).is_ok());
        assert!(matches!(order.bundle_directive(OrderId(901)), Err(CommanderError::BundleOccupied(_))));
        assert_eq!(order.bundle(), Some(OrderId(900)));
    }

    #[test]
    fn test_lock_freezes_intent() {
        let mut order = Order::unit_type_at(UnitTypeId::PROTOSS_PROBE, AbilityId::BUILD_PYLON, somewhere());
        order.lock();
        assert!(matches!(order.allow_multiple(true), Err(CommanderError::OrderLocked(_))));
        assert!(matches!(order.set_default(), Err(CommanderError::OrderLocked(_))));
        assert!(order.bundle_directive(OrderId(1)).is_err());
        assert!(order.set_target_location_function(LocationSource::StartLocation).is_err());
        // Assignment state stays mutable
        assert!(order.assign_agent(UnitTag(4)));
        assert!(order.unassign_agent(UnitTag(4)));
    }

    #[test]
    fn test_multiplicity_defaults_to_exclusive() {
        let mut order = Order::unit_type_simple(UnitTypeId::PROTOSS_GATEWAY, AbilityId::TRAIN_ZEALOT);
        assert!(!order.allows_multiple());
        order.allow_multiple(true).unwrap();
        assert!(order.allows_multiple());
    }

    #[test]
    fn test_set_default_changes_assignee() {
        let mut order = Order::unit_type_at(UnitTypeId::PROTOSS_PROBE, AbilityId::MOVE, somewhere());
        order.set_default().unwrap();
        assert_eq!(order.assignee(), &Assignee::Default);
    }

    #[test]
    fn test_location_functions() {
        let mut order = Order::unit_type_at(UnitTypeId::PROTOSS_PROBE, AbilityId::MOVE, somewhere());
        order.set_target_location_function(LocationSource::NewestActiveBase).unwrap();
        assert_eq!(order.action().location(), Some(&LocationSource::NewestActiveBase));

        order.set_assignee_location_function(LocationSource::StartLocation).unwrap();
        let scope = order.assignee_scope().unwrap();
        assert_eq!(scope.location, LocationSource::StartLocation);
        assert_eq!(scope.radius, DEFAULT_RADIUS);

        let mut simple = Order::unit_type_simple(UnitTypeId::PROTOSS_NEXUS, AbilityId::TRAIN_PROBE);
        assert!(matches!(
            simple.set_target_location_function(LocationSource::StartLocation),
            Err(CommanderError::NoLocation(_))
        ));
    }

    #[test]
    fn test_unassigning_last_agent_keeps_order() {
        let mut order = Order::unit_type_at(UnitTypeId::PROTOSS_PROBE, AbilityId::MOVE, somewhere());
        order.assign_agent(UnitTag(1));
        assert!(order.unassign_agent(UnitTag(1)));
        assert!(!order.has_assigned_agent());
        assert!(!order.unassign_agent(UnitTag(1)));
    }
}
