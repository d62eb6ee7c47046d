//! Declarative orders and their dispatch

pub mod dispatch;
pub mod execute;
pub mod location;
#[allow(clippy::module_inception)]
pub mod order;
pub mod registry;

pub use dispatch::DispatchContext;
pub use location::{Blackboard, LocationSource, UnitTarget};
pub use order::{
    validate_pairing, Action, ActionKind, Assignee, AssigneeKind, AssigneeScope, GroupEdit, Multiplicity, Order,
    OrderId, DEFAULT_RADIUS,
};
pub use registry::OrderRegistry;
