//! Entity registry: controlled units and their assignment state

#[allow(clippy::module_inception)]
pub mod agent;
pub mod registry;

pub use agent::{Agent, AgentCategory, CapabilityFlag, FlagSet};
pub use registry::AgentRegistry;
