//! Game-session driver wiring callbacks to agents, orders and strategy

pub mod session;

pub use session::{Bot, StepReport};
