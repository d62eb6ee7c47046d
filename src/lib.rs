//! Tick Commander - order dispatch and trigger-driven strategy for RTS bots

pub mod agent;
pub mod bot;
pub mod core;
pub mod order;
pub mod sim;
pub mod strategy;
