use thiserror::Error;

use crate::core::types::UnitTag;
use crate::order::{ActionKind, AssigneeKind, OrderId};

#[derive(Error, Debug)]
pub enum CommanderError {
    #[error("Invalid order pairing: {assignee:?} cannot perform {action:?}")]
    InvalidPairing {
        assignee: AssigneeKind,
        action: ActionKind,
    },

    #[error("Order {0} already carries a bundled order")]
    BundleOccupied(OrderId),

    #[error("Order {0} is locked")]
    OrderLocked(OrderId),

    #[error("Order {0} has no target location")]
    NoLocation(OrderId),

    #[error("Agent not found: {0}")]
    AgentNotFound(UnitTag),

    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("Invalid strategy: {0}")]
    Strategy(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CommanderError>;
