pub mod config;
pub mod error;
pub mod geometry;
pub mod types;

pub use config::BotConfig;
pub use error::{CommanderError, Result};
pub use types::{AbilityId, Point2, Tick, UnitTag, UnitTypeId, UpgradeId};
