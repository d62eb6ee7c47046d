//! Boundary with the external simulation session
//!
//! Everything the dispatch core consumes from the game: per-tick snapshots,
//! the command interface, unit classification and map locations.

pub mod catalog;
pub mod command;
pub mod location;
pub mod resources;
pub mod snapshot;

pub use command::{Command, CommandBuffer, CommandSink, CommandTarget};
pub use location::{Base, LocationService, StaticLocations};
pub use snapshot::{Alliance, UnitOrder, UnitSnapshot, WorldSnapshot};
