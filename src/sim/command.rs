//! Commands sent to the simulation
//!
//! Commands issued during a tick go through a [`CommandBuffer`] first so
//! later dispatches in the same tick can see them, then get flushed to the
//! external [`CommandSink`].

use serde::{Deserialize, Serialize};

use crate::core::types::{AbilityId, Point2, UnitTag};

/// What a command is aimed at
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandTarget {
    #[default]
    None,
    Point(Point2),
    Unit(UnitTag),
}

/// A single command for one or more units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub units: Vec<UnitTag>,
    pub ability: AbilityId,
    pub target: CommandTarget,
    #[serde(default)]
    pub queued: bool,
}

impl Command {
    pub fn new(unit: UnitTag, ability: AbilityId, target: CommandTarget) -> Self {
        Self {
            units: vec![unit],
            ability,
            target,
            queued: false,
        }
    }

    pub fn involves(&self, tag: UnitTag) -> bool {
        self.units.contains(&tag)
    }
}

/// Command-issuing side of the simulation session
pub trait CommandSink {
    fn issue(&mut self, command: Command);
}

impl CommandSink for Vec<Command> {
    fn issue(&mut self, command: Command) {
        self.push(command);
    }
}

/// Commands issued during the current tick, not yet delivered
#[derive(Debug, Default)]
pub struct CommandBuffer {
    commands: Vec<Command>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self, command: Command) {
        tracing::trace!(ability = %command.ability, target = ?command.target, units = ?command.units, "command buffered");
        self.commands.push(command);
    }

    /// Number of buffered commands involving `tag`
    pub fn count_for(&self, tag: UnitTag) -> usize {
        self.commands.iter().filter(|c| c.involves(tag)).count()
    }

    /// Whether any unit was told to use `ability` this tick
    pub fn any_with_ability(&self, ability: AbilityId) -> bool {
        self.commands.iter().any(|c| c.ability == ability)
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Deliver all buffered commands to `sink`, returning how many were sent
    pub fn flush_into(&mut self, sink: &mut dyn CommandSink) -> usize {
        let count = self.commands.len();
        for command in self.commands.drain(..) {
            sink.issue(command);
        }
        count
    }
}
