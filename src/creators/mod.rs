//! Command creators.
//!
//! A command creator is a pure function
//! `(args, &InvariantContext, &RobotState, &mut dyn KeyGenerator) -> CommandCreatorResult`.
//! It reads the state snapshot it is handed and either emits commands (plus
//! warnings) or reports errors as data. It never returns a new state; advancing
//! state between creators is the job of [`crate::pipeline`].
//!
//! # Layers
//!
//! - [`atomic`]: one command per call. Module creators do no validation;
//!   pipetting creators check the entities and tip they touch.
//! - [`diff`]: current-vs-desired module comparisons.
//! - [`compound`]: ordered sequences of atomic/compound creators, composed
//!   through the pipeline.

pub mod atomic;
pub mod compound;
pub mod diff;

use serde::{Deserialize, Serialize};

use crate::command::{Command, CommandBody};
use crate::error::{CommandCreatorWarning, ErrorList};
use crate::keys::KeyGenerator;

/// Successful creator output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandsAndWarnings {
    /// Emitted commands, in execution order.
    pub commands: Vec<Command>,
    /// Advisories accumulated while planning.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<CommandCreatorWarning>,
}

impl CommandsAndWarnings {
    /// Output holding a single command.
    pub fn single(command: Command) -> Self {
        Self {
            commands: vec![command],
            warnings: Vec::new(),
        }
    }
}

/// Result of every command creator.
pub type CommandCreatorResult = Result<CommandsAndWarnings, ErrorList>;

/// Emit one command with a fresh key.
pub(crate) fn emit(keys: &mut dyn KeyGenerator, body: CommandBody) -> CommandCreatorResult {
    Ok(CommandsAndWarnings::single(Command::new(keys.next_key(), body)))
}
