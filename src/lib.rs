//! Step planner for a laboratory liquid-handling robot.
//!
//! Turns declarative protocol steps ("bring the thermocycler to 4 °C with the
//! lid closed", "transfer 50 µL from A1 to B1") into ordered lists of atomic
//! robot commands, given a static entity registry and a snapshot of device
//! state. Planning is pure: the same registry, state, arguments and key
//! generator always yield the same commands, and a failed precondition is
//! returned as data instead of a partial command list.
//!
//! # Layout
//!
//! - [`command`]: atomic command wire format
//! - [`registry`]: entity registry (pipettes, labware, modules, equipment)
//! - [`state`]: device state, selectors and command effects
//! - [`creators`]: atomic creators, state diffs and compound creators
//! - [`pipeline`]: creator composition with state threading
//! - [`step`], [`timeline`], [`protocol`]: whole-protocol planning
//! - [`config`], [`keys`], [`error`]: ambient support

pub mod command;
pub mod config;
pub mod creators;
pub mod error;
pub mod keys;
pub mod pipeline;
pub mod protocol;
pub mod registry;
pub mod state;
pub mod step;
pub mod timeline;

pub use command::{Command, CommandBody};
pub use config::PlannerConfig;
pub use creators::{CommandCreatorResult, CommandsAndWarnings};
pub use error::{
    CommandCreatorError, CommandCreatorWarning, ErrorList, PlannerError, PlannerResult,
};
pub use keys::{KeyGenerator, SequentialKeyGenerator, UuidKeyGenerator};
pub use pipeline::{reduce_command_creators, CurriedCreator};
pub use protocol::ProtocolFile;
pub use registry::InvariantContext;
pub use state::RobotState;
pub use step::{plan_step, StepArgs};
pub use timeline::{build_timeline, Timeline};
