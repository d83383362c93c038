//! Delay and labware-movement steps.

use serde::{Deserialize, Serialize};

use crate::command::{
    CommandBody, LabwareMovementStrategy, MoveLabwareParams, WaitForDurationParams,
    WaitForResumeParams,
};
use crate::creators::CommandCreatorResult;
use crate::keys::KeyGenerator;
use crate::pipeline::{reduce_command_creators, CurriedCreator};
use crate::registry::InvariantContext;
use crate::state::{LabwareLocation, RobotState};

/// Arguments of the `delay` step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayArgs {
    /// Pause length; pause until resumed when absent.
    #[serde(default)]
    pub seconds: Option<f64>,
    /// Text shown to the operator during the pause.
    #[serde(default)]
    pub message: Option<String>,
}

/// Timed pause, or pause until the operator resumes.
pub fn delay_step(
    args: &DelayArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let body = match args.seconds {
        Some(seconds) => CommandBody::WaitForDuration(WaitForDurationParams {
            seconds,
            message: args.message.clone(),
        }),
        None => CommandBody::WaitForResume(WaitForResumeParams {
            message: args.message.clone(),
        }),
    };
    reduce_command_creators(&[CurriedCreator::Atomic(body)], ctx, state, keys)
}

/// Arguments of the `moveLabware` step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveLabwareArgs {
    /// Labware to move.
    pub labware_id: String,
    /// Where the labware ends up.
    pub new_location: LabwareLocation,
    /// Move with the gripper instead of pausing for a manual move.
    #[serde(default)]
    pub use_gripper: bool,
}

/// Relocate a labware with the gripper or by hand.
pub fn move_labware_step(
    args: &MoveLabwareArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let strategy = if args.use_gripper {
        LabwareMovementStrategy::UsingGripper
    } else {
        LabwareMovementStrategy::ManualMoveWithPause
    };
    let body = CommandBody::MoveLabware(MoveLabwareParams {
        labware_id: args.labware_id.clone(),
        new_location: args.new_location.clone(),
        strategy,
    });
    reduce_command_creators(&[CurriedCreator::Atomic(body)], ctx, state, keys)
}
