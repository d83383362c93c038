//! Flow-control and labware-movement atomic creators.

use crate::command::{
    CommandBody, LabwareMovementStrategy, MoveLabwareParams, WaitForDurationParams,
    WaitForResumeParams,
};
use crate::creators::{emit, CommandCreatorResult};
use crate::error::CommandCreatorError;
use crate::keys::KeyGenerator;
use crate::registry::InvariantContext;
use crate::state::selectors::thermocycler_state;
use crate::state::{LabwareLocation, RobotState};

/// `waitForDuration`
pub fn wait_for_duration(
    args: &WaitForDurationParams,
    _ctx: &InvariantContext,
    _state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    emit(keys, CommandBody::WaitForDuration(args.clone()))
}

/// `waitForResume`
pub fn wait_for_resume(
    args: &WaitForResumeParams,
    _ctx: &InvariantContext,
    _state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    emit(keys, CommandBody::WaitForResume(args.clone()))
}

fn closed_thermocycler(state: &RobotState, module_id: &str) -> Option<CommandCreatorError> {
    thermocycler_state(state, module_id)
        .filter(|tc| tc.lid_open != Some(true))
        .map(|_| CommandCreatorError::ThermocyclerLidClosed {
            module_id: module_id.to_string(),
        })
}

fn check_move_labware(
    args: &MoveLabwareParams,
    ctx: &InvariantContext,
    state: &RobotState,
) -> Result<(), CommandCreatorError> {
    ctx.labware(&args.labware_id)?;

    if args.strategy == LabwareMovementStrategy::UsingGripper && !ctx.has_gripper() {
        return Err(CommandCreatorError::GripperRequired);
    }

    // Neither the origin nor the destination may be under a closed lid.
    if let Some(module_id) = state.module_under_labware(&args.labware_id) {
        if let Some(err) = closed_thermocycler(state, module_id) {
            return Err(err);
        }
    }
    if let LabwareLocation::Module { module_id } = &args.new_location {
        if !state.modules.contains_key(module_id) {
            return Err(CommandCreatorError::MissingModule {
                module_id: module_id.clone(),
            });
        }
        if let Some(err) = closed_thermocycler(state, module_id) {
            return Err(err);
        }
    }
    Ok(())
}

/// `moveLabware`
pub fn move_labware(
    args: &MoveLabwareParams,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    check_move_labware(args, ctx, state)?;
    emit(keys, CommandBody::MoveLabware(args.clone()))
}
