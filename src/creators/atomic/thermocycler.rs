//! Thermocycler atomic creators.
//!
//! Validation-free: the compound creator that builds the arguments has already
//! resolved the module through a selector.

use crate::command::{CommandBody, ModuleParams, RunProfileParams, TemperatureParams};
use crate::creators::{emit, CommandCreatorResult};
use crate::keys::KeyGenerator;
use crate::registry::InvariantContext;
use crate::state::RobotState;

/// `thermocycler/openLid`
pub fn open_lid(
    args: &ModuleParams,
    _ctx: &InvariantContext,
    _state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    emit(keys, CommandBody::ThermocyclerOpenLid(args.clone()))
}

/// `thermocycler/closeLid`
pub fn close_lid(
    args: &ModuleParams,
    _ctx: &InvariantContext,
    _state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    emit(keys, CommandBody::ThermocyclerCloseLid(args.clone()))
}

/// `thermocycler/setTargetBlockTemperature`
pub fn set_target_block_temperature(
    args: &TemperatureParams,
    _ctx: &InvariantContext,
    _state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    emit(keys, CommandBody::ThermocyclerSetTargetBlockTemperature(args.clone()))
}

/// `thermocycler/waitForBlockTemperature`
pub fn wait_for_block_temperature(
    args: &ModuleParams,
    _ctx: &InvariantContext,
    _state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    emit(keys, CommandBody::ThermocyclerWaitForBlockTemperature(args.clone()))
}

/// `thermocycler/setTargetLidTemperature`
pub fn set_target_lid_temperature(
    args: &TemperatureParams,
    _ctx: &InvariantContext,
    _state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    emit(keys, CommandBody::ThermocyclerSetTargetLidTemperature(args.clone()))
}

/// `thermocycler/waitForLidTemperature`
pub fn wait_for_lid_temperature(
    args: &ModuleParams,
    _ctx: &InvariantContext,
    _state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    emit(keys, CommandBody::ThermocyclerWaitForLidTemperature(args.clone()))
}

/// `thermocycler/deactivateBlock`
pub fn deactivate_block(
    args: &ModuleParams,
    _ctx: &InvariantContext,
    _state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    emit(keys, CommandBody::ThermocyclerDeactivateBlock(args.clone()))
}

/// `thermocycler/deactivateLid`
pub fn deactivate_lid(
    args: &ModuleParams,
    _ctx: &InvariantContext,
    _state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    emit(keys, CommandBody::ThermocyclerDeactivateLid(args.clone()))
}

/// `thermocycler/runProfile`
pub fn run_profile(
    args: &RunProfileParams,
    _ctx: &InvariantContext,
    _state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    emit(keys, CommandBody::ThermocyclerRunProfile(args.clone()))
}

/// `thermocycler/awaitProfileComplete`
pub fn await_profile_complete(
    args: &ModuleParams,
    _ctx: &InvariantContext,
    _state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    emit(keys, CommandBody::ThermocyclerAwaitProfileComplete(args.clone()))
}
