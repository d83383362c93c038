//! Heater-shaker atomic creators.

use crate::command::{CommandBody, ModuleParams, ShakeSpeedParams, TemperatureParams};
use crate::creators::{emit, CommandCreatorResult};
use crate::keys::KeyGenerator;
use crate::registry::InvariantContext;
use crate::state::RobotState;

/// `heaterShaker/setTargetTemperature`
pub fn set_target_temperature(
    args: &TemperatureParams,
    _ctx: &InvariantContext,
    _state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    emit(keys, CommandBody::HeaterShakerSetTargetTemperature(args.clone()))
}

/// `heaterShaker/waitForTemperature`
pub fn wait_for_temperature(
    args: &ModuleParams,
    _ctx: &InvariantContext,
    _state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    emit(keys, CommandBody::HeaterShakerWaitForTemperature(args.clone()))
}

/// `heaterShaker/deactivateHeater`
pub fn deactivate_heater(
    args: &ModuleParams,
    _ctx: &InvariantContext,
    _state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    emit(keys, CommandBody::HeaterShakerDeactivateHeater(args.clone()))
}

/// `heaterShaker/setAndWaitForShakeSpeed`
pub fn set_and_wait_for_shake_speed(
    args: &ShakeSpeedParams,
    _ctx: &InvariantContext,
    _state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    emit(keys, CommandBody::HeaterShakerSetAndWaitForShakeSpeed(args.clone()))
}

/// `heaterShaker/deactivateShaker`
pub fn deactivate_shaker(
    args: &ModuleParams,
    _ctx: &InvariantContext,
    _state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    emit(keys, CommandBody::HeaterShakerDeactivateShaker(args.clone()))
}

/// `heaterShaker/openLabwareLatch`
pub fn open_labware_latch(
    args: &ModuleParams,
    _ctx: &InvariantContext,
    _state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    emit(keys, CommandBody::HeaterShakerOpenLabwareLatch(args.clone()))
}

/// `heaterShaker/closeLabwareLatch`
pub fn close_labware_latch(
    args: &ModuleParams,
    _ctx: &InvariantContext,
    _state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    emit(keys, CommandBody::HeaterShakerCloseLabwareLatch(args.clone()))
}
