//! Temperature module atomic creators.

use crate::command::{CommandBody, ModuleParams, TemperatureParams};
use crate::creators::{emit, CommandCreatorResult};
use crate::keys::KeyGenerator;
use crate::registry::InvariantContext;
use crate::state::RobotState;

/// `temperatureModule/setTargetTemperature`
pub fn set_target_temperature(
    args: &TemperatureParams,
    _ctx: &InvariantContext,
    _state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    emit(keys, CommandBody::TemperatureModuleSetTargetTemperature(args.clone()))
}

/// `temperatureModule/waitForTemperature`
pub fn wait_for_temperature(
    args: &ModuleParams,
    _ctx: &InvariantContext,
    _state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    emit(keys, CommandBody::TemperatureModuleWaitForTemperature(args.clone()))
}

/// `temperatureModule/deactivate`
pub fn deactivate(
    args: &ModuleParams,
    _ctx: &InvariantContext,
    _state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    emit(keys, CommandBody::TemperatureModuleDeactivate(args.clone()))
}
