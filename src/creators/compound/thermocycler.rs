//! Thermocycler steps: reach a state, run a profile.

use serde::{Deserialize, Serialize};

use crate::command::{CommandBody, ModuleParams, ProfileStep, RunProfileParams, TemperatureParams};
use crate::creators::compound::common::invalid_arguments;
use crate::creators::diff::diff_thermocycler_state;
use crate::creators::CommandCreatorResult;
use crate::keys::KeyGenerator;
use crate::pipeline::{reduce_command_creators, CurriedCreator};
use crate::registry::InvariantContext;
use crate::state::selectors::require_module;
use crate::state::{RobotState, ThermocyclerState};

/// Arguments of the `thermocyclerState` step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThermocyclerStateArgs {
    pub module_id: String,
    /// Block target; `None` turns the block heater off.
    #[serde(default)]
    pub block_target_temp: Option<f64>,
    /// Lid heater target; `None` turns the lid heater off.
    #[serde(default)]
    pub lid_target_temp: Option<f64>,
    /// Desired lid position.
    pub lid_open: bool,
}

/// Bring a thermocycler to the requested lid position and temperatures.
///
/// Only transitions reported by the diff are emitted, in this order: lid
/// motion, block deactivate, block set + wait, lid deactivate, lid set + wait.
pub fn thermocycler_state_step(
    args: &ThermocyclerStateArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let current = require_module::<ThermocyclerState>(state, &args.module_id)?;
    let desired = ThermocyclerState {
        block_target_temp: args.block_target_temp,
        lid_target_temp: args.lid_target_temp,
        lid_open: Some(args.lid_open),
    };
    let diff = diff_thermocycler_state(current, &desired);
    let module = || ModuleParams::new(&args.module_id);

    let mut creators = Vec::new();
    if diff.needs_lid_open {
        creators.push(CurriedCreator::Atomic(CommandBody::ThermocyclerOpenLid(module())));
    }
    if diff.needs_lid_close {
        creators.push(CurriedCreator::Atomic(CommandBody::ThermocyclerCloseLid(module())));
    }
    if diff.needs_block_deactivate {
        creators.push(CurriedCreator::Atomic(CommandBody::ThermocyclerDeactivateBlock(module())));
    }
    if let (true, Some(celsius)) = (diff.needs_block_set, args.block_target_temp) {
        creators.push(CurriedCreator::Atomic(CommandBody::ThermocyclerSetTargetBlockTemperature(
            TemperatureParams {
                module_id: args.module_id.clone(),
                celsius,
            },
        )));
        creators.push(CurriedCreator::Atomic(CommandBody::ThermocyclerWaitForBlockTemperature(
            module(),
        )));
    }
    if diff.needs_lid_temp_deactivate {
        creators.push(CurriedCreator::Atomic(CommandBody::ThermocyclerDeactivateLid(module())));
    }
    if let (true, Some(celsius)) = (diff.needs_lid_temp_set, args.lid_target_temp) {
        creators.push(CurriedCreator::Atomic(CommandBody::ThermocyclerSetTargetLidTemperature(
            TemperatureParams {
                module_id: args.module_id.clone(),
                celsius,
            },
        )));
        creators.push(CurriedCreator::Atomic(CommandBody::ThermocyclerWaitForLidTemperature(
            module(),
        )));
    }
    reduce_command_creators(&creators, ctx, state, keys)
}

/// Arguments of the `thermocyclerProfile` step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThermocyclerProfileArgs {
    pub module_id: String,
    /// Temperature/hold pairs run in order.
    pub profile_steps: Vec<ProfileStep>,
    /// Lid heater temperature held while the profile runs.
    pub profile_target_lid_temp: f64,
    /// Liquid volume per well (µL).
    pub profile_volume: f64,
    /// State to leave the module in after the profile.
    #[serde(default)]
    pub block_target_temp_hold: Option<f64>,
    /// Lid heater target after the profile; `None` turns it off.
    #[serde(default)]
    pub lid_target_temp_hold: Option<f64>,
    /// Lid position after the profile.
    pub lid_open_hold: bool,
}

/// Close the lid, heat it, run the profile, then settle into the hold state.
///
/// The hold is reached through [`thermocycler_state_step`] against the
/// post-profile state, so a hold equal to the last profile temperature emits
/// no extra block commands.
pub fn thermocycler_profile_step(
    args: &ThermocyclerProfileArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let current = require_module::<ThermocyclerState>(state, &args.module_id)?;
    if args.profile_steps.is_empty() {
        return Err(invalid_arguments("thermocycler profile has no steps").into());
    }
    let module = || ModuleParams::new(&args.module_id);

    let mut creators = Vec::new();
    if current.lid_open != Some(false) {
        creators.push(CurriedCreator::Atomic(CommandBody::ThermocyclerCloseLid(module())));
    }
    if current.lid_target_temp != Some(args.profile_target_lid_temp) {
        creators.push(CurriedCreator::Atomic(CommandBody::ThermocyclerSetTargetLidTemperature(
            TemperatureParams {
                module_id: args.module_id.clone(),
                celsius: args.profile_target_lid_temp,
            },
        )));
        creators.push(CurriedCreator::Atomic(CommandBody::ThermocyclerWaitForLidTemperature(
            module(),
        )));
    }
    creators.push(CurriedCreator::Atomic(CommandBody::ThermocyclerRunProfile(RunProfileParams {
        module_id: args.module_id.clone(),
        profile: args.profile_steps.clone(),
        block_max_volume_ul: args.profile_volume,
    })));
    creators.push(CurriedCreator::Atomic(CommandBody::ThermocyclerAwaitProfileComplete(module())));
    creators.push(CurriedCreator::ThermocyclerState(ThermocyclerStateArgs {
        module_id: args.module_id.clone(),
        block_target_temp: args.block_target_temp_hold,
        lid_target_temp: args.lid_target_temp_hold,
        lid_open: args.lid_open_hold,
    }));
    reduce_command_creators(&creators, ctx, state, keys)
}
