//! Heater-shaker step.

use serde::{Deserialize, Serialize};

use crate::command::{
    CommandBody, ModuleParams, ShakeSpeedParams, TemperatureParams, WaitForDurationParams,
};
use crate::creators::CommandCreatorResult;
use crate::error::CommandCreatorError;
use crate::keys::KeyGenerator;
use crate::pipeline::{reduce_command_creators, CurriedCreator};
use crate::registry::InvariantContext;
use crate::state::selectors::require_module;
use crate::state::{HeaterShakerState, RobotState};

/// Arguments of the `heaterShaker` step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaterShakerArgs {
    pub module_id: String,
    /// Heater target; `None` turns the heater off.
    #[serde(default)]
    pub target_temperature: Option<f64>,
    /// Shake speed; `None` stops shaking.
    #[serde(default)]
    pub rpm: Option<f64>,
    /// Desired labware latch position.
    pub latch_open: bool,
    /// Run for this long, then stop shaking and heating.
    #[serde(default)]
    pub timer_seconds: Option<f64>,
}

/// Latch, then heater, then shaker, then the optional timer.
pub fn heater_shaker_step(
    args: &HeaterShakerArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let current = require_module::<HeaterShakerState>(state, &args.module_id)?;
    if args.latch_open && args.rpm.is_some() {
        return Err(CommandCreatorError::HeaterShakerLatchOpen {
            module_id: args.module_id.clone(),
        }
        .into());
    }
    let module = || ModuleParams::new(&args.module_id);
    let atomic = CurriedCreator::Atomic;

    let mut creators = Vec::new();
    if current.latch_open != Some(args.latch_open) {
        creators.push(atomic(if args.latch_open {
            CommandBody::HeaterShakerOpenLabwareLatch(module())
        } else {
            CommandBody::HeaterShakerCloseLabwareLatch(module())
        }));
    }

    match args.target_temperature {
        Some(celsius) if current.target_temp != Some(celsius) => {
            creators.push(atomic(CommandBody::HeaterShakerSetTargetTemperature(
                TemperatureParams {
                    module_id: args.module_id.clone(),
                    celsius,
                },
            )));
            creators.push(atomic(CommandBody::HeaterShakerWaitForTemperature(module())));
        }
        None if current.target_temp.is_some() => {
            creators.push(atomic(CommandBody::HeaterShakerDeactivateHeater(module())));
        }
        _ => {}
    }

    match args.rpm {
        Some(rpm) if current.target_speed != Some(rpm) => {
            creators.push(atomic(CommandBody::HeaterShakerSetAndWaitForShakeSpeed(
                ShakeSpeedParams {
                    module_id: args.module_id.clone(),
                    rpm,
                },
            )));
        }
        None if current.target_speed.is_some() => {
            creators.push(atomic(CommandBody::HeaterShakerDeactivateShaker(module())));
        }
        _ => {}
    }

    if let Some(seconds) = args.timer_seconds {
        creators.push(atomic(CommandBody::WaitForDuration(WaitForDurationParams {
            seconds,
            message: None,
        })));
        if args.rpm.is_some() {
            creators.push(atomic(CommandBody::HeaterShakerDeactivateShaker(module())));
        }
        if args.target_temperature.is_some() {
            creators.push(atomic(CommandBody::HeaterShakerDeactivateHeater(module())));
        }
    }
    reduce_command_creators(&creators, ctx, state, keys)
}
