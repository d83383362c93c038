//! Temperature module step.

use serde::{Deserialize, Serialize};

use crate::command::{CommandBody, ModuleParams, TemperatureParams};
use crate::creators::diff::diff_temperature_state;
use crate::creators::CommandCreatorResult;
use crate::keys::KeyGenerator;
use crate::pipeline::{reduce_command_creators, CurriedCreator};
use crate::registry::InvariantContext;
use crate::state::selectors::require_module;
use crate::state::{RobotState, TemperatureModuleState};

/// Arguments of the `temperature` step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureArgs {
    pub module_id: String,
    /// Target; `None` deactivates the module.
    #[serde(default)]
    pub target_temperature: Option<f64>,
}

/// Set and wait for a target, or deactivate, as the diff requires.
pub fn temperature_step(
    args: &TemperatureArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let current = require_module::<TemperatureModuleState>(state, &args.module_id)?;
    let diff = diff_temperature_state(current, args.target_temperature);

    let mut creators = Vec::new();
    if diff.needs_deactivate {
        creators.push(CurriedCreator::Atomic(CommandBody::TemperatureModuleDeactivate(
            ModuleParams::new(&args.module_id),
        )));
    }
    if let (true, Some(celsius)) = (diff.needs_set, args.target_temperature) {
        creators.push(CurriedCreator::Atomic(CommandBody::TemperatureModuleSetTargetTemperature(
            TemperatureParams {
                module_id: args.module_id.clone(),
                celsius,
            },
        )));
        creators.push(CurriedCreator::Atomic(CommandBody::TemperatureModuleWaitForTemperature(
            ModuleParams::new(&args.module_id),
        )));
    }
    reduce_command_creators(&creators, ctx, state, keys)
}
