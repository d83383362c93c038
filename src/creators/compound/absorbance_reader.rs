//! Absorbance plate reader steps.
//!
//! Reader steps are fixed sequences: the lid is closed before every
//! initialize or read regardless of its tracked position.

use serde::{Deserialize, Serialize};

use crate::command::{
    AbsorbanceInitializeParams, AbsorbanceReadParams, CommandBody, MeasureMode, ModuleParams,
};
use crate::creators::compound::common::invalid_arguments;
use crate::creators::CommandCreatorResult;
use crate::keys::KeyGenerator;
use crate::pipeline::{reduce_command_creators, CurriedCreator};
use crate::registry::InvariantContext;
use crate::state::selectors::require_module;
use crate::state::{AbsorbanceReaderState, RobotState};

/// Most wavelengths a multi-mode read accepts.
pub const MAX_MULTI_WAVELENGTHS: usize = 6;

/// Arguments of the `absorbanceReaderInitialize` step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsorbanceReaderInitializeArgs {
    pub module_id: String,
    /// Single or multi-wavelength measurement.
    pub measure_mode: MeasureMode,
    /// Wavelengths to measure (nm).
    pub sample_wavelengths: Vec<u32>,
    /// Reference wavelength for single mode (nm).
    #[serde(default)]
    pub reference_wavelength: Option<u32>,
}

/// Arguments of the `absorbanceReaderRead` step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsorbanceReaderReadArgs {
    pub module_id: String,
    /// Results file; no file is written when absent.
    #[serde(default)]
    pub file_name: Option<String>,
}

/// Arguments of the `absorbanceReaderLid` step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsorbanceReaderLidArgs {
    pub module_id: String,
    /// Desired lid position.
    pub lid_open: bool,
}

/// Close the lid, then configure wavelengths.
pub fn absorbance_reader_initialize_step(
    args: &AbsorbanceReaderInitializeArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    require_module::<AbsorbanceReaderState>(state, &args.module_id)?;
    let count = args.sample_wavelengths.len();
    let valid = match args.measure_mode {
        MeasureMode::Single => count == 1,
        MeasureMode::Multi => (1..=MAX_MULTI_WAVELENGTHS).contains(&count),
    };
    if !valid {
        return Err(invalid_arguments(format!(
            "{count} sample wavelengths given for {:?} mode",
            args.measure_mode
        ))
        .into());
    }

    let creators = [
        CurriedCreator::Atomic(CommandBody::AbsorbanceReaderCloseLid(ModuleParams::new(
            &args.module_id,
        ))),
        CurriedCreator::Atomic(CommandBody::AbsorbanceReaderInitialize(
            AbsorbanceInitializeParams {
                module_id: args.module_id.clone(),
                measure_mode: args.measure_mode,
                sample_wavelengths: args.sample_wavelengths.clone(),
                reference_wavelength: args.reference_wavelength,
            },
        )),
    ];
    reduce_command_creators(&creators, ctx, state, keys)
}

/// Close the lid, then read.
pub fn absorbance_reader_read_step(
    args: &AbsorbanceReaderReadArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    require_module::<AbsorbanceReaderState>(state, &args.module_id)?;
    let creators = [
        CurriedCreator::Atomic(CommandBody::AbsorbanceReaderCloseLid(ModuleParams::new(
            &args.module_id,
        ))),
        CurriedCreator::Atomic(CommandBody::AbsorbanceReaderRead(AbsorbanceReadParams {
            module_id: args.module_id.clone(),
            file_name: args.file_name.clone(),
        })),
    ];
    reduce_command_creators(&creators, ctx, state, keys)
}

/// Open or close the reader lid.
pub fn absorbance_reader_lid_step(
    args: &AbsorbanceReaderLidArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    require_module::<AbsorbanceReaderState>(state, &args.module_id)?;
    let module = ModuleParams::new(&args.module_id);
    let body = if args.lid_open {
        CommandBody::AbsorbanceReaderOpenLid(module)
    } else {
        CommandBody::AbsorbanceReaderCloseLid(module)
    };
    reduce_command_creators(&[CurriedCreator::Atomic(body)], ctx, state, keys)
}
