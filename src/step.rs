//! Protocol step arguments and dispatch.
//!
//! Steps arrive as JSON objects discriminated by `commandCreatorFnName`,
//! e.g. `{"commandCreatorFnName": "thermocyclerState", "moduleId": "tc1",
//! "lidOpen": false, ...}`. [`plan_step`] routes each to its compound creator.

use serde::{Deserialize, Serialize};

use crate::creators::compound::{
    self, AbsorbanceReaderInitializeArgs, AbsorbanceReaderLidArgs, AbsorbanceReaderReadArgs,
    ConsolidateArgs, DelayArgs, DistributeArgs, HeaterShakerArgs, MixStepArgs, MoveLabwareArgs,
    TemperatureArgs, ThermocyclerProfileArgs, ThermocyclerStateArgs, TransferArgs,
};
use crate::creators::CommandCreatorResult;
use crate::keys::KeyGenerator;
use crate::registry::InvariantContext;
use crate::state::RobotState;

/// One declarative protocol step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "commandCreatorFnName", rename_all = "camelCase")]
pub enum StepArgs {
    /// Reach a lid position and temperatures.
    ThermocyclerState(ThermocyclerStateArgs),
    /// Run a thermal profile, then hold.
    ThermocyclerProfile(ThermocyclerProfileArgs),
    /// Close the reader lid and configure wavelengths.
    AbsorbanceReaderInitialize(AbsorbanceReaderInitializeArgs),
    /// Close the reader lid and read the plate.
    AbsorbanceReaderRead(AbsorbanceReaderReadArgs),
    /// Open or close the reader lid.
    AbsorbanceReaderLid(AbsorbanceReaderLidArgs),
    /// Set or deactivate a temperature module.
    Temperature(TemperatureArgs),
    /// Latch, heat, shake and time a heater-shaker.
    HeaterShaker(HeaterShakerArgs),
    /// Timed pause or pause until resumed.
    Delay(DelayArgs),
    /// Relocate labware.
    MoveLabware(MoveLabwareArgs),
    /// Paired well-to-well transfers.
    Transfer(TransferArgs),
    /// Many sources into one destination.
    Consolidate(ConsolidateArgs),
    /// One source into many destinations.
    Distribute(DistributeArgs),
    /// Mix in each listed well.
    Mix(MixStepArgs),
}

impl StepArgs {
    /// Discriminator value of this step.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ThermocyclerState(_) => "thermocyclerState",
            Self::ThermocyclerProfile(_) => "thermocyclerProfile",
            Self::AbsorbanceReaderInitialize(_) => "absorbanceReaderInitialize",
            Self::AbsorbanceReaderRead(_) => "absorbanceReaderRead",
            Self::AbsorbanceReaderLid(_) => "absorbanceReaderLid",
            Self::Temperature(_) => "temperature",
            Self::HeaterShaker(_) => "heaterShaker",
            Self::Delay(_) => "delay",
            Self::MoveLabware(_) => "moveLabware",
            Self::Transfer(_) => "transfer",
            Self::Consolidate(_) => "consolidate",
            Self::Distribute(_) => "distribute",
            Self::Mix(_) => "mix",
        }
    }
}

/// Plan one step against `state`.
pub fn plan_step(
    step: &StepArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    match step {
        StepArgs::ThermocyclerState(a) => compound::thermocycler_state_step(a, ctx, state, keys),
        StepArgs::ThermocyclerProfile(a) => {
            compound::thermocycler_profile_step(a, ctx, state, keys)
        }
        StepArgs::AbsorbanceReaderInitialize(a) => {
            compound::absorbance_reader_initialize_step(a, ctx, state, keys)
        }
        StepArgs::AbsorbanceReaderRead(a) => {
            compound::absorbance_reader_read_step(a, ctx, state, keys)
        }
        StepArgs::AbsorbanceReaderLid(a) => compound::absorbance_reader_lid_step(a, ctx, state, keys),
        StepArgs::Temperature(a) => compound::temperature_step(a, ctx, state, keys),
        StepArgs::HeaterShaker(a) => compound::heater_shaker_step(a, ctx, state, keys),
        StepArgs::Delay(a) => compound::delay_step(a, ctx, state, keys),
        StepArgs::MoveLabware(a) => compound::move_labware_step(a, ctx, state, keys),
        StepArgs::Transfer(a) => compound::transfer(a, ctx, state, keys),
        StepArgs::Consolidate(a) => compound::consolidate(a, ctx, state, keys),
        StepArgs::Distribute(a) => compound::distribute(a, ctx, state, keys),
        StepArgs::Mix(a) => compound::mix_step(a, ctx, state, keys),
    }
}
