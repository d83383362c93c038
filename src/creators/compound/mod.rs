//! Compound command creators.
//!
//! Each compound creator resolves the sub-state it needs, decides which
//! transitions are required, stages them as [`CurriedCreator`]s and hands the
//! list to [`reduce_command_creators`]. Its result is the pipeline's result,
//! unchanged: either every command of the step or only errors.
//!
//! [`CurriedCreator`]: crate::pipeline::CurriedCreator
//! [`reduce_command_creators`]: crate::pipeline::reduce_command_creators

pub mod absorbance_reader;
pub mod common;
pub mod consolidate;
pub mod distribute;
pub mod heater_shaker;
pub mod misc;
pub mod mix;
pub mod pipetting;
pub mod temperature;
pub mod thermocycler;
pub mod tips;
pub mod transfer;

pub use absorbance_reader::{
    absorbance_reader_initialize_step, absorbance_reader_lid_step, absorbance_reader_read_step,
    AbsorbanceReaderInitializeArgs, AbsorbanceReaderLidArgs, AbsorbanceReaderReadArgs,
};
pub use common::{ChangeTip, DelaySettings, MixSettings, TransferLikeArgs};
pub use consolidate::{consolidate, ConsolidateArgs};
pub use distribute::{distribute, DistributeArgs};
pub use heater_shaker::{heater_shaker_step, HeaterShakerArgs};
pub use misc::{delay_step, move_labware_step, DelayArgs, MoveLabwareArgs};
pub use mix::{mix, mix_step, MixArgs, MixStepArgs};
pub use pipetting::{air_gap, blow_out, AirGapArgs, BlowOutArgs, BlowOutTarget};
pub use temperature::{temperature_step, TemperatureArgs};
pub use thermocycler::{
    thermocycler_profile_step, thermocycler_state_step, ThermocyclerProfileArgs,
    ThermocyclerStateArgs,
};
pub use tips::{drop_tip, replace_tip, DropTipArgs, ReplaceTipArgs};
pub use transfer::{transfer, TransferArgs};
