//! Atomic command creators: exactly one command per successful call.
//!
//! [`create`] maps a [`CommandBody`] to the creator for its command type. The
//! pipeline uses it to execute a staged atomic step, whose bound arguments are
//! simply the command payload.

pub mod absorbance_reader;
pub mod heater_shaker;
pub mod misc;
pub mod pipetting;
pub mod temperature;
pub mod thermocycler;

use crate::command::CommandBody;
use crate::creators::CommandCreatorResult;
use crate::keys::KeyGenerator;
use crate::registry::InvariantContext;
use crate::state::RobotState;

/// Run the atomic creator for `body`.
pub fn create(
    body: &CommandBody,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    match body {
        CommandBody::PickUpTip(a) => pipetting::pick_up_tip(a, ctx, state, keys),
        CommandBody::DropTipInPlace(a) => pipetting::drop_tip_in_place(a, ctx, state, keys),
        CommandBody::MoveToAddressableAreaForDropTip(a) => {
            pipetting::move_to_addressable_area_for_drop_tip(a, ctx, state, keys)
        }
        CommandBody::MoveToAddressableArea(a) => {
            pipetting::move_to_addressable_area(a, ctx, state, keys)
        }
        CommandBody::MoveToWell(a) => pipetting::move_to_well(a, ctx, state, keys),
        CommandBody::Aspirate(a) => pipetting::aspirate(a, ctx, state, keys),
        CommandBody::Dispense(a) => pipetting::dispense(a, ctx, state, keys),
        CommandBody::AirGapInPlace(a) => pipetting::air_gap_in_place(a, ctx, state, keys),
        CommandBody::Blowout(a) => pipetting::blowout(a, ctx, state, keys),
        CommandBody::BlowOutInPlace(a) => pipetting::blow_out_in_place(a, ctx, state, keys),
        CommandBody::TouchTip(a) => pipetting::touch_tip(a, ctx, state, keys),

        CommandBody::WaitForDuration(a) => misc::wait_for_duration(a, ctx, state, keys),
        CommandBody::WaitForResume(a) => misc::wait_for_resume(a, ctx, state, keys),
        CommandBody::MoveLabware(a) => misc::move_labware(a, ctx, state, keys),

        CommandBody::TemperatureModuleSetTargetTemperature(a) => {
            temperature::set_target_temperature(a, ctx, state, keys)
        }
        CommandBody::TemperatureModuleWaitForTemperature(a) => {
            temperature::wait_for_temperature(a, ctx, state, keys)
        }
        CommandBody::TemperatureModuleDeactivate(a) => temperature::deactivate(a, ctx, state, keys),

        CommandBody::ThermocyclerOpenLid(a) => thermocycler::open_lid(a, ctx, state, keys),
        CommandBody::ThermocyclerCloseLid(a) => thermocycler::close_lid(a, ctx, state, keys),
        CommandBody::ThermocyclerSetTargetBlockTemperature(a) => {
            thermocycler::set_target_block_temperature(a, ctx, state, keys)
        }
        CommandBody::ThermocyclerWaitForBlockTemperature(a) => {
            thermocycler::wait_for_block_temperature(a, ctx, state, keys)
        }
        CommandBody::ThermocyclerSetTargetLidTemperature(a) => {
            thermocycler::set_target_lid_temperature(a, ctx, state, keys)
        }
        CommandBody::ThermocyclerWaitForLidTemperature(a) => {
            thermocycler::wait_for_lid_temperature(a, ctx, state, keys)
        }
        CommandBody::ThermocyclerDeactivateBlock(a) => {
            thermocycler::deactivate_block(a, ctx, state, keys)
        }
        CommandBody::ThermocyclerDeactivateLid(a) => {
            thermocycler::deactivate_lid(a, ctx, state, keys)
        }
        CommandBody::ThermocyclerRunProfile(a) => thermocycler::run_profile(a, ctx, state, keys),
        CommandBody::ThermocyclerAwaitProfileComplete(a) => {
            thermocycler::await_profile_complete(a, ctx, state, keys)
        }

        CommandBody::HeaterShakerSetTargetTemperature(a) => {
            heater_shaker::set_target_temperature(a, ctx, state, keys)
        }
        CommandBody::HeaterShakerWaitForTemperature(a) => {
            heater_shaker::wait_for_temperature(a, ctx, state, keys)
        }
        CommandBody::HeaterShakerDeactivateHeater(a) => {
            heater_shaker::deactivate_heater(a, ctx, state, keys)
        }
        CommandBody::HeaterShakerSetAndWaitForShakeSpeed(a) => {
            heater_shaker::set_and_wait_for_shake_speed(a, ctx, state, keys)
        }
        CommandBody::HeaterShakerDeactivateShaker(a) => {
            heater_shaker::deactivate_shaker(a, ctx, state, keys)
        }
        CommandBody::HeaterShakerOpenLabwareLatch(a) => {
            heater_shaker::open_labware_latch(a, ctx, state, keys)
        }
        CommandBody::HeaterShakerCloseLabwareLatch(a) => {
            heater_shaker::close_labware_latch(a, ctx, state, keys)
        }

        CommandBody::AbsorbanceReaderOpenLid(a) => absorbance_reader::open_lid(a, ctx, state, keys),
        CommandBody::AbsorbanceReaderCloseLid(a) => {
            absorbance_reader::close_lid(a, ctx, state, keys)
        }
        CommandBody::AbsorbanceReaderInitialize(a) => {
            absorbance_reader::initialize(a, ctx, state, keys)
        }
        CommandBody::AbsorbanceReaderRead(a) => absorbance_reader::read(a, ctx, state, keys),
    }
}
