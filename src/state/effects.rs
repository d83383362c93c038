//! Pure state-effect function.
//!
//! [`next_robot_state`] advances a [`RobotState`] snapshot by the semantics of
//! one command: tips are consumed and attached, liquid moves between wells and
//! tips, module set-points change. The input snapshot is never modified; the
//! function clones it once and patches the copy.
//!
//! Effects assume the command was produced by a validating creator. References
//! to unknown pipettes or modules are skipped rather than reported, because
//! reporting is the creator's job.

use super::liquid::{self, LocationLiquidState, AIR};
use super::{
    AbsorbanceInitialization, AttachedTip, ModuleState, RobotState, TemperatureStatus,
};
use crate::command::{Command, CommandBody};
use crate::registry::InvariantContext;

/// State after applying `command` to `state`.
pub fn next_robot_state(
    command: &CommandBody,
    ctx: &InvariantContext,
    state: &RobotState,
) -> RobotState {
    let mut next = state.clone();
    apply_in_place(command, ctx, &mut next);
    next
}

/// State after applying every command in order.
pub fn apply_commands(commands: &[Command], ctx: &InvariantContext, state: &RobotState) -> RobotState {
    let mut next = state.clone();
    for command in commands {
        apply_in_place(&command.body, ctx, &mut next);
    }
    next
}

fn apply_in_place(command: &CommandBody, _ctx: &InvariantContext, state: &mut RobotState) {
    match command {
        CommandBody::PickUpTip(p) => {
            if let Some(rack) = state.tip_state.tipracks.get_mut(&p.labware_id) {
                rack.insert(p.well_name.clone(), false);
            }
            if let Some(pipette) = state.pipettes.get_mut(&p.pipette_id) {
                pipette.tip = Some(AttachedTip {
                    tiprack_id: p.labware_id.clone(),
                    well_name: p.well_name.clone(),
                });
                pipette.tip_volume = 0.0;
            }
            state.liquid_state.pipettes.remove(&p.pipette_id);
        }
        CommandBody::DropTipInPlace(p) => {
            if let Some(pipette) = state.pipettes.get_mut(&p.pipette_id) {
                pipette.tip = None;
                pipette.tip_volume = 0.0;
            }
            state.liquid_state.pipettes.remove(&p.pipette_id);
        }
        CommandBody::Aspirate(p) => {
            let well = well_liquid(state, &p.labware_id, &p.well_name);
            let (taken, remaining) = liquid::split_liquid(p.volume, &well);
            set_well_liquid(state, &p.labware_id, &p.well_name, remaining);
            let tip = tip_liquid(state, &p.pipette_id);
            set_tip_liquid(state, &p.pipette_id, liquid::merge_liquid(&tip, &taken));
            if let Some(pipette) = state.pipettes.get_mut(&p.pipette_id) {
                pipette.tip_volume += p.volume;
            }
        }
        CommandBody::Dispense(p) => {
            let held = state.tip_volume(&p.pipette_id);
            if held > liquid::VOLUME_EPSILON {
                let tip = tip_liquid(state, &p.pipette_id);
                let (delivered, remaining) = liquid::dispense_from_tip(p.volume, held, &tip);
                let well = well_liquid(state, &p.labware_id, &p.well_name);
                set_well_liquid(
                    state,
                    &p.labware_id,
                    &p.well_name,
                    liquid::merge_liquid(&well, &delivered),
                );
                set_tip_liquid(state, &p.pipette_id, remaining);
            }
            if let Some(pipette) = state.pipettes.get_mut(&p.pipette_id) {
                pipette.tip_volume = (held - p.volume).max(0.0);
            }
        }
        CommandBody::AirGapInPlace(p) => {
            let mut tip = tip_liquid(state, &p.pipette_id);
            *tip.entry(AIR.to_string()).or_insert(0.0) += p.volume;
            set_tip_liquid(state, &p.pipette_id, tip);
            if let Some(pipette) = state.pipettes.get_mut(&p.pipette_id) {
                pipette.tip_volume += p.volume;
            }
        }
        CommandBody::Blowout(p) => {
            let tip = tip_liquid(state, &p.pipette_id);
            let well = well_liquid(state, &p.labware_id, &p.well_name);
            set_well_liquid(
                state,
                &p.labware_id,
                &p.well_name,
                liquid::merge_liquid(&well, &liquid::without_air(&tip)),
            );
            empty_tip(state, &p.pipette_id);
        }
        CommandBody::BlowOutInPlace(p) => empty_tip(state, &p.pipette_id),

        CommandBody::MoveLabware(p) => {
            if let Some(lw) = state.labware.get_mut(&p.labware_id) {
                lw.location = p.new_location.clone();
            }
        }

        CommandBody::TemperatureModuleSetTargetTemperature(p) => {
            if let Some(ModuleState::Temperature(s)) = module_state_mut(state, &p.module_id) {
                s.status = TemperatureStatus::Approaching;
                s.target_temperature = Some(p.celsius);
            }
        }
        CommandBody::TemperatureModuleWaitForTemperature(p) => {
            if let Some(ModuleState::Temperature(s)) = module_state_mut(state, &p.module_id) {
                if s.target_temperature.is_some() {
                    s.status = TemperatureStatus::AtTarget;
                }
            }
        }
        CommandBody::TemperatureModuleDeactivate(p) => {
            if let Some(ModuleState::Temperature(s)) = module_state_mut(state, &p.module_id) {
                s.status = TemperatureStatus::Deactivated;
                s.target_temperature = None;
            }
        }

        CommandBody::ThermocyclerOpenLid(p) | CommandBody::ThermocyclerCloseLid(p) => {
            let open = matches!(command, CommandBody::ThermocyclerOpenLid(_));
            if let Some(ModuleState::Thermocycler(s)) = module_state_mut(state, &p.module_id) {
                s.lid_open = Some(open);
            }
        }
        CommandBody::ThermocyclerSetTargetBlockTemperature(p) => {
            if let Some(ModuleState::Thermocycler(s)) = module_state_mut(state, &p.module_id) {
                s.block_target_temp = Some(p.celsius);
            }
        }
        CommandBody::ThermocyclerSetTargetLidTemperature(p) => {
            if let Some(ModuleState::Thermocycler(s)) = module_state_mut(state, &p.module_id) {
                s.lid_target_temp = Some(p.celsius);
            }
        }
        CommandBody::ThermocyclerDeactivateBlock(p) => {
            if let Some(ModuleState::Thermocycler(s)) = module_state_mut(state, &p.module_id) {
                s.block_target_temp = None;
            }
        }
        CommandBody::ThermocyclerDeactivateLid(p) => {
            if let Some(ModuleState::Thermocycler(s)) = module_state_mut(state, &p.module_id) {
                s.lid_target_temp = None;
            }
        }
        CommandBody::ThermocyclerRunProfile(p) => {
            // The block holds the final profile temperature once the run ends.
            if let Some(ModuleState::Thermocycler(s)) = module_state_mut(state, &p.module_id) {
                if let Some(last) = p.profile.last() {
                    s.block_target_temp = Some(last.celsius);
                }
            }
        }

        CommandBody::HeaterShakerSetTargetTemperature(p) => {
            if let Some(ModuleState::HeaterShaker(s)) = module_state_mut(state, &p.module_id) {
                s.target_temp = Some(p.celsius);
            }
        }
        CommandBody::HeaterShakerDeactivateHeater(p) => {
            if let Some(ModuleState::HeaterShaker(s)) = module_state_mut(state, &p.module_id) {
                s.target_temp = None;
            }
        }
        CommandBody::HeaterShakerSetAndWaitForShakeSpeed(p) => {
            if let Some(ModuleState::HeaterShaker(s)) = module_state_mut(state, &p.module_id) {
                s.target_speed = Some(p.rpm);
            }
        }
        CommandBody::HeaterShakerDeactivateShaker(p) => {
            if let Some(ModuleState::HeaterShaker(s)) = module_state_mut(state, &p.module_id) {
                s.target_speed = None;
            }
        }
        CommandBody::HeaterShakerOpenLabwareLatch(p) | CommandBody::HeaterShakerCloseLabwareLatch(p) => {
            let open = matches!(command, CommandBody::HeaterShakerOpenLabwareLatch(_));
            if let Some(ModuleState::HeaterShaker(s)) = module_state_mut(state, &p.module_id) {
                s.latch_open = Some(open);
            }
        }

        CommandBody::AbsorbanceReaderOpenLid(p) | CommandBody::AbsorbanceReaderCloseLid(p) => {
            let open = matches!(command, CommandBody::AbsorbanceReaderOpenLid(_));
            if let Some(ModuleState::AbsorbanceReader(s)) = module_state_mut(state, &p.module_id) {
                s.lid_open = Some(open);
            }
        }
        CommandBody::AbsorbanceReaderInitialize(p) => {
            if let Some(ModuleState::AbsorbanceReader(s)) = module_state_mut(state, &p.module_id) {
                s.initialization = Some(AbsorbanceInitialization {
                    measure_mode: p.measure_mode,
                    sample_wavelengths: p.sample_wavelengths.clone(),
                    reference_wavelength: p.reference_wavelength,
                });
            }
        }

        // Motion, waits and reads leave the simulated state unchanged.
        CommandBody::MoveToAddressableAreaForDropTip(_)
        | CommandBody::MoveToAddressableArea(_)
        | CommandBody::MoveToWell(_)
        | CommandBody::TouchTip(_)
        | CommandBody::WaitForDuration(_)
        | CommandBody::WaitForResume(_)
        | CommandBody::ThermocyclerWaitForBlockTemperature(_)
        | CommandBody::ThermocyclerWaitForLidTemperature(_)
        | CommandBody::ThermocyclerAwaitProfileComplete(_)
        | CommandBody::HeaterShakerWaitForTemperature(_)
        | CommandBody::AbsorbanceReaderRead(_) => {}
    }
}

fn module_state_mut<'a>(state: &'a mut RobotState, module_id: &str) -> Option<&'a mut ModuleState> {
    state.modules.get_mut(module_id).map(|m| &mut m.module_state)
}

fn well_liquid(state: &RobotState, labware_id: &str, well_name: &str) -> LocationLiquidState {
    state
        .well_liquid(labware_id, well_name)
        .cloned()
        .unwrap_or_default()
}

fn set_well_liquid(
    state: &mut RobotState,
    labware_id: &str,
    well_name: &str,
    contents: LocationLiquidState,
) {
    let contents = liquid::prune(contents);
    if contents.is_empty() {
        if let Some(wells) = state.liquid_state.labware.get_mut(labware_id) {
            wells.remove(well_name);
            if wells.is_empty() {
                state.liquid_state.labware.remove(labware_id);
            }
        }
        return;
    }
    state
        .liquid_state
        .labware
        .entry(labware_id.to_string())
        .or_default()
        .insert(well_name.to_string(), contents);
}

fn tip_liquid(state: &RobotState, pipette_id: &str) -> LocationLiquidState {
    state.tip_liquid(pipette_id).cloned().unwrap_or_default()
}

fn set_tip_liquid(state: &mut RobotState, pipette_id: &str, contents: LocationLiquidState) {
    let contents = liquid::prune(contents);
    if contents.is_empty() {
        state.liquid_state.pipettes.remove(pipette_id);
    } else {
        state
            .liquid_state
            .pipettes
            .insert(pipette_id.to_string(), contents);
    }
}

fn empty_tip(state: &mut RobotState, pipette_id: &str) {
    state.liquid_state.pipettes.remove(pipette_id);
    if let Some(pipette) = state.pipettes.get_mut(pipette_id) {
        pipette.tip_volume = 0.0;
    }
}
