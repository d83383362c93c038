//! Shared deck fixtures for integration tests.
#![allow(dead_code)]

use std::collections::BTreeMap;

use serde_json::Value;
use step_planner::command::Command;
use step_planner::registry::{
    AdditionalEquipmentEntity, EquipmentKind, InvariantContext, LabwareDefinition, LabwareEntity,
    ModuleEntity, ModuleKind, PipetteEntity, PipetteSpec, WellDefinition,
};
use step_planner::state::{
    AbsorbanceReaderState, HeaterShakerState, LabwareLocation, ModuleState, Mount, RobotState,
    TemperatureModuleState, ThermocyclerState,
};

pub const PIPETTE: &str = "p300";
pub const TIPRACK: &str = "tiprack";
pub const SOURCE: &str = "source_plate";
pub const DEST: &str = "dest_plate";
pub const TRASH: &str = "trash";
pub const TC: &str = "tc1";
pub const TEMP: &str = "temp1";
pub const HS: &str = "hs1";
pub const READER: &str = "reader1";

/// Well names A1..H<columns> in column order.
fn well_grid(columns: usize) -> Vec<Vec<String>> {
    (1..=columns)
        .map(|col| {
            "ABCDEFGH"
                .chars()
                .map(|row| format!("{row}{col}"))
                .collect()
        })
        .collect()
}

pub fn labware(id: &str, columns: usize, tip_max_volume: Option<f64>) -> LabwareEntity {
    let ordering = well_grid(columns);
    let wells: BTreeMap<String, WellDefinition> = ordering
        .iter()
        .flatten()
        .map(|w| {
            (
                w.clone(),
                WellDefinition {
                    total_liquid_volume: 360.0,
                    depth: 10.7,
                },
            )
        })
        .collect();
    let is_tiprack = tip_max_volume.is_some();
    LabwareEntity {
        id: id.to_string(),
        def: LabwareDefinition {
            load_name: format!("{id}_def"),
            display_category: if is_tiprack { "tipRack" } else { "wellPlate" }.to_string(),
            is_tiprack,
            tip_max_volume,
            ordering,
            wells,
        },
    }
}

/// A p300 single-channel with one 300 µL tiprack, two plates, a trash bin,
/// a gripper and one module of each kind.
pub fn context() -> InvariantContext {
    let mut ctx = InvariantContext::default();
    ctx.pipette_entities.insert(
        PIPETTE.to_string(),
        PipetteEntity {
            id: PIPETTE.to_string(),
            name: "p300_single_gen2".to_string(),
            spec: PipetteSpec {
                max_volume: 300.0,
                min_volume: 20.0,
                channels: 1,
                default_aspirate_flow_rate: 92.86,
                default_dispense_flow_rate: 92.86,
                default_blow_out_flow_rate: 92.86,
            },
            tiprack_ids: vec![TIPRACK.to_string()],
        },
    );
    for lw in [
        labware(TIPRACK, 12, Some(300.0)),
        labware(SOURCE, 12, None),
        labware(DEST, 12, None),
    ] {
        ctx.labware_entities.insert(lw.id.clone(), lw);
    }
    for (id, kind, model) in [
        (TC, ModuleKind::Thermocycler, "thermocyclerModuleV2"),
        (TEMP, ModuleKind::Temperature, "temperatureModuleV2"),
        (HS, ModuleKind::HeaterShaker, "heaterShakerModuleV1"),
        (READER, ModuleKind::AbsorbanceReader, "absorbanceReaderV1"),
    ] {
        ctx.module_entities.insert(
            id.to_string(),
            ModuleEntity {
                id: id.to_string(),
                kind,
                model: model.to_string(),
            },
        );
    }
    ctx.additional_equipment_entities.insert(
        TRASH.to_string(),
        AdditionalEquipmentEntity {
            id: TRASH.to_string(),
            kind: EquipmentKind::TrashBin,
            location: Some("cutoutA3".to_string()),
        },
    );
    ctx.additional_equipment_entities.insert(
        "gripper".to_string(),
        AdditionalEquipmentEntity {
            id: "gripper".to_string(),
            kind: EquipmentKind::Gripper,
            location: None,
        },
    );
    ctx
}

/// Deck with every module idle, plates in slots and a full tiprack.
pub fn initial_state(ctx: &InvariantContext) -> RobotState {
    RobotState::new()
        .with_pipette(PIPETTE, Mount::Left)
        .with_labware(TIPRACK, LabwareLocation::slot("C1"))
        .with_labware(SOURCE, LabwareLocation::slot("C2"))
        .with_labware(DEST, LabwareLocation::slot("D2"))
        .with_full_tiprack(ctx, TIPRACK)
        .with_module(TC, "B1", ModuleState::Thermocycler(ThermocyclerState::default()))
        .with_module(
            TEMP,
            "D1",
            ModuleState::Temperature(TemperatureModuleState::default()),
        )
        .with_module(HS, "D3", ModuleState::HeaterShaker(HeaterShakerState::default()))
        .with_module(
            READER,
            "B3",
            ModuleState::AbsorbanceReader(AbsorbanceReaderState::default()),
        )
}

/// Set a thermocycler's sub-state in place.
pub fn with_thermocycler(mut state: RobotState, tc: ThermocyclerState) -> RobotState {
    if let Some(module) = state.modules.get_mut(TC) {
        module.module_state = ModuleState::Thermocycler(tc);
    }
    state
}

/// Command types, in order.
pub fn command_types(commands: &[Command]) -> Vec<&'static str> {
    commands.iter().map(|c| c.body.command_type()).collect()
}

/// Commands as JSON with the `key` field removed.
pub fn without_keys(commands: &[Command]) -> Vec<Value> {
    commands
        .iter()
        .map(|c| {
            let mut value = serde_json::to_value(c).unwrap();
            if let Some(obj) = value.as_object_mut() {
                obj.remove("key");
            }
            value
        })
        .collect()
}
