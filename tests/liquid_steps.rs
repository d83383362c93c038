//! Transfer, consolidate, distribute and mix: command groups, tip policy and
//! liquid tracking.

mod common;

use common::*;
use serde_json::{json, Value};
use step_planner::creators::compound::{
    consolidate, distribute, mix_step, transfer, ConsolidateArgs, DistributeArgs, MixStepArgs,
    TransferArgs,
};
use step_planner::error::{CommandCreatorError, CommandCreatorWarning};
use step_planner::keys::SequentialKeyGenerator;
use step_planner::registry::InvariantContext;
use step_planner::state::effects::apply_commands;
use step_planner::state::{LabwareLocation, RobotState, ThermocyclerState};

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

fn ingredient(state: &RobotState, labware: &str, well: &str, id: &str) -> f64 {
    state
        .well_liquid(labware, well)
        .and_then(|liquid| liquid.get(id))
        .copied()
        .unwrap_or(0.0)
}

fn stocked(ctx: &InvariantContext) -> RobotState {
    initial_state(ctx)
        .with_well_liquid(SOURCE, "A1", "water", 200.0)
        .with_well_liquid(SOURCE, "A2", "dye", 200.0)
        .with_well_liquid(SOURCE, "A3", "buffer", 200.0)
}

/// Step arguments with the common fields filled in.
fn step_json(extra: Value) -> Value {
    let mut base = json!({
        "pipette": PIPETTE,
        "volume": 50.0,
        "sourceLabware": SOURCE,
        "destLabware": DEST,
        "dropTipLocation": TRASH,
    });
    if let (Some(base), Some(extra)) = (base.as_object_mut(), extra.as_object()) {
        base.extend(extra.clone());
    }
    base
}

fn transfer_args(extra: Value) -> TransferArgs {
    serde_json::from_value(step_json(extra)).unwrap()
}

/// `(commandType, wellName, volume)` of every aspirate/dispense.
fn liquid_moves(commands: &[step_planner::Command]) -> Vec<(String, String, f64)> {
    commands
        .iter()
        .map(|c| serde_json::to_value(c).unwrap())
        .filter(|v| v["commandType"] == "aspirate" || v["commandType"] == "dispense")
        .map(|v| {
            (
                v["commandType"].as_str().unwrap_or_default().to_string(),
                v["params"]["wellName"].as_str().unwrap_or_default().to_string(),
                v["params"]["volume"].as_f64().unwrap_or_default(),
            )
        })
        .collect()
}

fn mv(kind: &str, well: &str, volume: f64) -> (String, String, f64) {
    (kind.to_string(), well.to_string(), volume)
}

// =============================================================================
// Consolidate
// =============================================================================

#[test]
fn test_consolidate_draws_all_sources_before_one_dispense() {
    let ctx = context();
    let state = stocked(&ctx);
    let args: ConsolidateArgs = serde_json::from_value(step_json(json!({
        "sourceWells": ["A1", "A2"],
        "destWell": "C1",
    })))
    .unwrap();
    let mut keys = SequentialKeyGenerator::default();
    let out = consolidate(&args, &ctx, &state, &mut keys).unwrap();

    assert_eq!(
        command_types(&out.commands),
        vec![
            "pickUpTip",
            "aspirate",
            "aspirate",
            "dispense",
            "moveToAddressableAreaForDropTip",
            "dropTipInPlace",
        ]
    );
    assert_eq!(
        liquid_moves(&out.commands),
        vec![
            mv("aspirate", "A1", 50.0),
            mv("aspirate", "A2", 50.0),
            mv("dispense", "C1", 100.0),
        ]
    );
    assert!(out.warnings.is_empty());

    let after = apply_commands(&out.commands, &ctx, &state);
    assert_close(ingredient(&after, DEST, "C1", "water"), 50.0);
    assert_close(ingredient(&after, DEST, "C1", "dye"), 50.0);
    assert_close(ingredient(&after, SOURCE, "A1", "water"), 150.0);
    assert!(!after.has_tip(PIPETTE));
}

#[test]
fn test_consolidate_splits_groups_by_tip_capacity() {
    let ctx = context();
    let state = stocked(&ctx);
    let args: ConsolidateArgs = serde_json::from_value(step_json(json!({
        "volume": 120.0,
        "sourceWells": ["A1", "A2", "A3"],
        "destWell": "C1",
    })))
    .unwrap();
    let mut keys = SequentialKeyGenerator::default();
    let out = consolidate(&args, &ctx, &state, &mut keys).unwrap();
    assert_eq!(
        liquid_moves(&out.commands),
        vec![
            mv("aspirate", "A1", 120.0),
            mv("aspirate", "A2", 120.0),
            mv("dispense", "C1", 240.0),
            mv("aspirate", "A3", 120.0),
            mv("dispense", "C1", 120.0),
        ]
    );
    let after = apply_commands(&out.commands, &ctx, &state);
    assert_close(after.well_volume(DEST, "C1"), 360.0);
}

// =============================================================================
// Distribute
// =============================================================================

#[test]
fn test_distribute_one_aspirate_feeds_every_destination() {
    let ctx = context();
    let state = stocked(&ctx);
    let args: DistributeArgs = serde_json::from_value(step_json(json!({
        "sourceWell": "A1",
        "destWells": ["A1", "A2"],
    })))
    .unwrap();
    let mut keys = SequentialKeyGenerator::default();
    let out = distribute(&args, &ctx, &state, &mut keys).unwrap();
    assert_eq!(
        liquid_moves(&out.commands),
        vec![
            mv("aspirate", "A1", 100.0),
            mv("dispense", "A1", 50.0),
            mv("dispense", "A2", 50.0),
        ]
    );
    let after = apply_commands(&out.commands, &ctx, &state);
    assert_close(ingredient(&after, DEST, "A1", "water"), 50.0);
    assert_close(ingredient(&after, DEST, "A2", "water"), 50.0);
}

#[test]
fn test_disposal_volume_goes_to_trash() {
    let ctx = context();
    let state = stocked(&ctx).with_well_liquid(SOURCE, "A4", "water", 500.0);
    let args: DistributeArgs = serde_json::from_value(step_json(json!({
        "sourceWell": "A4",
        "destWells": ["B1", "B2", "B3", "B4"],
        "disposalVolume": 20.0,
    })))
    .unwrap();
    let mut keys = SequentialKeyGenerator::default();
    let out = distribute(&args, &ctx, &state, &mut keys).unwrap();
    assert_eq!(
        command_types(&out.commands),
        vec![
            "pickUpTip",
            "aspirate",
            "dispense",
            "dispense",
            "dispense",
            "dispense",
            "moveToAddressableArea",
            "blowOutInPlace",
            "moveToAddressableAreaForDropTip",
            "dropTipInPlace",
        ]
    );
    assert_eq!(liquid_moves(&out.commands)[0], mv("aspirate", "A4", 220.0));

    let after = apply_commands(&out.commands, &ctx, &state);
    let delivered: f64 = ["B1", "B2", "B3", "B4"]
        .iter()
        .map(|w| after.well_volume(DEST, w))
        .sum();
    assert_close(delivered, 200.0);
    assert_close(after.well_volume(SOURCE, "A4"), 280.0);
    assert_close(after.tip_volume(PIPETTE), 0.0);
}

// =============================================================================
// Transfer
// =============================================================================

#[test]
fn test_transfer_larger_than_tip_is_chunked() {
    let ctx = context();
    let state = stocked(&ctx).with_well_liquid(SOURCE, "A4", "water", 500.0);
    let args = transfer_args(json!({
        "volume": 450.0,
        "sourceWells": ["A4"],
        "destWells": ["B1"],
    }));
    let mut keys = SequentialKeyGenerator::default();
    let out = transfer(&args, &ctx, &state, &mut keys).unwrap();
    assert_eq!(
        liquid_moves(&out.commands),
        vec![
            mv("aspirate", "A4", 225.0),
            mv("dispense", "B1", 225.0),
            mv("aspirate", "A4", 225.0),
            mv("dispense", "B1", 225.0),
        ]
    );
    let after = apply_commands(&out.commands, &ctx, &state);
    assert_close(after.well_volume(DEST, "B1"), 450.0);
}

#[test]
fn test_volume_needing_too_many_trips_is_rejected() {
    let ctx = context();
    let state = stocked(&ctx);
    let mut keys = SequentialKeyGenerator::default();

    let huge = transfer_args(json!({
        "volume": 1e300,
        "sourceWells": ["A1"],
        "destWells": ["B1"],
    }));
    let err = transfer(&huge, &ctx, &state, &mut keys).unwrap_err();
    assert!(matches!(
        err.errors.as_slice(),
        [CommandCreatorError::InvalidArguments { .. }]
    ));

    let mut infinite = transfer_args(json!({ "sourceWells": ["A1"], "destWells": ["B1"] }));
    infinite.common.volume = f64::INFINITY;
    let err = transfer(&infinite, &ctx, &state, &mut keys).unwrap_err();
    assert!(matches!(
        err.errors.as_slice(),
        [CommandCreatorError::InvalidArguments { .. }]
    ));
    assert_eq!(keys.issued(), 0);
}

#[test]
fn test_transfer_always_takes_a_fresh_tip_per_pair() {
    let ctx = context();
    let state = stocked(&ctx);
    let args = transfer_args(json!({
        "changeTip": "always",
        "sourceWells": ["A1", "A2"],
        "destWells": ["B1", "B2"],
    }));
    let mut keys = SequentialKeyGenerator::default();
    let out = transfer(&args, &ctx, &state, &mut keys).unwrap();
    assert_eq!(
        command_types(&out.commands),
        vec![
            "pickUpTip",
            "aspirate",
            "dispense",
            "moveToAddressableAreaForDropTip",
            "dropTipInPlace",
            "pickUpTip",
            "aspirate",
            "dispense",
            "moveToAddressableAreaForDropTip",
            "dropTipInPlace",
        ]
    );
    let picked: Vec<Value> = out
        .commands
        .iter()
        .map(|c| serde_json::to_value(c).unwrap())
        .filter(|v| v["commandType"] == "pickUpTip")
        .map(|v| v["params"]["wellName"].clone())
        .collect();
    assert_eq!(picked, vec![json!("A1"), json!("B1")]);
}

#[test]
fn test_transfer_per_source_reuses_tip_for_same_source() {
    let ctx = context();
    let state = stocked(&ctx);
    let args = transfer_args(json!({
        "changeTip": "perSource",
        "sourceWells": ["A1", "A1", "A2"],
        "destWells": ["B1", "B2", "B3"],
    }));
    let mut keys = SequentialKeyGenerator::default();
    let out = transfer(&args, &ctx, &state, &mut keys).unwrap();
    let pickups = command_types(&out.commands)
        .into_iter()
        .filter(|t| *t == "pickUpTip")
        .count();
    assert_eq!(pickups, 2);
}

#[test]
fn test_transfer_never_without_tip_fails() {
    let ctx = context();
    let state = stocked(&ctx);
    let args = transfer_args(json!({
        "changeTip": "never",
        "sourceWells": ["A1"],
        "destWells": ["B1"],
    }));
    let mut keys = SequentialKeyGenerator::default();
    let err = transfer(&args, &ctx, &state, &mut keys).unwrap_err();
    assert_eq!(
        err.errors,
        vec![CommandCreatorError::NoTipOnPipette {
            pipette_id: PIPETTE.to_string()
        }]
    );
}

#[test]
fn test_air_gap_is_dispensed_but_never_tracked_in_wells() {
    let ctx = context();
    let state = stocked(&ctx);
    let args = transfer_args(json!({
        "volume": 100.0,
        "aspirateAirGapVolume": 20.0,
        "sourceWells": ["A1"],
        "destWells": ["B1"],
    }));
    let mut keys = SequentialKeyGenerator::default();
    let out = transfer(&args, &ctx, &state, &mut keys).unwrap();
    assert_eq!(
        command_types(&out.commands),
        vec![
            "pickUpTip",
            "aspirate",
            "moveToWell",
            "airGapInPlace",
            "dispense",
            "moveToAddressableAreaForDropTip",
            "dropTipInPlace",
        ]
    );
    assert_eq!(liquid_moves(&out.commands)[1], mv("dispense", "B1", 120.0));

    let after = apply_commands(&out.commands, &ctx, &state);
    assert_eq!(
        after.well_liquid(DEST, "B1").map(|l| l.keys().cloned().collect::<Vec<_>>()),
        Some(vec!["water".to_string()])
    );
    assert_close(after.well_volume(DEST, "B1"), 100.0);
}

#[test]
fn test_pristine_source_warns_but_plans() {
    let ctx = context();
    let state = initial_state(&ctx);
    let args = transfer_args(json!({
        "sourceWells": ["H12"],
        "destWells": ["B1"],
    }));
    let mut keys = SequentialKeyGenerator::default();
    let out = transfer(&args, &ctx, &state, &mut keys).unwrap();
    assert_eq!(
        out.warnings,
        vec![CommandCreatorWarning::AspirateFromPristineWell {
            labware_id: SOURCE.to_string(),
            well_name: "H12".to_string(),
        }]
    );
    assert_eq!(out.commands.len(), 5);
}

#[test]
fn test_out_of_tips_rejects_whole_step() {
    let ctx = context();
    let mut state = stocked(&ctx);
    if let Some(rack) = state.tip_state.tipracks.get_mut(TIPRACK) {
        rack.values_mut().for_each(|present| *present = false);
    }
    let args = transfer_args(json!({
        "sourceWells": ["A1"],
        "destWells": ["B1"],
    }));
    let mut keys = SequentialKeyGenerator::default();
    let err = transfer(&args, &ctx, &state, &mut keys).unwrap_err();
    assert_eq!(
        err.errors,
        vec![CommandCreatorError::InsufficientTips {
            pipette_id: PIPETTE.to_string()
        }]
    );
}

#[test]
fn test_unknown_well_is_invalid_reference() {
    let ctx = context();
    let state = stocked(&ctx);
    let args = transfer_args(json!({
        "sourceWells": ["A1"],
        "destWells": ["Z99"],
    }));
    let mut keys = SequentialKeyGenerator::default();
    let err = transfer(&args, &ctx, &state, &mut keys).unwrap_err();
    assert_eq!(
        err.errors,
        vec![CommandCreatorError::InvalidWellReference {
            labware_id: DEST.to_string(),
            well_name: "Z99".to_string(),
        }]
    );
}

#[test]
fn test_aspirate_under_closed_lid_is_rejected() {
    let ctx = context();
    let state = with_thermocycler(
        stocked(&ctx).with_labware(SOURCE, LabwareLocation::module(TC)),
        ThermocyclerState {
            lid_open: Some(false),
            ..Default::default()
        },
    );
    let args = transfer_args(json!({
        "sourceWells": ["A1"],
        "destWells": ["B1"],
    }));
    let mut keys = SequentialKeyGenerator::default();
    let err = transfer(&args, &ctx, &state, &mut keys).unwrap_err();
    assert_eq!(
        err.errors,
        vec![CommandCreatorError::ThermocyclerLidClosed {
            module_id: TC.to_string()
        }]
    );
}

#[test]
fn test_transfer_is_pure_up_to_keys() {
    let ctx = context();
    let state = stocked(&ctx);
    let args = transfer_args(json!({
        "changeTip": "perDest",
        "preWetTip": true,
        "touchTipAfterDispense": true,
        "blowoutLocation": "dest_well",
        "mixBeforeAspirate": { "volume": 30.0, "times": 2 },
        "sourceWells": ["A1", "A2"],
        "destWells": ["B1", "B2"],
    }));
    let first = transfer(&args, &ctx, &state, &mut SequentialKeyGenerator::new("x")).unwrap();
    let second = transfer(&args, &ctx, &state, &mut SequentialKeyGenerator::new("y")).unwrap();
    assert_eq!(without_keys(&first.commands), without_keys(&second.commands));
    assert_eq!(first.warnings, second.warnings);
}

// =============================================================================
// Mix
// =============================================================================

#[test]
fn test_mix_step_keeps_well_volume() {
    let ctx = context();
    let state = initial_state(&ctx).with_well_liquid(DEST, "A1", "cells", 100.0);
    let args: MixStepArgs = serde_json::from_value(json!({
        "pipette": PIPETTE,
        "labware": DEST,
        "wells": ["A1"],
        "volume": 50.0,
        "times": 2,
        "dropTipLocation": TRASH,
        "blowoutLocation": "dest_well",
        "touchTip": true,
    }))
    .unwrap();
    let mut keys = SequentialKeyGenerator::default();
    let out = mix_step(&args, &ctx, &state, &mut keys).unwrap();
    assert_eq!(
        command_types(&out.commands),
        vec![
            "pickUpTip",
            "aspirate",
            "dispense",
            "aspirate",
            "dispense",
            "blowout",
            "touchTip",
            "moveToAddressableAreaForDropTip",
            "dropTipInPlace",
        ]
    );
    let after = apply_commands(&out.commands, &ctx, &state);
    assert_close(after.well_volume(DEST, "A1"), 100.0);
}

// =============================================================================
// Optional parameters
// =============================================================================

#[test]
fn test_distribute_air_gap_leaves_each_well_the_requested_volume() {
    let ctx = context();
    let state = stocked(&ctx);
    let args: DistributeArgs = serde_json::from_value(step_json(json!({
        "sourceWell": "A1",
        "destWells": ["B1", "B2"],
        "aspirateAirGapVolume": 10.0,
    })))
    .unwrap();
    let mut keys = SequentialKeyGenerator::default();
    let out = distribute(&args, &ctx, &state, &mut keys).unwrap();
    assert_eq!(
        command_types(&out.commands),
        vec![
            "pickUpTip",
            "aspirate",
            "moveToWell",
            "airGapInPlace",
            "dispense",
            "moveToWell",
            "airGapInPlace",
            "dispense",
            "moveToAddressableAreaForDropTip",
            "dropTipInPlace",
        ]
    );
    assert_eq!(
        liquid_moves(&out.commands),
        vec![
            mv("aspirate", "A1", 100.0),
            mv("dispense", "B1", 60.0),
            mv("dispense", "B2", 60.0),
        ]
    );

    let after = apply_commands(&out.commands, &ctx, &state);
    assert_close(after.well_volume(DEST, "B1"), 50.0);
    assert_close(after.well_volume(DEST, "B2"), 50.0);
    assert_close(after.well_volume(SOURCE, "A1"), 100.0);
}

#[test]
fn test_consolidate_air_gap_after_every_source() {
    let ctx = context();
    let state = stocked(&ctx);
    let args: ConsolidateArgs = serde_json::from_value(step_json(json!({
        "sourceWells": ["A1", "A2"],
        "destWell": "C1",
        "aspirateAirGapVolume": 10.0,
    })))
    .unwrap();
    let mut keys = SequentialKeyGenerator::default();
    let out = consolidate(&args, &ctx, &state, &mut keys).unwrap();
    assert_eq!(
        command_types(&out.commands),
        vec![
            "pickUpTip",
            "aspirate",
            "moveToWell",
            "airGapInPlace",
            "aspirate",
            "moveToWell",
            "airGapInPlace",
            "dispense",
            "moveToAddressableAreaForDropTip",
            "dropTipInPlace",
        ]
    );
    assert_eq!(liquid_moves(&out.commands)[2], mv("dispense", "C1", 120.0));

    let after = apply_commands(&out.commands, &ctx, &state);
    assert_close(ingredient(&after, DEST, "C1", "water"), 50.0);
    assert_close(ingredient(&after, DEST, "C1", "dye"), 50.0);
    assert_close(after.well_volume(DEST, "C1"), 100.0);
}

#[test]
fn test_delays_follow_aspirate_and_dispense() {
    let ctx = context();
    let state = stocked(&ctx);
    let args = transfer_args(json!({
        "sourceWells": ["A1"],
        "destWells": ["B1"],
        "aspirateDelay": { "seconds": 2.0, "mmFromBottom": 5.0 },
        "dispenseDelay": { "seconds": 1.0 },
    }));
    let mut keys = SequentialKeyGenerator::default();
    let out = transfer(&args, &ctx, &state, &mut keys).unwrap();
    assert_eq!(
        command_types(&out.commands),
        vec![
            "pickUpTip",
            "aspirate",
            "moveToWell",
            "waitForDuration",
            "dispense",
            "waitForDuration",
            "moveToAddressableAreaForDropTip",
            "dropTipInPlace",
        ]
    );

    let wire: Vec<Value> = out
        .commands
        .iter()
        .map(|c| serde_json::to_value(c).unwrap())
        .collect();
    assert_eq!(wire[2]["params"]["wellName"], "A1");
    assert_eq!(wire[2]["params"]["labwareId"], SOURCE);
    assert_eq!(wire[2]["params"]["wellLocation"]["offset"]["z"], 5.0);
    assert_eq!(wire[3]["params"], json!({ "seconds": 2.0 }));
    assert_eq!(wire[5]["params"], json!({ "seconds": 1.0 }));

    let after = apply_commands(&out.commands, &ctx, &state);
    assert_close(after.well_volume(DEST, "B1"), 50.0);
    assert_close(after.well_volume(SOURCE, "A1"), 150.0);
}

#[test]
fn test_blowout_over_trash_after_each_transfer() {
    let ctx = context();
    let state = stocked(&ctx);
    let args = transfer_args(json!({
        "sourceWells": ["A1"],
        "destWells": ["B1"],
        "blowoutLocation": TRASH,
    }));
    let mut keys = SequentialKeyGenerator::default();
    let out = transfer(&args, &ctx, &state, &mut keys).unwrap();
    assert_eq!(
        command_types(&out.commands),
        vec![
            "pickUpTip",
            "aspirate",
            "dispense",
            "moveToAddressableArea",
            "blowOutInPlace",
            "moveToAddressableAreaForDropTip",
            "dropTipInPlace",
        ]
    );
    assert_eq!(
        serde_json::to_value(&out.commands[3]).unwrap()["params"]["addressableAreaName"],
        "movableTrashA3"
    );

    let after = apply_commands(&out.commands, &ctx, &state);
    assert_close(after.well_volume(DEST, "B1"), 50.0);
    assert_close(after.well_volume(SOURCE, "A1"), 150.0);
    assert!(after.tip_liquid(PIPETTE).is_none());
}

#[test]
fn test_consolidate_blowout_over_trash_keeps_destination_volume() {
    let ctx = context();
    let state = stocked(&ctx);
    let args: ConsolidateArgs = serde_json::from_value(step_json(json!({
        "sourceWells": ["A1", "A3"],
        "destWell": "D1",
        "blowoutLocation": TRASH,
    })))
    .unwrap();
    let mut keys = SequentialKeyGenerator::default();
    let out = consolidate(&args, &ctx, &state, &mut keys).unwrap();
    assert_eq!(
        command_types(&out.commands),
        vec![
            "pickUpTip",
            "aspirate",
            "aspirate",
            "dispense",
            "moveToAddressableArea",
            "blowOutInPlace",
            "moveToAddressableAreaForDropTip",
            "dropTipInPlace",
        ]
    );
    let after = apply_commands(&out.commands, &ctx, &state);
    assert_close(ingredient(&after, DEST, "D1", "water"), 50.0);
    assert_close(ingredient(&after, DEST, "D1", "buffer"), 50.0);
    assert_close(after.tip_volume(PIPETTE), 0.0);
}
