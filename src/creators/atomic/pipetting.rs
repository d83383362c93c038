//! Pipetting atomic creators.
//!
//! Unlike the module creators these validate what they touch: the pipette
//! entity, its tip, the labware and well, and whether the well is reachable
//! (on deck, not under a closed thermocycler lid). Each failure is returned as
//! a single [`CommandCreatorError`]; aspirate shortfalls are warnings.

use crate::command::{
    AirGapInPlaceParams, BlowOutInPlaceParams, BlowoutParams, CommandBody,
    MoveToAddressableAreaForDropTipParams, MoveToAddressableAreaParams, MoveToWellParams,
    PickUpTipParams, PipetteParams, PipettingParams, TouchTipParams,
};
use crate::creators::{emit, CommandCreatorResult};
use crate::error::{CommandCreatorError, CommandCreatorWarning};
use crate::keys::KeyGenerator;
use crate::registry::{InvariantContext, PipetteEntity};
use crate::state::liquid::VOLUME_EPSILON;
use crate::state::selectors::thermocycler_state;
use crate::state::RobotState;

/// Slack allowed when comparing volumes that went through chunk division.
pub const VOLUME_TOLERANCE: f64 = 1e-6;

// =============================================================================
// Shared checks
// =============================================================================

/// The pipette exists and carries a tip.
fn require_tip<'a>(
    ctx: &'a InvariantContext,
    state: &RobotState,
    pipette_id: &str,
) -> Result<&'a PipetteEntity, CommandCreatorError> {
    let pipette = ctx.pipette(pipette_id)?;
    if !state.has_tip(pipette_id) {
        return Err(CommandCreatorError::NoTipOnPipette {
            pipette_id: pipette_id.to_string(),
        });
    }
    Ok(pipette)
}

/// The well exists and the pipette can physically reach it.
fn require_reachable_well(
    ctx: &InvariantContext,
    state: &RobotState,
    labware_id: &str,
    well_name: &str,
) -> Result<(), CommandCreatorError> {
    ctx.well(labware_id, well_name)?;

    if state
        .labware_location(labware_id)
        .is_some_and(|loc| loc.is_off_deck())
    {
        return Err(CommandCreatorError::LabwareOffDeck {
            labware_id: labware_id.to_string(),
        });
    }

    // An unknown lid position counts as closed.
    if let Some(module_id) = state.module_under_labware(labware_id) {
        if let Some(tc) = thermocycler_state(state, module_id) {
            if tc.lid_open != Some(true) {
                return Err(CommandCreatorError::ThermocyclerLidClosed {
                    module_id: module_id.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Adding `volume` to the tip stays within its capacity.
fn require_capacity(
    ctx: &InvariantContext,
    state: &RobotState,
    pipette_id: &str,
    volume: f64,
) -> Result<(), CommandCreatorError> {
    let capacity = ctx.tip_capacity(pipette_id)?;
    let after = state.tip_volume(pipette_id) + volume;
    if after > capacity + VOLUME_TOLERANCE {
        return Err(CommandCreatorError::PipetteVolumeExceeded {
            pipette_id: pipette_id.to_string(),
            volume: after,
            max_volume: capacity,
        });
    }
    Ok(())
}

fn check_aspirate(
    args: &PipettingParams,
    ctx: &InvariantContext,
    state: &RobotState,
) -> Result<Vec<CommandCreatorWarning>, CommandCreatorError> {
    require_tip(ctx, state, &args.pipette_id)?;
    require_reachable_well(ctx, state, &args.labware_id, &args.well_name)?;
    require_capacity(ctx, state, &args.pipette_id, args.volume)?;

    let available = state.well_volume(&args.labware_id, &args.well_name);
    let mut warnings = Vec::new();
    if available <= VOLUME_EPSILON {
        warnings.push(CommandCreatorWarning::AspirateFromPristineWell {
            labware_id: args.labware_id.clone(),
            well_name: args.well_name.clone(),
        });
    } else if args.volume > available + VOLUME_TOLERANCE {
        warnings.push(CommandCreatorWarning::AspirateMoreThanWellContents {
            labware_id: args.labware_id.clone(),
            well_name: args.well_name.clone(),
            requested: args.volume,
            available,
        });
    }
    Ok(warnings)
}

fn check_dispense(
    args: &PipettingParams,
    ctx: &InvariantContext,
    state: &RobotState,
) -> Result<(), CommandCreatorError> {
    require_tip(ctx, state, &args.pipette_id)?;
    require_reachable_well(ctx, state, &args.labware_id, &args.well_name)?;

    let held = state.tip_volume(&args.pipette_id);
    if args.volume > held + VOLUME_TOLERANCE {
        return Err(CommandCreatorError::InsufficientVolume {
            pipette_id: args.pipette_id.clone(),
            requested: args.volume,
            available: held,
        });
    }
    Ok(())
}

fn check_pick_up_tip(
    args: &PickUpTipParams,
    ctx: &InvariantContext,
    state: &RobotState,
) -> Result<(), CommandCreatorError> {
    ctx.pipette(&args.pipette_id)?;
    if state.has_tip(&args.pipette_id) {
        return Err(CommandCreatorError::TipAlreadyAttached {
            pipette_id: args.pipette_id.clone(),
        });
    }
    ctx.well(&args.labware_id, &args.well_name)?;
    if !state.is_tip_present(&args.labware_id, &args.well_name) {
        return Err(CommandCreatorError::TipNotPresent {
            labware_id: args.labware_id.clone(),
            well_name: args.well_name.clone(),
        });
    }
    Ok(())
}

// =============================================================================
// Creators
// =============================================================================

/// `aspirate`
pub fn aspirate(
    args: &PipettingParams,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let warnings = check_aspirate(args, ctx, state)?;
    let mut out = emit(keys, CommandBody::Aspirate(args.clone()))?;
    out.warnings = warnings;
    Ok(out)
}

/// `dispense`
pub fn dispense(
    args: &PipettingParams,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    check_dispense(args, ctx, state)?;
    emit(keys, CommandBody::Dispense(args.clone()))
}

/// `airGapInPlace`
pub fn air_gap_in_place(
    args: &AirGapInPlaceParams,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    require_tip(ctx, state, &args.pipette_id)?;
    require_capacity(ctx, state, &args.pipette_id, args.volume)?;
    emit(keys, CommandBody::AirGapInPlace(args.clone()))
}

/// `blowout`
pub fn blowout(
    args: &BlowoutParams,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    require_tip(ctx, state, &args.pipette_id)?;
    require_reachable_well(ctx, state, &args.labware_id, &args.well_name)?;
    emit(keys, CommandBody::Blowout(args.clone()))
}

/// `blowOutInPlace`
pub fn blow_out_in_place(
    args: &BlowOutInPlaceParams,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    require_tip(ctx, state, &args.pipette_id)?;
    emit(keys, CommandBody::BlowOutInPlace(args.clone()))
}

/// `touchTip`
pub fn touch_tip(
    args: &TouchTipParams,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    require_tip(ctx, state, &args.pipette_id)?;
    require_reachable_well(ctx, state, &args.labware_id, &args.well_name)?;
    emit(keys, CommandBody::TouchTip(args.clone()))
}

/// `moveToWell`
pub fn move_to_well(
    args: &MoveToWellParams,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    ctx.pipette(&args.pipette_id)?;
    require_reachable_well(ctx, state, &args.labware_id, &args.well_name)?;
    emit(keys, CommandBody::MoveToWell(args.clone()))
}

/// `moveToAddressableArea`
pub fn move_to_addressable_area(
    args: &MoveToAddressableAreaParams,
    ctx: &InvariantContext,
    _state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    ctx.pipette(&args.pipette_id)?;
    emit(keys, CommandBody::MoveToAddressableArea(args.clone()))
}

/// `moveToAddressableAreaForDropTip`
pub fn move_to_addressable_area_for_drop_tip(
    args: &MoveToAddressableAreaForDropTipParams,
    ctx: &InvariantContext,
    _state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    ctx.pipette(&args.pipette_id)?;
    emit(keys, CommandBody::MoveToAddressableAreaForDropTip(args.clone()))
}

/// `pickUpTip`
pub fn pick_up_tip(
    args: &PickUpTipParams,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    check_pick_up_tip(args, ctx, state)?;
    emit(keys, CommandBody::PickUpTip(args.clone()))
}

/// `dropTipInPlace`
pub fn drop_tip_in_place(
    args: &PipetteParams,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    require_tip(ctx, state, &args.pipette_id)?;
    emit(keys, CommandBody::DropTipInPlace(args.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::WellLocation;
    use crate::keys::SequentialKeyGenerator;
    use crate::registry::{LabwareDefinition, LabwareEntity, PipetteSpec, WellDefinition};
    use crate::state::{
        AttachedTip, LabwareLocation, ModuleState, Mount, ThermocyclerState,
    };
    use std::collections::BTreeMap;

    fn labware(id: &str, wells: &[&str], tip_max_volume: Option<f64>) -> LabwareEntity {
        let defs: BTreeMap<String, WellDefinition> = wells
            .iter()
            .map(|w| {
                (
                    w.to_string(),
                    WellDefinition {
                        total_liquid_volume: 300.0,
                        depth: 10.0,
                    },
                )
            })
            .collect();
        LabwareEntity {
            id: id.into(),
            def: LabwareDefinition {
                load_name: id.into(),
                display_category: if tip_max_volume.is_some() {
                    "tipRack".into()
                } else {
                    "wellPlate".into()
                },
                is_tiprack: tip_max_volume.is_some(),
                tip_max_volume,
                ordering: vec![wells.iter().map(|w| w.to_string()).collect()],
                wells: defs,
            },
        }
    }

    fn ctx() -> InvariantContext {
        let mut ctx = InvariantContext::default();
        ctx.pipette_entities.insert(
            "p1".into(),
            PipetteEntity {
                id: "p1".into(),
                name: "p300_single".into(),
                spec: PipetteSpec {
                    max_volume: 300.0,
                    min_volume: 20.0,
                    channels: 1,
                    default_aspirate_flow_rate: 92.0,
                    default_dispense_flow_rate: 92.0,
                    default_blow_out_flow_rate: 92.0,
                },
                tiprack_ids: vec!["rack".into()],
            },
        );
        ctx.labware_entities
            .insert("rack".into(), labware("rack", &["A1", "B1"], Some(200.0)));
        ctx.labware_entities
            .insert("plate".into(), labware("plate", &["A1", "A2"], None));
        ctx
    }

    fn with_tip() -> RobotState {
        let mut state = RobotState::new()
            .with_pipette("p1", Mount::Left)
            .with_labware("plate", LabwareLocation::slot("C2"))
            .with_full_tiprack(&ctx(), "rack")
            .with_well_liquid("plate", "A1", "water", 100.0);
        if let Some(p) = state.pipettes.get_mut("p1") {
            p.tip = Some(AttachedTip {
                tiprack_id: "rack".into(),
                well_name: "A1".into(),
            });
        }
        state
    }

    fn params(well: &str, volume: f64) -> PipettingParams {
        PipettingParams {
            pipette_id: "p1".into(),
            labware_id: "plate".into(),
            well_name: well.into(),
            volume,
            flow_rate: 92.0,
            well_location: WellLocation::from_bottom(1.0),
        }
    }

    fn errors(result: CommandCreatorResult) -> Vec<CommandCreatorError> {
        result.unwrap_err().errors
    }

    #[test]
    fn test_aspirate_requires_tip() {
        let state = RobotState::new()
            .with_pipette("p1", Mount::Left)
            .with_labware("plate", LabwareLocation::slot("C2"));
        let mut keys = SequentialKeyGenerator::default();
        assert_eq!(
            errors(aspirate(&params("A1", 10.0), &ctx(), &state, &mut keys)),
            vec![CommandCreatorError::NoTipOnPipette {
                pipette_id: "p1".into()
            }]
        );
        assert_eq!(keys.issued(), 0);
    }

    #[test]
    fn test_aspirate_invalid_well() {
        let mut keys = SequentialKeyGenerator::default();
        let err = errors(aspirate(&params("H12", 10.0), &ctx(), &with_tip(), &mut keys));
        assert!(matches!(
            err[0],
            CommandCreatorError::InvalidWellReference { .. }
        ));
    }

    #[test]
    fn test_aspirate_warns_on_pristine_and_short_wells() {
        let mut keys = SequentialKeyGenerator::default();
        let out = aspirate(&params("A2", 10.0), &ctx(), &with_tip(), &mut keys).unwrap();
        assert!(matches!(
            out.warnings[0],
            CommandCreatorWarning::AspirateFromPristineWell { .. }
        ));

        let out = aspirate(&params("A1", 150.0), &ctx(), &with_tip(), &mut keys).unwrap();
        assert!(matches!(
            out.warnings[0],
            CommandCreatorWarning::AspirateMoreThanWellContents { .. }
        ));
        assert_eq!(out.commands.len(), 1);
    }

    #[test]
    fn test_aspirate_past_tip_capacity() {
        let mut keys = SequentialKeyGenerator::default();
        let err = errors(aspirate(&params("A1", 250.0), &ctx(), &with_tip(), &mut keys));
        assert_eq!(
            err,
            vec![CommandCreatorError::PipetteVolumeExceeded {
                pipette_id: "p1".into(),
                volume: 250.0,
                max_volume: 200.0,
            }]
        );
    }

    #[test]
    fn test_dispense_more_than_held() {
        let mut keys = SequentialKeyGenerator::default();
        let err = errors(dispense(&params("A2", 5.0), &ctx(), &with_tip(), &mut keys));
        assert!(matches!(
            err[0],
            CommandCreatorError::InsufficientVolume { .. }
        ));
    }

    #[test]
    fn test_labware_under_closed_lid_is_unreachable() {
        let state = with_tip()
            .with_module(
                "tc",
                "B1",
                ModuleState::Thermocycler(ThermocyclerState {
                    lid_open: Some(false),
                    ..Default::default()
                }),
            )
            .with_labware("plate", LabwareLocation::module("tc"));
        let mut keys = SequentialKeyGenerator::default();
        assert_eq!(
            errors(aspirate(&params("A1", 10.0), &ctx(), &state, &mut keys)),
            vec![CommandCreatorError::ThermocyclerLidClosed {
                module_id: "tc".into()
            }]
        );
    }

    #[test]
    fn test_off_deck_labware() {
        let state = with_tip().with_labware("plate", LabwareLocation::off_deck());
        let mut keys = SequentialKeyGenerator::default();
        assert!(matches!(
            errors(aspirate(&params("A1", 10.0), &ctx(), &state, &mut keys))[0],
            CommandCreatorError::LabwareOffDeck { .. }
        ));
    }

    #[test]
    fn test_pick_up_tip_checks() {
        let mut keys = SequentialKeyGenerator::default();
        let args = PickUpTipParams {
            pipette_id: "p1".into(),
            labware_id: "rack".into(),
            well_name: "B1".into(),
        };
        assert!(matches!(
            errors(pick_up_tip(&args, &ctx(), &with_tip(), &mut keys))[0],
            CommandCreatorError::TipAlreadyAttached { .. }
        ));

        let mut state = with_tip();
        if let Some(p) = state.pipettes.get_mut("p1") {
            p.tip = None;
        }
        state.tip_state.tipracks.get_mut("rack").unwrap().insert("B1".into(), false);
        assert!(matches!(
            errors(pick_up_tip(&args, &ctx(), &state, &mut keys))[0],
            CommandCreatorError::TipNotPresent { .. }
        ));
    }
}
