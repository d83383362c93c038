//! Air gaps and blow-outs.

use crate::command::{
    AirGapInPlaceParams, BlowOutInPlaceParams, BlowoutParams, CommandBody,
    MoveToAddressableAreaParams, MoveToWellParams, Offset, WellLocation,
};
use crate::creators::compound::common::invalid_arguments;
use crate::creators::CommandCreatorResult;
use crate::keys::KeyGenerator;
use crate::pipeline::{reduce_command_creators, CurriedCreator};
use crate::registry::InvariantContext;
use crate::state::RobotState;

/// Height above the well top at which air is drawn (mm).
const AIR_GAP_OFFSET_FROM_TOP_MM: f64 = 1.0;

/// Arguments for [`air_gap`].
#[derive(Debug, Clone, PartialEq)]
pub struct AirGapArgs {
    /// Pipette id.
    pub pipette: String,
    /// Labware the pipette is over.
    pub labware: String,
    /// Well the pipette is over.
    pub well: String,
    /// Air volume (µL).
    pub volume: f64,
    /// Flow rate (µL/s).
    pub flow_rate: f64,
}

/// Where a blow-out goes.
#[derive(Debug, Clone, PartialEq)]
pub enum BlowOutTarget {
    /// Into a tracked well.
    Well {
        /// Labware id.
        labware_id: String,
        /// Well name.
        well_name: String,
    },
    /// Into a trash bin or waste chute.
    Equipment {
        /// Equipment id.
        equipment_id: String,
    },
}

/// Arguments for [`blow_out`].
#[derive(Debug, Clone, PartialEq)]
pub struct BlowOutArgs {
    /// Pipette id.
    pub pipette: String,
    /// Destination of the blow-out.
    pub target: BlowOutTarget,
    /// Flow rate (µL/s).
    pub flow_rate: f64,
    /// Height relative to the well top, for well targets (mm).
    pub offset_from_top_mm: f64,
}

/// Rise above the well, then draw air.
pub fn air_gap(
    args: &AirGapArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let creators = [
        CurriedCreator::Atomic(CommandBody::MoveToWell(MoveToWellParams {
            pipette_id: args.pipette.clone(),
            labware_id: args.labware.clone(),
            well_name: args.well.clone(),
            well_location: WellLocation::from_top(AIR_GAP_OFFSET_FROM_TOP_MM),
        })),
        CurriedCreator::Atomic(CommandBody::AirGapInPlace(AirGapInPlaceParams {
            pipette_id: args.pipette.clone(),
            volume: args.volume,
            flow_rate: args.flow_rate,
        })),
    ];
    reduce_command_creators(&creators, ctx, state, keys)
}

/// Blow the tip out into a well, or over trash equipment.
pub fn blow_out(
    args: &BlowOutArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let creators = match &args.target {
        BlowOutTarget::Well {
            labware_id,
            well_name,
        } => vec![CurriedCreator::Atomic(CommandBody::Blowout(BlowoutParams {
            pipette_id: args.pipette.clone(),
            labware_id: labware_id.clone(),
            well_name: well_name.clone(),
            flow_rate: args.flow_rate,
            well_location: WellLocation::from_top(args.offset_from_top_mm),
        }))],
        BlowOutTarget::Equipment { equipment_id } => {
            let channels = ctx.pipette(&args.pipette)?.spec.channels;
            let area = ctx
                .equipment(equipment_id)
                .and_then(|equipment| equipment.addressable_area_name(channels))
                .ok_or_else(|| {
                    invalid_arguments(format!(
                        "blow-out location '{equipment_id}' is not a trash bin or waste chute"
                    ))
                })?;
            vec![
                CurriedCreator::Atomic(CommandBody::MoveToAddressableArea(
                    MoveToAddressableAreaParams {
                        pipette_id: args.pipette.clone(),
                        addressable_area_name: area,
                        offset: Offset::default(),
                    },
                )),
                CurriedCreator::Atomic(CommandBody::BlowOutInPlace(BlowOutInPlaceParams {
                    pipette_id: args.pipette.clone(),
                    flow_rate: args.flow_rate,
                })),
            ]
        }
    };
    reduce_command_creators(&creators, ctx, state, keys)
}
