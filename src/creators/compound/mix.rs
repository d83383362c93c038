//! Mixing: repeated aspirate/dispense cycles within one well.
//!
//! Each cycle aspirates and dispenses the same volume in the same well, so the
//! well's tracked total is unchanged once the cycle completes.

use serde::{Deserialize, Serialize};

use crate::command::{CommandBody, PipettingParams, TouchTipParams, WaitForDurationParams, WellLocation};
use crate::creators::compound::common::{
    invalid_arguments, require_wells, ChangeTip, DEST_WELL_BLOWOUT_DESTINATION,
    SOURCE_WELL_BLOWOUT_DESTINATION,
};
use crate::creators::compound::pipetting::{BlowOutArgs, BlowOutTarget};
use crate::creators::compound::tips::{DropTipArgs, ReplaceTipArgs};
use crate::creators::CommandCreatorResult;
use crate::keys::KeyGenerator;
use crate::pipeline::{reduce_command_creators, CurriedCreator};
use crate::registry::InvariantContext;
use crate::state::RobotState;

/// Arguments for [`mix`]: one well, fully resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct MixArgs {
    /// Pipette id.
    pub pipette: String,
    /// Labware id.
    pub labware: String,
    /// Well name.
    pub well: String,
    /// Volume per cycle (µL).
    pub volume: f64,
    /// Number of aspirate/dispense cycles.
    pub times: u32,
    /// Aspirate flow rate (µL/s).
    pub aspirate_flow_rate: f64,
    /// Dispense flow rate (µL/s).
    pub dispense_flow_rate: f64,
    /// Aspirate height above the well bottom (mm).
    pub aspirate_offset_from_bottom_mm: f64,
    /// Dispense height above the well bottom (mm).
    pub dispense_offset_from_bottom_mm: f64,
    /// Pause after each aspirate (s).
    pub aspirate_delay_seconds: Option<f64>,
    /// Pause after each dispense (s).
    pub dispense_delay_seconds: Option<f64>,
}

/// `times` aspirate/dispense cycles in one well.
pub fn mix(
    args: &MixArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let mut creators = Vec::with_capacity(args.times as usize * 4);
    for _ in 0..args.times {
        creators.push(CurriedCreator::Atomic(CommandBody::Aspirate(PipettingParams {
            pipette_id: args.pipette.clone(),
            labware_id: args.labware.clone(),
            well_name: args.well.clone(),
            volume: args.volume,
            flow_rate: args.aspirate_flow_rate,
            well_location: WellLocation::from_bottom(args.aspirate_offset_from_bottom_mm),
        })));
        if let Some(seconds) = args.aspirate_delay_seconds {
            creators.push(wait(seconds));
        }
        creators.push(CurriedCreator::Atomic(CommandBody::Dispense(PipettingParams {
            pipette_id: args.pipette.clone(),
            labware_id: args.labware.clone(),
            well_name: args.well.clone(),
            volume: args.volume,
            flow_rate: args.dispense_flow_rate,
            well_location: WellLocation::from_bottom(args.dispense_offset_from_bottom_mm),
        })));
        if let Some(seconds) = args.dispense_delay_seconds {
            creators.push(wait(seconds));
        }
    }
    reduce_command_creators(&creators, ctx, state, keys)
}

fn wait(seconds: f64) -> CurriedCreator {
    CurriedCreator::Atomic(CommandBody::WaitForDuration(WaitForDurationParams {
        seconds,
        message: None,
    }))
}

fn default_aspirate_offset() -> f64 {
    1.0
}

fn default_dispense_offset() -> f64 {
    0.5
}

fn default_touch_tip_offset() -> f64 {
    -1.0
}

/// Arguments of the `mix` protocol step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MixStepArgs {
    /// Pipette id.
    pub pipette: String,
    /// Labware holding the wells.
    pub labware: String,
    /// Wells mixed, in order.
    pub wells: Vec<String>,
    /// Volume per cycle (µL).
    pub volume: f64,
    /// Number of aspirate/dispense cycles.
    pub times: u32,
    /// Tip change policy.
    #[serde(default)]
    pub change_tip: ChangeTip,
    /// Trash or waste chute equipment id for used tips.
    pub drop_tip_location: String,
    /// Aspirate flow rate override (µL/s).
    #[serde(default)]
    pub aspirate_flow_rate: Option<f64>,
    /// Dispense flow rate override (µL/s).
    #[serde(default)]
    pub dispense_flow_rate: Option<f64>,
    /// Aspirate height above the well bottom (mm).
    #[serde(default = "default_aspirate_offset")]
    pub aspirate_offset_from_bottom_mm: f64,
    /// Dispense height above the well bottom (mm).
    #[serde(default = "default_dispense_offset")]
    pub dispense_offset_from_bottom_mm: f64,
    /// Pause after each aspirate (s).
    #[serde(default)]
    pub aspirate_delay_seconds: Option<f64>,
    /// Pause after each dispense (s).
    #[serde(default)]
    pub dispense_delay_seconds: Option<f64>,
    /// Touch the well wall after mixing.
    #[serde(default)]
    pub touch_tip: bool,
    /// Touch-tip height relative to the well top (mm).
    #[serde(default = "default_touch_tip_offset")]
    pub touch_tip_mm_from_top: f64,
    /// `source_well`/`dest_well` (both mean the mixed well) or an equipment id.
    #[serde(default)]
    pub blowout_location: Option<String>,
    /// Blow-out flow rate override (µL/s).
    #[serde(default)]
    pub blowout_flow_rate: Option<f64>,
    /// Blow-out height relative to the well top (mm).
    #[serde(default)]
    pub blowout_offset_from_top_mm: f64,
}

/// The `mix` step: mix each well in turn, with blow-out, touch tip and tip
/// changes as requested.
pub fn mix_step(
    args: &MixStepArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let pipette = ctx.pipette(&args.pipette)?;
    require_wells(&args.wells, "mix")?;
    if args.times == 0 || args.volume.is_nan() || args.volume <= 0.0 {
        return Err(invalid_arguments("mix needs a positive volume and at least one cycle").into());
    }

    let aspirate_flow_rate = args
        .aspirate_flow_rate
        .unwrap_or(pipette.spec.default_aspirate_flow_rate);
    let dispense_flow_rate = args
        .dispense_flow_rate
        .unwrap_or(pipette.spec.default_dispense_flow_rate);
    let blowout_flow_rate = args
        .blowout_flow_rate
        .unwrap_or(pipette.spec.default_blow_out_flow_rate);

    let mut creators = Vec::new();
    for (index, well) in args.wells.iter().enumerate() {
        let fresh_tip = match args.change_tip {
            ChangeTip::Always | ChangeTip::PerSource | ChangeTip::PerDest => true,
            ChangeTip::Once => index == 0,
            ChangeTip::Never => false,
        };
        if fresh_tip {
            creators.push(CurriedCreator::ReplaceTip(ReplaceTipArgs {
                pipette: args.pipette.clone(),
                drop_tip_location: args.drop_tip_location.clone(),
            }));
        }

        creators.push(CurriedCreator::Mix(MixArgs {
            pipette: args.pipette.clone(),
            labware: args.labware.clone(),
            well: well.clone(),
            volume: args.volume,
            times: args.times,
            aspirate_flow_rate,
            dispense_flow_rate,
            aspirate_offset_from_bottom_mm: args.aspirate_offset_from_bottom_mm,
            dispense_offset_from_bottom_mm: args.dispense_offset_from_bottom_mm,
            aspirate_delay_seconds: args.aspirate_delay_seconds,
            dispense_delay_seconds: args.dispense_delay_seconds,
        }));

        if let Some(location) = args.blowout_location.as_deref() {
            let target = match location {
                SOURCE_WELL_BLOWOUT_DESTINATION | DEST_WELL_BLOWOUT_DESTINATION => {
                    BlowOutTarget::Well {
                        labware_id: args.labware.clone(),
                        well_name: well.clone(),
                    }
                }
                equipment => BlowOutTarget::Equipment {
                    equipment_id: equipment.to_string(),
                },
            };
            creators.push(CurriedCreator::BlowOut(BlowOutArgs {
                pipette: args.pipette.clone(),
                target,
                flow_rate: blowout_flow_rate,
                offset_from_top_mm: args.blowout_offset_from_top_mm,
            }));
        }

        if args.touch_tip {
            creators.push(CurriedCreator::Atomic(CommandBody::TouchTip(TouchTipParams {
                pipette_id: args.pipette.clone(),
                labware_id: args.labware.clone(),
                well_name: well.clone(),
                well_location: WellLocation::from_top(args.touch_tip_mm_from_top),
            })));
        }
    }

    if args.change_tip != ChangeTip::Never {
        creators.push(CurriedCreator::DropTip(DropTipArgs {
            pipette: args.pipette.clone(),
            drop_tip_location: args.drop_tip_location.clone(),
        }));
    }
    reduce_command_creators(&creators, ctx, state, keys)
}
