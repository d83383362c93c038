//! Arguments and sequence building shared by transfer, consolidate and
//! distribute.
//!
//! [`LiquidPlan`] accumulates staged creators for one multi-well step. It owns
//! the resolved flow rates and knows how to expand the optional behaviors
//! (pre-wet, mix, delay, touch tip, air gap, blow-out) into concrete staged
//! creators; the step creators only decide the order of wells and tip changes.

use serde::{Deserialize, Serialize};

use crate::command::{
    CommandBody, MoveToWellParams, PipettingParams, TouchTipParams, WaitForDurationParams,
    WellLocation,
};
use crate::creators::atomic::pipetting::VOLUME_TOLERANCE;
use crate::creators::compound::mix::MixArgs;
use crate::creators::compound::pipetting::{AirGapArgs, BlowOutArgs, BlowOutTarget};
use crate::creators::compound::tips::{DropTipArgs, ReplaceTipArgs};
use crate::error::CommandCreatorError;
use crate::pipeline::CurriedCreator;
use crate::registry::InvariantContext;

/// Blow out back into the well liquid was drawn from.
pub const SOURCE_WELL_BLOWOUT_DESTINATION: &str = "source_well";
/// Blow out into the well liquid was delivered to.
pub const DEST_WELL_BLOWOUT_DESTINATION: &str = "dest_well";

/// When a multi-well step takes a fresh tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeTip {
    /// One tip for the whole step.
    #[default]
    Once,
    /// A fresh tip before every aspirate group.
    Always,
    /// Reuse the tip already attached.
    Never,
    /// A fresh tip whenever the source well changes.
    PerSource,
    /// A fresh tip whenever the destination well changes.
    PerDest,
}

/// Mix parameters for a single well.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MixSettings {
    /// Volume per mix cycle (µL).
    pub volume: f64,
    /// Number of aspirate/dispense cycles.
    pub times: u32,
}

/// Pause after an aspirate or dispense.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelaySettings {
    /// Pause length.
    pub seconds: f64,
    /// Height above the well bottom to hold at; stays in place when absent.
    #[serde(default)]
    pub mm_from_bottom: Option<f64>,
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

/// Options common to every multi-well liquid step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferLikeArgs {
    /// Pipette id.
    pub pipette: String,
    /// Volume per well (µL).
    pub volume: f64,
    /// Labware aspirated from.
    pub source_labware: String,
    /// Labware dispensed into.
    pub dest_labware: String,
    /// Tip change policy.
    #[serde(default)]
    pub change_tip: ChangeTip,
    /// Trash or waste chute equipment id used for tips and disposal volume.
    pub drop_tip_location: String,

    /// Flow rate overrides; the pipette defaults apply when absent.
    #[serde(default)]
    pub aspirate_flow_rate: Option<f64>,
    /// Dispense flow rate (µL/s).
    #[serde(default)]
    pub dispense_flow_rate: Option<f64>,
    /// Blow-out flow rate override (µL/s).
    #[serde(default)]
    pub blowout_flow_rate: Option<f64>,

    /// Aspirate height above the well bottom (mm).
    #[serde(default = "default_aspirate_offset")]
    pub aspirate_offset_from_bottom_mm: f64,
    /// Dispense height above the well bottom (mm).
    #[serde(default = "default_dispense_offset")]
    pub dispense_offset_from_bottom_mm: f64,

    /// Aspirate and dispense the same volume in the source once per fresh tip.
    #[serde(default)]
    pub pre_wet_tip: bool,
    /// Touch the source well wall after aspirating.
    #[serde(default)]
    pub touch_tip_after_aspirate: bool,
    /// Touch-tip height after aspirating, relative to the well top (mm).
    #[serde(default = "default_touch_tip_offset")]
    pub touch_tip_after_aspirate_offset_mm_from_top: f64,
    /// Touch the destination well wall after dispensing.
    #[serde(default)]
    pub touch_tip_after_dispense: bool,
    /// Touch-tip height after dispensing, relative to the well top (mm).
    #[serde(default = "default_touch_tip_offset")]
    pub touch_tip_after_dispense_offset_mm_from_top: f64,

    /// Air drawn after each aspirate (µL).
    #[serde(default)]
    pub aspirate_air_gap_volume: Option<f64>,
    /// Pause after each aspirate.
    #[serde(default)]
    pub aspirate_delay: Option<DelaySettings>,
    /// Pause after each dispense.
    #[serde(default)]
    pub dispense_delay: Option<DelaySettings>,
    /// Mix in the source before each aspirate.
    #[serde(default)]
    pub mix_before_aspirate: Option<MixSettings>,

    /// `source_well`, `dest_well`, or a trash/waste-chute equipment id.
    #[serde(default)]
    pub blowout_location: Option<String>,
    /// Blow-out height relative to the well top (mm).
    #[serde(default)]
    pub blowout_offset_from_top_mm: f64,
}

/// Most aspirate/dispense cycles one pairing may be split into.
pub const MAX_CHUNKS: usize = 1_000;

/// Split `volume` into equal chunks that each fit in `usable` µL.
pub(crate) fn split_volume(volume: f64, usable: f64) -> Result<Vec<f64>, CommandCreatorError> {
    let chunks = ((volume - VOLUME_TOLERANCE) / usable).ceil().max(1.0);
    if !chunks.is_finite() || chunks > MAX_CHUNKS as f64 {
        return Err(invalid_arguments(format!(
            "{volume} uL needs more than {MAX_CHUNKS} trips with a {usable} uL tip"
        )));
    }
    let chunks = chunks as usize;
    Ok(vec![volume / chunks as f64; chunks])
}

/// An `InvalidArguments` error.
pub(crate) fn invalid_arguments(reason: impl Into<String>) -> CommandCreatorError {
    CommandCreatorError::InvalidArguments {
        reason: reason.into(),
    }
}

/// Staged creators for one multi-well step, plus the resolved parameters
/// needed to build them.
pub(crate) struct LiquidPlan<'a> {
    args: &'a TransferLikeArgs,
    aspirate_flow_rate: f64,
    dispense_flow_rate: f64,
    blowout_flow_rate: f64,
    /// Tip capacity (µL).
    pub capacity: f64,
    /// Air gap per aspirate (µL), zero when disabled.
    pub air_gap: f64,
    steps: Vec<CurriedCreator>,
}

impl<'a> LiquidPlan<'a> {
    /// Resolve the pipette and flow rates, rejecting non-positive volumes.
    pub fn new(args: &'a TransferLikeArgs, ctx: &InvariantContext) -> Result<Self, CommandCreatorError> {
        let pipette = ctx.pipette(&args.pipette)?;
        if !args.volume.is_finite() || args.volume <= 0.0 {
            return Err(invalid_arguments(format!(
                "volume must be a positive number, got {}",
                args.volume
            )));
        }
        let air_gap = args.aspirate_air_gap_volume.unwrap_or(0.0).max(0.0);
        Ok(Self {
            args,
            aspirate_flow_rate: args
                .aspirate_flow_rate
                .unwrap_or(pipette.spec.default_aspirate_flow_rate),
            dispense_flow_rate: args
                .dispense_flow_rate
                .unwrap_or(pipette.spec.default_dispense_flow_rate),
            blowout_flow_rate: args
                .blowout_flow_rate
                .unwrap_or(pipette.spec.default_blow_out_flow_rate),
            capacity: ctx.tip_capacity(&args.pipette)?,
            air_gap,
            steps: Vec::new(),
        })
    }

    /// Whether a fresh tip is taken at all.
    pub fn changes_tips(&self) -> bool {
        self.args.change_tip != ChangeTip::Never
    }

    /// Swap the attached tip for a fresh one.
    pub fn replace_tip(&mut self) {
        self.steps.push(CurriedCreator::ReplaceTip(ReplaceTipArgs {
            pipette: self.args.pipette.clone(),
            drop_tip_location: self.args.drop_tip_location.clone(),
        }));
    }

    /// Drop the attached tip into the drop-tip location.
    pub fn drop_tip(&mut self) {
        self.steps.push(CurriedCreator::DropTip(DropTipArgs {
            pipette: self.args.pipette.clone(),
            drop_tip_location: self.args.drop_tip_location.clone(),
        }));
    }

    /// Mix `settings.times` cycles in a well.
    pub fn mix(&mut self, labware: &str, well: &str, settings: MixSettings) {
        if settings.times == 0 || settings.volume <= 0.0 {
            return;
        }
        self.steps.push(CurriedCreator::Mix(MixArgs {
            pipette: self.args.pipette.clone(),
            labware: labware.to_string(),
            well: well.to_string(),
            volume: settings.volume,
            times: settings.times,
            aspirate_flow_rate: self.aspirate_flow_rate,
            dispense_flow_rate: self.dispense_flow_rate,
            aspirate_offset_from_bottom_mm: self.args.aspirate_offset_from_bottom_mm,
            dispense_offset_from_bottom_mm: self.args.dispense_offset_from_bottom_mm,
            aspirate_delay_seconds: None,
            dispense_delay_seconds: None,
        }));
    }

    /// Mix before aspirating, when the step asks for it.
    pub fn mix_before_aspirate(&mut self, labware: &str, well: &str) {
        if let Some(settings) = self.args.mix_before_aspirate {
            self.mix(labware, well, settings);
        }
    }

    /// One pre-wet cycle of `volume` in the source well, when enabled.
    pub fn pre_wet(&mut self, labware: &str, well: &str, volume: f64) {
        if self.args.pre_wet_tip {
            self.mix(labware, well, MixSettings { volume, times: 1 });
        }
    }

    /// Aspirate, then the aspirate delay and touch tip if enabled.
    pub fn aspirate(&mut self, labware: &str, well: &str, volume: f64) {
        self.steps.push(CurriedCreator::Atomic(CommandBody::Aspirate(PipettingParams {
            pipette_id: self.args.pipette.clone(),
            labware_id: labware.to_string(),
            well_name: well.to_string(),
            volume,
            flow_rate: self.aspirate_flow_rate,
            well_location: WellLocation::from_bottom(self.args.aspirate_offset_from_bottom_mm),
        })));
        if let Some(delay) = self.args.aspirate_delay {
            self.delay(labware, well, delay);
        }
        if self.args.touch_tip_after_aspirate {
            self.touch_tip(labware, well, self.args.touch_tip_after_aspirate_offset_mm_from_top);
        }
    }

    /// Air gap above the well just aspirated from, when enabled.
    pub fn air_gap(&mut self, labware: &str, well: &str) {
        if self.air_gap <= 0.0 {
            return;
        }
        self.steps.push(CurriedCreator::AirGap(AirGapArgs {
            pipette: self.args.pipette.clone(),
            labware: labware.to_string(),
            well: well.to_string(),
            volume: self.air_gap,
            flow_rate: self.aspirate_flow_rate,
        }));
    }

    /// Dispense, then the dispense delay if enabled.
    pub fn dispense(&mut self, labware: &str, well: &str, volume: f64) {
        self.steps.push(CurriedCreator::Atomic(CommandBody::Dispense(PipettingParams {
            pipette_id: self.args.pipette.clone(),
            labware_id: labware.to_string(),
            well_name: well.to_string(),
            volume,
            flow_rate: self.dispense_flow_rate,
            well_location: WellLocation::from_bottom(self.args.dispense_offset_from_bottom_mm),
        })));
        if let Some(delay) = self.args.dispense_delay {
            self.delay(labware, well, delay);
        }
    }

    /// Touch tip after dispensing, when enabled.
    pub fn touch_tip_after_dispense(&mut self, labware: &str, well: &str) {
        if self.args.touch_tip_after_dispense {
            self.touch_tip(labware, well, self.args.touch_tip_after_dispense_offset_mm_from_top);
        }
    }

    /// Blow out to the configured location, if any.
    pub fn blow_out(&mut self, source: (&str, &str), dest: (&str, &str)) {
        let Some(location) = self.args.blowout_location.as_deref() else {
            return;
        };
        let target = match location {
            SOURCE_WELL_BLOWOUT_DESTINATION => BlowOutTarget::Well {
                labware_id: source.0.to_string(),
                well_name: source.1.to_string(),
            },
            DEST_WELL_BLOWOUT_DESTINATION => BlowOutTarget::Well {
                labware_id: dest.0.to_string(),
                well_name: dest.1.to_string(),
            },
            equipment => BlowOutTarget::Equipment {
                equipment_id: equipment.to_string(),
            },
        };
        self.push_blow_out(target);
    }

    /// Discard whatever is left in the tip into trash equipment: the
    /// blow-out location when it names equipment, the drop-tip location
    /// otherwise.
    pub fn blow_out_to_trash(&mut self) {
        let equipment_id = match self.args.blowout_location.as_deref() {
            Some(SOURCE_WELL_BLOWOUT_DESTINATION) | Some(DEST_WELL_BLOWOUT_DESTINATION) | None => {
                self.args.drop_tip_location.clone()
            }
            Some(equipment) => equipment.to_string(),
        };
        self.push_blow_out(BlowOutTarget::Equipment { equipment_id });
    }

    fn push_blow_out(&mut self, target: BlowOutTarget) {
        self.steps.push(CurriedCreator::BlowOut(BlowOutArgs {
            pipette: self.args.pipette.clone(),
            target,
            flow_rate: self.blowout_flow_rate,
            offset_from_top_mm: self.args.blowout_offset_from_top_mm,
        }));
    }

    fn touch_tip(&mut self, labware: &str, well: &str, offset_from_top: f64) {
        self.steps.push(CurriedCreator::Atomic(CommandBody::TouchTip(TouchTipParams {
            pipette_id: self.args.pipette.clone(),
            labware_id: labware.to_string(),
            well_name: well.to_string(),
            well_location: WellLocation::from_top(offset_from_top),
        })));
    }

    fn delay(&mut self, labware: &str, well: &str, delay: DelaySettings) {
        if let Some(z) = delay.mm_from_bottom {
            self.steps.push(CurriedCreator::Atomic(CommandBody::MoveToWell(MoveToWellParams {
                pipette_id: self.args.pipette.clone(),
                labware_id: labware.to_string(),
                well_name: well.to_string(),
                well_location: WellLocation::from_bottom(z),
            })));
        }
        self.steps.push(CurriedCreator::Atomic(CommandBody::WaitForDuration(
            WaitForDurationParams {
                seconds: delay.seconds,
                message: None,
            },
        )));
    }

    /// The staged creators, in order.
    pub fn finish(self) -> Vec<CurriedCreator> {
        self.steps
    }
}

/// Fail unless `wells` is non-empty.
pub(crate) fn require_wells(wells: &[String], what: &str) -> Result<(), CommandCreatorError> {
    if wells.is_empty() {
        return Err(invalid_arguments(format!("no {what} wells given")));
    }
    Ok(())
}
