//! Many-to-one liquid consolidation.

use serde::{Deserialize, Serialize};

use crate::creators::atomic::pipetting::VOLUME_TOLERANCE;
use crate::creators::compound::common::{
    invalid_arguments, require_wells, ChangeTip, LiquidPlan, MixSettings, TransferLikeArgs,
};
use crate::creators::CommandCreatorResult;
use crate::keys::KeyGenerator;
use crate::pipeline::reduce_command_creators;
use crate::registry::InvariantContext;
use crate::state::RobotState;

/// Arguments of the `consolidate` step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidateArgs {
    /// Fields shared by every multi-well liquid step.
    #[serde(flatten)]
    pub common: TransferLikeArgs,
    /// Wells drawn from, in order.
    pub source_wells: Vec<String>,
    /// The single destination well.
    pub dest_well: String,
    /// Mix in the destination after each dispense.
    #[serde(default)]
    pub mix_in_destination: Option<MixSettings>,
}

/// The `consolidate` step.
///
/// Sources are grouped into as many wells as one tip can hold (volume plus
/// air gap each). Every group is aspirated well by well and then dispensed
/// into the destination in one combined dispense.
pub fn consolidate(
    args: &ConsolidateArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let common = &args.common;
    let mut plan = LiquidPlan::new(common, ctx)?;
    require_wells(&args.source_wells, "source")?;

    let air_gap = plan.air_gap;
    let per_aspirate = common.volume + air_gap;
    let wells_per_tip = ((plan.capacity + VOLUME_TOLERANCE) / per_aspirate).floor() as usize;
    if wells_per_tip == 0 {
        return Err(invalid_arguments(format!(
            "{per_aspirate} uL per well does not fit in a {} uL tip",
            plan.capacity
        ))
        .into());
    }

    let (src_lw, dst_lw) = (common.source_labware.as_str(), common.dest_labware.as_str());
    let dest = args.dest_well.as_str();
    for (group_index, group) in args.source_wells.chunks(wells_per_tip).enumerate() {
        let fresh_tip = match common.change_tip {
            ChangeTip::Always | ChangeTip::PerSource => true,
            ChangeTip::Once | ChangeTip::PerDest => group_index == 0,
            ChangeTip::Never => false,
        };
        if fresh_tip {
            plan.replace_tip();
        }

        for (well_index, source) in group.iter().enumerate() {
            if well_index == 0 {
                plan.mix_before_aspirate(src_lw, source);
                if fresh_tip || group_index == 0 {
                    plan.pre_wet(src_lw, source, common.volume);
                }
            }
            plan.aspirate(src_lw, source, common.volume);
            plan.air_gap(src_lw, source);
        }

        plan.dispense(dst_lw, dest, group.len() as f64 * per_aspirate);
        if let Some(settings) = args.mix_in_destination {
            plan.mix(dst_lw, dest, settings);
        }
        plan.touch_tip_after_dispense(dst_lw, dest);
        let last_source = group.last().map(String::as_str).unwrap_or_default();
        plan.blow_out((src_lw, last_source), (dst_lw, dest));
    }

    if plan.changes_tips() {
        plan.drop_tip();
    }
    reduce_command_creators(&plan.finish(), ctx, state, keys)
}
