//! One-to-many liquid distribution.

use serde::{Deserialize, Serialize};

use crate::creators::atomic::pipetting::VOLUME_TOLERANCE;
use crate::creators::compound::common::{
    invalid_arguments, require_wells, ChangeTip, LiquidPlan, TransferLikeArgs,
};
use crate::creators::CommandCreatorResult;
use crate::keys::KeyGenerator;
use crate::pipeline::reduce_command_creators;
use crate::registry::InvariantContext;
use crate::state::RobotState;

/// Arguments of the `distribute` step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributeArgs {
    /// Fields shared by every multi-well liquid step.
    #[serde(flatten)]
    pub common: TransferLikeArgs,
    /// The single source well.
    pub source_well: String,
    /// Wells dispensed into, in order.
    pub dest_wells: Vec<String>,
    /// Extra volume aspirated with every group and discarded to trash.
    #[serde(default)]
    pub disposal_volume: Option<f64>,
}

/// The `distribute` step.
///
/// Destinations are grouped into as many wells as one tip can serve. Each
/// group is one aspirate of `volume * wells + disposal` followed by one
/// dispense per destination. A disposal volume is never dispensed into a
/// tracked well: it is blown out over trash after the group.
pub fn distribute(
    args: &DistributeArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let common = &args.common;
    let mut plan = LiquidPlan::new(common, ctx)?;
    require_wells(&args.dest_wells, "destination")?;

    let air_gap = plan.air_gap;
    let disposal = args.disposal_volume.unwrap_or(0.0).max(0.0);
    let usable = plan.capacity - disposal - air_gap;
    let wells_per_tip = ((usable + VOLUME_TOLERANCE) / common.volume).floor().max(0.0) as usize;
    if wells_per_tip == 0 {
        return Err(invalid_arguments(format!(
            "{} uL per well plus {disposal} uL disposal does not fit in a {} uL tip",
            common.volume, plan.capacity
        ))
        .into());
    }

    let (src_lw, dst_lw) = (common.source_labware.as_str(), common.dest_labware.as_str());
    let source = args.source_well.as_str();
    for (group_index, group) in args.dest_wells.chunks(wells_per_tip).enumerate() {
        let fresh_tip = match common.change_tip {
            ChangeTip::Always | ChangeTip::PerDest => true,
            ChangeTip::Once | ChangeTip::PerSource => group_index == 0,
            ChangeTip::Never => false,
        };
        if fresh_tip {
            plan.replace_tip();
        }

        let group_volume = common.volume * group.len() as f64 + disposal;
        plan.mix_before_aspirate(src_lw, source);
        if fresh_tip || group_index == 0 {
            plan.pre_wet(src_lw, source, group_volume);
        }
        plan.aspirate(src_lw, source, group_volume);
        plan.air_gap(src_lw, source);

        for (well_index, dest) in group.iter().enumerate() {
            plan.dispense(dst_lw, dest, common.volume + air_gap);
            plan.touch_tip_after_dispense(dst_lw, dest);
            if well_index + 1 < group.len() {
                plan.air_gap(dst_lw, dest);
            }
        }

        if disposal > 0.0 {
            plan.blow_out_to_trash();
        } else {
            let last_dest = group.last().map(String::as_str).unwrap_or_default();
            plan.blow_out((src_lw, source), (dst_lw, last_dest));
        }
    }

    if plan.changes_tips() {
        plan.drop_tip();
    }
    reduce_command_creators(&plan.finish(), ctx, state, keys)
}
