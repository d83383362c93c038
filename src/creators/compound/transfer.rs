//! One-to-one liquid transfer between well lists.

use serde::{Deserialize, Serialize};

use crate::creators::compound::common::{
    invalid_arguments, require_wells, split_volume, ChangeTip, LiquidPlan, MixSettings,
    TransferLikeArgs,
};
use crate::creators::CommandCreatorResult;
use crate::keys::KeyGenerator;
use crate::pipeline::reduce_command_creators;
use crate::registry::InvariantContext;
use crate::state::RobotState;

/// Arguments of the `transfer` step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferArgs {
    /// Fields shared by every multi-well liquid step.
    #[serde(flatten)]
    pub common: TransferLikeArgs,
    /// Source wells, paired in order with `dest_wells`.
    pub source_wells: Vec<String>,
    /// Destination wells.
    pub dest_wells: Vec<String>,
    /// Mix in each destination after dispensing.
    #[serde(default)]
    pub mix_in_destination: Option<MixSettings>,
}

/// Pair sources with destinations. A single well on either side is paired
/// with every well on the other.
fn pair_wells<'a>(sources: &'a [String], dests: &'a [String]) -> Option<Vec<(&'a str, &'a str)>> {
    match (sources.len(), dests.len()) {
        (s, d) if s == d => Some(
            sources
                .iter()
                .zip(dests)
                .map(|(s, d)| (s.as_str(), d.as_str()))
                .collect(),
        ),
        (1, _) => Some(dests.iter().map(|d| (sources[0].as_str(), d.as_str())).collect()),
        (_, 1) => Some(sources.iter().map(|s| (s.as_str(), dests[0].as_str())).collect()),
        _ => None,
    }
}

/// The `transfer` step.
///
/// Each source/destination pairing gets its own aspirate/dispense group. A
/// volume that does not fit in one tip (less any air gap) is split into
/// equal chunks.
pub fn transfer(
    args: &TransferArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let common = &args.common;
    let mut plan = LiquidPlan::new(common, ctx)?;
    require_wells(&args.source_wells, "source")?;
    require_wells(&args.dest_wells, "destination")?;
    let pairs = pair_wells(&args.source_wells, &args.dest_wells).ok_or_else(|| {
        invalid_arguments(format!(
            "cannot pair {} source wells with {} destination wells",
            args.source_wells.len(),
            args.dest_wells.len()
        ))
    })?;

    let air_gap = plan.air_gap;
    let usable = plan.capacity - air_gap;
    if usable <= 0.0 {
        return Err(invalid_arguments("air gap leaves no room in the tip").into());
    }
    let chunks = split_volume(common.volume, usable)?;

    let (src_lw, dst_lw) = (common.source_labware.as_str(), common.dest_labware.as_str());
    let mut previous: Option<(&str, &str)> = None;
    for (pair_index, &(source, dest)) in pairs.iter().enumerate() {
        for (chunk_index, &chunk) in chunks.iter().enumerate() {
            let first_chunk = chunk_index == 0;
            let fresh_tip = match common.change_tip {
                ChangeTip::Always => true,
                ChangeTip::Once => pair_index == 0 && first_chunk,
                ChangeTip::Never => false,
                ChangeTip::PerSource => first_chunk && previous.map(|p| p.0) != Some(source),
                ChangeTip::PerDest => first_chunk && previous.map(|p| p.1) != Some(dest),
            };
            if fresh_tip {
                plan.replace_tip();
            }

            plan.mix_before_aspirate(src_lw, source);
            if fresh_tip || (pair_index == 0 && first_chunk) {
                plan.pre_wet(src_lw, source, chunk);
            }
            plan.aspirate(src_lw, source, chunk);
            plan.air_gap(src_lw, source);

            plan.dispense(dst_lw, dest, chunk + air_gap);
            if let Some(settings) = args.mix_in_destination {
                plan.mix(dst_lw, dest, settings);
            }
            plan.touch_tip_after_dispense(dst_lw, dest);
            plan.blow_out((src_lw, source), (dst_lw, dest));
        }
        previous = Some((source, dest));
    }

    if plan.changes_tips() {
        plan.drop_tip();
    }
    reduce_command_creators(&plan.finish(), ctx, state, keys)
}
