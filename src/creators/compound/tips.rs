//! Tip handling: replace and drop.

use serde::{Deserialize, Serialize};

use crate::command::{
    CommandBody, MoveToAddressableAreaForDropTipParams, Offset, PickUpTipParams, PipetteParams,
};
use crate::creators::{CommandCreatorResult, CommandsAndWarnings};
use crate::error::CommandCreatorError;
use crate::keys::KeyGenerator;
use crate::pipeline::{reduce_command_creators, CurriedCreator};
use crate::registry::InvariantContext;
use crate::state::RobotState;

/// Arguments for [`replace_tip`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceTipArgs {
    /// Pipette id.
    pub pipette: String,
    /// Equipment id the old tip is dropped into.
    pub drop_tip_location: String,
}

/// Arguments for [`drop_tip`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropTipArgs {
    /// Pipette id.
    pub pipette: String,
    /// Trash bin or waste chute equipment id.
    pub drop_tip_location: String,
}

/// Drop the attached tip (if any), then pick up the next available one.
///
/// Tips are taken from the pipette's tipracks in priority order, wells in
/// column order. `InsufficientTips` when every rack is empty.
pub fn replace_tip(
    args: &ReplaceTipArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    ctx.pipette(&args.pipette)?;
    let tip = state
        .next_tip(ctx, &args.pipette)
        .ok_or_else(|| CommandCreatorError::InsufficientTips {
            pipette_id: args.pipette.clone(),
        })?;

    let mut creators = Vec::with_capacity(2);
    if state.has_tip(&args.pipette) {
        creators.push(CurriedCreator::DropTip(DropTipArgs {
            pipette: args.pipette.clone(),
            drop_tip_location: args.drop_tip_location.clone(),
        }));
    }
    creators.push(CurriedCreator::Atomic(CommandBody::PickUpTip(PickUpTipParams {
        pipette_id: args.pipette.clone(),
        labware_id: tip.tiprack_id,
        well_name: tip.well_name,
    })));
    reduce_command_creators(&creators, ctx, state, keys)
}

/// Move over the trash or waste chute and drop the tip there.
///
/// No commands when no tip is attached.
pub fn drop_tip(
    args: &DropTipArgs,
    ctx: &InvariantContext,
    state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    let pipette = ctx.pipette(&args.pipette)?;
    if !state.has_tip(&args.pipette) {
        return Ok(CommandsAndWarnings::default());
    }
    let area = ctx
        .equipment(&args.drop_tip_location)
        .and_then(|equipment| equipment.addressable_area_name(pipette.spec.channels))
        .ok_or_else(|| CommandCreatorError::DropTipLocationDoesNotExist {
            location: args.drop_tip_location.clone(),
        })?;

    let creators = [
        CurriedCreator::Atomic(CommandBody::MoveToAddressableAreaForDropTip(
            MoveToAddressableAreaForDropTipParams {
                pipette_id: args.pipette.clone(),
                addressable_area_name: area,
                offset: Offset::default(),
                alternate_drop_location: true,
            },
        )),
        CurriedCreator::Atomic(CommandBody::DropTipInPlace(PipetteParams {
            pipette_id: args.pipette.clone(),
        })),
    ];
    reduce_command_creators(&creators, ctx, state, keys)
}
