//! Composition pipeline.
//!
//! A [`CurriedCreator`] is a staged operation: the tag of a creator plus the
//! arguments bound to it. [`reduce_command_creators`] runs a list of them in
//! order against a state snapshot that it advances after each one with
//! [`apply_commands`]. Commands and warnings accumulate; the first creator to
//! return errors ends the chain, and everything accumulated so far is
//! discarded so callers never see a partially planned step.

use tracing::{debug, trace};

use crate::command::CommandBody;
use crate::creators::compound::{
    self, AirGapArgs, BlowOutArgs, DropTipArgs, MixArgs, ReplaceTipArgs, ThermocyclerStateArgs,
};
use crate::creators::{atomic, CommandCreatorResult, CommandsAndWarnings};
use crate::error::ErrorList;
use crate::keys::KeyGenerator;
use crate::registry::InvariantContext;
use crate::state::effects::apply_commands;
use crate::state::RobotState;

/// A creator bound to its arguments, ready to run in a chain.
#[derive(Debug, Clone, PartialEq)]
pub enum CurriedCreator {
    /// One atomic command; the payload is the bound argument set.
    Atomic(CommandBody),
    /// Swap in a fresh tip.
    ReplaceTip(ReplaceTipArgs),
    /// Drop the attached tip.
    DropTip(DropTipArgs),
    /// Rise above a well and draw air.
    AirGap(AirGapArgs),
    /// Blow out into a well or over trash.
    BlowOut(BlowOutArgs),
    /// Mix cycles in one well.
    Mix(MixArgs),
    /// Reach a thermocycler state through its diff.
    ThermocyclerState(ThermocyclerStateArgs),
}

impl CurriedCreator {
    /// Creator tag, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Atomic(body) => body.command_type(),
            Self::ReplaceTip(_) => "replaceTip",
            Self::DropTip(_) => "dropTip",
            Self::AirGap(_) => "airGap",
            Self::BlowOut(_) => "blowOut",
            Self::Mix(_) => "mix",
            Self::ThermocyclerState(_) => "thermocyclerState",
        }
    }

    /// Execute the bound creator against `state`.
    pub fn run(
        &self,
        ctx: &InvariantContext,
        state: &RobotState,
        keys: &mut dyn KeyGenerator,
    ) -> CommandCreatorResult {
        match self {
            Self::Atomic(body) => atomic::create(body, ctx, state, keys),
            Self::ReplaceTip(args) => compound::replace_tip(args, ctx, state, keys),
            Self::DropTip(args) => compound::drop_tip(args, ctx, state, keys),
            Self::AirGap(args) => compound::air_gap(args, ctx, state, keys),
            Self::BlowOut(args) => compound::blow_out(args, ctx, state, keys),
            Self::Mix(args) => compound::mix(args, ctx, state, keys),
            Self::ThermocyclerState(args) => {
                compound::thermocycler_state_step(args, ctx, state, keys)
            }
        }
    }
}

/// Run `creators` in order, threading state; all commands or only errors.
pub fn reduce_command_creators(
    creators: &[CurriedCreator],
    ctx: &InvariantContext,
    initial: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    reduce_with_state(creators, ctx, initial, keys).map(|(output, _)| output)
}

/// Like [`reduce_command_creators`], also returning the state after the
/// last command.
pub fn reduce_with_state(
    creators: &[CurriedCreator],
    ctx: &InvariantContext,
    initial: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> Result<(CommandsAndWarnings, RobotState), ErrorList> {
    let mut state = initial.clone();
    let mut output = CommandsAndWarnings::default();

    for (index, creator) in creators.iter().enumerate() {
        match creator.run(ctx, &state, keys) {
            Ok(step) => {
                trace!(
                    creator = creator.name(),
                    index,
                    commands = step.commands.len(),
                    warnings = step.warnings.len(),
                    "creator emitted"
                );
                state = apply_commands(&step.commands, ctx, &state);
                output.commands.extend(step.commands);
                output.warnings.extend(step.warnings);
            }
            Err(errors) => {
                debug!(
                    creator = creator.name(),
                    index,
                    errors = errors.errors.len(),
                    discarded = output.commands.len(),
                    "creator failed, discarding chain"
                );
                return Err(errors);
            }
        }
    }
    Ok((output, state))
}
