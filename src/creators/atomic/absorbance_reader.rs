//! Absorbance plate reader atomic creators.

use crate::command::{
    AbsorbanceInitializeParams, AbsorbanceReadParams, CommandBody, ModuleParams,
};
use crate::creators::{emit, CommandCreatorResult};
use crate::keys::KeyGenerator;
use crate::registry::InvariantContext;
use crate::state::RobotState;

/// `absorbanceReader/openLid`
pub fn open_lid(
    args: &ModuleParams,
    _ctx: &InvariantContext,
    _state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    emit(keys, CommandBody::AbsorbanceReaderOpenLid(args.clone()))
}

/// `absorbanceReader/closeLid`
pub fn close_lid(
    args: &ModuleParams,
    _ctx: &InvariantContext,
    _state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    emit(keys, CommandBody::AbsorbanceReaderCloseLid(args.clone()))
}

/// `absorbanceReader/initialize`
pub fn initialize(
    args: &AbsorbanceInitializeParams,
    _ctx: &InvariantContext,
    _state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    emit(keys, CommandBody::AbsorbanceReaderInitialize(args.clone()))
}

/// `absorbanceReader/read`
///
/// `file_name` is carried through as given; `None` leaves the key off the wire.
pub fn read(
    args: &AbsorbanceReadParams,
    _ctx: &InvariantContext,
    _state: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> CommandCreatorResult {
    emit(keys, CommandBody::AbsorbanceReaderRead(args.clone()))
}
