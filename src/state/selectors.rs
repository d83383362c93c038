//! Typed module state selectors.
//!
//! The generic module map holds a [`ModuleState`] per module id. Selectors pull
//! out one kind's sub-state and return `None` when the id is absent *or*
//! belongs to another module kind: a heater-shaker is never read back as a
//! thermocycler. [`require_module`] is the boundary used by compound creators;
//! it turns absence into exactly one [`CommandCreatorError::MissingModule`].

use super::{
    AbsorbanceReaderState, HeaterShakerState, ModuleState, RobotState, TemperatureModuleState,
    ThermocyclerState,
};
use crate::error::CommandCreatorError;
use crate::registry::ModuleKind;

/// A kind-specific module sub-state that can be selected from [`ModuleState`].
pub trait ModuleSubState: Sized {
    /// The module kind this sub-state belongs to.
    const KIND: ModuleKind;

    /// Borrow the sub-state if `state` is of this kind.
    fn select(state: &ModuleState) -> Option<&Self>;
}

impl ModuleSubState for ThermocyclerState {
    const KIND: ModuleKind = ModuleKind::Thermocycler;

    fn select(state: &ModuleState) -> Option<&Self> {
        match state {
            ModuleState::Thermocycler(s) => Some(s),
            _ => None,
        }
    }
}

impl ModuleSubState for TemperatureModuleState {
    const KIND: ModuleKind = ModuleKind::Temperature;

    fn select(state: &ModuleState) -> Option<&Self> {
        match state {
            ModuleState::Temperature(s) => Some(s),
            _ => None,
        }
    }
}

impl ModuleSubState for HeaterShakerState {
    const KIND: ModuleKind = ModuleKind::HeaterShaker;

    fn select(state: &ModuleState) -> Option<&Self> {
        match state {
            ModuleState::HeaterShaker(s) => Some(s),
            _ => None,
        }
    }
}

impl ModuleSubState for AbsorbanceReaderState {
    const KIND: ModuleKind = ModuleKind::AbsorbanceReader;

    fn select(state: &ModuleState) -> Option<&Self> {
        match state {
            ModuleState::AbsorbanceReader(s) => Some(s),
            _ => None,
        }
    }
}

impl ModuleState {
    /// Kind of this module state.
    pub fn kind(&self) -> ModuleKind {
        match self {
            ModuleState::Thermocycler(_) => ModuleKind::Thermocycler,
            ModuleState::Temperature(_) => ModuleKind::Temperature,
            ModuleState::HeaterShaker(_) => ModuleKind::HeaterShaker,
            ModuleState::AbsorbanceReader(_) => ModuleKind::AbsorbanceReader,
        }
    }
}

/// Select a module's sub-state of kind `T`.
pub fn module_sub_state<'a, T: ModuleSubState>(
    state: &'a RobotState,
    module_id: &str,
) -> Option<&'a T> {
    state
        .modules
        .get(module_id)
        .and_then(|m| T::select(&m.module_state))
}

/// Select a module's sub-state, converting absence into a `MissingModule` error.
pub fn require_module<'a, T: ModuleSubState>(
    state: &'a RobotState,
    module_id: &str,
) -> Result<&'a T, CommandCreatorError> {
    module_sub_state(state, module_id).ok_or_else(|| CommandCreatorError::MissingModule {
        module_id: module_id.to_string(),
    })
}

/// Thermocycler sub-state.
pub fn thermocycler_state<'a>(state: &'a RobotState, module_id: &str) -> Option<&'a ThermocyclerState> {
    module_sub_state(state, module_id)
}

/// Temperature module sub-state.
pub fn temperature_module_state<'a>(
    state: &'a RobotState,
    module_id: &str,
) -> Option<&'a TemperatureModuleState> {
    module_sub_state(state, module_id)
}

/// Heater-shaker sub-state.
pub fn heater_shaker_state<'a>(state: &'a RobotState, module_id: &str) -> Option<&'a HeaterShakerState> {
    module_sub_state(state, module_id)
}

/// Plate reader sub-state.
pub fn absorbance_reader_state<'a>(
    state: &'a RobotState,
    module_id: &str,
) -> Option<&'a AbsorbanceReaderState> {
    module_sub_state(state, module_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck() -> RobotState {
        RobotState::new()
            .with_module(
                "tc",
                "B1",
                ModuleState::Thermocycler(ThermocyclerState::default()),
            )
            .with_module("hs", "D1", ModuleState::HeaterShaker(HeaterShakerState::default()))
    }

    #[test]
    fn test_selects_matching_kind() {
        let state = deck();
        assert!(thermocycler_state(&state, "tc").is_some());
        assert!(heater_shaker_state(&state, "hs").is_some());
    }

    #[test]
    fn test_wrong_kind_is_absent() {
        let state = deck();
        assert!(thermocycler_state(&state, "hs").is_none());
        assert!(absorbance_reader_state(&state, "tc").is_none());
        assert!(temperature_module_state(&state, "tc").is_none());
    }

    #[test]
    fn test_require_module_reports_missing() {
        let state = deck();
        let err = require_module::<ThermocyclerState>(&state, "nope").unwrap_err();
        assert_eq!(
            err,
            CommandCreatorError::MissingModule {
                module_id: "nope".into()
            }
        );
    }

    #[test]
    fn test_kind_constant_matches_variant() {
        let state = deck();
        let tc = &state.modules["tc"].module_state;
        assert_eq!(tc.kind(), ThermocyclerState::KIND);
    }
}
