//! Current-vs-desired module comparisons.
//!
//! A diff is a set of independent flags, one per transition. The functions
//! here only detect differences; the order in which transitions are emitted
//! belongs to the compound creator consuming the diff.
//!
//! Deactivation is flagged only when the dimension is currently active, so a
//! module already in the desired configuration yields an empty diff.

use serde::{Deserialize, Serialize};

use crate::state::{TemperatureModuleState, ThermocyclerState};

/// Transitions needed to bring a thermocycler to a desired state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThermocyclerStateDiff {
    /// Lid must open.
    pub needs_lid_open: bool,
    /// Lid must close.
    pub needs_lid_close: bool,
    /// Block target must be set and awaited.
    pub needs_block_set: bool,
    /// Block heater must be turned off.
    pub needs_block_deactivate: bool,
    /// Lid heater target must be set and awaited.
    pub needs_lid_temp_set: bool,
    /// Lid heater must be turned off.
    pub needs_lid_temp_deactivate: bool,
}

impl ThermocyclerStateDiff {
    /// True when no transition is needed.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Compare a thermocycler's current state with the desired one.
///
/// A desired `lid_open` of `None` leaves the lid where it is; `None`
/// temperatures mean "heater off".
pub fn diff_thermocycler_state(
    current: &ThermocyclerState,
    desired: &ThermocyclerState,
) -> ThermocyclerStateDiff {
    let (needs_block_set, needs_block_deactivate) =
        target_diff(current.block_target_temp, desired.block_target_temp);
    let (needs_lid_temp_set, needs_lid_temp_deactivate) =
        target_diff(current.lid_target_temp, desired.lid_target_temp);

    ThermocyclerStateDiff {
        needs_lid_open: desired.lid_open == Some(true) && current.lid_open != Some(true),
        needs_lid_close: desired.lid_open == Some(false) && current.lid_open != Some(false),
        needs_block_set,
        needs_block_deactivate,
        needs_lid_temp_set,
        needs_lid_temp_deactivate,
    }
}

/// Transitions needed to bring a temperature module to a desired target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureDiff {
    /// Target must be set and awaited.
    pub needs_set: bool,
    /// Module must be turned off.
    pub needs_deactivate: bool,
}

impl TemperatureDiff {
    /// True when no transition is needed.
    pub fn is_empty(&self) -> bool {
        !self.needs_set && !self.needs_deactivate
    }
}

/// Compare a temperature module's target with the desired one (`None` = off).
pub fn diff_temperature_state(
    current: &TemperatureModuleState,
    desired: Option<f64>,
) -> TemperatureDiff {
    let (needs_set, needs_deactivate) = target_diff(current.target_temperature, desired);
    TemperatureDiff {
        needs_set,
        needs_deactivate,
    }
}

/// `(needs_set, needs_deactivate)` for one temperature dimension.
fn target_diff(current: Option<f64>, desired: Option<f64>) -> (bool, bool) {
    match desired {
        Some(target) => (current != Some(target), false),
        None => (false, current.is_some()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tc(block: Option<f64>, lid: Option<f64>, open: Option<bool>) -> ThermocyclerState {
        ThermocyclerState {
            block_target_temp: block,
            lid_target_temp: lid,
            lid_open: open,
        }
    }

    #[test]
    fn test_identical_state_has_empty_diff() {
        let s = tc(Some(4.0), Some(105.0), Some(false));
        assert!(diff_thermocycler_state(&s, &s).is_empty());
    }

    #[test]
    fn test_lid_and_temperature_flags_are_independent() {
        let diff = diff_thermocycler_state(
            &tc(None, Some(100.0), Some(false)),
            &tc(Some(42.0), None, Some(true)),
        );
        assert!(diff.needs_lid_open);
        assert!(!diff.needs_lid_close);
        assert!(diff.needs_block_set);
        assert!(!diff.needs_block_deactivate);
        assert!(!diff.needs_lid_temp_set);
        assert!(diff.needs_lid_temp_deactivate);
    }

    #[test]
    fn test_unknown_lid_is_moved_to_desired_position() {
        let diff = diff_thermocycler_state(&tc(None, None, None), &tc(None, None, Some(false)));
        assert!(diff.needs_lid_close);
    }

    #[test]
    fn test_deactivating_an_idle_heater_is_a_no_op() {
        let diff = diff_thermocycler_state(&tc(None, None, Some(true)), &tc(None, None, Some(true)));
        assert!(diff.is_empty());
    }

    #[test]
    fn test_temperature_diff() {
        let idle = TemperatureModuleState::default();
        assert!(diff_temperature_state(&idle, None).is_empty());
        assert!(diff_temperature_state(&idle, Some(4.0)).needs_set);

        let cold = TemperatureModuleState {
            target_temperature: Some(4.0),
            ..Default::default()
        };
        assert!(diff_temperature_state(&cold, Some(4.0)).is_empty());
        assert!(diff_temperature_state(&cold, None).needs_deactivate);
    }
}
