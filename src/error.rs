//! Error and warning types for the step planner.
//!
//! Two families live here:
//!
//! - **Planning outcomes**: [`CommandCreatorError`] and [`CommandCreatorWarning`]
//!   are returned *as data* by command creators. A failed precondition (missing
//!   module, no tip, bad well name) never panics or short-circuits through `?` out
//!   of the planner; it is collected into an [`ErrorList`] that the caller
//!   inspects and a UI layer maps to a message. Both serialize with a `type`
//!   discriminator so the external UI can switch on the kind.
//! - **Ambient failures**: [`PlannerError`] covers configuration loading,
//!   protocol-file I/O and JSON decoding. These are ordinary Rust errors used by
//!   the binary and the loading helpers.
//!
//! Using `thiserror`, every variant carries a human-readable message, so both
//! families can be logged or shown without a separate formatting table.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience alias for results using the ambient error type.
pub type PlannerResult<T> = std::result::Result<T, PlannerError>;

/// Failures of the loading/CLI surface (not of planning itself).
#[derive(Error, Debug)]
pub enum PlannerError {
    /// The configuration could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    /// The configuration parsed but holds an unusable value.
    #[error("Configuration validation error: {0}")]
    Validation(String),

    /// A file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A protocol or timeline document is not valid JSON for its type.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A planning precondition that failed.
///
/// Returned in the `errors` list of a creator result; never thrown.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CommandCreatorError {
    /// The module id is absent from device state or is a different module kind.
    #[error("Module '{module_id}' is missing or is not the expected module type")]
    #[serde(rename_all = "camelCase")]
    MissingModule {
        /// Requested module.
        module_id: String,
    },

    /// No labware entity has this id.
    #[error("Labware '{labware_id}' does not exist")]
    #[serde(rename_all = "camelCase")]
    LabwareDoesNotExist {
        /// Requested labware.
        labware_id: String,
    },

    /// No pipette entity has this id.
    #[error("Pipette '{pipette_id}' does not exist")]
    #[serde(rename_all = "camelCase")]
    PipetteDoesNotExist {
        /// Requested pipette.
        pipette_id: String,
    },

    /// Every tiprack assigned to the pipette is empty.
    #[error("Not enough tips remaining for pipette '{pipette_id}'")]
    #[serde(rename_all = "camelCase")]
    InsufficientTips {
        /// Pipette needing a tip.
        pipette_id: String,
    },

    /// The tip holds less than the requested dispense volume.
    #[error(
        "Pipette '{pipette_id}' holds {available} uL but {requested} uL was requested"
    )]
    #[serde(rename_all = "camelCase")]
    InsufficientVolume {
        /// Dispensing pipette.
        pipette_id: String,
        /// Dispense volume (µL).
        requested: f64,
        /// Volume in the tip (µL).
        available: f64,
    },

    /// An aspirate would overfill the tip.
    #[error("Aspirating {volume} uL would exceed the {max_volume} uL capacity of pipette '{pipette_id}'")]
    #[serde(rename_all = "camelCase")]
    PipetteVolumeExceeded {
        /// Aspirating pipette.
        pipette_id: String,
        /// Tip contents after the aspirate (µL).
        volume: f64,
        /// Usable tip capacity (µL).
        max_volume: f64,
    },

    /// A liquid command needs a tip and none is attached.
    #[error("Pipette '{pipette_id}' has no tip attached")]
    #[serde(rename_all = "camelCase")]
    NoTipOnPipette {
        /// Pipette without a tip.
        pipette_id: String,
    },

    /// A pick-up was requested while a tip is still attached.
    #[error("Pipette '{pipette_id}' already has a tip attached")]
    #[serde(rename_all = "camelCase")]
    TipAlreadyAttached {
        /// Pipette holding a tip.
        pipette_id: String,
    },

    /// The labware definition has no well of this name.
    #[error("Well '{well_name}' does not exist in labware '{labware_id}'")]
    #[serde(rename_all = "camelCase")]
    InvalidWellReference {
        /// Labware searched.
        labware_id: String,
        /// Missing well.
        well_name: String,
    },

    /// The tiprack well was already emptied.
    #[error("Tip in well '{well_name}' of tiprack '{labware_id}' has already been used")]
    #[serde(rename_all = "camelCase")]
    TipNotPresent {
        /// Tiprack.
        labware_id: String,
        /// Empty tip well.
        well_name: String,
    },

    /// The drop-tip location is not trash or waste-chute equipment.
    #[error("Drop tip location '{location}' does not exist")]
    DropTipLocationDoesNotExist {
        /// Requested equipment id.
        location: String,
    },

    /// The labware is not on the deck.
    #[error("Labware '{labware_id}' is off deck")]
    #[serde(rename_all = "camelCase")]
    LabwareOffDeck {
        /// Off-deck labware.
        labware_id: String,
    },

    /// The pipette or gripper needs the thermocycler lid open.
    #[error("Thermocycler '{module_id}' lid is closed")]
    #[serde(rename_all = "camelCase")]
    ThermocyclerLidClosed {
        /// Thermocycler with the closed (or unknown) lid.
        module_id: String,
    },

    /// Shaking was requested with the labware latch open.
    #[error("Heater-shaker '{module_id}' cannot shake with its labware latch open")]
    #[serde(rename_all = "camelCase")]
    HeaterShakerLatchOpen {
        /// Heater-shaker module.
        module_id: String,
    },

    /// A gripper move was requested on a deck without a gripper.
    #[error("Moving labware with the gripper requires a gripper")]
    GripperRequired,

    /// The step arguments are inconsistent or out of range.
    #[error("Invalid step arguments: {reason}")]
    InvalidArguments {
        /// What is wrong with them.
        reason: String,
    },
}

/// Non-fatal advisory accumulated alongside successful commands.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CommandCreatorWarning {
    /// The source well has no tracked liquid; volumes are not tracked.
    #[error("Aspirating from well '{well_name}' of '{labware_id}' which has no tracked liquid")]
    #[serde(rename_all = "camelCase")]
    AspirateFromPristineWell {
        /// Source labware.
        labware_id: String,
        /// Source well.
        well_name: String,
    },

    /// The aspirate asks for more than the well's tracked contents.
    #[error(
        "Aspirating {requested} uL from well '{well_name}' of '{labware_id}' which holds {available} uL"
    )]
    #[serde(rename_all = "camelCase")]
    AspirateMoreThanWellContents {
        /// Source labware.
        labware_id: String,
        /// Source well.
        well_name: String,
        /// Aspirate volume (µL).
        requested: f64,
        /// Tracked well volume (µL).
        available: f64,
    },
}

/// Errors returned by a failed creator.
///
/// A failed chain surfaces only its errors: commands and warnings gathered
/// before the failure are discarded.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ErrorList {
    /// One or more failures; never empty for a failed result.
    pub errors: Vec<CommandCreatorError>,
}

impl ErrorList {
    /// A list holding one error.
    pub fn single(error: CommandCreatorError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl From<CommandCreatorError> for ErrorList {
    fn from(error: CommandCreatorError) -> Self {
        Self::single(error)
    }
}

impl std::fmt::Display for ErrorList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ErrorList {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_display() {
        let err = CommandCreatorError::MissingModule {
            module_id: "tc1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Module 'tc1' is missing or is not the expected module type"
        );
    }

    #[test]
    fn test_error_serializes_with_type_tag() {
        let err = CommandCreatorError::InvalidWellReference {
            labware_id: "plate".into(),
            well_name: "Z99".into(),
        };
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({ "type": "invalidWellReference", "labwareId": "plate", "wellName": "Z99" })
        );
    }

    #[test]
    fn test_error_list_display_joins_messages() {
        let list = ErrorList {
            errors: vec![
                CommandCreatorError::GripperRequired,
                CommandCreatorError::PipetteDoesNotExist {
                    pipette_id: "p".into(),
                },
            ],
        };
        assert!(list.to_string().contains("; Pipette 'p' does not exist"));
    }

    #[test]
    fn test_validation_error_message() {
        let err = PlannerError::Validation("log level".into());
        assert_eq!(err.to_string(), "Configuration validation error: log level");
    }
}
