//! Command wire format consumed by the run engine.
//!
//! Every command the planner emits serializes to
//! `{ "commandType": <tag>, "params": { ... }, "key": <unique id> }`, the same
//! shape the run engine and the protocol-file exporter read. The `commandType`
//! tag and the `params` object come from [`CommandBody`], an adjacently tagged
//! enum, so adding a command kind forces every `match` over it to be updated.
//!
//! # Example
//!
//! ```
//! use step_planner::command::{Command, CommandBody, ModuleParams};
//!
//! let cmd = Command::new(
//!     "key-0",
//!     CommandBody::ThermocyclerCloseLid(ModuleParams::new("tc1")),
//! );
//! let json = serde_json::to_value(&cmd).unwrap();
//! assert_eq!(json["commandType"], "thermocycler/closeLid");
//! assert_eq!(json["params"]["moduleId"], "tc1");
//! ```

use serde::{Deserialize, Serialize};

use crate::state::LabwareLocation;

/// One atomic instruction in the robot's execution wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Tagged command payload (`commandType` + `params`).
    #[serde(flatten)]
    pub body: CommandBody,
    /// Unique identifier supplied by the injected key generator.
    pub key: String,
}

impl Command {
    /// Build a command from a key and payload.
    pub fn new(key: impl Into<String>, body: CommandBody) -> Self {
        Self {
            body,
            key: key.into(),
        }
    }

    /// The wire `commandType` tag of this command.
    pub fn command_type(&self) -> &'static str {
        self.body.command_type()
    }
}

/// Payload of a command, discriminated by the wire `commandType` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "commandType", content = "params")]
pub enum CommandBody {
    // ---------------------------------------------------------------------
    // Pipetting
    // ---------------------------------------------------------------------
    /// Pick up a tip from a tiprack well.
    #[serde(rename = "pickUpTip")]
    PickUpTip(PickUpTipParams),
    /// Drop the attached tip at the current position.
    #[serde(rename = "dropTipInPlace")]
    DropTipInPlace(PipetteParams),
    /// Move to a trash or waste-chute area in preparation for dropping a tip.
    #[serde(rename = "moveToAddressableAreaForDropTip")]
    MoveToAddressableAreaForDropTip(MoveToAddressableAreaForDropTipParams),
    /// Move to a named addressable area (trash, waste chute).
    #[serde(rename = "moveToAddressableArea")]
    MoveToAddressableArea(MoveToAddressableAreaParams),
    /// Move the pipette to a position relative to a well.
    #[serde(rename = "moveToWell")]
    MoveToWell(MoveToWellParams),
    /// Aspirate liquid from a well.
    #[serde(rename = "aspirate")]
    Aspirate(PipettingParams),
    /// Dispense liquid into a well.
    #[serde(rename = "dispense")]
    Dispense(PipettingParams),
    /// Aspirate air at the current position.
    #[serde(rename = "airGapInPlace")]
    AirGapInPlace(AirGapInPlaceParams),
    /// Blow out the tip contents into a well.
    #[serde(rename = "blowout")]
    Blowout(BlowoutParams),
    /// Blow out the tip contents at the current position.
    #[serde(rename = "blowOutInPlace")]
    BlowOutInPlace(BlowOutInPlaceParams),
    /// Touch the tip against the well walls.
    #[serde(rename = "touchTip")]
    TouchTip(TouchTipParams),

    // ---------------------------------------------------------------------
    // Flow control and labware
    // ---------------------------------------------------------------------
    /// Pause for a fixed duration.
    #[serde(rename = "waitForDuration")]
    WaitForDuration(WaitForDurationParams),
    /// Pause until the operator resumes the run.
    #[serde(rename = "waitForResume")]
    WaitForResume(WaitForResumeParams),
    /// Relocate a labware.
    #[serde(rename = "moveLabware")]
    MoveLabware(MoveLabwareParams),

    // ---------------------------------------------------------------------
    // Temperature module
    // ---------------------------------------------------------------------
    /// Set the temperature module target.
    #[serde(rename = "temperatureModule/setTargetTemperature")]
    TemperatureModuleSetTargetTemperature(TemperatureParams),
    /// Block until the temperature module reaches its target.
    #[serde(rename = "temperatureModule/waitForTemperature")]
    TemperatureModuleWaitForTemperature(ModuleParams),
    /// Turn the temperature module off.
    #[serde(rename = "temperatureModule/deactivate")]
    TemperatureModuleDeactivate(ModuleParams),

    // ---------------------------------------------------------------------
    // Thermocycler
    // ---------------------------------------------------------------------
    /// Open the thermocycler lid.
    #[serde(rename = "thermocycler/openLid")]
    ThermocyclerOpenLid(ModuleParams),
    /// Close the thermocycler lid.
    #[serde(rename = "thermocycler/closeLid")]
    ThermocyclerCloseLid(ModuleParams),
    /// Set the block target temperature.
    #[serde(rename = "thermocycler/setTargetBlockTemperature")]
    ThermocyclerSetTargetBlockTemperature(TemperatureParams),
    /// Block until the block reaches its target.
    #[serde(rename = "thermocycler/waitForBlockTemperature")]
    ThermocyclerWaitForBlockTemperature(ModuleParams),
    /// Set the lid target temperature.
    #[serde(rename = "thermocycler/setTargetLidTemperature")]
    ThermocyclerSetTargetLidTemperature(TemperatureParams),
    /// Block until the lid reaches its target.
    #[serde(rename = "thermocycler/waitForLidTemperature")]
    ThermocyclerWaitForLidTemperature(ModuleParams),
    /// Turn the block heater off.
    #[serde(rename = "thermocycler/deactivateBlock")]
    ThermocyclerDeactivateBlock(ModuleParams),
    /// Turn the lid heater off.
    #[serde(rename = "thermocycler/deactivateLid")]
    ThermocyclerDeactivateLid(ModuleParams),
    /// Run a thermal profile.
    #[serde(rename = "thermocycler/runProfile")]
    ThermocyclerRunProfile(RunProfileParams),
    /// Block until a running profile completes.
    #[serde(rename = "thermocycler/awaitProfileComplete")]
    ThermocyclerAwaitProfileComplete(ModuleParams),

    // ---------------------------------------------------------------------
    // Heater-shaker
    // ---------------------------------------------------------------------
    /// Set the heater-shaker target temperature.
    #[serde(rename = "heaterShaker/setTargetTemperature")]
    HeaterShakerSetTargetTemperature(TemperatureParams),
    /// Block until the heater-shaker reaches its target.
    #[serde(rename = "heaterShaker/waitForTemperature")]
    HeaterShakerWaitForTemperature(ModuleParams),
    /// Turn the heater off.
    #[serde(rename = "heaterShaker/deactivateHeater")]
    HeaterShakerDeactivateHeater(ModuleParams),
    /// Start shaking and block until the speed is reached.
    #[serde(rename = "heaterShaker/setAndWaitForShakeSpeed")]
    HeaterShakerSetAndWaitForShakeSpeed(ShakeSpeedParams),
    /// Stop shaking.
    #[serde(rename = "heaterShaker/deactivateShaker")]
    HeaterShakerDeactivateShaker(ModuleParams),
    /// Open the labware latch.
    #[serde(rename = "heaterShaker/openLabwareLatch")]
    HeaterShakerOpenLabwareLatch(ModuleParams),
    /// Close the labware latch.
    #[serde(rename = "heaterShaker/closeLabwareLatch")]
    HeaterShakerCloseLabwareLatch(ModuleParams),

    // ---------------------------------------------------------------------
    // Absorbance plate reader
    // ---------------------------------------------------------------------
    /// Open the plate reader lid.
    #[serde(rename = "absorbanceReader/openLid")]
    AbsorbanceReaderOpenLid(ModuleParams),
    /// Close the plate reader lid.
    #[serde(rename = "absorbanceReader/closeLid")]
    AbsorbanceReaderCloseLid(ModuleParams),
    /// Configure wavelengths before reading.
    #[serde(rename = "absorbanceReader/initialize")]
    AbsorbanceReaderInitialize(AbsorbanceInitializeParams),
    /// Read the plate, optionally saving results to a file.
    #[serde(rename = "absorbanceReader/read")]
    AbsorbanceReaderRead(AbsorbanceReadParams),
}

impl CommandBody {
    /// The wire `commandType` tag for this payload.
    pub fn command_type(&self) -> &'static str {
        match self {
            Self::PickUpTip(_) => "pickUpTip",
            Self::DropTipInPlace(_) => "dropTipInPlace",
            Self::MoveToAddressableAreaForDropTip(_) => "moveToAddressableAreaForDropTip",
            Self::MoveToAddressableArea(_) => "moveToAddressableArea",
            Self::MoveToWell(_) => "moveToWell",
            Self::Aspirate(_) => "aspirate",
            Self::Dispense(_) => "dispense",
            Self::AirGapInPlace(_) => "airGapInPlace",
            Self::Blowout(_) => "blowout",
            Self::BlowOutInPlace(_) => "blowOutInPlace",
            Self::TouchTip(_) => "touchTip",
            Self::WaitForDuration(_) => "waitForDuration",
            Self::WaitForResume(_) => "waitForResume",
            Self::MoveLabware(_) => "moveLabware",
            Self::TemperatureModuleSetTargetTemperature(_) => {
                "temperatureModule/setTargetTemperature"
            }
            Self::TemperatureModuleWaitForTemperature(_) => "temperatureModule/waitForTemperature",
            Self::TemperatureModuleDeactivate(_) => "temperatureModule/deactivate",
            Self::ThermocyclerOpenLid(_) => "thermocycler/openLid",
            Self::ThermocyclerCloseLid(_) => "thermocycler/closeLid",
            Self::ThermocyclerSetTargetBlockTemperature(_) => {
                "thermocycler/setTargetBlockTemperature"
            }
            Self::ThermocyclerWaitForBlockTemperature(_) => "thermocycler/waitForBlockTemperature",
            Self::ThermocyclerSetTargetLidTemperature(_) => "thermocycler/setTargetLidTemperature",
            Self::ThermocyclerWaitForLidTemperature(_) => "thermocycler/waitForLidTemperature",
            Self::ThermocyclerDeactivateBlock(_) => "thermocycler/deactivateBlock",
            Self::ThermocyclerDeactivateLid(_) => "thermocycler/deactivateLid",
            Self::ThermocyclerRunProfile(_) => "thermocycler/runProfile",
            Self::ThermocyclerAwaitProfileComplete(_) => "thermocycler/awaitProfileComplete",
            Self::HeaterShakerSetTargetTemperature(_) => "heaterShaker/setTargetTemperature",
            Self::HeaterShakerWaitForTemperature(_) => "heaterShaker/waitForTemperature",
            Self::HeaterShakerDeactivateHeater(_) => "heaterShaker/deactivateHeater",
            Self::HeaterShakerSetAndWaitForShakeSpeed(_) => "heaterShaker/setAndWaitForShakeSpeed",
            Self::HeaterShakerDeactivateShaker(_) => "heaterShaker/deactivateShaker",
            Self::HeaterShakerOpenLabwareLatch(_) => "heaterShaker/openLabwareLatch",
            Self::HeaterShakerCloseLabwareLatch(_) => "heaterShaker/closeLabwareLatch",
            Self::AbsorbanceReaderOpenLid(_) => "absorbanceReader/openLid",
            Self::AbsorbanceReaderCloseLid(_) => "absorbanceReader/closeLid",
            Self::AbsorbanceReaderInitialize(_) => "absorbanceReader/initialize",
            Self::AbsorbanceReaderRead(_) => "absorbanceReader/read",
        }
    }
}

// =============================================================================
// Parameter shapes
// =============================================================================

/// Parameters for commands addressing only a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleParams {
    /// Target module id.
    pub module_id: String,
}

impl ModuleParams {
    /// Parameters for the given module id.
    pub fn new(module_id: impl Into<String>) -> Self {
        Self {
            module_id: module_id.into(),
        }
    }
}

/// Parameters for temperature set-points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureParams {
    /// Target module id.
    pub module_id: String,
    /// Target temperature in degrees Celsius.
    pub celsius: f64,
}

/// One step of a thermal profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStep {
    /// Block temperature for this step.
    pub celsius: f64,
    /// Hold time at that temperature.
    pub hold_seconds: f64,
}

/// Parameters for `thermocycler/runProfile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunProfileParams {
    /// Target module id.
    pub module_id: String,
    /// Ordered profile steps.
    pub profile: Vec<ProfileStep>,
    /// Liquid volume per well, used by the firmware for thermal modelling.
    pub block_max_volume_ul: f64,
}

/// Parameters for `heaterShaker/setAndWaitForShakeSpeed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShakeSpeedParams {
    /// Target module id.
    pub module_id: String,
    /// Shake speed in revolutions per minute.
    pub rpm: f64,
}

/// Reader measurement mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasureMode {
    /// One sample wavelength.
    Single,
    /// Up to six sample wavelengths.
    Multi,
}

/// Parameters for `absorbanceReader/initialize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsorbanceInitializeParams {
    /// Target module id.
    pub module_id: String,
    /// Single or multi-wavelength mode.
    pub measure_mode: MeasureMode,
    /// Sample wavelengths in nanometres.
    pub sample_wavelengths: Vec<u32>,
    /// Optional reference wavelength in nanometres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_wavelength: Option<u32>,
}

/// Parameters for `absorbanceReader/read`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsorbanceReadParams {
    /// Target module id.
    pub module_id: String,
    /// Output file name; omitted from the wire when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

/// Reference point of a well used for positioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WellOrigin {
    /// Top of the well.
    Top,
    /// Bottom of the well.
    Bottom,
    /// Centre of the well.
    Center,
}

/// Cartesian offset in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Offset {
    /// X offset.
    pub x: f64,
    /// Y offset.
    pub y: f64,
    /// Z offset.
    pub z: f64,
}

impl Offset {
    /// Offset along the z axis only.
    pub fn z(z: f64) -> Self {
        Self { x: 0.0, y: 0.0, z }
    }
}

/// Position relative to a well.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WellLocation {
    /// Reference point.
    pub origin: WellOrigin,
    /// Offset from the reference point.
    pub offset: Offset,
}

impl WellLocation {
    /// `z` millimetres above the well bottom.
    pub fn from_bottom(z: f64) -> Self {
        Self {
            origin: WellOrigin::Bottom,
            offset: Offset::z(z),
        }
    }

    /// `z` millimetres relative to the well top (negative is inside the well).
    pub fn from_top(z: f64) -> Self {
        Self {
            origin: WellOrigin::Top,
            offset: Offset::z(z),
        }
    }
}

/// Parameters naming only a pipette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipetteParams {
    /// Pipette id.
    pub pipette_id: String,
}

/// Parameters for `pickUpTip`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickUpTipParams {
    /// Pipette id.
    pub pipette_id: String,
    /// Tiprack labware id.
    pub labware_id: String,
    /// Tiprack well holding the tip.
    pub well_name: String,
}

/// Parameters for `aspirate` and `dispense`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipettingParams {
    /// Pipette id.
    pub pipette_id: String,
    /// Labware id.
    pub labware_id: String,
    /// Well name.
    pub well_name: String,
    /// Volume in microlitres.
    pub volume: f64,
    /// Flow rate in microlitres per second.
    pub flow_rate: f64,
    /// Position inside the well.
    pub well_location: WellLocation,
}

/// Parameters for `airGapInPlace`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirGapInPlaceParams {
    /// Pipette id.
    pub pipette_id: String,
    /// Volume of air in microlitres.
    pub volume: f64,
    /// Flow rate in microlitres per second.
    pub flow_rate: f64,
}

/// Parameters for `blowout`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlowoutParams {
    /// Pipette id.
    pub pipette_id: String,
    /// Labware id.
    pub labware_id: String,
    /// Well name.
    pub well_name: String,
    /// Flow rate in microlitres per second.
    pub flow_rate: f64,
    /// Position relative to the well.
    pub well_location: WellLocation,
}

/// Parameters for `blowOutInPlace`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlowOutInPlaceParams {
    /// Pipette id.
    pub pipette_id: String,
    /// Flow rate in microlitres per second.
    pub flow_rate: f64,
}

/// Parameters for `touchTip`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchTipParams {
    /// Pipette id.
    pub pipette_id: String,
    /// Labware id.
    pub labware_id: String,
    /// Well name.
    pub well_name: String,
    /// Touch height relative to the well top.
    pub well_location: WellLocation,
}

/// Parameters for `moveToWell`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveToWellParams {
    /// Pipette id.
    pub pipette_id: String,
    /// Labware id.
    pub labware_id: String,
    /// Well name.
    pub well_name: String,
    /// Target position relative to the well.
    pub well_location: WellLocation,
}

/// Parameters for `moveToAddressableArea`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveToAddressableAreaParams {
    /// Pipette id.
    pub pipette_id: String,
    /// Deck area name (e.g. `movableTrashA3`).
    pub addressable_area_name: String,
    /// Offset from the area's reference point.
    pub offset: Offset,
}

/// Parameters for `moveToAddressableAreaForDropTip`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveToAddressableAreaForDropTipParams {
    /// Pipette id.
    pub pipette_id: String,
    /// Deck area name.
    pub addressable_area_name: String,
    /// Offset from the area's reference point.
    pub offset: Offset,
    /// Alternate drop positions to spread tips across the bin.
    pub alternate_drop_location: bool,
}

/// Parameters for `waitForDuration`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitForDurationParams {
    /// Delay length.
    pub seconds: f64,
    /// Optional operator-facing message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Parameters for `waitForResume`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitForResumeParams {
    /// Optional operator-facing message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// How labware is physically relocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabwareMovementStrategy {
    /// Robot gripper moves the labware.
    UsingGripper,
    /// The run pauses for the operator to move it.
    ManualMoveWithPause,
}

/// Parameters for `moveLabware`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveLabwareParams {
    /// Labware being moved.
    pub labware_id: String,
    /// Destination.
    pub new_location: LabwareLocation,
    /// Movement strategy.
    pub strategy: LabwareMovementStrategy,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_module_command_wire_shape() {
        let cmd = Command::new(
            "abc",
            CommandBody::ThermocyclerSetTargetBlockTemperature(TemperatureParams {
                module_id: "tc1".into(),
                celsius: 42.0,
            }),
        );
        let value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(
            value,
            json!({
                "commandType": "thermocycler/setTargetBlockTemperature",
                "params": { "moduleId": "tc1", "celsius": 42.0 },
                "key": "abc"
            })
        );
    }

    #[test]
    fn test_read_omits_absent_file_name() {
        let body = CommandBody::AbsorbanceReaderRead(AbsorbanceReadParams {
            module_id: "reader".into(),
            file_name: None,
        });
        let value = serde_json::to_value(Command::new("k", body)).unwrap();
        assert!(value["params"].get("fileName").is_none());
    }

    #[test]
    fn test_command_type_matches_serde_tag() {
        let body = CommandBody::HeaterShakerSetAndWaitForShakeSpeed(ShakeSpeedParams {
            module_id: "hs".into(),
            rpm: 500.0,
        });
        let value = serde_json::to_value(Command::new("k", body.clone())).unwrap();
        assert_eq!(value["commandType"], body.command_type());
    }

    #[test]
    fn test_command_parses_from_wire() {
        let raw = json!({
            "commandType": "aspirate",
            "params": {
                "pipetteId": "p1",
                "labwareId": "plate",
                "wellName": "A1",
                "volume": 50.0,
                "flowRate": 7.5,
                "wellLocation": { "origin": "bottom", "offset": { "x": 0.0, "y": 0.0, "z": 1.0 } }
            },
            "key": "k1"
        });
        let cmd: Command = serde_json::from_value(raw).unwrap();
        assert_eq!(cmd.command_type(), "aspirate");
        assert_eq!(cmd.key, "k1");
    }
}
