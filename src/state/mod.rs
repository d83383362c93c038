//! Simulated device state ("robot state").
//!
//! [`RobotState`] is a plain value: pipettes and their tips, tiprack contents,
//! labware placement, module sub-states and per-well liquid. Command creators
//! only *read* it. Advancing it to reflect emitted commands is the job of
//! [`effects`], which clones the snapshot once and patches the copy, so every
//! creator in a chain sees one consistent state and earlier snapshots are never
//! disturbed.
//!
//! All maps are `BTreeMap`s: iteration order is part of the planner's output
//! (tip selection, liquid splitting), and ordered maps keep that output
//! bit-for-bit reproducible.
//!
//! # Submodules
//!
//! - [`selectors`]: typed, kind-checked module sub-state readers
//! - [`liquid`]: ingredient/volume bookkeeping primitives
//! - [`effects`]: the pure state-effect function applied after each command

pub mod effects;
pub mod liquid;
pub mod selectors;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::command::MeasureMode;
use crate::registry::InvariantContext;

pub use liquid::{LocationLiquidState, AIR};

/// Complete simulated state threaded through planning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotState {
    /// Pipette id → mount and tip.
    #[serde(default)]
    pub pipettes: BTreeMap<String, PipetteState>,
    /// Labware id → placement.
    #[serde(default)]
    pub labware: BTreeMap<String, LabwareTemporalProperties>,
    /// Module id → slot and kind-specific state.
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleTemporalProperties>,
    /// Tiprack contents.
    #[serde(default)]
    pub tip_state: TipState,
    /// Liquid in tips and wells.
    #[serde(default)]
    pub liquid_state: LiquidState,
}

/// Which side of the gantry a pipette is mounted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mount {
    /// Left mount.
    Left,
    /// Right mount.
    Right,
}

/// Identity of an attached tip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedTip {
    /// Tiprack the tip came from.
    pub tiprack_id: String,
    /// Tiprack well it came from.
    pub well_name: String,
}

/// Per-pipette state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipetteState {
    /// Mount assignment.
    pub mount: Mount,
    /// Currently attached tip, if any. A pipette holds at most one tip set.
    #[serde(default)]
    pub tip: Option<AttachedTip>,
    /// Everything currently held in the tip (tracked or not, air included), in µL.
    #[serde(default)]
    pub tip_volume: f64,
}

impl PipetteState {
    /// A pipette with no tip.
    pub fn new(mount: Mount) -> Self {
        Self {
            mount,
            tip: None,
            tip_volume: 0.0,
        }
    }
}

/// Marker for labware that has been removed from the deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OffDeck {
    /// Serialized as the bare string `"offDeck"`.
    #[serde(rename = "offDeck")]
    OffDeck,
}

/// Where a labware currently sits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabwareLocation {
    /// Directly in a deck slot.
    Slot {
        /// Slot name (e.g. `D1`).
        #[serde(rename = "slotName")]
        slot_name: String,
    },
    /// On top of a module.
    Module {
        /// Module id.
        #[serde(rename = "moduleId")]
        module_id: String,
    },
    /// Stacked on another labware (e.g. an adapter).
    OnLabware {
        /// Supporting labware id.
        #[serde(rename = "labwareId")]
        labware_id: String,
    },
    /// Removed from the deck.
    OffDeck(OffDeck),
}

impl LabwareLocation {
    /// Location in a deck slot.
    pub fn slot(slot_name: impl Into<String>) -> Self {
        Self::Slot {
            slot_name: slot_name.into(),
        }
    }

    /// Location on a module.
    pub fn module(module_id: impl Into<String>) -> Self {
        Self::Module {
            module_id: module_id.into(),
        }
    }

    /// Off-deck location.
    pub fn off_deck() -> Self {
        Self::OffDeck(OffDeck::OffDeck)
    }

    /// True when off-deck.
    pub fn is_off_deck(&self) -> bool {
        matches!(self, Self::OffDeck(_))
    }
}

/// Mutable properties of a labware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabwareTemporalProperties {
    /// Current placement.
    pub location: LabwareLocation,
}

/// Mutable properties of a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleTemporalProperties {
    /// Deck slot the module occupies.
    pub slot: String,
    /// Kind-discriminated state.
    pub module_state: ModuleState,
}

/// Module state, discriminated by module kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ModuleState {
    /// Thermocycler state.
    Thermocycler(ThermocyclerState),
    /// Temperature module state.
    Temperature(TemperatureModuleState),
    /// Heater-shaker state.
    HeaterShaker(HeaterShakerState),
    /// Plate reader state.
    AbsorbanceReader(AbsorbanceReaderState),
}

/// Thermocycler block, lid heater and lid position.
///
/// `None` means "off" for temperatures and "unknown" for the lid position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThermocyclerState {
    /// Block target temperature (°C).
    #[serde(default)]
    pub block_target_temp: Option<f64>,
    /// Lid target temperature (°C).
    #[serde(default)]
    pub lid_target_temp: Option<f64>,
    /// Lid position; `None` when not yet known.
    #[serde(default)]
    pub lid_open: Option<bool>,
}

/// Temperature module heating status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TemperatureStatus {
    /// Heater off.
    #[default]
    Deactivated,
    /// Target set, not yet confirmed.
    Approaching,
    /// Target reached.
    AtTarget,
}

/// Temperature module state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureModuleState {
    /// Heating status.
    #[serde(default)]
    pub status: TemperatureStatus,
    /// Target temperature (°C).
    #[serde(default)]
    pub target_temperature: Option<f64>,
}

/// Heater-shaker state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaterShakerState {
    /// Heater target (°C).
    #[serde(default)]
    pub target_temp: Option<f64>,
    /// Shake speed (rpm).
    #[serde(default)]
    pub target_speed: Option<f64>,
    /// Labware latch position; `None` when not yet known.
    #[serde(default)]
    pub latch_open: Option<bool>,
}

/// Wavelength configuration recorded by `absorbanceReader/initialize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsorbanceInitialization {
    /// Single or multi mode.
    pub measure_mode: MeasureMode,
    /// Sample wavelengths (nm).
    pub sample_wavelengths: Vec<u32>,
    /// Reference wavelength (nm).
    #[serde(default)]
    pub reference_wavelength: Option<u32>,
}

/// Plate reader state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsorbanceReaderState {
    /// Lid position; `None` when not yet known.
    #[serde(default)]
    pub lid_open: Option<bool>,
    /// Last applied wavelength configuration.
    #[serde(default)]
    pub initialization: Option<AbsorbanceInitialization>,
}

/// Tiprack contents: tiprack id → well → tip present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipState {
    /// Per-rack, per-well "has tip" flags.
    #[serde(default)]
    pub tipracks: BTreeMap<String, BTreeMap<String, bool>>,
}

/// Liquid held in tips and wells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidState {
    /// Pipette id → contents of its tip.
    #[serde(default)]
    pub pipettes: BTreeMap<String, LocationLiquidState>,
    /// Labware id → well → contents.
    #[serde(default)]
    pub labware: BTreeMap<String, BTreeMap<String, LocationLiquidState>>,
}

impl RobotState {
    /// An empty deck.
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Copy-and-patch builders, used by deck-setup resolvers and tests
    // -------------------------------------------------------------------------

    /// Add a pipette with no tip.
    pub fn with_pipette(mut self, pipette_id: impl Into<String>, mount: Mount) -> Self {
        self.pipettes.insert(pipette_id.into(), PipetteState::new(mount));
        self
    }

    /// Place a labware.
    pub fn with_labware(mut self, labware_id: impl Into<String>, location: LabwareLocation) -> Self {
        self.labware
            .insert(labware_id.into(), LabwareTemporalProperties { location });
        self
    }

    /// Place a module in a slot.
    pub fn with_module(
        mut self,
        module_id: impl Into<String>,
        slot: impl Into<String>,
        module_state: ModuleState,
    ) -> Self {
        self.modules.insert(
            module_id.into(),
            ModuleTemporalProperties {
                slot: slot.into(),
                module_state,
            },
        );
        self
    }

    /// Fill every well of a tiprack with tips.
    pub fn with_full_tiprack(mut self, ctx: &InvariantContext, tiprack_id: &str) -> Self {
        if let Some(lw) = ctx.labware_entities.get(tiprack_id) {
            let wells = lw
                .def
                .wells_in_order()
                .map(|w| (w.to_string(), true))
                .collect();
            self.tip_state.tipracks.insert(tiprack_id.to_string(), wells);
        }
        self
    }

    /// Add liquid to a well.
    pub fn with_well_liquid(
        mut self,
        labware_id: &str,
        well_name: &str,
        ingredient_id: &str,
        volume: f64,
    ) -> Self {
        let well = self
            .liquid_state
            .labware
            .entry(labware_id.to_string())
            .or_default()
            .entry(well_name.to_string())
            .or_default();
        *well.entry(ingredient_id.to_string()).or_insert(0.0) += volume.max(0.0);
        self
    }

    // -------------------------------------------------------------------------
    // Readers
    // -------------------------------------------------------------------------

    /// True when the pipette has a tip attached.
    pub fn has_tip(&self, pipette_id: &str) -> bool {
        self.pipettes
            .get(pipette_id)
            .is_some_and(|p| p.tip.is_some())
    }

    /// True when the tiprack well is marked as holding a tip.
    pub fn is_tip_present(&self, tiprack_id: &str, well_name: &str) -> bool {
        self.tip_state
            .tipracks
            .get(tiprack_id)
            .and_then(|rack| rack.get(well_name))
            .copied()
            .unwrap_or(false)
    }

    /// First available tip for a pipette: its tipracks in priority order, wells
    /// in column order.
    pub fn next_tip(&self, ctx: &InvariantContext, pipette_id: &str) -> Option<AttachedTip> {
        let pipette = ctx.pipette_entities.get(pipette_id)?;
        pipette.tiprack_ids.iter().find_map(|rack_id| {
            let rack = ctx.labware_entities.get(rack_id)?;
            rack.def
                .wells_in_order()
                .find(|well| self.is_tip_present(rack_id, well))
                .map(|well| AttachedTip {
                    tiprack_id: rack_id.clone(),
                    well_name: well.to_string(),
                })
        })
    }

    /// Current placement of a labware.
    pub fn labware_location(&self, labware_id: &str) -> Option<&LabwareLocation> {
        self.labware.get(labware_id).map(|l| &l.location)
    }

    /// Module the labware sits on, if any.
    pub fn module_under_labware(&self, labware_id: &str) -> Option<&str> {
        match self.labware_location(labware_id)? {
            LabwareLocation::Module { module_id } => Some(module_id.as_str()),
            LabwareLocation::OnLabware { labware_id } => self.module_under_labware(labware_id),
            _ => None,
        }
    }

    /// Liquid tracked in a well.
    pub fn well_liquid(&self, labware_id: &str, well_name: &str) -> Option<&LocationLiquidState> {
        self.liquid_state.labware.get(labware_id)?.get(well_name)
    }

    /// Total tracked liquid volume in a well (µL).
    pub fn well_volume(&self, labware_id: &str, well_name: &str) -> f64 {
        self.well_liquid(labware_id, well_name)
            .map(liquid::total_volume)
            .unwrap_or(0.0)
    }

    /// Liquid tracked in a pipette's tip.
    pub fn tip_liquid(&self, pipette_id: &str) -> Option<&LocationLiquidState> {
        self.liquid_state.pipettes.get(pipette_id)
    }

    /// Volume held in a pipette's tip (µL).
    pub fn tip_volume(&self, pipette_id: &str) -> f64 {
        self.pipettes
            .get(pipette_id)
            .map(|p| p.tip_volume)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_labware_location_wire_forms() {
        assert_eq!(
            serde_json::to_value(LabwareLocation::slot("D1")).unwrap(),
            json!({ "slotName": "D1" })
        );
        assert_eq!(
            serde_json::to_value(LabwareLocation::off_deck()).unwrap(),
            json!("offDeck")
        );
        let parsed: LabwareLocation = serde_json::from_value(json!({ "moduleId": "tc" })).unwrap();
        assert_eq!(parsed, LabwareLocation::module("tc"));
    }

    #[test]
    fn test_module_state_tagged_by_kind() {
        let state = ModuleState::Thermocycler(ThermocyclerState {
            block_target_temp: Some(4.0),
            lid_target_temp: None,
            lid_open: Some(false),
        });
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["type"], "thermocycler");
        assert_eq!(value["blockTargetTemp"], 4.0);
    }

    #[test]
    fn test_builders_do_not_touch_other_snapshots() {
        let base = RobotState::new().with_pipette("p1", Mount::Left);
        let patched = base.clone().with_well_liquid("plate", "A1", "water", 10.0);
        assert_eq!(base.well_volume("plate", "A1"), 0.0);
        assert_eq!(patched.well_volume("plate", "A1"), 10.0);
    }

    #[test]
    fn test_module_under_stacked_labware() {
        let state = RobotState::new()
            .with_labware("adapter", LabwareLocation::module("hs"))
            .with_labware(
                "plate",
                LabwareLocation::OnLabware {
                    labware_id: "adapter".into(),
                },
            );
        assert_eq!(state.module_under_labware("plate"), Some("hs"));
    }
}
