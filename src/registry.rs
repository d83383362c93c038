//! Entity registry ("invariant context").
//!
//! The registry is the static description of everything present in a
//! protocol: pipettes, labware, modules and auxiliary equipment. It is built
//! once by the protocol-loading stage, handed to every creator unchanged, and
//! never mutated by the planner. Device state and step arguments refer to
//! entities by id; looking up an unknown id yields a [`CommandCreatorError`]
//! value, never a panic.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::CommandCreatorError;

/// Immutable registry of protocol entities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvariantContext {
    /// Pipettes keyed by id.
    #[serde(default)]
    pub pipette_entities: BTreeMap<String, PipetteEntity>,
    /// Labware keyed by id.
    #[serde(default)]
    pub labware_entities: BTreeMap<String, LabwareEntity>,
    /// Modules keyed by id.
    #[serde(default)]
    pub module_entities: BTreeMap<String, ModuleEntity>,
    /// Gripper, trash bins and waste chutes keyed by id.
    #[serde(default)]
    pub additional_equipment_entities: BTreeMap<String, AdditionalEquipmentEntity>,
}

impl InvariantContext {
    /// Look up a pipette.
    pub fn pipette(&self, pipette_id: &str) -> Result<&PipetteEntity, CommandCreatorError> {
        self.pipette_entities
            .get(pipette_id)
            .ok_or_else(|| CommandCreatorError::PipetteDoesNotExist {
                pipette_id: pipette_id.to_string(),
            })
    }

    /// Look up a labware.
    pub fn labware(&self, labware_id: &str) -> Result<&LabwareEntity, CommandCreatorError> {
        self.labware_entities
            .get(labware_id)
            .ok_or_else(|| CommandCreatorError::LabwareDoesNotExist {
                labware_id: labware_id.to_string(),
            })
    }

    /// Look up a labware and confirm it has the named well.
    pub fn well(
        &self,
        labware_id: &str,
        well_name: &str,
    ) -> Result<&WellDefinition, CommandCreatorError> {
        self.labware(labware_id)?
            .def
            .wells
            .get(well_name)
            .ok_or_else(|| CommandCreatorError::InvalidWellReference {
                labware_id: labware_id.to_string(),
                well_name: well_name.to_string(),
            })
    }

    /// Look up a module entity.
    pub fn module(&self, module_id: &str) -> Result<&ModuleEntity, CommandCreatorError> {
        self.module_entities
            .get(module_id)
            .ok_or_else(|| CommandCreatorError::MissingModule {
                module_id: module_id.to_string(),
            })
    }

    /// Look up a piece of additional equipment.
    pub fn equipment(&self, equipment_id: &str) -> Option<&AdditionalEquipmentEntity> {
        self.additional_equipment_entities.get(equipment_id)
    }

    /// True when a gripper is installed.
    pub fn has_gripper(&self) -> bool {
        self.additional_equipment_entities
            .values()
            .any(|e| e.kind == EquipmentKind::Gripper)
    }

    /// Usable volume of one tip on this pipette: the smaller of the pipette's
    /// maximum volume and the tip capacity of its first tiprack.
    pub fn tip_capacity(&self, pipette_id: &str) -> Result<f64, CommandCreatorError> {
        let pipette = self.pipette(pipette_id)?;
        let tip_max = pipette
            .tiprack_ids
            .iter()
            .filter_map(|id| self.labware_entities.get(id))
            .find_map(|lw| lw.def.tip_max_volume);
        Ok(match tip_max {
            Some(tip) => tip.min(pipette.spec.max_volume),
            None => pipette.spec.max_volume,
        })
    }
}

/// A pipette loaded on the robot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipetteEntity {
    /// Entity id.
    pub id: String,
    /// Pipette model name (e.g. `p300_single_gen2`).
    pub name: String,
    /// Physical characteristics.
    pub spec: PipetteSpec,
    /// Tipracks this pipette draws tips from, in priority order.
    #[serde(default)]
    pub tiprack_ids: Vec<String>,
}

/// Physical characteristics of a pipette model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipetteSpec {
    /// Maximum aspirate volume (µL).
    pub max_volume: f64,
    /// Minimum accurate volume (µL).
    pub min_volume: f64,
    /// Channel count.
    #[serde(default = "default_channels")]
    pub channels: u8,
    /// Default aspirate flow rate (µL/s).
    pub default_aspirate_flow_rate: f64,
    /// Default dispense flow rate (µL/s).
    pub default_dispense_flow_rate: f64,
    /// Default blow-out flow rate (µL/s).
    pub default_blow_out_flow_rate: f64,
}

fn default_channels() -> u8 {
    1
}

/// A labware placed in the protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabwareEntity {
    /// Entity id.
    pub id: String,
    /// Labware definition.
    pub def: LabwareDefinition,
}

/// Geometry-free subset of a labware definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabwareDefinition {
    /// Load name (e.g. `corning_96_wellplate_360ul_flat`).
    pub load_name: String,
    /// Display category (`wellPlate`, `tipRack`, `reservoir`, ...).
    pub display_category: String,
    /// True for tipracks.
    #[serde(default)]
    pub is_tiprack: bool,
    /// Tip capacity for tipracks.
    #[serde(default)]
    pub tip_max_volume: Option<f64>,
    /// Well names grouped by column, in column order.
    pub ordering: Vec<Vec<String>>,
    /// Per-well properties.
    pub wells: BTreeMap<String, WellDefinition>,
}

impl LabwareDefinition {
    /// Well names in column-major order.
    pub fn wells_in_order(&self) -> impl Iterator<Item = &str> {
        self.ordering.iter().flatten().map(String::as_str)
    }
}

/// Properties of one well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WellDefinition {
    /// Capacity in µL.
    pub total_liquid_volume: f64,
    /// Depth in mm.
    pub depth: f64,
}

/// Module kinds understood by the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModuleKind {
    /// Thermocycler (block + heated lid).
    Thermocycler,
    /// Temperature module.
    Temperature,
    /// Heater-shaker.
    HeaterShaker,
    /// Absorbance plate reader.
    AbsorbanceReader,
}

/// A module loaded in the protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleEntity {
    /// Entity id.
    pub id: String,
    /// Module kind.
    #[serde(rename = "type")]
    pub kind: ModuleKind,
    /// Hardware model (e.g. `thermocyclerModuleV2`).
    pub model: String,
}

/// Kinds of auxiliary equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EquipmentKind {
    /// Labware gripper.
    Gripper,
    /// Movable trash bin.
    TrashBin,
    /// Waste chute.
    WasteChute,
}

/// Gripper, trash bin or waste chute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalEquipmentEntity {
    /// Entity id.
    pub id: String,
    /// Equipment kind.
    #[serde(rename = "name")]
    pub kind: EquipmentKind,
    /// Deck cutout or slot, for trash bins and waste chutes.
    #[serde(default)]
    pub location: Option<String>,
}

impl AdditionalEquipmentEntity {
    /// Addressable area the pipette moves to when disposing into this
    /// equipment. `None` for equipment that cannot receive liquid or tips.
    pub fn addressable_area_name(&self, channels: u8) -> Option<String> {
        match self.kind {
            EquipmentKind::TrashBin => {
                let slot = self.location.as_deref().unwrap_or("A3");
                Some(format!("movableTrash{}", slot.trim_start_matches("cutout")))
            }
            EquipmentKind::WasteChute => Some(
                match channels {
                    96 => "96ChannelWasteChute",
                    8 => "1and8ChannelWasteChute",
                    _ => "1ChannelWasteChute",
                }
                .to_string(),
            ),
            EquipmentKind::Gripper => None,
        }
    }
}
