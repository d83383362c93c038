//! Protocol files.
//!
//! A protocol file bundles everything needed to plan a run:
//!
//! ```json
//! {
//!   "invariantContext": { "pipetteEntities": {...}, "labwareEntities": {...}, ... },
//!   "initialRobotState": { "pipettes": {...}, "modules": {...}, ... },
//!   "steps": [ { "commandCreatorFnName": "transfer", ... } ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::PlannerResult;
use crate::keys::KeyGenerator;
use crate::registry::InvariantContext;
use crate::state::RobotState;
use crate::step::StepArgs;
use crate::timeline::{build_timeline, Timeline};

/// A deck setup, its starting state and the ordered steps to plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolFile {
    /// Entities on the deck.
    pub invariant_context: InvariantContext,
    /// Device state before the first step.
    #[serde(default)]
    pub initial_robot_state: RobotState,
    /// Steps to plan, in order.
    #[serde(default)]
    pub steps: Vec<StepArgs>,
}

impl ProtocolFile {
    /// Parse a protocol from JSON text.
    pub fn from_json(text: &str) -> PlannerResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a protocol file.
    pub fn load<P: AsRef<Path>>(path: P) -> PlannerResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let protocol = Self::from_json(&text)?;
        debug!(
            path = %path.display(),
            steps = protocol.steps.len(),
            pipettes = protocol.invariant_context.pipette_entities.len(),
            labware = protocol.invariant_context.labware_entities.len(),
            "protocol loaded"
        );
        Ok(protocol)
    }

    /// Plan every step from the initial state.
    pub fn plan(&self, keys: &mut dyn KeyGenerator) -> Timeline {
        build_timeline(
            &self.steps,
            &self.invariant_context,
            &self.initial_robot_state,
            keys,
        )
    }
}
