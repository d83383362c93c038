//! Whole-protocol planning.
//!
//! [`build_timeline`] plans each step against the state left by the previous
//! one and records a frame per step. Planning stops at the first failing step;
//! the frames before it are kept so a UI can still preview them.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::command::Command;
use crate::error::{CommandCreatorError, CommandCreatorWarning};
use crate::keys::KeyGenerator;
use crate::registry::InvariantContext;
use crate::state::effects::apply_commands;
use crate::state::RobotState;
use crate::step::{plan_step, StepArgs};

/// Result of planning one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineFrame {
    /// Commands emitted by this step.
    pub commands: Vec<Command>,
    /// Advisories raised while planning this step.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<CommandCreatorWarning>,
    /// State after this step's commands.
    pub robot_state: RobotState,
}

/// The step that stopped planning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineError {
    /// Zero-based index into the step list.
    pub step_index: usize,
    /// Why the step failed.
    pub errors: Vec<CommandCreatorError>,
}

/// Planned protocol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    /// One frame per successfully planned step.
    pub frames: Vec<TimelineFrame>,
    /// Set when a step failed; later steps were not planned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TimelineError>,
}

impl Timeline {
    /// True when every step planned.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Every frame's commands, in order, for protocol export.
    pub fn flatten_commands(&self) -> Vec<Command> {
        self.frames
            .iter()
            .flat_map(|frame| frame.commands.iter().cloned())
            .collect()
    }

    /// State after the last planned step.
    pub fn final_state(&self) -> Option<&RobotState> {
        self.frames.last().map(|frame| &frame.robot_state)
    }
}

/// Plan `steps` in order starting from `initial`.
pub fn build_timeline(
    steps: &[StepArgs],
    ctx: &InvariantContext,
    initial: &RobotState,
    keys: &mut dyn KeyGenerator,
) -> Timeline {
    let mut timeline = Timeline::default();
    let mut state = initial.clone();

    for (step_index, step) in steps.iter().enumerate() {
        match plan_step(step, ctx, &state, keys) {
            Ok(output) => {
                state = apply_commands(&output.commands, ctx, &state);
                debug!(
                    step_index,
                    step = step.name(),
                    commands = output.commands.len(),
                    warnings = output.warnings.len(),
                    "step planned"
                );
                timeline.frames.push(TimelineFrame {
                    commands: output.commands,
                    warnings: output.warnings,
                    robot_state: state.clone(),
                });
            }
            Err(list) => {
                warn!(step_index, step = step.name(), errors = %list, "step failed");
                timeline.error = Some(TimelineError {
                    step_index,
                    errors: list.errors,
                });
                break;
            }
        }
    }
    timeline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creators::compound::{DelayArgs, TemperatureArgs};
    use crate::error::CommandCreatorError;
    use crate::keys::SequentialKeyGenerator;
    use crate::state::{ModuleState, TemperatureModuleState};
    use tracing_test::traced_test;

    fn state() -> RobotState {
        RobotState::new().with_module(
            "temp",
            "D1",
            ModuleState::Temperature(TemperatureModuleState::default()),
        )
    }

    fn heat(module_id: &str) -> StepArgs {
        StepArgs::Temperature(TemperatureArgs {
            module_id: module_id.into(),
            target_temperature: Some(4.0),
        })
    }

    #[test]
    fn test_frames_carry_state_forward() {
        let steps = [heat("temp"), heat("temp")];
        let mut keys = SequentialKeyGenerator::default();
        let timeline = build_timeline(&steps, &InvariantContext::default(), &state(), &mut keys);
        assert!(timeline.is_ok());
        assert_eq!(timeline.frames.len(), 2);
        // The second step sees the module already at 4 °C.
        assert_eq!(timeline.frames[0].commands.len(), 2);
        assert!(timeline.frames[1].commands.is_empty());
        assert_eq!(timeline.flatten_commands().len(), 2);
        assert_eq!(
            timeline.final_state(),
            Some(&timeline.frames[0].robot_state)
        );
    }

    #[test]
    #[traced_test]
    fn test_planning_stops_at_first_failure() {
        let steps = [
            StepArgs::Delay(DelayArgs {
                seconds: Some(1.0),
                message: None,
            }),
            heat("ghost"),
            heat("temp"),
        ];
        let mut keys = SequentialKeyGenerator::default();
        let timeline = build_timeline(&steps, &InvariantContext::default(), &state(), &mut keys);

        assert_eq!(timeline.frames.len(), 1);
        assert_eq!(
            timeline.error,
            Some(TimelineError {
                step_index: 1,
                errors: vec![CommandCreatorError::MissingModule {
                    module_id: "ghost".into()
                }],
            })
        );
        assert!(logs_contain("step failed"));
    }
}
