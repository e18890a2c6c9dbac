// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Step tree compiler: validation, flattening and duration estimation

use serde_json::Value;

use super::error::{StepPath, ValidationError, Violation};
use super::payload::{
    EndConditionCode, ExecutableStep, TargetTypeCode, WorkoutPayload, WorkoutSegment, RUNNING_SPORT,
};
use super::step::{parse_steps, EndCondition, LeafStep, StepKind, Target, WorkoutStep};
use crate::constants::limits::{DEFAULT_REFERENCE_PACE_SECS_PER_KM, DEFAULT_WORKOUT_MAX_STEPS};
use crate::units::Pace;

/// Pace used to estimate how long distance-based steps take
pub const DEFAULT_REFERENCE_PACE: Pace = Pace::from_seconds_per_km(DEFAULT_REFERENCE_PACE_SECS_PER_KM);

/// Upper bound on flattened steps
pub const DEFAULT_MAX_STEPS: usize = DEFAULT_WORKOUT_MAX_STEPS;

/// Tunables for [`WorkoutCompiler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Only affects the duration estimate, never the emitted end condition
    pub reference_pace: Pace,
    pub max_steps: usize,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            reference_pace: DEFAULT_REFERENCE_PACE,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// Protocol target code plus its two range values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompiledTarget {
    pub code: TargetTypeCode,
    pub value_one: f64,
    pub value_two: f64,
}

/// One flattened protocol step
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStep {
    /// 1-based position in the flattened workout
    pub order: u32,
    pub kind: StepKind,
    pub end_condition: EndConditionCode,
    /// Seconds or meters, depending on `end_condition`
    pub end_condition_value: u32,
    pub target: Option<CompiledTarget>,
    pub note: Option<String>,
    /// This step's contribution to the workout duration estimate
    pub estimated_seconds: f64,
}

impl CompiledStep {
    pub fn target_code(&self) -> TargetTypeCode {
        self.target.map_or(TargetTypeCode::NoTarget, |target| target.code)
    }

    fn to_executable(&self) -> ExecutableStep {
        let mut step = ExecutableStep::new(
            self.order,
            self.kind.into(),
            self.end_condition.into(),
            f64::from(self.end_condition_value),
        );
        if let Some(target) = self.target {
            step.target_type = target.code.into();
            step.target_value_one = Some(target.value_one);
            step.target_value_two = Some(target.value_two);
        }
        step.description = self.note.clone();
        step
    }
}

/// A validated, flattened workout ready for submission
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledWorkout {
    name: String,
    description: Option<String>,
    steps: Vec<CompiledStep>,
    estimated_duration_seconds: u64,
}

impl CompiledWorkout {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn steps(&self) -> &[CompiledStep] {
        &self.steps
    }

    pub fn estimated_duration_seconds(&self) -> u64 {
        self.estimated_duration_seconds
    }

    /// Build the workout-service request body
    pub fn payload(&self) -> WorkoutPayload {
        WorkoutPayload {
            workout_name: self.name.clone(),
            description: self.description.clone(),
            sport_type: RUNNING_SPORT,
            estimated_duration_in_secs: self.estimated_duration_seconds,
            workout_segments: vec![WorkoutSegment {
                segment_order: 1,
                sport_type: RUNNING_SPORT,
                workout_steps: self.steps.iter().map(CompiledStep::to_executable).collect(),
            }],
        }
    }
}

/// Compiles workout step trees into flat protocol payloads.
///
/// Compilation is a pure function of its inputs and the options.
#[derive(Debug, Clone, Default)]
pub struct WorkoutCompiler {
    options: CompilerOptions,
}

impl WorkoutCompiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Validate and flatten a typed step tree
    pub fn compile(
        &self,
        name: &str,
        description: Option<&str>,
        steps: &[WorkoutStep],
    ) -> Result<CompiledWorkout, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::new(StepPath::root(), Violation::EmptyWorkoutName));
        }
        if steps.is_empty() {
            return Err(ValidationError::new(StepPath::root(), Violation::EmptyWorkout));
        }

        validate_steps(steps, &StepPath::root())?;

        let too_many = || {
            ValidationError::new(
                StepPath::root(),
                Violation::TooManySteps {
                    max: self.options.max_steps,
                },
            )
        };
        let max_steps = u64::try_from(self.options.max_steps).unwrap_or(u64::MAX);
        let expanded = expanded_len(steps)
            .filter(|&len| len <= max_steps)
            .ok_or_else(too_many)?;
        if expanded == 0 {
            return Err(ValidationError::new(StepPath::root(), Violation::EmptyWorkout));
        }

        let mut flat = Vec::with_capacity(usize::try_from(expanded).map_err(|_| too_many())?);
        self.flatten(steps, &mut flat)?;

        let total: f64 = flat.iter().map(|step| step.estimated_seconds).sum();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let estimated_duration_seconds = total.round() as u64;

        Ok(CompiledWorkout {
            name: name.to_string(),
            description: description
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_string),
            steps: flat,
            estimated_duration_seconds,
        })
    }

    /// Parse the tool-boundary JSON encoding, then compile it
    pub fn compile_definitions(
        &self,
        name: &str,
        description: Option<&str>,
        definitions: &[Value],
    ) -> Result<CompiledWorkout, ValidationError> {
        if definitions.is_empty() {
            return Err(ValidationError::new(StepPath::root(), Violation::EmptyWorkout));
        }
        let steps = parse_steps(definitions)?;
        self.compile(name, description, &steps)
    }

    /// Depth-first pre-order expansion with repeats unrolled. Callers bound
    /// the output size with [`expanded_len`] first.
    fn flatten(&self, steps: &[WorkoutStep], out: &mut Vec<CompiledStep>) -> Result<(), ValidationError> {
        for step in steps {
            match step {
                WorkoutStep::Leaf(leaf) => {
                    let order = u32::try_from(out.len() + 1).map_err(|_| {
                        ValidationError::new(
                            StepPath::root(),
                            Violation::TooManySteps {
                                max: self.options.max_steps,
                            },
                        )
                    })?;
                    out.push(self.compile_leaf(leaf, order));
                }
                WorkoutStep::Repeat(group) => {
                    for iteration in 1..=group.count {
                        let children = if iteration == group.count && group.drops_final_rest() {
                            &group.steps[..group.steps.len() - 1]
                        } else {
                            &group.steps[..]
                        };
                        self.flatten(children, out)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn compile_leaf(&self, leaf: &LeafStep, order: u32) -> CompiledStep {
        let (end_condition, end_condition_value, estimated_seconds) = match leaf.end_condition {
            EndCondition::Duration { seconds } => (EndConditionCode::Time, seconds, f64::from(seconds)),
            EndCondition::Distance { meters } => (
                EndConditionCode::Distance,
                meters,
                self.options.reference_pace.seconds_for(f64::from(meters)),
            ),
        };

        CompiledStep {
            order,
            kind: leaf.kind,
            end_condition,
            end_condition_value,
            target: leaf.target.as_ref().and_then(compile_target),
            note: leaf.note.clone(),
            estimated_seconds,
        }
    }
}

/// Compile with default options
pub fn compile(
    name: &str,
    description: Option<&str>,
    steps: &[WorkoutStep],
) -> Result<CompiledWorkout, ValidationError> {
    WorkoutCompiler::default().compile(name, description, steps)
}

fn validate_steps(steps: &[WorkoutStep], parent: &StepPath) -> Result<(), ValidationError> {
    for (index, step) in steps.iter().enumerate() {
        let path = parent.child(index);
        match step {
            WorkoutStep::Leaf(leaf) => {
                validate_leaf(leaf).map_err(|violation| ValidationError::new(path.clone(), violation))?;
            }
            WorkoutStep::Repeat(group) => {
                if group.count == 0 {
                    return Err(ValidationError::new(path, Violation::InvalidRepeatCount(0.0)));
                }
                if group.steps.is_empty() {
                    return Err(ValidationError::new(path, Violation::EmptyRepeat));
                }
                // A lone rest dropped from the only iteration leaves nothing
                if group.count == 1 && group.steps.len() == 1 && group.drops_final_rest() {
                    return Err(ValidationError::new(path, Violation::EmptyRepeat));
                }
                validate_steps(&group.steps, &path)?;
            }
        }
    }
    Ok(())
}

fn validate_leaf(leaf: &LeafStep) -> Result<(), Violation> {
    match leaf.end_condition {
        EndCondition::Duration { seconds: 0 } => {
            return Err(Violation::InvalidEndCondition {
                field: "duration_seconds",
                value: 0.0,
            })
        }
        EndCondition::Distance { meters: 0 } => {
            return Err(Violation::InvalidEndCondition {
                field: "distance_meters",
                value: 0.0,
            })
        }
        _ => {}
    }

    if let Some(target) = &leaf.target {
        target.check_range()?;
    }
    Ok(())
}

/// Number of leaves a step list flattens to, or `None` on overflow.
/// Counted without unrolling, so a huge repeat count costs nothing.
fn expanded_len(steps: &[WorkoutStep]) -> Option<u64> {
    steps.iter().try_fold(0u64, |total, step| {
        let len = match step {
            WorkoutStep::Leaf(_) => 1,
            WorkoutStep::Repeat(group) => {
                let body = expanded_len(&group.steps)?;
                let dropped = u64::from(group.drops_final_rest());
                body.checked_mul(u64::from(group.count))?.checked_sub(dropped)?
            }
        };
        total.checked_add(len)
    })
}

/// Map a target onto the fixed protocol table.
///
/// Pace values are speeds in m/s, slow bound first, so both values ascend
/// like the heart-rate and cadence ranges do. Power has no code in the
/// table and is sent as no target.
fn compile_target(target: &Target) -> Option<CompiledTarget> {
    match *target {
        Target::Pace { min, max } => Some(CompiledTarget {
            code: TargetTypeCode::Pace,
            value_one: max.speed(),
            value_two: min.speed(),
        }),
        Target::HeartRate { min, max } => Some(CompiledTarget {
            code: TargetTypeCode::HeartRate,
            value_one: f64::from(min),
            value_two: f64::from(max),
        }),
        Target::Cadence { min, max } => Some(CompiledTarget {
            code: TargetTypeCode::Cadence,
            value_one: f64::from(min),
            value_two: f64::from(max),
        }),
        Target::Power { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seconds(kind: StepKind, seconds: u32) -> WorkoutStep {
        WorkoutStep::leaf(kind, EndCondition::Duration { seconds })
    }

    #[test]
    fn test_flat_tree_keeps_order() {
        let steps = vec![
            seconds(StepKind::Warmup, 600),
            seconds(StepKind::Interval, 300),
            seconds(StepKind::Cooldown, 600),
        ];
        let workout = compile("Easy", None, &steps).unwrap();

        let kinds: Vec<StepKind> = workout.steps().iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![StepKind::Warmup, StepKind::Interval, StepKind::Cooldown]);
        let orders: Vec<u32> = workout.steps().iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
        assert_eq!(workout.estimated_duration_seconds(), 1500);
    }

    #[test]
    fn test_repeat_skips_final_recovery() {
        let steps = vec![WorkoutStep::repeat_skipping_last_rest(
            4,
            vec![seconds(StepKind::Interval, 180), seconds(StepKind::Recovery, 60)],
        )];
        let workout = compile("4x3min", None, &steps).unwrap();

        assert_eq!(workout.steps().len(), 7);
        assert_eq!(workout.steps().last().unwrap().kind, StepKind::Interval);
        assert_eq!(workout.estimated_duration_seconds(), 4 * 180 + 3 * 60);
    }

    #[test]
    fn test_skip_last_rest_ignores_non_rest_tail() {
        let steps = vec![WorkoutStep::repeat_skipping_last_rest(
            2,
            vec![seconds(StepKind::Recovery, 60), seconds(StepKind::Interval, 180)],
        )];
        let workout = compile("Tail", None, &steps).unwrap();
        assert_eq!(workout.steps().len(), 4);
    }

    #[test]
    fn test_distance_step_estimate_uses_reference_pace() {
        let steps = vec![WorkoutStep::leaf(StepKind::Interval, EndCondition::Distance { meters: 1000 })];

        let workout = compile("1k", None, &steps).unwrap();
        assert_eq!(workout.estimated_duration_seconds(), 300);
        assert_eq!(workout.steps()[0].end_condition, EndConditionCode::Distance);
        assert_eq!(workout.steps()[0].end_condition_value, 1000);

        let compiler = WorkoutCompiler::new(CompilerOptions {
            reference_pace: Pace::from_seconds_per_km(240),
            ..CompilerOptions::default()
        });
        assert_eq!(compiler.compile("1k", None, &steps).unwrap().estimated_duration_seconds(), 240);
    }

    #[test]
    fn test_target_values() {
        let steps = vec![
            LeafStep::new(StepKind::Interval, EndCondition::Duration { seconds: 60 })
                .with_target(Target::Pace {
                    min: Pace::from_seconds_per_km(250),
                    max: Pace::from_seconds_per_km(400),
                })
                .into(),
            LeafStep::new(StepKind::Interval, EndCondition::Duration { seconds: 60 })
                .with_target(Target::HeartRate { min: 140, max: 155 })
                .into(),
        ];
        let workout = compile("Targets", None, &steps).unwrap();

        let pace = workout.steps()[0].target.unwrap();
        assert_eq!(pace.code, TargetTypeCode::Pace);
        assert!((pace.value_one - 2.5).abs() < 1e-9);
        assert!((pace.value_two - 4.0).abs() < 1e-9);

        let heart_rate = workout.steps()[1].target.unwrap();
        assert_eq!(heart_rate.code, TargetTypeCode::HeartRate);
        assert_eq!((heart_rate.value_one, heart_rate.value_two), (140.0, 155.0));
    }

    #[test]
    fn test_power_target_sent_without_target() {
        let steps = vec![LeafStep::new(StepKind::Interval, EndCondition::Duration { seconds: 60 })
            .with_target(Target::Power { min: 250, max: 300 })
            .into()];
        let workout = compile("Power", None, &steps).unwrap();
        assert!(workout.steps()[0].target.is_none());
        assert_eq!(workout.steps()[0].target_code(), TargetTypeCode::NoTarget);

        let inverted = vec![LeafStep::new(StepKind::Interval, EndCondition::Duration { seconds: 60 })
            .with_target(Target::Power { min: 300, max: 250 })
            .into()];
        let error = compile("Power", None, &inverted).unwrap_err();
        assert_eq!(error.path.to_string(), "steps[0]");
        assert!(matches!(error.violation, Violation::InvertedTargetRange { .. }));
    }

    #[test]
    fn test_expanded_len_counts_without_unrolling() {
        let inner = WorkoutStep::repeat_skipping_last_rest(
            3,
            vec![seconds(StepKind::Interval, 60), seconds(StepKind::Recovery, 60)],
        );
        let steps = vec![seconds(StepKind::Warmup, 600), WorkoutStep::repeat(2, vec![inner])];
        assert_eq!(expanded_len(&steps), Some(1 + 2 * 5));

        let mut huge = vec![seconds(StepKind::Interval, 1)];
        for _ in 0..3 {
            huge = vec![WorkoutStep::repeat(u32::MAX, huge)];
        }
        assert_eq!(expanded_len(&huge), None);
    }

    #[test]
    fn test_repeat_expanding_to_nothing_rejected() {
        let lone_rest = WorkoutStep::repeat_skipping_last_rest(1, vec![seconds(StepKind::Rest, 60)]);
        let error = compile("Nothing", None, &[seconds(StepKind::Warmup, 60), lone_rest]).unwrap_err();
        assert_eq!(error.violation, Violation::EmptyRepeat);
        assert_eq!(error.path.to_string(), "steps[1]");
    }

    #[test]
    fn test_structural_invariants_on_typed_trees() {
        let error = compile("Empty", None, &[WorkoutStep::repeat(3, vec![])]).unwrap_err();
        assert_eq!(error.violation, Violation::EmptyRepeat);

        let error = compile("Zero", None, &[WorkoutStep::repeat(0, vec![seconds(StepKind::Interval, 60)])]).unwrap_err();
        assert_eq!(error.violation, Violation::InvalidRepeatCount(0.0));

        let error = compile("Zero", None, &[seconds(StepKind::Interval, 0)]).unwrap_err();
        assert!(matches!(error.violation, Violation::InvalidEndCondition { .. }));

        let error = compile("  ", None, &[seconds(StepKind::Interval, 60)]).unwrap_err();
        assert_eq!(error.violation, Violation::EmptyWorkoutName);

        let error = compile("Nothing", None, &[]).unwrap_err();
        assert_eq!(error.violation, Violation::EmptyWorkout);
    }

    #[test]
    fn test_step_limit() {
        let compiler = WorkoutCompiler::new(CompilerOptions {
            max_steps: 10,
            ..CompilerOptions::default()
        });
        let steps = vec![WorkoutStep::repeat(1_000_000, vec![seconds(StepKind::Interval, 10)])];
        let error = compiler.compile("Too long", None, &steps).unwrap_err();
        assert_eq!(error.violation, Violation::TooManySteps { max: 10 });
        assert!(error.path.is_root());
    }

    #[test]
    fn test_payload_shape() {
        let steps = vec![
            seconds(StepKind::Warmup, 600),
            LeafStep::new(StepKind::Interval, EndCondition::Distance { meters: 800 })
                .with_note("strong")
                .into(),
        ];
        let workout = compile("Mixed", Some("Tuesday session"), &steps).unwrap();
        let json = serde_json::to_value(workout.payload()).unwrap();

        assert_eq!(json["workoutName"], "Mixed");
        assert_eq!(json["description"], "Tuesday session");
        assert_eq!(json["sportType"]["sportTypeKey"], "running");
        assert_eq!(json["estimatedDurationInSecs"], 840);
        let steps = json["workoutSegments"][0]["workoutSteps"].as_array().unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0]["targetType"]["workoutTargetTypeId"], 1);
        assert_eq!(steps[1]["endCondition"]["conditionTypeId"], 3);
        assert_eq!(steps[1]["description"], "strong");
    }
}
