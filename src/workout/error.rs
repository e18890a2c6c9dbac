// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Validation errors raised while compiling a workout step tree

use std::fmt;

use super::step::TargetKind;

/// Location of a step inside the submitted tree.
///
/// The empty path refers to the workout itself; `[1, 0]` is the first child
/// of the second top-level step and renders as `steps[1].steps[0]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct StepPath {
    indices: Vec<usize>,
}

impl StepPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.indices.clone();
        indices.push(index);
        Self { indices }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn is_root(&self) -> bool {
        self.indices.is_empty()
    }
}

impl fmt::Display for StepPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str("workout");
        }
        for (depth, index) in self.indices.iter().enumerate() {
            if depth > 0 {
                f.write_str(".")?;
            }
            write!(f, "steps[{index}]")?;
        }
        Ok(())
    }
}

/// The invariant a step violated
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Violation {
    #[error("workout name must not be empty")]
    EmptyWorkoutName,

    #[error("workout must contain at least one step")]
    EmptyWorkout,

    #[error("malformed step definition: {0}")]
    Malformed(String),

    #[error("unknown step type '{0}' (expected warmup, interval, recovery, rest, cooldown or repeat)")]
    UnknownStepKind(String),

    #[error("unknown target type '{0}' (expected pace, heart_rate, cadence, power or none)")]
    UnknownTargetType(String),

    #[error("step needs either duration_seconds or distance_meters")]
    MissingEndCondition,

    #[error("{field} must be a positive integer, got {value}")]
    InvalidEndCondition { field: &'static str, value: f64 },

    #[error("repeat count must be a positive integer, got {0}")]
    InvalidRepeatCount(f64),

    #[error("repeat must contain at least one step")]
    EmptyRepeat,

    #[error("{0} is only valid on repeat steps")]
    RepeatFieldOnLeaf(&'static str),

    #[error("{0} is not valid on repeat steps; set it on the repeated steps instead")]
    LeafFieldOnRepeat(&'static str),

    #[error("{0} target is missing its '{1}' bound")]
    MissingTargetBound(TargetKind, &'static str),

    #[error("invalid pace '{0}', expected m:ss per km")]
    InvalidPace(String),

    #[error("{kind} target '{bound}' must be a non-negative integer, got {value}")]
    InvalidTargetValue {
        kind: TargetKind,
        bound: &'static str,
        value: String,
    },

    #[error("{kind} target min ({min}) must not exceed max ({max})")]
    InvertedTargetRange {
        kind: TargetKind,
        min: String,
        max: String,
    },

    #[error("workout expands to more than {max} steps")]
    TooManySteps { max: usize },
}

/// A step tree failed validation.
///
/// Always caller-recoverable: fix the offending step and compile again.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid workout at {path}: {violation}")]
pub struct ValidationError {
    pub path: StepPath,
    pub violation: Violation,
}

impl ValidationError {
    pub fn new(path: StepPath, violation: Violation) -> Self {
        Self { path, violation }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_rendering() {
        assert_eq!(StepPath::root().to_string(), "workout");
        assert_eq!(StepPath::root().child(2).to_string(), "steps[2]");
        assert_eq!(StepPath::root().child(1).child(0).to_string(), "steps[1].steps[0]");
    }

    #[test]
    fn test_error_message_names_path_and_violation() {
        let error = ValidationError::new(StepPath::root().child(1), Violation::EmptyRepeat);
        assert_eq!(
            error.to_string(),
            "invalid workout at steps[1]: repeat must contain at least one step"
        );
    }
}
