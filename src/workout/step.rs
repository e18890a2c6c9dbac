// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Workout Step Tree
//!
//! Two representations of a user-authored workout:
//!
//! - [`StepDefinition`]: the loose JSON encoding an agent sends at the tool
//!   boundary (`{"type": "repeat", "count": 4, "steps": [...]}`)
//! - [`WorkoutStep`]: the typed tree the compiler works on
//!
//! [`parse_steps`] converts the former into the latter, reporting the path of
//! the first step it cannot understand. Semantic invariants (positive
//! durations, non-empty repeats, ordered target ranges) are checked by the
//! compiler so they also hold for trees built directly in Rust.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use super::error::{StepPath, ValidationError, Violation};
use crate::units::Pace;

/// Step type assumed when a definition omits `type`
const DEFAULT_STEP_KIND: &str = "interval";

/// Step as encoded at the tool boundary. Nested steps stay as raw JSON so
/// each one can be parsed with its own path.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StepDefinition {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub distance_meters: Option<f64>,
    #[serde(default)]
    pub target: Option<TargetDefinition>,
    #[serde(default, alias = "note")]
    pub description: Option<String>,
    #[serde(default, alias = "repeat_count")]
    pub count: Option<f64>,
    #[serde(default)]
    pub skip_last_rest: Option<bool>,
    #[serde(default, alias = "children")]
    pub steps: Option<Vec<Value>>,
}

/// Target as encoded at the tool boundary
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TargetDefinition {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub min: Option<Value>,
    #[serde(default)]
    pub max: Option<Value>,
}

/// Kind of a terminal (non-repeat) step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    Warmup,
    Interval,
    Recovery,
    Rest,
    Cooldown,
}

impl StepKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "warmup" => Some(Self::Warmup),
            "interval" => Some(Self::Interval),
            "recovery" => Some(Self::Recovery),
            "rest" => Some(Self::Rest),
            "cooldown" => Some(Self::Cooldown),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Warmup => "warmup",
            Self::Interval => "interval",
            Self::Recovery => "recovery",
            Self::Rest => "rest",
            Self::Cooldown => "cooldown",
        }
    }

    /// Recovery and rest steps are the ones `skip_last_rest` may drop
    pub fn is_rest(self) -> bool {
        matches!(self, Self::Recovery | Self::Rest)
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a terminal step ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndCondition {
    Duration { seconds: u32 },
    Distance { meters: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Pace,
    HeartRate,
    Cadence,
    Power,
}

impl TargetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pace => "pace",
            Self::HeartRate => "heart_rate",
            Self::Cadence => "cadence",
            Self::Power => "power",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Intensity range attached to a step.
///
/// For pace, `min` is the fast bound and `max` the slow bound, matching how
/// runners write ranges ("4:30-4:50").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Pace { min: Pace, max: Pace },
    HeartRate { min: u32, max: u32 },
    Cadence { min: u32, max: u32 },
    Power { min: u32, max: u32 },
}

impl Target {
    pub fn kind(&self) -> TargetKind {
        match self {
            Self::Pace { .. } => TargetKind::Pace,
            Self::HeartRate { .. } => TargetKind::HeartRate,
            Self::Cadence { .. } => TargetKind::Cadence,
            Self::Power { .. } => TargetKind::Power,
        }
    }

    /// Check that `min` sits on the correct side of `max`
    pub fn check_range(&self) -> Result<(), Violation> {
        let ordered = match *self {
            Self::Pace { min, max } => min.is_faster_or_equal(max),
            Self::HeartRate { min, max } | Self::Cadence { min, max } | Self::Power { min, max } => {
                min <= max
            }
        };
        if ordered {
            return Ok(());
        }

        let (min, max) = match *self {
            Self::Pace { min, max } => (min.to_string(), max.to_string()),
            Self::HeartRate { min, max } | Self::Cadence { min, max } | Self::Power { min, max } => {
                (min.to_string(), max.to_string())
            }
        };
        Err(Violation::InvertedTargetRange {
            kind: self.kind(),
            min,
            max,
        })
    }
}

/// A terminal step
#[derive(Debug, Clone, PartialEq)]
pub struct LeafStep {
    pub kind: StepKind,
    pub end_condition: EndCondition,
    pub target: Option<Target>,
    pub note: Option<String>,
}

impl LeafStep {
    pub fn new(kind: StepKind, end_condition: EndCondition) -> Self {
        Self {
            kind,
            end_condition,
            target: None,
            note: None,
        }
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// A block of steps repeated `count` times
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatGroup {
    pub count: u32,
    pub skip_last_rest: bool,
    pub steps: Vec<WorkoutStep>,
}

impl RepeatGroup {
    /// True when the last child is a rest/recovery step that the final
    /// repetition should omit
    pub fn drops_final_rest(&self) -> bool {
        self.skip_last_rest && matches!(self.steps.last(), Some(step) if step.is_rest())
    }
}

/// Node of the workout step tree
#[derive(Debug, Clone, PartialEq)]
pub enum WorkoutStep {
    Leaf(LeafStep),
    Repeat(RepeatGroup),
}

impl WorkoutStep {
    pub fn leaf(kind: StepKind, end_condition: EndCondition) -> Self {
        Self::Leaf(LeafStep::new(kind, end_condition))
    }

    pub fn repeat(count: u32, steps: Vec<WorkoutStep>) -> Self {
        Self::Repeat(RepeatGroup {
            count,
            skip_last_rest: false,
            steps,
        })
    }

    pub fn repeat_skipping_last_rest(count: u32, steps: Vec<WorkoutStep>) -> Self {
        Self::Repeat(RepeatGroup {
            count,
            skip_last_rest: true,
            steps,
        })
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, Self::Leaf(leaf) if leaf.kind.is_rest())
    }
}

impl From<LeafStep> for WorkoutStep {
    fn from(leaf: LeafStep) -> Self {
        Self::Leaf(leaf)
    }
}

/// Parse the top-level `steps` array of a workout definition
pub fn parse_steps(definitions: &[Value]) -> Result<Vec<WorkoutStep>, ValidationError> {
    parse_children(definitions, &StepPath::root())
}

fn parse_children(definitions: &[Value], parent: &StepPath) -> Result<Vec<WorkoutStep>, ValidationError> {
    definitions
        .iter()
        .enumerate()
        .map(|(index, definition)| parse_step(definition, &parent.child(index)))
        .collect()
}

fn parse_step(value: &Value, path: &StepPath) -> Result<WorkoutStep, ValidationError> {
    let fail = |violation| ValidationError::new(path.clone(), violation);

    let definition = StepDefinition::deserialize(value)
        .map_err(|e| fail(Violation::Malformed(e.to_string())))?;

    let tag = definition
        .kind
        .as_deref()
        .unwrap_or(DEFAULT_STEP_KIND)
        .trim()
        .to_ascii_lowercase();

    if tag == "repeat" {
        return parse_repeat(definition, path);
    }

    let kind = StepKind::from_tag(&tag).ok_or_else(|| fail(Violation::UnknownStepKind(tag.clone())))?;
    parse_leaf(kind, definition, path)
}

fn parse_leaf(kind: StepKind, definition: StepDefinition, path: &StepPath) -> Result<WorkoutStep, ValidationError> {
    let fail = |violation| ValidationError::new(path.clone(), violation);

    if definition.steps.is_some() {
        return Err(fail(Violation::RepeatFieldOnLeaf("steps")));
    }
    if definition.count.is_some() {
        return Err(fail(Violation::RepeatFieldOnLeaf("count")));
    }
    if definition.skip_last_rest.is_some() {
        return Err(fail(Violation::RepeatFieldOnLeaf("skip_last_rest")));
    }

    // Distance takes precedence when both are present
    let end_condition = match (definition.distance_meters, definition.duration_seconds) {
        (Some(meters), _) => EndCondition::Distance {
            meters: whole_number(meters).ok_or_else(|| {
                fail(Violation::InvalidEndCondition {
                    field: "distance_meters",
                    value: meters,
                })
            })?,
        },
        (None, Some(seconds)) => EndCondition::Duration {
            seconds: whole_number(seconds).ok_or_else(|| {
                fail(Violation::InvalidEndCondition {
                    field: "duration_seconds",
                    value: seconds,
                })
            })?,
        },
        (None, None) => return Err(fail(Violation::MissingEndCondition)),
    };

    let target = match &definition.target {
        Some(target) => parse_target(target).map_err(fail)?,
        None => None,
    };

    Ok(WorkoutStep::Leaf(LeafStep {
        kind,
        end_condition,
        target,
        note: definition.description.filter(|note| !note.trim().is_empty()),
    }))
}

fn parse_repeat(definition: StepDefinition, path: &StepPath) -> Result<WorkoutStep, ValidationError> {
    let fail = |violation| ValidationError::new(path.clone(), violation);

    if definition.duration_seconds.is_some() {
        return Err(fail(Violation::LeafFieldOnRepeat("duration_seconds")));
    }
    if definition.distance_meters.is_some() {
        return Err(fail(Violation::LeafFieldOnRepeat("distance_meters")));
    }
    if definition.target.is_some() {
        return Err(fail(Violation::LeafFieldOnRepeat("target")));
    }

    let raw_count = definition.count.unwrap_or(1.0);
    let count = whole_number(raw_count).ok_or_else(|| fail(Violation::InvalidRepeatCount(raw_count)))?;

    let children = definition.steps.unwrap_or_default();
    let steps = parse_children(&children, path)?;

    Ok(WorkoutStep::Repeat(RepeatGroup {
        count,
        skip_last_rest: definition.skip_last_rest.unwrap_or(false),
        steps,
    }))
}

fn parse_target(definition: &TargetDefinition) -> Result<Option<Target>, Violation> {
    let tag = definition
        .kind
        .as_deref()
        .unwrap_or("none")
        .trim()
        .to_ascii_lowercase();

    let kind = match tag.as_str() {
        "none" | "no_target" => return Ok(None),
        "pace" => TargetKind::Pace,
        "heart_rate" => TargetKind::HeartRate,
        "cadence" => TargetKind::Cadence,
        "power" => TargetKind::Power,
        _ => return Err(Violation::UnknownTargetType(tag.clone())),
    };

    let min = definition
        .min
        .as_ref()
        .filter(|value| !value.is_null())
        .ok_or(Violation::MissingTargetBound(kind, "min"))?;
    let max = definition
        .max
        .as_ref()
        .filter(|value| !value.is_null())
        .ok_or(Violation::MissingTargetBound(kind, "max"))?;

    let target = match kind {
        TargetKind::Pace => Target::Pace {
            min: pace_bound(min)?,
            max: pace_bound(max)?,
        },
        TargetKind::HeartRate => Target::HeartRate {
            min: numeric_bound(kind, "min", min)?,
            max: numeric_bound(kind, "max", max)?,
        },
        TargetKind::Cadence => Target::Cadence {
            min: numeric_bound(kind, "min", min)?,
            max: numeric_bound(kind, "max", max)?,
        },
        TargetKind::Power => Target::Power {
            min: numeric_bound(kind, "min", min)?,
            max: numeric_bound(kind, "max", max)?,
        },
    };
    Ok(Some(target))
}

fn pace_bound(value: &Value) -> Result<Pace, Violation> {
    value
        .as_str()
        .and_then(|text| text.parse::<Pace>().ok())
        .ok_or_else(|| Violation::InvalidPace(display_value(value)))
}

fn numeric_bound(kind: TargetKind, bound: &'static str, value: &Value) -> Result<u32, Violation> {
    value
        .as_f64()
        .and_then(whole_number)
        .ok_or_else(|| Violation::InvalidTargetValue {
            kind,
            bound,
            value: display_value(value),
        })
}

/// Accepts non-negative integral values that fit in a `u32`; zero is left
/// for the compiler's semantic checks
fn whole_number(value: f64) -> Option<u32> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX) {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Some(value as u32)
    } else {
        None
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
