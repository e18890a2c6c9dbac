// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Workout-service protocol codes and the upload payload
//!
//! The target-type table is fixed rather than derived from the upstream's
//! published enumeration: Garmin's workout service treats a "speed" target
//! (`4`) as heart rate, so pace must always be sent as `pace.zone` (`6`).

use serde::Serialize;

use super::step::StepKind;

/// Sport of every workout this server uploads
pub const RUNNING_SPORT: SportTypeRef = SportTypeRef {
    sport_type_id: 1,
    sport_type_key: "running",
};

/// Discriminator the workout service expects on every flat step
const EXECUTABLE_STEP_DTO: &str = "ExecutableStepDTO";

/// Protocol target-type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetTypeCode {
    NoTarget,
    HeartRate,
    Cadence,
    Pace,
}

impl TargetTypeCode {
    pub const fn id(self) -> u32 {
        match self {
            Self::NoTarget => 1,
            Self::HeartRate => 2,
            Self::Cadence => 3,
            Self::Pace => 6,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::NoTarget => "no.target",
            Self::HeartRate => "heart.rate.zone",
            Self::Cadence => "cadence.zone",
            Self::Pace => "pace.zone",
        }
    }
}

/// Protocol end-condition codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndConditionCode {
    Time,
    Distance,
}

impl EndConditionCode {
    pub const fn id(self) -> u32 {
        match self {
            Self::Time => 2,
            Self::Distance => 3,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Distance => "distance",
        }
    }
}

/// Protocol step-type codes
pub const fn step_type_id(kind: StepKind) -> u32 {
    match kind {
        StepKind::Warmup => 1,
        StepKind::Cooldown => 2,
        StepKind::Interval => 3,
        StepKind::Recovery => 4,
        StepKind::Rest => 5,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SportTypeRef {
    pub sport_type_id: u32,
    pub sport_type_key: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepTypeRef {
    pub step_type_id: u32,
    pub step_type_key: &'static str,
}

impl From<StepKind> for StepTypeRef {
    fn from(kind: StepKind) -> Self {
        Self {
            step_type_id: step_type_id(kind),
            step_type_key: kind.as_str(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndConditionRef {
    pub condition_type_id: u32,
    pub condition_type_key: &'static str,
}

impl From<EndConditionCode> for EndConditionRef {
    fn from(code: EndConditionCode) -> Self {
        Self {
            condition_type_id: code.id(),
            condition_type_key: code.key(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetTypeRef {
    pub workout_target_type_id: u32,
    pub workout_target_type_key: &'static str,
}

impl From<TargetTypeCode> for TargetTypeRef {
    fn from(code: TargetTypeCode) -> Self {
        Self {
            workout_target_type_id: code.id(),
            workout_target_type_key: code.key(),
        }
    }
}

/// One flat step of the upload payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutableStep {
    #[serde(rename = "type")]
    pub dto_type: &'static str,
    pub step_order: u32,
    pub step_type: StepTypeRef,
    pub end_condition: EndConditionRef,
    pub end_condition_value: f64,
    pub target_type: TargetTypeRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_value_one: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_value_two: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ExecutableStep {
    pub(crate) fn new(step_order: u32, step_type: StepTypeRef, end_condition: EndConditionRef, end_condition_value: f64) -> Self {
        Self {
            dto_type: EXECUTABLE_STEP_DTO,
            step_order,
            step_type,
            end_condition,
            end_condition_value,
            target_type: TargetTypeCode::NoTarget.into(),
            target_value_one: None,
            target_value_two: None,
            description: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSegment {
    pub segment_order: u32,
    pub sport_type: SportTypeRef,
    pub workout_steps: Vec<ExecutableStep>,
}

/// Body of the workout-creation request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPayload {
    pub workout_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub sport_type: SportTypeRef,
    pub estimated_duration_in_secs: u64,
    pub workout_segments: Vec<WorkoutSegment>,
}
