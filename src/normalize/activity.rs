// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Activity Schema Reconciliation
//!
//! Garmin returns the same activity in two shapes:
//!
//! - **list** (activity search): flat, e.g. `avgStrideLength`,
//!   `averageRunningCadenceInStepsPerMinute`, `activityType.typeKey`
//! - **detail** (single activity): metrics nested under `summaryDTO` with
//!   other names, e.g. `summaryDTO.strideLength`,
//!   `summaryDTO.averageRunCadence`, `activityTypeDTO.typeKey`
//!
//! [`ACTIVITY_FIELDS`] maps every canonical field to its source path in each
//! shape. A field that only one shape carries is null for the other.

use serde::Serialize;
use serde_json::{Map, Number, Value};

use super::splits::reconcile_split_summaries;
use super::velocity::speed_to_pace;
use crate::units::Pace;

/// Activity type keys counted as running
pub const RUNNING_TYPE_KEYS: &[&str] = &["running", "track_running", "trail_running", "treadmill_running"];

/// Which upstream representation an activity arrived in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityShape {
    List,
    Detail,
}

impl ActivityShape {
    /// Detail responses are the ones carrying a `summaryDTO` object
    pub fn detect(raw: &Value) -> Self {
        if raw.get("summaryDTO").is_some_and(Value::is_object) {
            Self::Detail
        } else {
            Self::List
        }
    }
}

/// How a source value becomes a canonical value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    Raw,
    Round1,
    MetersToKm,
    SpeedToPace,
    /// Whole seconds rendered as `m:ss`
    Clock,
    SplitSummary,
}

/// Canonical field and its dotted source path in each shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldAlias {
    pub canonical: &'static str,
    pub list: Option<&'static str>,
    pub detail: Option<&'static str>,
    pub conversion: Conversion,
}

const fn alias(
    canonical: &'static str,
    list: Option<&'static str>,
    detail: Option<&'static str>,
    conversion: Conversion,
) -> FieldAlias {
    FieldAlias {
        canonical,
        list,
        detail,
        conversion,
    }
}

use Conversion::{Clock, MetersToKm, Raw, Round1, SpeedToPace, SplitSummary};

pub const ACTIVITY_FIELDS: &[FieldAlias] = &[
    alias("activity_id", Some("activityId"), Some("activityId"), Raw),
    alias("name", Some("activityName"), Some("activityName"), Raw),
    alias("date", Some("startTimeLocal"), Some("summaryDTO.startTimeLocal"), Raw),
    alias("type", Some("activityType.typeKey"), Some("activityTypeDTO.typeKey"), Raw),
    alias("distance_km", Some("distance"), Some("summaryDTO.distance"), MetersToKm),
    alias("duration_seconds", Some("duration"), Some("summaryDTO.duration"), Round1),
    alias("moving_duration_seconds", Some("movingDuration"), Some("summaryDTO.movingDuration"), Round1),
    alias("avg_pace", Some("averageSpeed"), Some("summaryDTO.averageSpeed"), SpeedToPace),
    alias("max_pace", Some("maxSpeed"), Some("summaryDTO.maxSpeed"), SpeedToPace),
    alias("avg_grade_adjusted_pace", Some("avgGradeAdjustedSpeed"), Some("summaryDTO.avgGradeAdjustedSpeed"), SpeedToPace),
    alias("avg_heart_rate", Some("averageHR"), Some("summaryDTO.averageHR"), Raw),
    alias("max_heart_rate", Some("maxHR"), Some("summaryDTO.maxHR"), Raw),
    alias("min_heart_rate", None, Some("summaryDTO.minHR"), Raw),
    alias("avg_cadence", Some("averageRunningCadenceInStepsPerMinute"), Some("summaryDTO.averageRunCadence"), Round1),
    alias("max_cadence", Some("maxRunningCadenceInStepsPerMinute"), Some("summaryDTO.maxRunCadence"), Round1),
    alias("avg_stride_length_cm", Some("avgStrideLength"), Some("summaryDTO.strideLength"), Round1),
    alias("avg_ground_contact_time_ms", Some("avgGroundContactTime"), Some("summaryDTO.groundContactTime"), Round1),
    alias("avg_vertical_oscillation_cm", Some("avgVerticalOscillation"), Some("summaryDTO.verticalOscillation"), Round1),
    alias("avg_vertical_ratio", Some("avgVerticalRatio"), Some("summaryDTO.verticalRatio"), Round1),
    alias("avg_power", Some("avgPower"), Some("summaryDTO.averagePower"), Raw),
    alias("max_power", Some("maxPower"), Some("summaryDTO.maxPower"), Raw),
    alias("normalized_power", Some("normPower"), Some("summaryDTO.normalizedPower"), Raw),
    alias("calories", Some("calories"), Some("summaryDTO.calories"), Raw),
    alias("elevation_gain", Some("elevationGain"), Some("summaryDTO.elevationGain"), Raw),
    alias("elevation_loss", Some("elevationLoss"), Some("summaryDTO.elevationLoss"), Raw),
    alias("min_elevation", Some("minElevation"), Some("summaryDTO.minElevation"), Raw),
    alias("max_elevation", Some("maxElevation"), Some("summaryDTO.maxElevation"), Raw),
    alias("max_vertical_speed", Some("maxVerticalSpeed"), Some("summaryDTO.maxVerticalSpeed"), Raw),
    alias("training_effect_aerobic", Some("aerobicTrainingEffect"), Some("summaryDTO.trainingEffect"), Raw),
    alias("training_effect_anaerobic", Some("anaerobicTrainingEffect"), Some("summaryDTO.anaerobicTrainingEffect"), Raw),
    alias("training_load", Some("activityTrainingLoad"), Some("summaryDTO.activityTrainingLoad"), Raw),
    alias("training_effect_label", Some("trainingEffectLabel"), Some("summaryDTO.trainingEffectLabel"), Raw),
    alias("vo2max", Some("vO2MaxValue"), None, Raw),
    alias("avg_temperature", None, Some("summaryDTO.averageTemperature"), Raw),
    alias("min_temperature", Some("minTemperature"), Some("summaryDTO.minTemperature"), Raw),
    alias("max_temperature", Some("maxTemperature"), Some("summaryDTO.maxTemperature"), Raw),
    alias("steps", Some("steps"), Some("summaryDTO.steps"), Raw),
    alias("lap_count", Some("lapCount"), None, Raw),
    alias("is_pr", Some("pr"), None, Raw),
    alias("fastest_split_1km", Some("fastestSplit_1000"), None, Clock),
    alias("fastest_split_1mile", Some("fastestSplit_1609"), None, Clock),
    alias("fastest_split_5km", Some("fastestSplit_5000"), None, Clock),
    alias("hr_zone_1_seconds", Some("hrTimeInZone_1"), None, Round1),
    alias("hr_zone_2_seconds", Some("hrTimeInZone_2"), None, Round1),
    alias("hr_zone_3_seconds", Some("hrTimeInZone_3"), None, Round1),
    alias("hr_zone_4_seconds", Some("hrTimeInZone_4"), None, Round1),
    alias("hr_zone_5_seconds", Some("hrTimeInZone_5"), None, Round1),
    alias("water_estimated_ml", Some("waterEstimated"), Some("summaryDTO.waterEstimated"), Raw),
    alias("impact_load", None, Some("summaryDTO.impactLoad"), Raw),
    alias("begin_potential_stamina", None, Some("summaryDTO.beginPotentialStamina"), Raw),
    alias("end_potential_stamina", None, Some("summaryDTO.endPotentialStamina"), Raw),
    alias("min_available_stamina", None, Some("summaryDTO.minAvailableStamina"), Raw),
    alias("description", None, Some("description"), Raw),
    alias("split_summary", Some("splitSummaries"), Some("splitSummaries"), SplitSummary),
];

impl FieldAlias {
    pub fn source(&self, shape: ActivityShape) -> Option<&'static str> {
        match shape {
            ActivityShape::List => self.list,
            ActivityShape::Detail => self.detail,
        }
    }

    fn resolve(&self, raw: &Value, shape: ActivityShape) -> Value {
        let value = self.source(shape).and_then(|path| lookup(raw, path));
        match self.conversion {
            Raw => value.cloned().unwrap_or(Value::Null),
            Round1 => rounded(value, 1),
            MetersToKm => value
                .and_then(Value::as_f64)
                .map_or(Value::Null, |meters| number(round_to(meters / 1000.0, 2))),
            SpeedToPace => value.map_or(Value::Null, speed_to_pace),
            Clock => value.and_then(Value::as_f64).map_or(Value::Null, clock),
            SplitSummary => reconcile_split_summaries(value, shape),
        }
    }
}

/// Canonical activity: every field of [`ACTIVITY_FIELDS`], in table order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityRecord {
    #[serde(skip)]
    shape: ActivityShape,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl ActivityRecord {
    pub fn shape(&self) -> ActivityShape {
        self.shape
    }

    pub fn get(&self, canonical: &str) -> Option<&Value> {
        self.fields.get(canonical)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Map a list- or detail-shaped activity onto the canonical field set
pub fn reconcile_activity(raw: &Value) -> ActivityRecord {
    let shape = ActivityShape::detect(raw);
    let fields = ACTIVITY_FIELDS
        .iter()
        .map(|alias| (alias.canonical.to_string(), alias.resolve(raw, shape)))
        .collect();
    ActivityRecord { shape, fields }
}

/// Whether an activity (either shape) is a run
pub fn is_running(raw: &Value) -> bool {
    let Some(activity_type) = raw
        .get("activityType")
        .filter(|value| value.is_object())
        .or_else(|| raw.get("activityTypeDTO"))
    else {
        return false;
    };

    let type_key = activity_type.get("typeKey").and_then(Value::as_str).unwrap_or_default();
    let parent_key = activity_type
        .get("parentTypeKey")
        .and_then(Value::as_str)
        .unwrap_or_default();
    RUNNING_TYPE_KEYS.contains(&type_key) || parent_key == "running"
}

/// Follow a dotted path such as `summaryDTO.strideLength`; an explicit JSON
/// null counts as absent
pub(super) fn lookup<'a>(raw: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(raw, |node, key| node.get(key))
        .filter(|value| !value.is_null())
}

pub(super) fn rounded(value: Option<&Value>, decimals: i32) -> Value {
    value
        .and_then(Value::as_f64)
        .map_or(Value::Null, |raw| number(round_to(raw, decimals)))
}

pub(super) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub(super) fn number(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

fn clock(seconds: f64) -> Value {
    if !seconds.is_finite() || seconds <= 0.0 || seconds > f64::from(u32::MAX) {
        return Value::Null;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let whole = seconds.round() as u32;
    Value::String(Pace::from_seconds_per_km(whole).to_string())
}
