// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Aggregate statistics over a set of runs
//!
//! Input activities are search-list entries (flat `distance`, `duration`,
//! `elevationGain`, `averageHR`). Only aggregates leave this module, so the
//! input does not need to be stripped first.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use super::activity::{lookup, round_to};
use crate::units::Pace;

/// Totals and averages for a period
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunningSummary {
    pub total_runs: usize,
    pub total_distance_km: f64,
    pub total_duration_seconds: f64,
    /// Overall pace: total time over total distance
    pub avg_pace: Option<String>,
    pub avg_heart_rate: Option<f64>,
    pub total_elevation_gain: f64,
    pub longest_run_km: f64,
    pub longest_run_pace: Option<String>,
}

fn metric(activity: &Value, key: &str) -> f64 {
    lookup(activity, key)
        .and_then(Value::as_f64)
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

fn pace_over(meters: f64, seconds: f64) -> Option<String> {
    if seconds <= 0.0 {
        return None;
    }
    Pace::from_speed(meters / seconds).map(|pace| pace.to_string())
}

impl RunningSummary {
    pub fn from_activities(activities: &[Value]) -> Self {
        if activities.is_empty() {
            return Self::default();
        }

        let total_meters: f64 = activities.iter().map(|a| metric(a, "distance")).sum();
        let total_seconds: f64 = activities.iter().map(|a| metric(a, "duration")).sum();
        let total_elevation: f64 = activities.iter().map(|a| metric(a, "elevationGain")).sum();

        let heart_rates: Vec<f64> = activities
            .iter()
            .map(|a| metric(a, "averageHR"))
            .filter(|hr| *hr > 0.0)
            .collect();
        #[allow(clippy::cast_precision_loss)]
        let avg_heart_rate = (!heart_rates.is_empty())
            .then(|| round_to(heart_rates.iter().sum::<f64>() / heart_rates.len() as f64, 1));

        let longest = activities
            .iter()
            .max_by(|a, b| metric(a, "distance").total_cmp(&metric(b, "distance")));
        let (longest_meters, longest_seconds) =
            longest.map_or((0.0, 0.0), |a| (metric(a, "distance"), metric(a, "duration")));

        Self {
            total_runs: activities.len(),
            total_distance_km: round_to(total_meters / 1000.0, 2),
            total_duration_seconds: round_to(total_seconds, 1),
            avg_pace: pace_over(total_meters, total_seconds),
            avg_heart_rate,
            total_elevation_gain: round_to(total_elevation, 1),
            longest_run_km: round_to(longest_meters / 1000.0, 2),
            longest_run_pace: pace_over(longest_meters, longest_seconds),
        }
    }

    /// Distance change against `previous` in percent; none when `previous`
    /// covered no distance
    pub fn distance_change_pct(&self, previous: &RunningSummary) -> Option<f64> {
        let before = previous.total_distance_km;
        (before != 0.0).then(|| round_to((self.total_distance_km - before) / before * 100.0, 1))
    }
}

/// Local calendar day the activity started on
pub fn activity_date(activity: &Value) -> Option<NaiveDate> {
    let start = lookup(activity, "startTimeLocal")
        .or_else(|| lookup(activity, "summaryDTO.startTimeLocal"))
        .and_then(Value::as_str)?;
    NaiveDate::parse_from_str(start.get(..10)?, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(meters: f64, seconds: f64, hr: Option<f64>) -> Value {
        json!({"distance": meters, "duration": seconds, "elevationGain": 12.34, "averageHR": hr})
    }

    #[test]
    fn test_empty_period() {
        let summary = RunningSummary::from_activities(&[]);
        assert_eq!(summary.total_runs, 0);
        assert_eq!(summary.avg_pace, None);
        assert_eq!(summary.longest_run_pace, None);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["avg_heart_rate"], Value::Null);
        assert_eq!(json["total_distance_km"], json!(0.0));
    }

    #[test]
    fn test_totals_and_paces() {
        let summary = RunningSummary::from_activities(&[
            run(10_000.0, 3_000.0, Some(150.0)),
            run(5_000.0, 1_200.0, Some(161.0)),
            run(2_000.0, 700.0, None),
        ]);

        assert_eq!(summary.total_runs, 3);
        assert_eq!(summary.total_distance_km, 17.0);
        assert_eq!(summary.total_duration_seconds, 4_900.0);
        // 4900 s over 17 km = 288.2 s/km
        assert_eq!(summary.avg_pace.as_deref(), Some("4:48"));
        assert_eq!(summary.avg_heart_rate, Some(155.5));
        assert_eq!(summary.total_elevation_gain, 37.0);
        assert_eq!(summary.longest_run_km, 10.0);
        assert_eq!(summary.longest_run_pace.as_deref(), Some("5:00"));
    }

    #[test]
    fn test_missing_metrics_count_as_zero() {
        let summary = RunningSummary::from_activities(&[json!({"activityName": "watch died"})]);
        assert_eq!(summary.total_runs, 1);
        assert_eq!(summary.total_distance_km, 0.0);
        assert_eq!(summary.avg_pace, None);
        assert_eq!(summary.avg_heart_rate, None);
    }

    #[test]
    fn test_distance_change() {
        let with_km = |km: f64| RunningSummary {
            total_distance_km: km,
            ..RunningSummary::default()
        };

        assert_eq!(with_km(12.0).distance_change_pct(&with_km(10.0)), Some(20.0));
        assert_eq!(with_km(5.0).distance_change_pct(&with_km(15.0)), Some(-66.7));
        assert_eq!(with_km(5.0).distance_change_pct(&with_km(0.0)), None);
    }

    #[test]
    fn test_activity_date_from_either_shape() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 2);
        assert_eq!(activity_date(&json!({"startTimeLocal": "2024-03-02 07:15:00"})), expected);
        assert_eq!(
            activity_date(&json!({"summaryDTO": {"startTimeLocal": "2024-03-02T07:15:00.0"}})),
            expected
        );
        assert_eq!(activity_date(&json!({"startTimeLocal": "yesterday"})), None);
        assert_eq!(activity_date(&json!({})), None);
    }
}
