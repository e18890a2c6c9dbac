// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! ClimbPro segments from the typed-splits endpoint
//!
//! The typed-splits document mixes climb segments with run/walk and interval
//! splits. Only entries whose `type` mentions `CLIMB` are kept, reduced to a
//! fixed field set with speeds shown as paces.

use serde_json::{json, Value};

use super::activity::{lookup, number, round_to, rounded};
use super::velocity::speed_to_pace;

fn is_climb(split: &Value) -> bool {
    split
        .get("type")
        .and_then(Value::as_str)
        .is_some_and(|split_type| split_type.contains("CLIMB"))
}

fn raw(split: &Value, key: &str) -> Value {
    lookup(split, key).cloned().unwrap_or(Value::Null)
}

fn summarize(split: &Value) -> Value {
    let distance_km = lookup(split, "distance")
        .and_then(Value::as_f64)
        .map_or(Value::Null, |meters| number(round_to(meters / 1000.0, 2)));

    json!({
        "type": raw(split, "type"),
        "difficulty": raw(split, "climbProDifficulty"),
        "distance_km": distance_km,
        "duration_seconds": rounded(lookup(split, "duration"), 1),
        "elevation_gain": rounded(lookup(split, "elevationGain"), 1),
        "elevation_loss": rounded(lookup(split, "elevationLoss"), 1),
        "start_elevation": rounded(lookup(split, "startElevation"), 1),
        "avg_grade": rounded(lookup(split, "averageGrade"), 1),
        "max_grade": rounded(lookup(split, "maxGrade"), 1),
        "actual_pace": lookup(split, "averageSpeed").map_or(Value::Null, speed_to_pace),
        "grade_adjusted_pace": lookup(split, "avgGradeAdjustedSpeed").map_or(Value::Null, speed_to_pace),
        "avg_heart_rate": raw(split, "averageHR"),
        "max_heart_rate": raw(split, "maxHR"),
        "avg_power": raw(split, "averagePower"),
        "avg_cadence": rounded(lookup(split, "averageRunCadence"), 1),
    })
}

/// Climb segments of a typed-splits response, in upstream order
pub fn summarize_climb_splits(typed_splits: &Value) -> Vec<Value> {
    typed_splits
        .get("splits")
        .and_then(Value::as_array)
        .map(|splits| splits.iter().filter(|split| is_climb(split)).map(summarize).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_climbs_are_kept() {
        let typed = json!({"splits": [
            {"type": "RWD_RUN", "distance": 5000.0},
            {"type": "CLIMB_PRO_CYCLING_CLIMB", "distance": 1234.5, "climbProDifficulty": "STEEP"},
            {"type": "INTERVAL_ACTIVE", "distance": 5000.0},
            {"type": "CLIMB_PRO_CYCLING_CLIMB_SECTION", "distance": 400.0}
        ]});

        let climbs = summarize_climb_splits(&typed);
        assert_eq!(climbs.len(), 2);
        assert_eq!(climbs[0]["difficulty"], json!("STEEP"));
        assert_eq!(climbs[0]["distance_km"], json!(1.23));
        assert_eq!(climbs[1]["type"], json!("CLIMB_PRO_CYCLING_CLIMB_SECTION"));
        assert_eq!(climbs[1]["difficulty"], Value::Null);
    }

    #[test]
    fn test_speeds_become_paces() {
        let typed = json!({"splits": [
            {"type": "CLIMB_PRO_CYCLING_CLIMB", "averageSpeed": 2.5, "avgGradeAdjustedSpeed": 4.0}
        ]});

        let climb = &summarize_climb_splits(&typed)[0];
        assert_eq!(climb["actual_pace"], json!("6:40"));
        assert_eq!(climb["grade_adjusted_pace"], json!("4:10"));
        assert!(climb.get("averageSpeed").is_none());
    }

    #[test]
    fn test_missing_splits_give_empty_list() {
        assert!(summarize_climb_splits(&json!({"activityId": 1})).is_empty());
        assert!(summarize_climb_splits(&Value::Null).is_empty());
        assert!(summarize_climb_splits(&json!({"splits": [{"distance": 1.0}]})).is_empty());
    }
}
