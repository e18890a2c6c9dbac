// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Integration tests for response normalization
//!
//! Fixtures mirror the two shapes Garmin Connect returns for the same run:
//! the activity search list entry and the single-activity detail document.

use garmin_mcp_server::normalize::{
    is_running, normalize, reconcile_activity, ActivityShape, Normalizer, SanitizationPolicy, ACTIVITY_FIELDS,
};
use serde_json::{json, Value};

fn list_activity() -> Value {
    json!({
        "activityId": 14_123_456_789_u64,
        "activityName": "Morning Run",
        "startTimeLocal": "2024-03-02 07:15:00",
        "activityType": {"typeId": 1, "typeKey": "running", "parentTypeId": 17},
        "ownerId": 987_654,
        "ownerFullName": "Jane Runner",
        "startLatitude": 51.5074,
        "startLongitude": -0.1278,
        "distance": 10_012.3,
        "duration": 2_950.47,
        "movingDuration": 2_921.0,
        "averageSpeed": 3.394,
        "maxSpeed": 4.5,
        "averageHR": 152.0,
        "maxHR": 171.0,
        "averageRunningCadenceInStepsPerMinute": 172.34,
        "avgStrideLength": 118.27,
        "elevationGain": 84.0,
        "elevationLoss": 82.0,
        "maxVerticalSpeed": 0.4,
        "calories": 712.0,
        "splitSummaries": [
            {"splitType": "RWD_RUN", "distance": 9_800.0, "duration": 2_860.2,
             "averageSpeed": 3.426, "totalAscent": 8_100.0, "elevationLoss": 80.0},
            {"splitType": "RWD_WALK", "distance": 212.3, "duration": 90.27,
             "averageSpeed": 2.358, "totalAscent": 300.0, "elevationLoss": 2.0},
            {"splitType": "INTERVAL_ACTIVE", "distance": 10_012.3}
        ]
    })
}

fn detail_activity() -> Value {
    json!({
        "activityId": 14_123_456_789_u64,
        "activityName": "Morning Run",
        "userProfileId": 987_654,
        "activityTypeDTO": {"typeId": 1, "typeKey": "running", "parentTypeId": 17},
        "summaryDTO": {
            "startTimeLocal": "2024-03-02 07:15:00",
            "startLatitude": 51.5074,
            "startLongitude": -0.1278,
            "distance": 10_012.3,
            "duration": 2_950.47,
            "movingDuration": 2_921.0,
            "averageSpeed": 3.394,
            "maxSpeed": 4.5,
            "averageHR": 152.0,
            "maxHR": 171.0,
            "averageRunCadence": 172.34,
            "strideLength": 118.27,
            "elevationGain": 84.0,
            "elevationLoss": 82.0,
            "maxVerticalSpeed": 0.4,
            "calories": 712.0
        },
        "splitSummaries": [
            {"splitType": "RWD_RUN", "distance": 9_800.0, "duration": 2_860.2,
             "averageSpeed": 3.426, "elevationGain": 81.0, "elevationLoss": 80.0},
            {"splitType": "RWD_WALK", "distance": 212.3, "duration": 90.27,
             "averageSpeed": 2.358, "elevationGain": 3.0, "elevationLoss": 2.0}
        ]
    })
}

fn contains_key(value: &Value, key: &str) -> bool {
    match value {
        Value::Object(map) => map.contains_key(key) || map.values().any(|child| contains_key(child, key)),
        Value::Array(items) => items.iter().any(|child| contains_key(child, key)),
        _ => false,
    }
}

#[test]
fn test_location_and_speed_example() {
    let policy = SanitizationPolicy::personal_data();
    let normalized = normalize(
        json!({"startLatitude": 37.5, "distance": 1000, "averageSpeed": 2.5}),
        &policy,
    );

    assert_eq!(normalized, json!({"distance": 1000, "avg_pace": "6:40"}));
}

#[test]
fn test_zero_speed_becomes_null_pace() {
    let policy = SanitizationPolicy::personal_data();
    let normalized = normalize(json!({"averageSpeed": 0, "maxSpeed": 0.0}), &policy);

    assert_eq!(normalized, json!({"avg_pace": null, "max_pace": null}));
}

#[test]
fn test_denied_keys_removed_at_every_depth() {
    let policy = SanitizationPolicy::personal_data();
    let normalized = Normalizer::new(&policy).normalize(json!({
        "workouts": [
            {"workoutId": 1, "ownerId": 42, "author": {"displayName": "jane", "fullName": "Jane"}},
            {"workoutId": 2, "ownerId": 42}
        ]
    }));

    for key in ["ownerId", "displayName", "fullName"] {
        assert!(!contains_key(&normalized, key), "{key} survived normalization");
    }
    assert_eq!(normalized["workouts"][1], json!({"workoutId": 2}));
}

#[test]
fn test_normalize_is_idempotent() {
    let policy = SanitizationPolicy::personal_data();
    let normalizer = Normalizer::new(&policy);

    for raw in [list_activity(), detail_activity()] {
        let once = normalizer.normalize(raw);
        let twice = normalizer.normalize(once.clone());
        assert_eq!(once, twice);
    }
}

#[test]
fn test_vertical_speed_stays_a_rate() {
    let policy = SanitizationPolicy::personal_data();
    let normalized = normalize(list_activity(), &policy);

    assert_eq!(normalized["maxVerticalSpeed"], json!(0.4));
    assert!(normalized.get("averageSpeed").is_none());
    assert_eq!(normalized["avg_pace"], json!("4:55"));
}

#[test]
fn test_list_and_detail_reconcile_to_same_record() {
    let policy = SanitizationPolicy::personal_data();
    let normalizer = Normalizer::new(&policy);

    let from_list = normalizer.normalize_activity(list_activity());
    let from_detail = normalizer.normalize_activity(detail_activity());

    assert_eq!(from_list.shape(), ActivityShape::List);
    assert_eq!(from_detail.shape(), ActivityShape::Detail);

    for field in [
        "activity_id",
        "name",
        "date",
        "type",
        "distance_km",
        "duration_seconds",
        "avg_pace",
        "max_pace",
        "avg_heart_rate",
        "avg_cadence",
        "avg_stride_length_cm",
        "elevation_gain",
        "calories",
        "split_summary",
    ] {
        assert_eq!(from_list.get(field), from_detail.get(field), "{field} differs between shapes");
    }

    assert_eq!(from_list.get("distance_km"), Some(&json!(10.01)));
    assert_eq!(from_list.get("avg_stride_length_cm"), Some(&json!(118.3)));
    assert_eq!(from_list.get("avg_cadence"), Some(&json!(172.3)));
}

#[test]
fn test_record_carries_every_canonical_field_in_order() {
    let record = reconcile_activity(&list_activity());

    let keys: Vec<&str> = record.fields().keys().map(String::as_str).collect();
    let expected: Vec<&str> = ACTIVITY_FIELDS.iter().map(|alias| alias.canonical).collect();
    assert_eq!(keys, expected);

    // Detail-only field absent from the list shape
    assert_eq!(record.get("impact_load"), Some(&Value::Null));
}

#[test]
fn test_split_summary_units() {
    let policy = SanitizationPolicy::personal_data();
    let record = Normalizer::new(&policy).normalize_activity(list_activity());
    let summary = record.get("split_summary").expect("split summary");

    assert_eq!(summary["run"]["distance_km"], json!(9.8));
    assert_eq!(summary["run"]["elevation_gain"], json!(81.0));
    assert_eq!(summary["walk"]["duration_seconds"], json!(90.3));
    assert!(summary.get("stand").is_none());
    assert_eq!(summary.as_object().map(|entries| entries.len()), Some(2));
}

#[test]
fn test_reconciled_record_has_no_personal_data() {
    let policy = SanitizationPolicy::personal_data();
    let value = Normalizer::new(&policy).normalize_activity(detail_activity()).into_value();

    for key in ["userProfileId", "startLatitude", "startLongitude", "ownerId"] {
        assert!(!contains_key(&value, key));
    }
}

#[test]
fn test_weather_policy_hides_station_coordinates() {
    let policy = SanitizationPolicy::weather();
    let normalized = normalize(
        json!({
            "temp": 54,
            "relativeHumidity": 80,
            "latitude": 51.5,
            "longitude": -0.12,
            "weatherStationDTO": {"id": "EGLL", "name": "London Heathrow"}
        }),
        &policy,
    );

    assert_eq!(normalized["temp"], json!(54));
    assert!(normalized.get("latitude").is_none());
    assert!(normalized.get("longitude").is_none());
    assert_eq!(normalized["weatherStationDTO"]["id"], json!("EGLL"));
}

#[test]
fn test_running_filter() {
    assert!(is_running(&list_activity()));
    assert!(is_running(&detail_activity()));
    assert!(is_running(&json!({"activityType": {"typeKey": "trail_running"}})));
    assert!(!is_running(&json!({"activityType": {"typeKey": "cycling", "parentTypeKey": "cycling"}})));
    assert!(!is_running(&json!({"activityName": "no type"})));
}
