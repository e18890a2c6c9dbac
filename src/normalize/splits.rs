// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Run/walk/stand split summaries
//!
//! Both activity shapes carry `splitSummaries`, but list entries report
//! climbing as `totalAscent` in centimeters while detail entries report
//! `elevationGain` in meters.

use serde_json::{json, Map, Value};

use super::activity::{lookup, number, round_to, rounded, ActivityShape};
use super::velocity::speed_to_pace;

const SPLIT_LABELS: &[(&str, &str)] = &[("RWD_RUN", "run"), ("RWD_WALK", "walk"), ("RWD_STAND", "stand")];

fn label_for(split_type: &str) -> Option<&'static str> {
    SPLIT_LABELS
        .iter()
        .find(|(upstream, _)| *upstream == split_type)
        .map(|(_, label)| *label)
}

/// Summaries keyed by `run`/`walk`/`stand`, or null when there are none
pub fn reconcile_split_summaries(value: Option<&Value>, shape: ActivityShape) -> Value {
    let Some(entries) = value.and_then(Value::as_array) else {
        return Value::Null;
    };

    let mut summary = Map::new();
    for entry in entries {
        let Some(label) = entry
            .get("splitType")
            .and_then(Value::as_str)
            .and_then(label_for)
        else {
            continue;
        };

        let distance_km = lookup(entry, "distance")
            .and_then(Value::as_f64)
            .map_or(Value::Null, |meters| number(round_to(meters / 1000.0, 2)));
        summary.insert(
            label.to_string(),
            json!({
                "distance_km": distance_km,
                "duration_seconds": rounded(lookup(entry, "duration"), 1),
                "avg_pace": lookup(entry, "averageSpeed").map_or(Value::Null, speed_to_pace),
                "elevation_gain": elevation_gain(entry, shape),
                "elevation_loss": rounded(lookup(entry, "elevationLoss"), 1),
            }),
        );
    }

    if summary.is_empty() {
        Value::Null
    } else {
        Value::Object(summary)
    }
}

fn elevation_gain(entry: &Value, shape: ActivityShape) -> Value {
    let meters = match shape {
        ActivityShape::List => lookup(entry, "totalAscent")
            .and_then(Value::as_f64)
            .map(|centimeters| centimeters / 100.0),
        ActivityShape::Detail => lookup(entry, "elevationGain").and_then(Value::as_f64),
    };
    meters.map_or(Value::Null, |meters| number(round_to(meters, 1)))
}
