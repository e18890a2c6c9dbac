// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Speed-to-pace conversion for horizontal velocity fields

use serde_json::Value;

use crate::units::Pace;

/// Horizontal speed fields (m/s) and the pace field (`m:ss` per km) that
/// replaces each of them
pub const VELOCITY_FIELDS: &[(&str, &str)] = &[
    ("averageSpeed", "avg_pace"),
    ("averageMovingSpeed", "avg_moving_pace"),
    ("maxSpeed", "max_pace"),
    ("avgGradeAdjustedSpeed", "grade_adjusted_pace"),
];

/// Climbing rates stay rates; a pace has no meaning for vertical motion
pub const VERTICAL_RATE_FIELDS: &[&str] = &["maxVerticalSpeed", "avgVerticalSpeed", "verticalSpeed"];

pub fn is_vertical_rate(field: &str) -> bool {
    VERTICAL_RATE_FIELDS.contains(&field)
}

/// Name of the pace field that replaces `field`, if it is a horizontal speed
pub fn pace_field_for(field: &str) -> Option<&'static str> {
    if is_vertical_rate(field) {
        return None;
    }
    VELOCITY_FIELDS
        .iter()
        .find(|(speed, _)| *speed == field)
        .map(|(_, pace)| *pace)
}

/// Format a speed value as a pace string, or null when the value is missing,
/// zero, negative or not a number
pub fn speed_to_pace(value: &Value) -> Value {
    value
        .as_f64()
        .and_then(Pace::from_speed)
        .map_or(Value::Null, |pace| Value::String(pace.to_string()))
}
