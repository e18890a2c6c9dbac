// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Typed access to `tools/call` arguments

use chrono::NaiveDate;
use serde_json::Value;

use super::ToolError;

fn invalid(message: impl Into<String>) -> ToolError {
    ToolError::InvalidArguments(message.into())
}

/// A positive count, `default` when absent, clamped to `max`
pub fn count(arguments: &Value, key: &str, default: u32, max: u32) -> Result<u32, ToolError> {
    let requested = match arguments.get(key) {
        None | Some(Value::Null) => return Ok(default.min(max)),
        Some(value) => value
            .as_u64()
            .or_else(|| value.as_f64().filter(|n| n.fract() == 0.0 && *n >= 0.0).map(|n| n as u64))
            .ok_or_else(|| invalid(format!("'{key}' must be a positive integer, got {value}")))?,
    };

    if requested == 0 {
        return Err(invalid(format!("'{key}' must be at least 1")));
    }
    Ok(u32::try_from(requested).unwrap_or(u32::MAX).min(max))
}

pub fn required_str<'a>(arguments: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    match arguments.get(key) {
        Some(Value::String(text)) if !text.trim().is_empty() => Ok(text.as_str()),
        Some(Value::String(_)) => Err(invalid(format!("'{key}' must not be empty"))),
        Some(other) => Err(invalid(format!("'{key}' must be a string, got {other}"))),
        None => Err(invalid(format!("missing required argument '{key}'"))),
    }
}

pub fn optional_str<'a>(arguments: &'a Value, key: &str) -> Result<Option<&'a str>, ToolError> {
    match arguments.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.as_str())),
        Some(other) => Err(invalid(format!("'{key}' must be a string, got {other}"))),
    }
}

pub fn required_array<'a>(arguments: &'a Value, key: &str) -> Result<&'a [Value], ToolError> {
    match arguments.get(key) {
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(other) => Err(invalid(format!("'{key}' must be an array, got {other}"))),
        None => Err(invalid(format!("missing required argument '{key}'"))),
    }
}

/// Garmin activity ids arrive as numbers or as numeric strings
pub fn activity_id(arguments: &Value, key: &str) -> Result<u64, ToolError> {
    match arguments.get(key) {
        Some(Value::Number(number)) => number
            .as_u64()
            .ok_or_else(|| invalid(format!("'{key}' must be a positive integer, got {number}"))),
        Some(Value::String(text)) => text
            .trim()
            .parse()
            .map_err(|_| invalid(format!("'{key}' must be a numeric activity id, got '{text}'"))),
        Some(other) => Err(invalid(format!("'{key}' must be an activity id, got {other}"))),
        None => Err(invalid(format!("missing required argument '{key}'"))),
    }
}

/// A strict `YYYY-MM-DD` date
pub fn date(arguments: &Value, key: &str) -> Result<NaiveDate, ToolError> {
    let text = required_str(arguments, key)?;
    let well_formed = text.len() == 10
        && text
            .char_indices()
            .all(|(i, c)| if i == 4 || i == 7 { c == '-' } else { c.is_ascii_digit() });
    if !well_formed {
        return Err(invalid(format!("invalid date format: '{text}'. Expected YYYY-MM-DD.")));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|e| invalid(format!("invalid date '{text}': {e}")))
}

/// Like [`date`], but absent or null gives `None`
pub fn optional_date(arguments: &Value, key: &str) -> Result<Option<NaiveDate>, ToolError> {
    match arguments.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) if text.is_empty() => Ok(None),
        Some(_) => date(arguments, key).map(Some),
    }
}

/// A whole number in `range`; absent, null and 0 mean "use the default"
pub fn optional_in_range(
    arguments: &Value,
    key: &str,
    range: std::ops::RangeInclusive<u32>,
) -> Result<Option<u32>, ToolError> {
    let value = match arguments.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value
            .as_u64()
            .ok_or_else(|| invalid(format!("'{key}' must be a whole number, got {value}")))?,
    };
    if value == 0 {
        return Ok(None);
    }

    u32::try_from(value)
        .ok()
        .filter(|value| range.contains(value))
        .map(Some)
        .ok_or_else(|| {
            invalid(format!(
                "'{key}' must be between {} and {}, got {value}",
                range.start(),
                range.end()
            ))
        })
}
