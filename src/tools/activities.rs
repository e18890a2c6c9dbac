// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Running activity tools

use serde_json::{json, Value};

use super::args;
use super::{ToolContext, ToolError};
use crate::constants::json_fields::{ACTIVITY_ID, COUNT, END_DATE, START_DATE};
use crate::constants::limits::{DEFAULT_ACTIVITIES_LIMIT, MAX_ACTIVITIES_FETCH, RUNNING_OVERFETCH_FACTOR};
use crate::constants::tools::{GET_ACTIVITIES_BY_DATE, GET_RECENT_ACTIVITIES};
use crate::normalize::{is_running, summarize_climb_splits};

pub(super) fn activity_list(tool: &'static str, raw: Value) -> Result<Vec<Value>, ToolError> {
    match raw {
        Value::Array(activities) => Ok(activities),
        Value::Null => Ok(Vec::new()),
        _ => Err(ToolError::UnexpectedResponse {
            tool,
            expected: "an activity list",
        }),
    }
}

/// Latest runs, newest first. Non-running activities are skipped, so more
/// than `count` activities are requested upstream.
pub async fn get_recent_activities(ctx: &ToolContext, arguments: &Value) -> Result<Value, ToolError> {
    let count = args::count(arguments, COUNT, DEFAULT_ACTIVITIES_LIMIT, MAX_ACTIVITIES_FETCH)?;
    let raw = ctx
        .api()
        .get_activities(0, count.saturating_mul(RUNNING_OVERFETCH_FACTOR))
        .await?;

    let normalizer = ctx.normalizer();
    let runs = activity_list(GET_RECENT_ACTIVITIES, raw)?
        .into_iter()
        .filter(is_running)
        .take(count as usize)
        .map(|activity| normalizer.normalize_activity(activity).into_value())
        .collect();
    Ok(Value::Array(runs))
}

pub async fn get_activities_by_date(ctx: &ToolContext, arguments: &Value) -> Result<Value, ToolError> {
    let start_date = args::date(arguments, START_DATE)?;
    let end_date = args::date(arguments, END_DATE)?;
    if start_date > end_date {
        return Err(ToolError::InvalidArguments(format!(
            "start_date {start_date} is after end_date {end_date}"
        )));
    }

    let raw = ctx
        .api()
        .get_activities_by_date(start_date, end_date, Some("running"))
        .await?;

    let normalizer = ctx.normalizer();
    let runs = activity_list(GET_ACTIVITIES_BY_DATE, raw)?
        .into_iter()
        .filter(is_running)
        .map(|activity| normalizer.normalize_activity(activity).into_value())
        .collect();
    Ok(Value::Array(runs))
}

pub async fn get_activity_detail(ctx: &ToolContext, arguments: &Value) -> Result<Value, ToolError> {
    let activity_id = args::activity_id(arguments, ACTIVITY_ID)?;
    let raw = ctx.api().get_activity(activity_id).await?;
    Ok(ctx.normalizer().normalize_activity(raw).into_value())
}

/// Per-lap splits with speeds shown as paces
pub async fn get_activity_splits(ctx: &ToolContext, arguments: &Value) -> Result<Value, ToolError> {
    let activity_id = args::activity_id(arguments, ACTIVITY_ID)?;
    let raw = ctx.api().get_activity_splits(activity_id).await?;
    Ok(ctx.normalizer().normalize(raw))
}

/// ClimbPro climb segments with grades and grade-adjusted pace
pub async fn get_activity_typed_splits(ctx: &ToolContext, arguments: &Value) -> Result<Value, ToolError> {
    let activity_id = args::activity_id(arguments, ACTIVITY_ID)?;
    let raw = ctx.api().get_activity_typed_splits(activity_id).await?;
    let climbs = summarize_climb_splits(&raw);

    Ok(json!({
        "activity_id": activity_id,
        "total_climb_splits": climbs.len(),
        "splits": climbs,
    }))
}

/// Weather during the activity, without the station coordinates
pub async fn get_activity_weather(ctx: &ToolContext, arguments: &Value) -> Result<Value, ToolError> {
    let activity_id = args::activity_id(arguments, ACTIVITY_ID)?;
    let raw = ctx.api().get_activity_weather(activity_id).await?;
    Ok(ctx.weather_normalizer().normalize(raw))
}
