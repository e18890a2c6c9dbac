// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Workout library tools

use serde_json::{json, Value};

use super::args;
use super::{ToolContext, ToolError};
use crate::constants::json_fields::{COUNT, DESCRIPTION, NAME, STEPS};
use crate::constants::limits::{DEFAULT_ACTIVITIES_LIMIT, MAX_ACTIVITIES_FETCH};
use crate::logging::AppLogger;

pub async fn get_workouts(ctx: &ToolContext, arguments: &Value) -> Result<Value, ToolError> {
    let count = args::count(arguments, COUNT, DEFAULT_ACTIVITIES_LIMIT, MAX_ACTIVITIES_FETCH)?;
    let raw = ctx.api().get_workouts(0, count).await?;
    Ok(ctx.normalizer().normalize(raw))
}

/// Compile the step tree and upload it. Nothing is sent to Garmin unless the
/// whole tree validates.
pub async fn create_running_workout(ctx: &ToolContext, arguments: &Value) -> Result<Value, ToolError> {
    let name = args::required_str(arguments, NAME)?;
    let description = args::optional_str(arguments, DESCRIPTION)?;
    let steps = args::required_array(arguments, STEPS)?;

    let workout = ctx.compiler().compile_definitions(name, description, steps)?;
    AppLogger::log_workout_compiled(
        workout.name(),
        workout.steps().len(),
        workout.estimated_duration_seconds(),
    );

    let result = ctx.api().create_workout(&workout.payload()).await?;

    Ok(json!({
        "status": "created",
        "workout_name": workout.name(),
        "estimated_duration_seconds": workout.estimated_duration_seconds(),
        "step_count": workout.steps().len(),
        "result": ctx.normalizer().normalize(result),
    }))
}
