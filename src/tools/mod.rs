// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # MCP Tools
//!
//! Each tool fetches raw Garmin data through [`GarminApi`], runs it through
//! the normalizer (or the workout compiler, for authoring) and returns plain
//! JSON. Tools never see transport details.

pub mod activities;
pub mod args;
pub mod summary;
pub mod workouts;

use serde_json::Value;
use std::sync::Arc;

use crate::constants::tools::{
    CREATE_RUNNING_WORKOUT, GET_ACTIVITIES_BY_DATE, GET_ACTIVITY_DETAIL, GET_ACTIVITY_SPLITS,
    GET_ACTIVITY_TYPED_SPLITS, GET_ACTIVITY_WEATHER, GET_MONTHLY_RUNNING_SUMMARY, GET_RECENT_ACTIVITIES,
    GET_WEEKLY_RUNNING_SUMMARY, GET_WORKOUTS,
};
use crate::normalize::{Normalizer, SanitizationPolicy};
use crate::providers::{GarminApi, ProviderError};
use crate::workout::{ValidationError, WorkoutCompiler};

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Upstream(#[from] ProviderError),

    #[error("Unexpected Garmin response for {tool}: expected {expected}")]
    UnexpectedResponse {
        tool: &'static str,
        expected: &'static str,
    },

    #[error("Failed to encode tool result: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Everything a tool call needs; shared read-only across calls
pub struct ToolContext {
    api: Arc<dyn GarminApi>,
    policy: SanitizationPolicy,
    weather_policy: SanitizationPolicy,
    compiler: WorkoutCompiler,
}

impl ToolContext {
    pub fn new(api: Arc<dyn GarminApi>, compiler: WorkoutCompiler) -> Self {
        Self {
            api,
            policy: SanitizationPolicy::personal_data(),
            weather_policy: SanitizationPolicy::weather(),
            compiler,
        }
    }

    /// Replace the default denylists
    pub fn with_policies(mut self, policy: SanitizationPolicy, weather_policy: SanitizationPolicy) -> Self {
        self.policy = policy;
        self.weather_policy = weather_policy;
        self
    }

    pub fn api(&self) -> &dyn GarminApi {
        self.api.as_ref()
    }

    pub fn compiler(&self) -> &WorkoutCompiler {
        &self.compiler
    }

    pub fn normalizer(&self) -> Normalizer<'_> {
        Normalizer::new(&self.policy)
    }

    pub fn weather_normalizer(&self) -> Normalizer<'_> {
        Normalizer::new(&self.weather_policy)
    }

    /// Dispatch a `tools/call` by name
    pub async fn call_tool(&self, name: &str, arguments: &Value) -> Result<Value, ToolError> {
        match name {
            GET_RECENT_ACTIVITIES => activities::get_recent_activities(self, arguments).await,
            GET_ACTIVITIES_BY_DATE => activities::get_activities_by_date(self, arguments).await,
            GET_ACTIVITY_DETAIL => activities::get_activity_detail(self, arguments).await,
            GET_ACTIVITY_SPLITS => activities::get_activity_splits(self, arguments).await,
            GET_ACTIVITY_WEATHER => activities::get_activity_weather(self, arguments).await,
            GET_ACTIVITY_TYPED_SPLITS => activities::get_activity_typed_splits(self, arguments).await,
            GET_WEEKLY_RUNNING_SUMMARY => summary::get_weekly_running_summary(self, arguments).await,
            GET_MONTHLY_RUNNING_SUMMARY => summary::get_monthly_running_summary(self, arguments).await,
            GET_WORKOUTS => workouts::get_workouts(self, arguments).await,
            CREATE_RUNNING_WORKOUT => workouts::create_running_workout(self, arguments).await,
            _ => Err(ToolError::UnknownTool(name.to_string())),
        }
    }
}
