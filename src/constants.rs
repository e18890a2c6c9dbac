// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Constants Module
//!
//! Protocol identifiers, Garmin endpoints, tool names and numeric limits.

/// Protocol-related constants
pub mod protocol {
    use std::env;

    /// Get MCP Protocol version from environment or default
    pub fn mcp_protocol_version() -> String {
        env::var("MCP_PROTOCOL_VERSION").unwrap_or_else(|_| MCP_PROTOCOL_VERSION.to_string())
    }

    /// Get server name from environment or default
    pub fn server_name() -> String {
        env::var("SERVER_NAME").unwrap_or_else(|_| SERVER_NAME.to_string())
    }

    /// JSON-RPC version (standard, not configurable)
    pub const JSONRPC_VERSION: &str = "2.0";

    /// Server version from Cargo.toml
    pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

    pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";
    pub const SERVER_NAME: &str = "garmin-mcp-server";
}

/// JSON-RPC error codes
pub mod errors {
    pub const ERROR_PARSE: i32 = -32700;
    pub const ERROR_INVALID_REQUEST: i32 = -32600;
    pub const ERROR_METHOD_NOT_FOUND: i32 = -32601;
    pub const ERROR_INVALID_PARAMS: i32 = -32602;
    pub const ERROR_INTERNAL_ERROR: i32 = -32603;

    pub const MSG_PARSE_ERROR: &str = "Parse error";
    pub const MSG_INVALID_REQUEST: &str = "Invalid request";
    pub const MSG_METHOD_NOT_FOUND: &str = "Method not found";
}

/// Garmin Connect API
pub mod garmin {
    pub const DEFAULT_API_BASE_URL: &str = "https://connectapi.garmin.com";

    /// Directory under `$HOME` where the Garmin login stores its tokens
    pub const DEFAULT_TOKEN_DIR: &str = ".garminconnect";
    pub const OAUTH2_TOKEN_FILE: &str = "oauth2_token.json";

    pub const ACTIVITY_SEARCH_ENDPOINT: &str = "/activitylist-service/activities/search/activities";
    pub const ACTIVITY_ENDPOINT: &str = "/activity-service/activity";
    pub const WORKOUTS_ENDPOINT: &str = "/workout-service/workouts";
    pub const WORKOUT_ENDPOINT: &str = "/workout-service/workout";

    /// Page size used when walking a date range
    pub const ACTIVITIES_PAGE_SIZE: u32 = 20;
    pub const MAX_DATE_RANGE_PAGES: u32 = 50;

    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 2000;
    pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
}

/// MCP tool names
pub mod tools {
    pub const GET_RECENT_ACTIVITIES: &str = "get_recent_activities";
    pub const GET_ACTIVITIES_BY_DATE: &str = "get_activities_by_date";
    pub const GET_ACTIVITY_DETAIL: &str = "get_activity_detail";
    pub const GET_ACTIVITY_SPLITS: &str = "get_activity_splits";
    pub const GET_ACTIVITY_WEATHER: &str = "get_activity_weather";
    pub const GET_ACTIVITY_TYPED_SPLITS: &str = "get_activity_typed_splits";
    pub const GET_WEEKLY_RUNNING_SUMMARY: &str = "get_weekly_running_summary";
    pub const GET_MONTHLY_RUNNING_SUMMARY: &str = "get_monthly_running_summary";
    pub const GET_WORKOUTS: &str = "get_workouts";
    pub const CREATE_RUNNING_WORKOUT: &str = "create_running_workout";
}

/// Common JSON field names
pub mod json_fields {
    pub const NAME: &str = "name";
    pub const ARGUMENTS: &str = "arguments";
    pub const COUNT: &str = "count";
    pub const ACTIVITY_ID: &str = "activity_id";
    pub const START_DATE: &str = "start_date";
    pub const END_DATE: &str = "end_date";
    pub const WEEKS: &str = "weeks";
    pub const YEAR: &str = "year";
    pub const MONTH: &str = "month";
    pub const STEPS: &str = "steps";
    pub const DESCRIPTION: &str = "description";
}

/// Numeric limits
pub mod limits {
    pub const DEFAULT_ACTIVITIES_LIMIT: u32 = 20;
    pub const MAX_ACTIVITIES_FETCH: u32 = 100;

    /// Recent-activity lookups over-fetch by this factor, then keep runs only
    pub const RUNNING_OVERFETCH_FACTOR: u32 = 3;

    pub const DEFAULT_WORKOUT_MAX_STEPS: usize = 200;
    /// 5:00 per km
    pub const DEFAULT_REFERENCE_PACE_SECS_PER_KM: u32 = 300;

    pub const DEFAULT_SUMMARY_WEEKS: u32 = 1;
    pub const MAX_SUMMARY_WEEKS: u32 = 12;
}
