// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! MCP Protocol Schema Definitions
//!
//! Type-safe definitions for the initialize handshake, the tool list and
//! tool results.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::constants::limits::{DEFAULT_ACTIVITIES_LIMIT, DEFAULT_SUMMARY_WEEKS, MAX_ACTIVITIES_FETCH, MAX_SUMMARY_WEEKS};
use crate::constants::tools::{
    CREATE_RUNNING_WORKOUT, GET_ACTIVITIES_BY_DATE, GET_ACTIVITY_DETAIL, GET_ACTIVITY_SPLITS,
    GET_ACTIVITY_TYPED_SPLITS, GET_ACTIVITY_WEATHER, GET_MONTHLY_RUNNING_SUMMARY, GET_RECENT_ACTIVITIES,
    GET_WEEKLY_RUNNING_SUMMARY, GET_WORKOUTS,
};

/// Server Information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// MCP Tool Schema Definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: JsonSchema,
}

/// JSON Schema Definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<HashMap<String, PropertySchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

/// JSON Schema Property Definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub property_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<u32>,
    /// Element schema for arrays
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Value>,
}

impl PropertySchema {
    fn new(property_type: &str, description: &str) -> Self {
        Self {
            property_type: property_type.to_string(),
            description: Some(description.to_string()),
            default: None,
            maximum: None,
            items: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsCapability {
    #[serde(rename = "listChanged")]
    pub list_changed: bool,
}

/// MCP Server Capabilities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCapabilities {
    pub tools: ToolsCapability,
}

/// Complete MCP Initialize Response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeResponse {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
    pub capabilities: ServerCapabilities,
}

impl InitializeResponse {
    pub fn new(protocol_version: String, server_name: String, server_version: String) -> Self {
        Self {
            protocol_version,
            server_info: ServerInfo {
                name: server_name,
                version: server_version,
            },
            capabilities: ServerCapabilities {
                tools: ToolsCapability { list_changed: false },
            },
        }
    }
}

/// `tools/list` result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsListResponse {
    pub tools: Vec<ToolSchema>,
}

impl Default for ToolsListResponse {
    fn default() -> Self {
        Self { tools: get_tools() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

/// `tools/call` result: the tool output as pretty JSON text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResponse {
    pub content: Vec<ToolContent>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl ToolCallResponse {
    pub fn json(value: &Value) -> Result<Self, serde_json::Error> {
        Ok(Self {
            content: vec![ToolContent {
                content_type: "text".to_string(),
                text: serde_json::to_string_pretty(value)?,
            }],
            is_error: false,
        })
    }
}

/// Every tool this server exposes
pub fn get_tools() -> Vec<ToolSchema> {
    vec![
        create_get_recent_activities_tool(),
        create_get_activities_by_date_tool(),
        create_activity_id_tool(
            GET_ACTIVITY_DETAIL,
            "Get full details of a running activity: pace, heart rate, cadence, running dynamics, elevation, training effect and run/walk/stand breakdown",
        ),
        create_activity_id_tool(
            GET_ACTIVITY_SPLITS,
            "Get per-lap splits for a running activity with speeds shown as m:ss per km paces",
        ),
        create_activity_id_tool(
            GET_ACTIVITY_WEATHER,
            "Get weather conditions recorded during a running activity",
        ),
        create_activity_id_tool(
            GET_ACTIVITY_TYPED_SPLITS,
            "Get ClimbPro climb segments for a running activity: difficulty, grade, elevation and grade-adjusted pace",
        ),
        create_weekly_summary_tool(),
        create_monthly_summary_tool(),
        create_get_workouts_tool(),
        create_running_workout_tool(),
    ]
}

fn count_property(description: &str) -> PropertySchema {
    PropertySchema {
        default: Some(json!(DEFAULT_ACTIVITIES_LIMIT)),
        maximum: Some(MAX_ACTIVITIES_FETCH),
        ..PropertySchema::new("integer", description)
    }
}

fn create_get_recent_activities_tool() -> ToolSchema {
    let mut properties = HashMap::new();
    properties.insert(
        "count".to_string(),
        count_property("Number of running activities to return (default 20, max 100)"),
    );

    ToolSchema {
        name: GET_RECENT_ACTIVITIES.to_string(),
        description: "Get recent running activities with distance, pace, heart rate, cadence and elevation".to_string(),
        input_schema: JsonSchema {
            schema_type: "object".to_string(),
            properties: Some(properties),
            required: None,
        },
    }
}

fn create_get_activities_by_date_tool() -> ToolSchema {
    let mut properties = HashMap::new();
    properties.insert("start_date".to_string(), PropertySchema::new("string", "Start date (YYYY-MM-DD)"));
    properties.insert("end_date".to_string(), PropertySchema::new("string", "End date (YYYY-MM-DD), inclusive"));

    ToolSchema {
        name: GET_ACTIVITIES_BY_DATE.to_string(),
        description: "Get running activities within a date range".to_string(),
        input_schema: JsonSchema {
            schema_type: "object".to_string(),
            properties: Some(properties),
            required: Some(vec!["start_date".to_string(), "end_date".to_string()]),
        },
    }
}

fn create_activity_id_tool(name: &str, description: &str) -> ToolSchema {
    let mut properties = HashMap::new();
    properties.insert("activity_id".to_string(), PropertySchema::new("integer", "The Garmin activity ID"));

    ToolSchema {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: JsonSchema {
            schema_type: "object".to_string(),
            properties: Some(properties),
            required: Some(vec!["activity_id".to_string()]),
        },
    }
}

fn create_weekly_summary_tool() -> ToolSchema {
    let mut properties = HashMap::new();
    properties.insert(
        "end_date".to_string(),
        PropertySchema::new("string", "Any day of the most recent week (YYYY-MM-DD), defaults to today"),
    );
    properties.insert(
        "weeks".to_string(),
        PropertySchema {
            default: Some(json!(DEFAULT_SUMMARY_WEEKS)),
            maximum: Some(MAX_SUMMARY_WEEKS),
            ..PropertySchema::new("integer", "Number of Monday-to-Sunday weeks to include (default 1, max 12)")
        },
    );

    ToolSchema {
        name: GET_WEEKLY_RUNNING_SUMMARY.to_string(),
        description: "Get weekly running totals: runs, distance, time, average pace and heart rate, elevation and longest run"
            .to_string(),
        input_schema: JsonSchema {
            schema_type: "object".to_string(),
            properties: Some(properties),
            required: None,
        },
    }
}

fn create_monthly_summary_tool() -> ToolSchema {
    let mut properties = HashMap::new();
    properties.insert("year".to_string(), PropertySchema::new("integer", "Year, defaults to the current year"));
    properties.insert(
        "month".to_string(),
        PropertySchema {
            maximum: Some(12),
            ..PropertySchema::new("integer", "Month (1-12), defaults to the current month")
        },
    );

    ToolSchema {
        name: GET_MONTHLY_RUNNING_SUMMARY.to_string(),
        description: "Get monthly running totals with a weekly breakdown and a comparison against the previous month"
            .to_string(),
        input_schema: JsonSchema {
            schema_type: "object".to_string(),
            properties: Some(properties),
            required: None,
        },
    }
}

fn create_get_workouts_tool() -> ToolSchema {
    let mut properties = HashMap::new();
    properties.insert(
        "count".to_string(),
        count_property("Number of workouts to return (default 20, max 100)"),
    );

    ToolSchema {
        name: GET_WORKOUTS.to_string(),
        description: "Get saved workouts from the Garmin Connect workout library".to_string(),
        input_schema: JsonSchema {
            schema_type: "object".to_string(),
            properties: Some(properties),
            required: None,
        },
    }
}

fn create_running_workout_tool() -> ToolSchema {
    let mut properties = HashMap::new();
    properties.insert("name".to_string(), PropertySchema::new("string", "Workout name, e.g. \"4x1km Intervals\""));
    properties.insert("description".to_string(), PropertySchema::new("string", "Optional workout notes"));
    properties.insert(
        "steps".to_string(),
        PropertySchema {
            items: Some(json!({"type": "object"})),
            ..PropertySchema::new(
                "array",
                "Workout steps. A step has a 'type' (warmup, interval, recovery, rest, cooldown, repeat), \
                 'duration_seconds' or 'distance_meters' (distance wins when both are given), an optional \
                 'target' {type: pace|heart_rate|cadence|power, min, max} with paces as \"m:ss\" per km (power is \
                 uploaded without a target), and an \
                 optional 'description'. Repeat steps have 'count', nested 'steps' and optional \
                 'skip_last_rest' to drop the final recovery.",
            )
        },
    );

    ToolSchema {
        name: CREATE_RUNNING_WORKOUT.to_string(),
        description: "Create a structured running workout and upload it to Garmin Connect so it syncs to the watch"
            .to_string(),
        input_schema: JsonSchema {
            schema_type: "object".to_string(),
            properties: Some(properties),
            required: Some(vec!["name".to_string(), "steps".to_string()]),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_response_serialization() {
        let response = InitializeResponse::new(
            "2024-11-05".to_string(),
            "test-server".to_string(),
            "1.0.0".to_string(),
        );

        let json = serde_json::to_value(&response).expect("Should serialize");

        assert_eq!(json["protocolVersion"], "2024-11-05");
        assert_eq!(json["serverInfo"]["name"], "test-server");
        assert_eq!(json["serverInfo"]["version"], "1.0.0");
        assert_eq!(json["capabilities"]["tools"]["listChanged"], false);
    }

    #[test]
    fn test_tool_list() {
        let tools = get_tools();
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();

        assert_eq!(
            names,
            [
                "get_recent_activities",
                "get_activities_by_date",
                "get_activity_detail",
                "get_activity_splits",
                "get_activity_weather",
                "get_activity_typed_splits",
                "get_weekly_running_summary",
                "get_monthly_running_summary",
                "get_workouts",
                "create_running_workout",
            ]
        );
        assert!(tools.iter().all(|t| t.input_schema.schema_type == "object"));
    }

    #[test]
    fn test_workout_tool_schema_structure() {
        let tool = create_running_workout_tool();
        let properties = tool.input_schema.properties.expect("properties");

        assert_eq!(properties["steps"].property_type, "array");
        assert_eq!(properties["steps"].items, Some(json!({"type": "object"})));
        assert_eq!(tool.input_schema.required, Some(vec!["name".to_string(), "steps".to_string()]));
    }

    #[test]
    fn test_count_property_limits() {
        let json = serde_json::to_value(create_get_recent_activities_tool()).unwrap();
        let count = &json["inputSchema"]["properties"]["count"];

        assert_eq!(count["type"], "integer");
        assert_eq!(count["default"], 20);
        assert_eq!(count["maximum"], 100);
        assert!(json["inputSchema"].get("required").is_none());
    }

    #[test]
    fn test_tool_call_response_wraps_text() {
        let response = ToolCallResponse::json(&json!({"distance_km": 5.0})).unwrap();
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["isError"], false);
        assert_eq!(json["content"][0]["type"], "text");
        let text = json["content"][0]["text"].as_str().unwrap();
        assert_eq!(serde_json::from_str::<Value>(text).unwrap(), json!({"distance_km": 5.0}));
    }
}
