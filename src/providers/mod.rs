// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Upstream Garmin Connect access
//!
//! Tools talk to Garmin only through [`GarminApi`], which hands back raw JSON.
//! Normalization happens in the tool layer, never here.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workout::WorkoutPayload;

pub mod credentials;
pub mod garmin;

pub use credentials::{CredentialStore, Session, StaticTokenStore, TokenFileStore};
pub use garmin::{GarminConnectClient, RetryPolicy};

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Garmin rate limit still exceeded after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("Garmin rejected the credentials (HTTP {status}); re-run the Garmin login")]
    Unauthorized { status: u16 },

    #[error("Garmin request to {endpoint} failed with HTTP {status}: {message}")]
    Api {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("Garmin returned an unreadable response from {endpoint}: {source}")]
    InvalidResponse {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Garmin credentials unavailable: {0}")]
    Credentials(String),

    #[error("Invalid Garmin API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Network error talking to Garmin: {0}")]
    Network(#[from] reqwest::Error),
}

/// Raw Garmin Connect operations used by the MCP tools
#[async_trait]
pub trait GarminApi: Send + Sync {
    /// Newest-first activity list page
    async fn get_activities(&self, start: u32, limit: u32) -> Result<Value, ProviderError>;

    /// Every activity between two dates, inclusive, optionally filtered by
    /// activity type key
    async fn get_activities_by_date(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        activity_type: Option<&str>,
    ) -> Result<Value, ProviderError>;

    async fn get_activity(&self, activity_id: u64) -> Result<Value, ProviderError>;

    async fn get_activity_splits(&self, activity_id: u64) -> Result<Value, ProviderError>;

    async fn get_activity_weather(&self, activity_id: u64) -> Result<Value, ProviderError>;

    /// Terrain-typed splits, including ClimbPro climb segments
    async fn get_activity_typed_splits(&self, activity_id: u64) -> Result<Value, ProviderError>;

    async fn get_workouts(&self, start: u32, limit: u32) -> Result<Value, ProviderError>;

    /// Upload a compiled workout to the Garmin workout library
    async fn create_workout(&self, payload: &WorkoutPayload) -> Result<Value, ProviderError>;

    fn provider_name(&self) -> &'static str;
}
