// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::{CredentialStore, GarminApi, ProviderError, StaticTokenStore, TokenFileStore};
use crate::config::GarminConfig;
use crate::constants::garmin::{
    ACTIVITIES_PAGE_SIZE, ACTIVITY_ENDPOINT, ACTIVITY_SEARCH_ENDPOINT, MAX_DATE_RANGE_PAGES,
    WORKOUTS_ENDPOINT, WORKOUT_ENDPOINT,
};
use crate::logging::AppLogger;
use crate::workout::WorkoutPayload;

/// Backoff applied when Garmin answers 429
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total requests made before giving up, including the first
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Wait after the `attempt`-th rate-limited request (1-based):
    /// base, 2x base, 4x base, ...
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1 << exponent)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

pub struct GarminConnectClient {
    client: Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
    retry: RetryPolicy,
}

impl GarminConnectClient {
    pub fn new(
        base_url: &str,
        credentials: Arc<dyn CredentialStore>,
        retry: RetryPolicy,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        // Reject garbage early rather than on the first request
        Url::parse(base_url)?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("garmin-mcp-server/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            retry,
        })
    }

    /// A static token from configuration wins over the token directory
    pub fn from_config(config: &GarminConfig) -> Result<Self, ProviderError> {
        let credentials: Arc<dyn CredentialStore> = match config.access_token.as_deref() {
            Some(token) if !token.is_empty() => Arc::new(StaticTokenStore::new(token)),
            _ => Arc::new(TokenFileStore::new(&config.token_dir)),
        };

        Self::new(
            &config.api_base_url,
            credentials,
            RetryPolicy::new(config.max_attempts, Duration::from_millis(config.retry_base_delay_ms)),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    fn endpoint(&self, path: &str) -> Result<Url, ProviderError> {
        Ok(Url::parse(&format!("{}{path}", self.base_url))?)
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ProviderError> {
        self.send::<()>(Method::GET, path, query, None).await
    }

    async fn send<B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<Value, ProviderError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let url = self.endpoint(path)?;
        let mut attempt = 0;

        loop {
            let session = self.credentials.session().await?;
            let mut request = self
                .client
                .request(method.clone(), url.clone())
                .bearer_auth(session.access_token())
                .query(query);
            if let Some(body) = body {
                request = request.json(body);
            }

            debug!("{method} {path} (attempt {})", attempt + 1);
            let response = request.send().await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                attempt += 1;
                if attempt >= self.retry.max_attempts {
                    warn!("Garmin rate limit on {path}: giving up after {attempt} attempts");
                    return Err(ProviderError::RateLimited { attempts: attempt });
                }
                let delay = self.retry.delay_for(attempt);
                AppLogger::log_upstream_retry(path, attempt, self.retry.max_attempts, delay);
                tokio::time::sleep(delay).await;
                continue;
            }

            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(ProviderError::Unauthorized {
                    status: status.as_u16(),
                });
            }

            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(ProviderError::Api {
                    endpoint: path.to_string(),
                    status: status.as_u16(),
                    message,
                });
            }

            let bytes = response.bytes().await?;
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(Value::Null);
            }
            return serde_json::from_slice(&bytes).map_err(|source| ProviderError::InvalidResponse {
                endpoint: path.to_string(),
                source,
            });
        }
    }
}

#[async_trait]
impl GarminApi for GarminConnectClient {
    async fn get_activities(&self, start: u32, limit: u32) -> Result<Value, ProviderError> {
        self.get(
            ACTIVITY_SEARCH_ENDPOINT,
            &[("start", start.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    async fn get_activities_by_date(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        activity_type: Option<&str>,
    ) -> Result<Value, ProviderError> {
        let mut activities = Vec::new();

        for page in 0..MAX_DATE_RANGE_PAGES {
            let mut query = vec![
                ("startDate", start_date.format("%Y-%m-%d").to_string()),
                ("endDate", end_date.format("%Y-%m-%d").to_string()),
                ("start", (page * ACTIVITIES_PAGE_SIZE).to_string()),
                ("limit", ACTIVITIES_PAGE_SIZE.to_string()),
            ];
            if let Some(activity_type) = activity_type {
                query.push(("activityType", activity_type.to_string()));
            }

            let batch = match self.get(ACTIVITY_SEARCH_ENDPOINT, &query).await? {
                Value::Array(batch) => batch,
                // An empty body past the last activity
                Value::Null => Vec::new(),
                other => {
                    return Err(ProviderError::Api {
                        endpoint: ACTIVITY_SEARCH_ENDPOINT.to_string(),
                        status: StatusCode::OK.as_u16(),
                        message: format!("expected an activity list, got {}", json_kind(&other)),
                    })
                }
            };

            let full_page = batch.len() >= ACTIVITIES_PAGE_SIZE as usize;
            activities.extend(batch);
            if !full_page {
                return Ok(Value::Array(activities));
            }
        }

        warn!(
            "Activity search {start_date}..{end_date} stopped after {MAX_DATE_RANGE_PAGES} pages ({} activities)",
            activities.len()
        );
        Ok(Value::Array(activities))
    }

    async fn get_activity(&self, activity_id: u64) -> Result<Value, ProviderError> {
        self.get(&format!("{ACTIVITY_ENDPOINT}/{activity_id}"), &[]).await
    }

    async fn get_activity_splits(&self, activity_id: u64) -> Result<Value, ProviderError> {
        self.get(&format!("{ACTIVITY_ENDPOINT}/{activity_id}/splits"), &[])
            .await
    }

    async fn get_activity_weather(&self, activity_id: u64) -> Result<Value, ProviderError> {
        self.get(&format!("{ACTIVITY_ENDPOINT}/{activity_id}/weather"), &[])
            .await
    }

    async fn get_activity_typed_splits(&self, activity_id: u64) -> Result<Value, ProviderError> {
        self.get(&format!("{ACTIVITY_ENDPOINT}/{activity_id}/typedsplits"), &[])
            .await
    }

    async fn get_workouts(&self, start: u32, limit: u32) -> Result<Value, ProviderError> {
        self.get(
            WORKOUTS_ENDPOINT,
            &[("start", start.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    async fn create_workout(&self, payload: &WorkoutPayload) -> Result<Value, ProviderError> {
        self.send(Method::POST, WORKOUT_ENDPOINT, &[], Some(payload)).await
    }

    fn provider_name(&self) -> &'static str {
        "Garmin Connect"
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delays_double() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(3), Duration::from_secs(8));
    }

    #[test]
    fn test_retry_policy_needs_one_attempt() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let result = GarminConnectClient::new(
            "not a url",
            Arc::new(StaticTokenStore::new("t")),
            RetryPolicy::default(),
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(ProviderError::InvalidUrl(_))));
    }

    #[test]
    fn test_from_config_applies_retry_settings() {
        let config = GarminConfig {
            access_token: Some("t".to_string()),
            max_attempts: 5,
            retry_base_delay_ms: 250,
            ..GarminConfig::default()
        };
        let client = GarminConnectClient::from_config(&config).unwrap();

        assert_eq!(client.retry_policy(), RetryPolicy::new(5, Duration::from_millis(250)));
        assert_eq!(client.provider_name(), "Garmin Connect");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = GarminConnectClient::new(
            "http://localhost:8080/proxy/",
            Arc::new(StaticTokenStore::new("t")),
            RetryPolicy::default(),
            Duration::from_secs(5),
        )
        .unwrap();
        let url = client.endpoint("/activity-service/activity/1").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/proxy/activity-service/activity/1");
    }
}
