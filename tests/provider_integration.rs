// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Integration tests for the Garmin Connect client
//!
//! These tests verify authentication headers, pagination, rate-limit retries
//! and error handling using mocked HTTP responses.

use anyhow::Result;
use chrono::NaiveDate;
use garmin_mcp_server::providers::{
    GarminApi, GarminConnectClient, ProviderError, RetryPolicy, StaticTokenStore, TokenFileStore,
};
use garmin_mcp_server::workout::WorkoutCompiler;
use mockito::{Matcher, Server};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const SEARCH_PATH: &str = "/activitylist-service/activities/search/activities";

fn create_client(base_url: &str, retry: RetryPolicy) -> GarminConnectClient {
    GarminConnectClient::new(
        base_url,
        Arc::new(StaticTokenStore::new("test-token")),
        retry,
        Duration::from_secs(5),
    )
    .expect("client")
}

fn no_wait_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new(max_attempts, Duration::ZERO)
}

fn mock_activity_page(first_id: u64, len: u64) -> Value {
    Value::Array(
        (first_id..first_id + len)
            .map(|id| json!({"activityId": id, "activityType": {"typeKey": "running"}}))
            .collect(),
    )
}

#[tokio::test]
async fn test_requests_carry_bearer_token() -> Result<()> {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/activity-service/activity/42")
        .match_header("authorization", "Bearer test-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"activityId": 42, "activityName": "Tempo"}).to_string())
        .create_async()
        .await;

    let client = create_client(&server.url(), no_wait_retry(3));
    let activity = client.get_activity(42).await?;

    assert_eq!(activity["activityName"], "Tempo");
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_token_file_credentials() -> Result<()> {
    let mut server = Server::new_async().await;
    let token_dir = TempDir::new()?;
    let expires_at = (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp();
    std::fs::write(
        token_dir.path().join("oauth2_token.json"),
        json!({"access_token": "from-file", "expires_at": expires_at}).to_string(),
    )?;

    let mock = server
        .mock("GET", "/workout-service/workouts")
        .match_header("authorization", "Bearer from-file")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("start".into(), "0".into()),
            Matcher::UrlEncoded("limit".into(), "5".into()),
        ]))
        .with_status(200)
        .with_body(json!([{"workoutId": 1}]).to_string())
        .create_async()
        .await;

    let client = GarminConnectClient::new(
        &server.url(),
        Arc::new(TokenFileStore::new(token_dir.path())),
        no_wait_retry(3),
        Duration::from_secs(5),
    )?;
    let workouts = client.get_workouts(0, 5).await?;

    assert_eq!(workouts, json!([{"workoutId": 1}]));
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_missing_token_file_fails_before_any_request() -> Result<()> {
    let mut server = Server::new_async().await;
    let token_dir = TempDir::new()?;

    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = GarminConnectClient::new(
        &server.url(),
        Arc::new(TokenFileStore::new(token_dir.path())),
        no_wait_retry(3),
        Duration::from_secs(5),
    )?;
    let error = client.get_activity(1).await.unwrap_err();

    assert!(matches!(error, ProviderError::Credentials(_)));
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_date_range_follows_pages() -> Result<()> {
    let mut server = Server::new_async().await;

    let first_page = server
        .mock("GET", SEARCH_PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("startDate".into(), "2024-03-01".into()),
            Matcher::UrlEncoded("endDate".into(), "2024-03-31".into()),
            Matcher::UrlEncoded("start".into(), "0".into()),
            Matcher::UrlEncoded("limit".into(), "20".into()),
            Matcher::UrlEncoded("activityType".into(), "running".into()),
        ]))
        .with_status(200)
        .with_body(mock_activity_page(1, 20).to_string())
        .expect(1)
        .create_async()
        .await;

    let second_page = server
        .mock("GET", SEARCH_PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("start".into(), "20".into()),
            Matcher::UrlEncoded("limit".into(), "20".into()),
        ]))
        .with_status(200)
        .with_body(mock_activity_page(21, 5).to_string())
        .expect(1)
        .create_async()
        .await;

    let client = create_client(&server.url(), no_wait_retry(3));
    let activities = client
        .get_activities_by_date(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            Some("running"),
        )
        .await?;

    let activities = activities.as_array().expect("activity list");
    assert_eq!(activities.len(), 25);
    assert_eq!(activities[0]["activityId"], 1);
    assert_eq!(activities[24]["activityId"], 25);

    first_page.assert_async().await;
    second_page.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_date_range_stops_at_empty_body() -> Result<()> {
    let mut server = Server::new_async().await;

    let _first_page = server
        .mock("GET", SEARCH_PATH)
        .match_query(Matcher::UrlEncoded("start".into(), "0".into()))
        .with_status(200)
        .with_body(mock_activity_page(1, 20).to_string())
        .create_async()
        .await;
    let past_the_end = server
        .mock("GET", SEARCH_PATH)
        .match_query(Matcher::UrlEncoded("start".into(), "20".into()))
        .with_status(200)
        .with_body("")
        .expect(1)
        .create_async()
        .await;

    let client = create_client(&server.url(), no_wait_retry(3));
    let activities = client
        .get_activities_by_date(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            None,
        )
        .await?;

    assert_eq!(activities.as_array().map(Vec::len), Some(20));
    past_the_end.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_typed_splits_endpoint() -> Result<()> {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/activity-service/activity/42/typedsplits")
        .match_header("authorization", "Bearer test-token")
        .with_status(200)
        .with_body(json!({"activityId": 42, "splits": []}).to_string())
        .create_async()
        .await;

    let client = create_client(&server.url(), no_wait_retry(3));
    let typed = client.get_activity_typed_splits(42).await?;

    assert_eq!(typed["activityId"], 42);
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_rate_limit_gives_up_after_max_attempts() -> Result<()> {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/activity-service/activity/7/weather")
        .with_status(429)
        .expect(3)
        .create_async()
        .await;

    let client = create_client(&server.url(), no_wait_retry(3));
    let error = client.get_activity_weather(7).await.unwrap_err();

    assert!(matches!(error, ProviderError::RateLimited { attempts: 3 }));
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_single_attempt_policy_never_retries() -> Result<()> {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/activity-service/activity/7/splits")
        .with_status(429)
        .expect(1)
        .create_async()
        .await;

    let client = create_client(&server.url(), no_wait_retry(1));
    let error = client.get_activity_splits(7).await.unwrap_err();

    assert!(matches!(error, ProviderError::RateLimited { attempts: 1 }));
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_unauthorized_and_server_errors() -> Result<()> {
    let mut server = Server::new_async().await;

    let _unauthorized = server
        .mock("GET", "/activity-service/activity/1")
        .with_status(401)
        .create_async()
        .await;
    let _broken = server
        .mock("GET", "/activity-service/activity/2")
        .with_status(500)
        .with_body("upstream exploded")
        .create_async()
        .await;
    let _garbage = server
        .mock("GET", "/activity-service/activity/3")
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let client = create_client(&server.url(), no_wait_retry(3));

    let error = client.get_activity(1).await.unwrap_err();
    assert!(matches!(error, ProviderError::Unauthorized { status: 401 }));

    match client.get_activity(2).await.unwrap_err() {
        ProviderError::Api { status, message, .. } => {
            assert_eq!(status, 500);
            assert_eq!(message, "upstream exploded");
        }
        other => panic!("expected API error, got {other:?}"),
    }

    let error = client.get_activity(3).await.unwrap_err();
    assert!(matches!(error, ProviderError::InvalidResponse { .. }));
    Ok(())
}

#[tokio::test]
async fn test_empty_body_is_null() -> Result<()> {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("GET", "/activity-service/activity/9/weather")
        .with_status(200)
        .with_body("")
        .create_async()
        .await;

    let client = create_client(&server.url(), no_wait_retry(3));
    assert_eq!(client.get_activity_weather(9).await?, Value::Null);
    Ok(())
}

#[tokio::test]
async fn test_create_workout_posts_payload() -> Result<()> {
    let mut server = Server::new_async().await;

    let workout = WorkoutCompiler::default().compile_definitions(
        "Tempo 20",
        None,
        json!([
            {"type": "warmup", "duration_seconds": 600},
            {"type": "interval", "duration_seconds": 1200,
             "target": {"type": "heart_rate", "min": 160, "max": 170}},
            {"type": "cooldown", "duration_seconds": 300}
        ])
        .as_array()
        .unwrap(),
    )?;

    let mock = server
        .mock("POST", "/workout-service/workout")
        .match_header("authorization", "Bearer test-token")
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(json!({
            "workoutName": "Tempo 20",
            "estimatedDurationInSecs": 2100,
            "sportType": {"sportTypeKey": "running"}
        })))
        .with_status(200)
        .with_body(json!({"workoutId": 555, "workoutName": "Tempo 20"}).to_string())
        .create_async()
        .await;

    let client = create_client(&server.url(), no_wait_retry(3));
    let created = client.create_workout(&workout.payload()).await?;

    assert_eq!(created["workoutId"], 555);
    mock.assert_async().await;
    Ok(())
}
