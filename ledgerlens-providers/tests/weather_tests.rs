//! Weather history client and aggregator against a mocked WeatherAPI.com.

use std::sync::Arc;
use std::time::Duration;

use ledgerlens_core::{FixedClock, PeriodKey};
use ledgerlens_fetch::{FetchError, RetryStrategy};
use ledgerlens_providers::weather::{
    synthetic_series, PeriodAggregator, TemperatureSource, WeatherApiClient,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 2024-07-01T00:00:00Z
const JULY_2024: i64 = 1_719_792_000;

fn history(temps: &[f64]) -> serde_json::Value {
    let days: Vec<_> = temps
        .iter()
        .map(|t| json!({"date": "2024-01-01", "day": {"avgtemp_f": t}}))
        .collect();
    json!({"location": {"name": "Austin"}, "forecast": {"forecastday": days}})
}

fn client(server: &MockServer) -> WeatherApiClient {
    WeatherApiClient::new(Some("test-key".into()))
        .unwrap()
        .with_base_url(server.uri())
        .with_retry_strategy(RetryStrategy::new(3).with_base_delay(Duration::from_millis(5)))
        .with_clock(Arc::new(FixedClock::at(JULY_2024)))
}

#[tokio::test]
async fn test_month_request_shape_and_mean() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/history.json"))
        .and(query_param("key", "test-key"))
        .and(query_param("q", "78701"))
        .and(query_param("dt", "2024-02-01"))
        .and(query_param("end_dt", "2024-02-29"))
        .respond_with(ResponseTemplate::new(200).set_body_json(history(&[50.0, 52.0, 57.0])))
        .expect(1)
        .mount(&server)
        .await;

    let mean = client(&server)
        .fetch_month("78701", 2024, PeriodKey::Feb)
        .await
        .unwrap();
    assert_eq!(mean, Some(53.0));
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let server = MockServer::start().await;
    Mock::given(path("/history.json"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/history.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(history(&[70.0])))
        .expect(1)
        .mount(&server)
        .await;

    let mean = client(&server)
        .fetch_month("78701", 2024, PeriodKey::Mar)
        .await
        .unwrap();
    assert_eq!(mean, Some(70.0));
}

#[tokio::test]
async fn test_retries_are_bounded_and_last_error_propagates() {
    let server = MockServer::start().await;
    Mock::given(path("/history.json"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .expect(3)
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch_month("78701", 2024, PeriodKey::Mar)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 502, .. }));
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(path("/history.json"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": {"code": 1006}})))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch_month("nowhere", 2024, PeriodKey::Mar)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 400, .. }));
}

#[tokio::test]
async fn test_future_month_makes_no_call() {
    let server = MockServer::start().await;
    Mock::given(path("/history.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(history(&[1.0])))
        .expect(0)
        .mount(&server)
        .await;

    let mean = client(&server)
        .fetch_month("78701", 2024, PeriodKey::Sep)
        .await
        .unwrap();
    assert_eq!(mean, None);
}

#[tokio::test]
async fn test_year_through_aggregator() {
    let server = MockServer::start().await;
    Mock::given(path("/history.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(history(&[64.0, 66.0])))
        // Jan through Jul have started by the fixed clock; Aug..Dec never hit the wire.
        .expect(7)
        .mount(&server)
        .await;

    let aggregator = PeriodAggregator::new(client(&server));
    let first = aggregator.aggregate("78701", 2024, None).await;
    let again = aggregator.aggregate("78701", 2024, None).await;

    assert_eq!(first[&PeriodKey::Jan], 65.0);
    assert_eq!(first[&PeriodKey::Jul], 65.0);
    assert_eq!(first[&PeriodKey::Aug], 0.0);
    assert_eq!(first, again);
}

#[tokio::test]
async fn test_unreachable_source_falls_back_to_synthetic() {
    let server = MockServer::start().await;
    Mock::given(path("/history.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    // Every month in the past so every sub-fetch errors.
    let client = client(&server)
        .with_retry_strategy(RetryStrategy::no_retry())
        .with_clock(Arc::new(FixedClock::at(JULY_2024 + 200 * 86_400)));
    let aggregator = PeriodAggregator::new(client);

    let values = aggregator.aggregate("78701", 2024, None).await;
    assert_eq!(values, synthetic_series("78701", 2024));
}

#[tokio::test]
async fn test_unconfigured_client_makes_no_calls() {
    let server = MockServer::start().await;
    Mock::given(path("/history.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(history(&[1.0])))
        .expect(0)
        .mount(&server)
        .await;

    let client = WeatherApiClient::new(None).unwrap().with_base_url(server.uri());
    let aggregator = PeriodAggregator::new(client);

    assert_eq!(aggregator.aggregate("78701", 2024, None).await, PeriodKey::zeroed());
}
