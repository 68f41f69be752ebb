//! Retry and backoff behavior of the HTTP fetcher

use crate::RecordingSleeper;
use critic_scrape::config::{FetchConfig, SiteConfig, DEFAULT_USER_AGENT};
use critic_scrape::crawler::{build_http_client, FailureKind, Fetch, FetchResult, Fetcher, RetryPolicy};
use critic_scrape::Target;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A fetcher with the default retry policy whose delays are recorded
fn recording_fetcher(fetch: FetchConfig) -> (Fetcher, RecordingSleeper) {
    let sleeper = RecordingSleeper::default();
    let client = build_http_client(&SiteConfig::default(), &fetch).unwrap();
    let fetcher = Fetcher::new(
        client,
        RetryPolicy::from_config(&fetch),
        Arc::new(sleeper.clone()),
    );
    (fetcher, sleeper)
}

fn secs(values: &[u64]) -> Vec<Duration> {
    values.iter().map(|s| Duration::from_secs(*s)).collect()
}

#[tokio::test]
async fn test_rate_limited_target_gives_up_after_max_retries() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/game/throttled/"))
        .respond_with(ResponseTemplate::new(429))
        .expect(5)
        .mount(&mock_server)
        .await;

    let (fetcher, sleeper) = recording_fetcher(FetchConfig::default());
    let target = Target::new(format!("{}/game/throttled/", mock_server.uri()));

    let result = fetcher.fetch(&target).await;

    match result {
        FetchResult::GaveUp {
            attempts,
            rate_limited,
            last_failure,
        } => {
            assert_eq!(attempts, 5);
            assert_eq!(rate_limited, 5);
            assert_eq!(last_failure, FailureKind::RateLimited);
        }
        other => panic!("expected GaveUp, got {:?}", other),
    }
    assert_eq!(sleeper.calls(), secs(&[30, 60, 90, 120]));
}

#[tokio::test]
async fn test_server_error_then_success() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/game/flaky/"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/game/flaky/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&mock_server)
        .await;

    let (fetcher, sleeper) = recording_fetcher(FetchConfig::default());
    let target = Target::new(format!("{}/game/flaky/", mock_server.uri()));

    match fetcher.fetch(&target).await {
        FetchResult::Success {
            status_code,
            body,
            attempts,
            rate_limited,
            ..
        } => {
            assert_eq!(status_code, 200);
            assert_eq!(body, "<html>ok</html>");
            assert_eq!(attempts, 2);
            assert_eq!(rate_limited, 0);
        }
        other => panic!("expected Success, got {:?}", other),
    }
    assert_eq!(sleeper.calls(), secs(&[5]));
}

#[tokio::test]
async fn test_rate_limit_then_success_counts_throttling() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/game/busy/"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/game/busy/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("done"))
        .mount(&mock_server)
        .await;

    let (fetcher, sleeper) = recording_fetcher(FetchConfig::default());
    let result = fetcher
        .fetch(&Target::new(format!("{}/game/busy/", mock_server.uri())))
        .await;

    assert!(result.is_success());
    assert_eq!(result.attempts(), 3);
    assert_eq!(result.rate_limited(), 2);
    assert_eq!(sleeper.calls(), secs(&[30, 60]));
}

#[tokio::test]
async fn test_not_found_uses_fixed_retry_delay() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/game/gone/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(3)
        .mount(&mock_server)
        .await;

    let (fetcher, sleeper) = recording_fetcher(FetchConfig {
        max_retries: 3,
        ..FetchConfig::default()
    });
    let result = fetcher
        .fetch(&Target::new(format!("{}/game/gone/", mock_server.uri())))
        .await;

    match result {
        FetchResult::GaveUp {
            rate_limited,
            last_failure,
            ..
        } => {
            assert_eq!(rate_limited, 0);
            assert_eq!(last_failure, FailureKind::Http { status_code: 404 });
        }
        other => panic!("expected GaveUp, got {:?}", other),
    }
    assert_eq!(sleeper.calls(), secs(&[5, 5]));
}

#[tokio::test]
async fn test_requests_carry_fixed_user_agent() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/game/halo/"))
        .and(header("user-agent", DEFAULT_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string("halo"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (fetcher, sleeper) = recording_fetcher(FetchConfig::default());
    let result = fetcher
        .fetch(&Target::new(format!("{}/game/halo/", mock_server.uri())))
        .await;

    assert!(result.is_success());
    assert!(sleeper.calls().is_empty());
}

#[tokio::test]
async fn test_unreachable_host_is_network_failure() {
    let (fetcher, _sleeper) = recording_fetcher(FetchConfig {
        max_retries: 2,
        ..FetchConfig::default()
    });

    // Nothing listens on port 1
    let result = fetcher.fetch(&Target::new("http://127.0.0.1:1/")).await;

    match result {
        FetchResult::GaveUp {
            attempts,
            last_failure: FailureKind::Network { .. },
            ..
        } => assert_eq!(attempts, 2),
        other => panic!("expected network GaveUp, got {:?}", other),
    }
}
