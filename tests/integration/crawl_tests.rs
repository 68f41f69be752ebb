//! End-to-end runs of the listing and detail phases

use crate::test_config;
use critic_scrape::crawler::{collect_details, collect_links};
use critic_scrape::extract::{GENRES, METACRITIC_SCORE, PLATFORMS, TITLE, USER_SCORE};
use critic_scrape::state::{SOURCE_FIELD, UNKNOWN_SCORE};
use critic_scrape::storage::read_mapping;
use critic_scrape::{ConfigError, FieldValue, Record, ScrapeError};
use std::collections::BTreeMap;
use std::future::pending;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn card(href: &str, label: &str) -> String {
    format!(
        r#"<a class="c-finderProductCard_container g-color-gray80 u-grid" href="{}"><span>{}</span></a>"#,
        href, label
    )
}

fn listing_page(cards: &[(&str, &str)]) -> String {
    let cards: String = cards.iter().map(|(href, label)| card(href, label)).collect();
    format!("<html><body><div class=\"c-productListings\">{}</div></body></html>", cards)
}

fn detail_page(title: &str, metascore: Option<&str>) -> String {
    let score = metascore
        .map(|s| format!(r#"<div class="c-siteReviewScore_background-critic_medium"><span>{}</span></div>"#, s))
        .unwrap_or_default();
    format!(
        r#"<html><body>
            <div data-testid="hero-title"><h1>{}</h1></div>
            <a class="c-gamePlatformTileLink" href="/game/x/critic-reviews/?platform=pc">PC</a>
            <ul class="c-genreList"><li><a href="/g"><span class="c-globalButton_label">Action</span></a></li></ul>
            {}
        </body></html>"#,
        title, score
    )
}

#[tokio::test]
async fn test_listing_phase_collects_links_across_pages() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/browse/game/"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[
            ("/game/halo/", "Halo"),
            ("/game/doom/", "Doom"),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/browse/game/"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[
            ("/game/doom/", "Doom (again)"),
            ("/game/myst/", "Myst"),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = test_config(&base, dir.path());
    let collection = collect_links(&config, pending()).await.unwrap();

    assert_eq!(collection.stats.processed, 2);
    assert_eq!(collection.stats.duplicate_keys, 1);
    assert_eq!(collection.stats.checkpoints_written, 2);

    let links: BTreeMap<String, String> = read_mapping(&config.listing.output_path).unwrap();
    assert_eq!(links.len(), 3);
    assert_eq!(links.get(&format!("{}/game/halo/", base)).map(String::as_str), Some("Halo"));
    assert_eq!(links.get(&format!("{}/game/doom/", base)).map(String::as_str), Some("Doom"));
    assert_eq!(links.get(&format!("{}/game/myst/", base)).map(String::as_str), Some("Myst"));
}

#[tokio::test]
async fn test_listing_phase_skips_throttled_page() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/browse/game/"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(429))
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/browse/game/"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[("/game/myst/", "Myst")])))
        .mount(&mock_server)
        .await;

    let config = test_config(&base, dir.path());
    let collection = collect_links(&config, pending()).await.unwrap();

    assert_eq!(collection.stats.failures, 1);
    assert_eq!(collection.stats.rate_limited, 2);
    assert_eq!(collection.accumulator.len(), 1);
}

#[tokio::test]
async fn test_detail_phase_end_to_end_and_resume() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let dir = TempDir::new().unwrap();
    let config = test_config(&base, dir.path());

    let halo = format!("{}/game/halo/", base);
    let lost = format!("{}/game/lost/", base);
    let myst = format!("{}/game/myst/", base);
    std::fs::write(
        &config.details.input_path,
        format!(
            r#"{{"{}": "Halo", "{}": "Lost", "{}": "Myst"}}"#,
            halo, lost, myst
        ),
    )
    .unwrap();

    Mock::given(method("GET"))
        .and(path("/game/halo/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("Halo", Some("97"))))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/game/myst/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page("Myst", None)))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/game/lost/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let first = collect_details(&config, false, pending()).await.unwrap();
    assert_eq!(first.stats.merged, 2);
    assert_eq!(first.stats.failures, 1);

    let records: BTreeMap<String, Record> = read_mapping(&config.details.output_path).unwrap();
    assert_eq!(records.len(), 2);

    let halo_record = &records["Halo"];
    assert_eq!(halo_record.get(TITLE).and_then(FieldValue::as_text), Some("Halo"));
    assert_eq!(halo_record.get(METACRITIC_SCORE).and_then(FieldValue::as_text), Some("97"));
    assert_eq!(
        halo_record.get(PLATFORMS).and_then(FieldValue::as_list),
        Some(&["pc".to_string()][..])
    );
    assert_eq!(
        halo_record.get(GENRES).and_then(FieldValue::as_list),
        Some(&["Action".to_string()][..])
    );
    assert_eq!(halo_record.get(SOURCE_FIELD).and_then(FieldValue::as_text), Some(halo.as_str()));

    let myst_record = &records["Myst"];
    assert_eq!(myst_record.get(METACRITIC_SCORE), Some(&FieldValue::unknown(UNKNOWN_SCORE)));
    assert_eq!(myst_record.get(USER_SCORE), Some(&FieldValue::unknown(UNKNOWN_SCORE)));

    // Only the failed target is fetched again; the page mocks above expect one hit each
    let resumed = collect_details(&config, true, pending()).await.unwrap();
    assert_eq!(resumed.stats.skipped, 2);
    assert_eq!(resumed.stats.processed, 1);
    assert_eq!(resumed.accumulator.len(), 2);
}

#[tokio::test]
async fn test_detail_phase_missing_input_aborts_before_fetching() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&mock_server.uri(), dir.path());

    let err = collect_details(&config, false, pending()).await.unwrap_err();

    assert!(matches!(err, ScrapeError::Config(ConfigError::MissingInput(_))));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
    assert!(!config.details.output_path.exists());
}
