//! Integration tests for the events harvester using wiremock HTTP mocks.

use futures::TryStreamExt;
use newsgen_events::{
    harvest_dataset, ApiSession, EventHarvester, EventQuery, HarvestError, NormalizeOptions,
    RawEvent, SessionConfig,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EVENTS_PATH: &str = "/public-api/v1.4/events/";

fn test_harvester(server: &MockServer, max_retries: u32) -> EventHarvester {
    let session = ApiSession::new(&SessionConfig {
        timeout_secs: 5,
        user_agent: "newsgen-test/0.1".to_owned(),
        max_retries,
        backoff_base_ms: 0,
    })
    .expect("session construction should not fail");
    EventHarvester::new(session, &format!("{}{EVENTS_PATH}", server.uri()))
        .expect("mock server URL is valid")
}

fn query(pages: u32) -> EventQuery {
    EventQuery {
        location: "spb".to_owned(),
        pages,
        page_size: 2,
        lang: "ru".to_owned(),
    }
}

fn event(id: i64, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "short_title": "",
        "description": format!("<p>Описание события {id}.</p>"),
        "dates": [{"start": 1_735_678_800, "end": 1_735_686_000}],
        "place": {"title": "Манеж", "address": "Исаакиевская пл., 1"},
        "site_url": format!("https://kudago.com/spb/event/{id}/"),
        "categories": ["exhibition"],
        "tags": ["искусство", "выставки"]
    })
}

async fn mount_page(server: &MockServer, page: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .and(query_param("page", page))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_page_ends_stream_before_next_page() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "1",
        json!({"count": 2, "results": [event(1, "Первое"), event(2, "Второе")]}),
    )
    .await;
    mount_page(&server, "2", json!({"count": 2, "results": []})).await;
    Mock::given(method("GET"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(0)
        .mount(&server)
        .await;

    let harvester = test_harvester(&server, 0);
    let events: Vec<RawEvent> = harvester
        .iter_events(&query(5))
        .try_collect()
        .await
        .expect("harvest should succeed");

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].id, json!(1));
    assert_eq!(events[1].id, json!(2));
}

#[tokio::test]
async fn missing_results_key_ends_stream() {
    let server = MockServer::start().await;
    mount_page(&server, "1", json!({"detail": "nothing here"})).await;
    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(0)
        .mount(&server)
        .await;

    let harvester = test_harvester(&server, 0);
    let events: Vec<RawEvent> = harvester.iter_events(&query(3)).try_collect().await.unwrap();

    assert!(events.is_empty());
}

#[tokio::test]
async fn page_limit_bounds_requests() {
    let server = MockServer::start().await;
    mount_page(&server, "1", json!({"results": [event(1, "A"), event(2, "B")]})).await;
    mount_page(&server, "2", json!({"results": [event(3, "C"), event(4, "D")]})).await;
    Mock::given(method("GET"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [event(5, "E")]})))
        .expect(0)
        .mount(&server)
        .await;

    let harvester = test_harvester(&server, 0);
    let events: Vec<RawEvent> = harvester.iter_events(&query(2)).try_collect().await.unwrap();

    assert_eq!(events.len(), 4);
}

#[tokio::test]
async fn request_carries_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .and(query_param("location", "spb"))
        .and(query_param("lang", "ru"))
        .and(query_param("page", "1"))
        .and(query_param("page_size", "2"))
        .and(query_param(
            "fields",
            "id,title,short_title,description,dates,place,site_url,categories,tags",
        ))
        .and(query_param("text_format", "text"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [event(9, "X")]})))
        .expect(1)
        .mount(&server)
        .await;

    let harvester = test_harvester(&server, 0);
    let events: Vec<RawEvent> = harvester.iter_events(&query(1)).try_collect().await.unwrap();

    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn non_object_items_are_skipped() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "1",
        json!({"results": [42, "junk", null, event(7, "Настоящее"), []]}),
    )
    .await;

    let harvester = test_harvester(&server, 0);
    let events: Vec<RawEvent> = harvester.iter_events(&query(1)).try_collect().await.unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, json!(7));
}

#[tokio::test]
async fn stream_restarts_from_first_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [event(1, "A")]})))
        .expect(2)
        .mount(&server)
        .await;

    let harvester = test_harvester(&server, 0);
    let q = query(1);
    let first: Vec<RawEvent> = harvester.iter_events(&q).try_collect().await.unwrap();
    let second: Vec<RawEvent> = harvester.iter_events(&q).try_collect().await.unwrap();

    assert_eq!(first, second);
}

// ---------------------------------------------------------------------------
// Retries and errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn retriable_status_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_page(&server, "1", json!({"results": [event(1, "A")]})).await;

    let harvester = test_harvester(&server, 3);
    let events: Vec<RawEvent> = harvester.iter_events(&query(1)).try_collect().await.unwrap();

    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn exhausted_retries_surface_last_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .expect(2)
        .mount(&server)
        .await;

    let harvester = test_harvester(&server, 1);
    let result: Result<Vec<RawEvent>, _> = harvester.iter_events(&query(1)).try_collect().await;

    match result {
        Err(HarvestError::Parse { status, excerpt, .. }) => {
            assert_eq!(status, 503);
            assert_eq!(excerpt, "Service Unavailable");
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[tokio::test]
async fn json_error_body_is_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Страница не найдена."})))
        .expect(1)
        .mount(&server)
        .await;

    let harvester = test_harvester(&server, 3);
    let result: Result<Vec<RawEvent>, _> = harvester.iter_events(&query(1)).try_collect().await;

    match result {
        Err(HarvestError::Http { status, excerpt, .. }) => {
            assert_eq!(status, 404);
            assert!(excerpt.contains("Страница не найдена."), "excerpt: {excerpt}");
        }
        other => panic!("expected an HTTP error, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_success_is_parse_error_and_not_retried() {
    let server = MockServer::start().await;
    let html = format!("<html>{}</html>", "x".repeat(2_000));
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .expect(1)
        .mount(&server)
        .await;

    let harvester = test_harvester(&server, 3);
    let result: Result<Vec<RawEvent>, _> = harvester.iter_events(&query(1)).try_collect().await;

    match result {
        Err(HarvestError::Parse { status, excerpt, .. }) => {
            assert_eq!(status, 200);
            assert_eq!(excerpt.chars().count(), 500);
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

#[tokio::test]
async fn harvest_dataset_counts_and_pairs() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "1",
        json!({"results": [event(1, "Выставка"), event(2, "<b></b>")]}),
    )
    .await;
    mount_page(&server, "2", json!({"results": [event(3, "Лекция")]})).await;
    mount_page(&server, "3", json!({"results": []})).await;

    let harvester = test_harvester(&server, 0);
    let options = NormalizeOptions::new("spb", 3).unwrap();
    let dataset = harvest_dataset(&harvester, &query(10), &options, true)
        .await
        .expect("harvest should succeed");

    assert_eq!(dataset.fetched, 3);
    assert_eq!(dataset.events.len(), 2);
    assert_eq!(dataset.pairs.len(), 2);

    let first = &dataset.events[0];
    assert_eq!(first.id, 1);
    assert_eq!(first.location, "spb");
    assert_eq!(first.start_str, "2025-01-01 00:00");
    assert_eq!(first.tags, "искусство, выставки");

    let pair = &dataset.pairs[0];
    assert_eq!(pair.id, 1);
    assert!(pair.source.starts_with("Событие: Выставка\nГород: spb"));
    assert!(pair.target.starts_with("Выставка. Дата: 2025-01-01 00:00—2025-01-01 02:00."));
    assert!(pair.target.ends_with("Подробнее: https://kudago.com/spb/event/1/"));
}

#[tokio::test]
async fn harvest_dataset_without_pairs() {
    let server = MockServer::start().await;
    mount_page(&server, "1", json!({"results": [event(1, "Выставка")]})).await;

    let harvester = test_harvester(&server, 0);
    let dataset = harvest_dataset(&harvester, &query(1), &NormalizeOptions::default(), false)
        .await
        .unwrap();

    assert_eq!(dataset.events.len(), 1);
    assert!(dataset.pairs.is_empty());
}

#[tokio::test]
async fn harvest_dataset_fails_on_page_error() {
    let server = MockServer::start().await;
    mount_page(&server, "1", json!({"results": [event(1, "A"), event(2, "B")]})).await;
    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"detail": "bad page"})))
        .mount(&server)
        .await;

    let harvester = test_harvester(&server, 0);
    let err = harvest_dataset(&harvester, &query(5), &NormalizeOptions::default(), true)
        .await
        .expect_err("page 2 failure aborts the run");

    assert!(matches!(err, HarvestError::Http { status: 400, .. }));
}
