// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot, with
// stub sources and a fixed-output chat model injected through AppState.
//
// Covered:
// - GET /health
// - POST /fetch   (field validation, success shape, empty-content 404)
// - POST /ideas   (merged tracks, unusable-model 422)
// - POST /roadmap (missing fields 400, success, model failure 502)

use std::sync::Arc;

use serde_json::{json, Value as Json};
use shuttle_axum::axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use tower::ServiceExt as _; // for `oneshot`

use idea_forge::aggregator::SourceAggregator;
use idea_forge::api::{self, AppState};
use idea_forge::llm::MockModel;
use idea_forge::sources::types::{ContentItem, ContentQuery, ContentSource, Platform};

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

struct StubSource {
    platform: Platform,
    items: Vec<ContentItem>,
    fail: Option<String>,
}

impl StubSource {
    fn ok(platform: Platform, items: Vec<ContentItem>) -> Self {
        Self {
            platform,
            items,
            fail: None,
        }
    }

    fn failing(platform: Platform, reason: &str) -> Self {
        Self {
            platform,
            items: Vec::new(),
            fail: Some(reason.to_string()),
        }
    }
}

#[async_trait::async_trait]
impl ContentSource for StubSource {
    async fn fetch(&self, _query: &ContentQuery) -> anyhow::Result<Vec<ContentItem>> {
        match &self.fail {
            Some(reason) => anyhow::bail!("{reason}"),
            None => Ok(self.items.clone()),
        }
    }

    fn platform(&self) -> Platform {
        self.platform
    }
}

fn content_item(n: usize) -> ContentItem {
    ContentItem {
        title: format!("Fetched post {n}"),
        text: "a long enough normalized body describing a side project in detail".to_string(),
        url: format!("https://news.ycombinator.com/item?id=4100{n}"),
        source: Platform::HackerNews,
    }
}

/// Build the same Router the binary uses, on stubbed dependencies.
fn test_router(sources: Vec<Arc<dyn ContentSource>>, fixed_model: &str) -> Router {
    let state = AppState::new(
        SourceAggregator::new(sources),
        Arc::new(MockModel {
            fixed: fixed_model.to_string(),
        }),
    );
    api::router(state)
}

fn ok_sources(count: usize) -> Vec<Arc<dyn ContentSource>> {
    vec![Arc::new(StubSource::ok(
        Platform::HackerNews,
        (0..count).map(content_item).collect(),
    ))]
}

fn post(uri: &str, payload: &Json) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build request")
}

async fn read_json(resp: Response) -> Json {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    serde_json::from_slice(&bytes).expect("parse json")
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = test_router(ok_sources(1), "[]");

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK, "health should be 200");

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let body = String::from_utf8(bytes).expect("utf8");
    assert_eq!(body.trim(), "ok");
}

#[tokio::test]
async fn api_fetch_rejects_missing_fields() {
    let app = test_router(ok_sources(1), "[]");

    let resp = app
        .oneshot(post("/fetch", &json!({ "domain": "fintech" })))
        .await
        .expect("oneshot /fetch");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let v = read_json(resp).await;
    assert_eq!(v["error"], "Domain and interest are required");
}

#[tokio::test]
async fn api_fetch_returns_content_sources_and_errors() {
    let sources: Vec<Arc<dyn ContentSource>> = vec![
        Arc::new(StubSource::ok(
            Platform::HackerNews,
            (0..3).map(content_item).collect(),
        )),
        Arc::new(StubSource::failing(Platform::Reddit, "connection refused")),
    ];
    let app = test_router(sources, "[]");

    let payload = json!({ "domain": "fintech", "interest": "subscriptions" });
    let resp = app.oneshot(post("/fetch", &payload)).await.expect("oneshot /fetch");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = read_json(resp).await;
    assert_eq!(v["content"].as_array().expect("content array").len(), 3);
    assert_eq!(v["sources"]["hackernews"], 3);
    assert_eq!(v["sources"]["reddit"], 0);

    let errors = v["errors"].as_array().expect("errors array");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["source"], "reddit");
    assert!(errors[0]["reason"]
        .as_str()
        .expect("reason string")
        .contains("connection refused"));
}

#[tokio::test]
async fn api_fetch_404_when_no_source_yields_content() {
    let sources: Vec<Arc<dyn ContentSource>> = vec![
        Arc::new(StubSource::ok(Platform::HackerNews, Vec::new())),
        Arc::new(StubSource::failing(Platform::DevTo, "service unavailable")),
    ];
    let app = test_router(sources, "[]");

    let payload = json!({ "domain": "fintech", "interest": "subscriptions" });
    let resp = app.oneshot(post("/fetch", &payload)).await.expect("oneshot /fetch");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let v = read_json(resp).await;
    assert_eq!(v["error"], "No content found from any source");
    assert_eq!(v["details"].as_array().expect("details array").len(), 1);
}

#[tokio::test]
async fn api_ideas_returns_merged_ideas() {
    // The model cites the url of an actually fetched item, so the community
    // idea survives the provenance check.
    let fixed = r#"[{
        "title": "Subscription lens",
        "problem": "Recurring charges go unnoticed",
        "concept": "A dashboard that flags every recurring charge",
        "source_platform": "hackernews",
        "source_url": "https://news.ycombinator.com/item?id=41000",
        "rough_tech": ["rust"],
        "why_interesting": "Everyone pays for something they forgot"
    }]"#;
    let app = test_router(ok_sources(2), fixed);

    let payload = json!({ "domain": "fintech", "interest": "subscriptions" });
    let resp = app.oneshot(post("/ideas", &payload)).await.expect("oneshot /ideas");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = read_json(resp).await;
    let ideas = v["ideas"].as_array().expect("ideas array");
    // Both tracks emit the same title; the merge collapses them and the
    // community variant wins.
    assert_eq!(ideas.len(), 1);
    assert_eq!(ideas[0]["origin"], "community");
    assert_eq!(ideas[0]["title"], "Subscription lens");
    assert!(v.get("sources").is_some(), "missing 'sources'");
    assert!(v.get("errors").is_some(), "missing 'errors'");
}

#[tokio::test]
async fn api_ideas_422_when_model_is_unusable() {
    let app = test_router(ok_sources(2), "The model is unavailable right now.");

    let payload = json!({ "domain": "fintech", "interest": "subscriptions" });
    let resp = app.oneshot(post("/ideas", &payload)).await.expect("oneshot /ideas");
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let v = read_json(resp).await;
    assert_eq!(
        v["error"],
        "Could not generate ideas. Try a different interest."
    );
}

#[tokio::test]
async fn api_roadmap_rejects_missing_profile() {
    let app = test_router(ok_sources(1), "{}");

    let payload = json!({
        "idea": {
            "title": "LedgerLens",
            "problem": "Subscriptions bill silently",
            "concept": "A dashboard that flags recurring charges",
            "tech_stack": {
                "frontend": "React",
                "backend": "Node.js",
                "database": "PostgreSQL",
                "extra": []
            },
            "scope": "solo-weekend"
        }
    });
    let resp = app
        .oneshot(post("/roadmap", &payload))
        .await
        .expect("oneshot /roadmap");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let v = read_json(resp).await;
    assert_eq!(v["error"], "idea and profile are required");
}

#[tokio::test]
async fn api_roadmap_returns_validated_blueprint() {
    let fixed = r#"{
        "title": "LedgerLens",
        "tagline": "See every subscription before it bills you.",
        "core_features": [
            {"name": "Statement import", "description": "CSV and OFX ingest", "priority": "must", "est_hours": 8}
        ],
        "roadmap": [
            {"week": 1, "milestone": "Parsing pipeline", "tasks": ["CSV import"], "deliverable": "Imports a real statement"}
        ],
        "difficulty_score": 4,
        "estimated_total_hours": 32
    }"#;
    let app = test_router(ok_sources(1), fixed);

    let payload = json!({
        "idea": {
            "title": "LedgerLens",
            "problem": "Subscriptions bill silently",
            "concept": "A dashboard that flags recurring charges",
            "tech_stack": {
                "frontend": "React",
                "backend": "Node.js",
                "database": "PostgreSQL",
                "extra": []
            },
            "features": [{"name": "Statement import", "included": true}],
            "scope": "solo-weekend"
        },
        "profile": {
            "skill_level": "intermediate",
            "time_available": "1 week",
            "team_size": "solo"
        }
    });
    let resp = app
        .oneshot(post("/roadmap", &payload))
        .await
        .expect("oneshot /roadmap");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = read_json(resp).await;
    assert_eq!(v["roadmap"]["title"], "LedgerLens");
    assert_eq!(v["roadmap"]["core_features"].as_array().expect("features").len(), 1);
    // Omitted stack fields come back with their defaults.
    assert_eq!(v["roadmap"]["tech_stack"]["auth"], "Firebase Auth");
    assert_eq!(v["roadmap"]["tech_stack"]["hosting"], "Vercel");
}

#[tokio::test]
async fn api_roadmap_502_when_model_fails() {
    let app = test_router(ok_sources(1), "I had trouble with that request.");

    let payload = json!({
        "idea": {
            "title": "LedgerLens",
            "problem": "Subscriptions bill silently",
            "concept": "A dashboard that flags recurring charges",
            "tech_stack": {
                "frontend": "React",
                "backend": "Node.js",
                "database": "PostgreSQL",
                "extra": []
            },
            "scope": "solo-weekend"
        },
        "profile": {
            "skill_level": "beginner",
            "time_available": "1 day",
            "team_size": "solo"
        }
    });
    let resp = app
        .oneshot(post("/roadmap", &payload))
        .await
        .expect("oneshot /roadmap");
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

    let v = read_json(resp).await;
    assert!(v["error"]
        .as_str()
        .expect("error string")
        .contains("no valid JSON"));
}
