use std::sync::Arc;

use serde_json::json;
use shuttle_axum::axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::aggregator::{AggregationResult, SourceAggregator};
use crate::config::{DomainTagMap, LlmSettings, SourceSettings};
use crate::ideas::extract::IdeaExtractor;
use crate::ideas::generate::IdeaGenerator;
use crate::ideas::merge::merge_idea_tracks;
use crate::ideas::GenerationParams;
use crate::llm::{self, DynChatModel};
use crate::roadmap::{IdeaState, RoadmapBuilder, UserProfile};
use crate::sources::types::ContentQuery;

#[derive(Clone)]
pub struct AppState {
    aggregator: Arc<SourceAggregator>,
    extractor: Arc<IdeaExtractor>,
    generator: Arc<IdeaGenerator>,
    roadmap: Arc<RoadmapBuilder>,
}

impl AppState {
    /// Wire the real pipeline from process env and config files.
    pub fn from_env() -> Self {
        let settings = SourceSettings::from_env();
        let tags = DomainTagMap::load();
        let model = llm::build_model(&LlmSettings::load());
        Self::new(SourceAggregator::from_settings(&settings, tags), model)
    }

    /// Constructor-injected variant; tests pass mock sources and a mock model.
    pub fn new(aggregator: SourceAggregator, model: DynChatModel) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            extractor: Arc::new(IdeaExtractor::new(model.clone())),
            generator: Arc::new(IdeaGenerator::new(model.clone())),
            roadmap: Arc::new(RoadmapBuilder::new(model)),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/fetch", post(fetch_content))
        .route("/ideas", post(generate_ideas))
        .route("/roadmap", post(build_roadmap))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct ContentRequest {
    #[serde(default)]
    domain: String,
    #[serde(default)]
    interest: String,
}

#[derive(serde::Deserialize)]
struct RoadmapRequest {
    #[serde(default)]
    idea: Option<IdeaState>,
    #[serde(default)]
    profile: Option<UserProfile>,
}

async fn fetch_content(
    State(state): State<AppState>,
    Json(body): Json<ContentRequest>,
) -> Response {
    let query = match parse_query(&body) {
        Ok(q) => q,
        Err(resp) => return resp,
    };
    log_query("fetch", &query);

    let result = state.aggregator.aggregate(&query).await;
    if result.content.is_empty() {
        return no_content_found(&result);
    }
    Json(result).into_response()
}

async fn generate_ideas(
    State(state): State<AppState>,
    Json(body): Json<ContentRequest>,
) -> Response {
    let query = match parse_query(&body) {
        Ok(q) => q,
        Err(resp) => return resp,
    };
    log_query("ideas", &query);

    let result = state.aggregator.aggregate(&query).await;
    if result.content.is_empty() {
        return no_content_found(&result);
    }

    let params = GenerationParams {
        domain: query.domain.clone(),
        interest: query.interest.clone(),
    };
    // Both tracks run concurrently; either may fail without taking the
    // request down with it.
    let (community, generated) = tokio::join!(
        state.extractor.extract(&query.domain, &result.content),
        state.generator.generate(&params),
    );
    let community = community.unwrap_or_else(|e| {
        tracing::warn!(error = ?e, "community track failed");
        Vec::new()
    });
    let generated = generated.unwrap_or_else(|e| {
        tracing::warn!(error = ?e, "generated track failed");
        Vec::new()
    });

    let ideas = merge_idea_tracks(community, generated);
    if ideas.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "Could not generate ideas. Try a different interest."
            })),
        )
            .into_response();
    }

    Json(json!({
        "ideas": ideas,
        "sources": result.sources,
        "errors": result.errors,
    }))
    .into_response()
}

async fn build_roadmap(
    State(state): State<AppState>,
    Json(body): Json<RoadmapRequest>,
) -> Response {
    let (Some(idea), Some(profile)) = (body.idea, body.profile) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "idea and profile are required" })),
        )
            .into_response();
    };

    match state.roadmap.build(&idea, &profile).await {
        Ok(roadmap) => Json(json!({ "roadmap": roadmap })).into_response(),
        Err(e) => {
            tracing::warn!(error = ?e, "roadmap build failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": format!("{e:#}") })),
            )
                .into_response()
        }
    }
}

fn parse_query(body: &ContentRequest) -> Result<ContentQuery, Response> {
    let domain = body.domain.trim();
    let interest = body.interest.trim();
    if domain.is_empty() || interest.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Domain and interest are required" })),
        )
            .into_response());
    }
    Ok(ContentQuery::new(domain, interest))
}

fn no_content_found(result: &AggregationResult) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "No content found from any source",
            "details": result.errors,
        })),
    )
        .into_response()
}

/// Log a query without its raw text. Only the domain label plus a short
/// hash of the interest keyword; never the keyword itself.
fn log_query(endpoint: &str, query: &ContentQuery) {
    let id = anon_hash(&query.interest);
    tracing::info!(
        target: "api",
        endpoint,
        domain = %query.domain,
        interest_id = %id,
        "query received"
    );
}

pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
