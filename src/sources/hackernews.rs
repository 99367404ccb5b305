// src/sources/hackernews.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::sources::types::{ContentItem, ContentQuery, ContentSource, Platform};
use crate::sources::{http_client, normalize_snippet, SERVICE_UA};

const SEARCH_URL: &str = "https://hn.algolia.com/api/v1/search";
/// Ask/Show posts with less body text than this carry no extractable idea.
const MIN_TEXT_CHARS: usize = 30;

#[derive(Debug, Deserialize)]
struct SearchResp {
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    title: Option<String>,
    story_text: Option<String>,
    url: Option<String>,
    #[serde(rename = "objectID")]
    object_id: String,
}

/// Hacker News via the Algolia search API, restricted to Ask HN / Show HN.
pub struct HackerNewsSource {
    http: reqwest::Client,
}

impl HackerNewsSource {
    pub fn new() -> Self {
        Self {
            http: http_client(SERVICE_UA),
        }
    }
}

impl Default for HackerNewsSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an Algolia search payload into content items.
pub fn parse_search_response(body: &str) -> Result<Vec<ContentItem>> {
    let resp: SearchResp = serde_json::from_str(body).context("parsing algolia search json")?;
    let mut out = Vec::with_capacity(resp.hits.len());

    for hit in resp.hits {
        let title = normalize_snippet(hit.title.as_deref().unwrap_or_default());
        if title.is_empty() {
            continue;
        }
        let text = normalize_snippet(hit.story_text.as_deref().unwrap_or_default());
        if text.chars().count() <= MIN_TEXT_CHARS {
            continue;
        }
        // Ask HN posts have no external url; link the discussion itself.
        let url = match hit.url {
            Some(u) if !u.trim().is_empty() => u,
            _ => format!("https://news.ycombinator.com/item?id={}", hit.object_id),
        };
        out.push(ContentItem {
            title,
            text,
            url,
            source: Platform::HackerNews,
        });
    }

    Ok(out)
}

#[async_trait]
impl ContentSource for HackerNewsSource {
    async fn fetch(&self, query: &ContentQuery) -> Result<Vec<ContentItem>> {
        let t0 = std::time::Instant::now();

        let resp = self
            .http
            .get(SEARCH_URL)
            .query(&[
                ("query", query.interest.as_str()),
                ("tags", "(ask_hn,show_hn)"),
                ("hitsPerPage", "10"),
            ])
            .send()
            .await
            .context("hackernews search request")?;

        if !resp.status().is_success() {
            tracing::warn!(status = %resp.status(), source = "hackernews", "non-success search response");
            return Ok(Vec::new());
        }

        let body = match resp.text().await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(error = ?e, source = "hackernews", "failed to read search body");
                return Ok(Vec::new());
            }
        };
        let items = match parse_search_response(&body) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = ?e, source = "hackernews", "malformed search payload");
                Vec::new()
            }
        };

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("source_fetch_ms").record(ms);
        counter!("source_items_total").increment(items.len() as u64);

        Ok(items)
    }

    fn platform(&self) -> Platform {
        Platform::HackerNews
    }
}
