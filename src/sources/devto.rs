// src/sources/devto.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::config::DomainTagMap;
use crate::sources::types::{ContentItem, ContentQuery, ContentSource, Platform};
use crate::sources::{http_client, normalize_snippet, SERVICE_UA};

const ARTICLES_URL: &str = "https://dev.to/api/articles";
/// Articles with a shorter description are listicles/announcements, skip them.
const MIN_TEXT_CHARS: usize = 20;

#[derive(Debug, Deserialize)]
struct Article {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
}

/// dev.to articles by tag. The tag comes from the domain→tag map; the api key
/// is optional and only raises the rate limit.
pub struct DevToSource {
    http: reqwest::Client,
    api_key: Option<String>,
    tags: DomainTagMap,
}

impl DevToSource {
    pub fn new(api_key: Option<String>, tags: DomainTagMap) -> Self {
        Self {
            http: http_client(SERVICE_UA),
            api_key,
            tags,
        }
    }
}

/// Parse an articles payload into content items.
pub fn parse_articles_response(body: &str) -> Result<Vec<ContentItem>> {
    let articles: Vec<Article> = serde_json::from_str(body).context("parsing dev.to articles json")?;
    let mut out = Vec::with_capacity(articles.len());

    for a in articles {
        let title = normalize_snippet(a.title.as_deref().unwrap_or_default());
        if title.is_empty() {
            continue;
        }
        let text = normalize_snippet(a.description.as_deref().unwrap_or_default());
        if text.chars().count() <= MIN_TEXT_CHARS {
            continue;
        }
        let url = match a.url {
            Some(u) if !u.trim().is_empty() => u,
            _ => continue,
        };
        out.push(ContentItem {
            title,
            text,
            url,
            source: Platform::DevTo,
        });
    }

    Ok(out)
}

#[async_trait]
impl ContentSource for DevToSource {
    async fn fetch(&self, query: &ContentQuery) -> Result<Vec<ContentItem>> {
        let t0 = std::time::Instant::now();

        let tag = self.tags.tag_for(&query.domain);
        let mut req = self
            .http
            .get(ARTICLES_URL)
            .query(&[("tag", tag.as_str()), ("top", "10"), ("per_page", "10")]);
        if let Some(key) = &self.api_key {
            req = req.header("api-key", key);
        }

        let resp = req.send().await.context("dev.to articles request")?;

        if !resp.status().is_success() {
            tracing::warn!(status = %resp.status(), source = "devto", %tag, "non-success articles response");
            return Ok(Vec::new());
        }

        let body = match resp.text().await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(error = ?e, source = "devto", "failed to read articles body");
                return Ok(Vec::new());
            }
        };
        let items = match parse_articles_response(&body) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = ?e, source = "devto", "malformed articles payload");
                Vec::new()
            }
        };

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("source_fetch_ms").record(ms);
        counter!("source_items_total").increment(items.len() as u64);

        Ok(items)
    }

    fn platform(&self) -> Platform {
        Platform::DevTo
    }
}
