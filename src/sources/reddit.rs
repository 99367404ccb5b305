// src/sources/reddit.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::config::SourceSettings;
use crate::sources::token::{RedditTokenExchanger, TokenCache};
use crate::sources::types::{ContentItem, ContentQuery, ContentSource, Platform};
use crate::sources::{http_client, normalize_snippet, SERVICE_UA};

/// Maker-oriented subreddits searched as one unit.
const SUBREDDITS: &str = "SideProject+hackathon+learnprogramming+startups+webdev";
/// Posts with a shorter selftext are link drops, not discussions.
const MIN_TEXT_CHARS: usize = 50;

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    title: Option<String>,
    selftext: Option<String>,
    permalink: Option<String>,
}

/// Reddit search across the maker subreddits. Requires app credentials; the
/// token cache keeps the client-credentials grant warm between fetches.
pub struct RedditSource {
    http: reqwest::Client,
    tokens: Option<TokenCache>,
}

impl RedditSource {
    pub fn from_settings(settings: &SourceSettings) -> Self {
        let tokens = match (&settings.reddit_client_id, &settings.reddit_client_secret) {
            (Some(id), Some(secret)) => Some(TokenCache::new(Box::new(
                RedditTokenExchanger::new(id.clone(), secret.clone()),
            ))),
            _ => None,
        };
        Self {
            http: http_client(SERVICE_UA),
            tokens,
        }
    }

    /// Inject a prepared cache (tests count exchanges through it).
    pub fn with_token_cache(tokens: TokenCache) -> Self {
        Self {
            http: http_client(SERVICE_UA),
            tokens: Some(tokens),
        }
    }
}

/// Parse a search listing into content items.
pub fn parse_search_response(body: &str) -> Result<Vec<ContentItem>> {
    let listing: Listing = serde_json::from_str(body).context("parsing reddit listing json")?;
    let mut out = Vec::with_capacity(listing.data.children.len());

    for child in listing.data.children {
        let post = child.data;
        let title = normalize_snippet(post.title.as_deref().unwrap_or_default());
        if title.is_empty() {
            continue;
        }
        let text = normalize_snippet(post.selftext.as_deref().unwrap_or_default());
        if text.chars().count() <= MIN_TEXT_CHARS {
            continue;
        }
        let url = match post.permalink {
            Some(p) if !p.trim().is_empty() => format!("https://reddit.com{p}"),
            _ => continue,
        };
        out.push(ContentItem {
            title,
            text,
            url,
            source: Platform::Reddit,
        });
    }

    Ok(out)
}

#[async_trait]
impl ContentSource for RedditSource {
    async fn fetch(&self, query: &ContentQuery) -> Result<Vec<ContentItem>> {
        let tokens = self
            .tokens
            .as_ref()
            .ok_or_else(|| anyhow!("reddit credentials not configured"))?;
        let bearer = tokens.bearer().await?;

        let t0 = std::time::Instant::now();

        let url = format!("https://oauth.reddit.com/r/{SUBREDDITS}/search");
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("q", query.interest.as_str()),
                ("sort", "top"),
                ("limit", "10"),
                ("restrict_sr", "true"),
            ])
            .bearer_auth(&bearer)
            .send()
            .await
            .context("reddit search request")?;

        if !resp.status().is_success() {
            tracing::warn!(status = %resp.status(), source = "reddit", "non-success search response");
            return Ok(Vec::new());
        }

        let body = match resp.text().await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(error = ?e, source = "reddit", "failed to read search body");
                return Ok(Vec::new());
            }
        };
        let items = match parse_search_response(&body) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = ?e, source = "reddit", "malformed search payload");
                Vec::new()
            }
        };

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("source_fetch_ms").record(ms);
        counter!("source_items_total").increment(items.len() as u64);

        Ok(items)
    }

    fn platform(&self) -> Platform {
        Platform::Reddit
    }
}
