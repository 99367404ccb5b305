// src/sources/types.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Content platforms this service can query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    HackerNews,
    Reddit,
    DevTo,
    Devpost,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::HackerNews => "hackernews",
            Platform::Reddit => "reddit",
            Platform::DevTo => "devto",
            Platform::Devpost => "devpost",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fetched piece of content. Created per fetch, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentItem {
    pub title: String,
    /// Normalized body text (entity-decoded, tag-stripped, whitespace-collapsed).
    pub text: String,
    pub url: String,
    pub source: Platform,
}

/// A source that failed during aggregation, with a human-readable reason.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceFailure {
    pub source: Platform,
    pub reason: String,
}

/// What the user asked for. Each source searches by the field it understands:
/// the article API maps `domain` to a tag, the rest search by `interest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentQuery {
    pub domain: String,
    pub interest: String,
}

impl ContentQuery {
    pub fn new(domain: impl Into<String>, interest: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            interest: interest.into(),
        }
    }
}

#[async_trait::async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch content for a query. Normal platform response problems (non-2xx,
    /// malformed payload, nothing matching) degrade to `Ok` with fewer or
    /// zero items; transport failures and configuration faults (missing
    /// credentials, failed token exchange) surface as `Err`.
    async fn fetch(&self, query: &ContentQuery) -> Result<Vec<ContentItem>>;
    fn platform(&self) -> Platform;
}
