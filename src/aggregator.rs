// src/aggregator.rs
//! Concurrent fan-out over the content sources with settle-all semantics:
//! every source gets to finish, per-source failures become diagnostic
//! records, and the aggregation itself never fails.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tokio::task::JoinSet;

use crate::config::{DomainTagMap, SourceSettings};
use crate::sources::devpost::DevpostSource;
use crate::sources::devto::DevToSource;
use crate::sources::hackernews::HackerNewsSource;
use crate::sources::reddit::RedditSource;
use crate::sources::types::{ContentItem, ContentQuery, ContentSource, Platform, SourceFailure};

/// Upper bound on content returned from one aggregation.
pub const MAX_CONTENT_ITEMS: usize = 20;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("aggregate_runs_total", "Aggregation calls served.");
        describe_counter!(
            "aggregate_content_kept_total",
            "Content items returned after dedup + cap."
        );
        describe_counter!(
            "aggregate_dedup_total",
            "Items removed as duplicate URLs."
        );
        describe_counter!(
            "aggregate_source_errors_total",
            "Sources that failed during aggregation."
        );
        describe_counter!("source_items_total", "Items parsed from platform responses.");
        describe_histogram!("source_fetch_ms", "Platform fetch+parse time in milliseconds.");
        describe_gauge!("aggregate_last_run_ts", "Unix ts of the last aggregation.");
    });
}

/// Outcome of one aggregation call.
#[derive(Debug, Clone, Serialize)]
pub struct AggregationResult {
    pub content: Vec<ContentItem>,
    /// Raw per-platform item counts (before dedup/cap); every configured
    /// platform has an entry, zero when it returned nothing or failed.
    pub sources: BTreeMap<Platform, usize>,
    pub errors: Vec<SourceFailure>,
}

pub struct SourceAggregator {
    sources: Vec<Arc<dyn ContentSource>>,
    cap: usize,
}

impl SourceAggregator {
    pub fn new(sources: Vec<Arc<dyn ContentSource>>) -> Self {
        Self {
            sources,
            cap: MAX_CONTENT_ITEMS,
        }
    }

    /// Wire the four real platform clients.
    pub fn from_settings(settings: &SourceSettings, tags: DomainTagMap) -> Self {
        Self::new(vec![
            Arc::new(HackerNewsSource::new()),
            Arc::new(RedditSource::from_settings(settings)),
            Arc::new(DevToSource::new(settings.devto_api_key.clone(), tags)),
            Arc::new(DevpostSource::new()),
        ])
    }

    pub async fn aggregate(&self, query: &ContentQuery) -> AggregationResult {
        // `ThreadRng` is not `Send`; a fresh OS-seeded `StdRng` keeps the
        // returned future `Send` for the axum handlers.
        let mut rng = rand::rngs::StdRng::from_os_rng();
        self.aggregate_with_rng(query, &mut rng).await
    }

    /// Same as `aggregate` with the RNG passed in, so tests can seed it.
    pub async fn aggregate_with_rng<R: Rng + ?Sized>(
        &self,
        query: &ContentQuery,
        rng: &mut R,
    ) -> AggregationResult {
        ensure_metrics_described();

        // 1) Fan out: one task per source, results written back by index.
        let mut set = JoinSet::new();
        for (idx, source) in self.sources.iter().enumerate() {
            let source = Arc::clone(source);
            let query = query.clone();
            set.spawn(async move { (idx, source.fetch(&query).await) });
        }

        let mut outcomes: Vec<Option<anyhow::Result<Vec<ContentItem>>>> = Vec::new();
        outcomes.resize_with(self.sources.len(), || None);

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((idx, res)) => outcomes[idx] = Some(res),
                Err(e) => {
                    // A panicked task leaves its slot empty; recorded below.
                    tracing::warn!(error = ?e, "source task did not complete");
                }
            }
        }

        // 2) Settle: items in source order, failures as records.
        let mut sources_map: BTreeMap<Platform, usize> =
            self.sources.iter().map(|s| (s.platform(), 0)).collect();
        let mut errors: Vec<SourceFailure> = Vec::new();
        let mut combined: Vec<ContentItem> = Vec::new();

        for (idx, outcome) in outcomes.into_iter().enumerate() {
            let platform = self.sources[idx].platform();
            match outcome {
                Some(Ok(items)) => {
                    *sources_map.entry(platform).or_insert(0) += items.len();
                    combined.extend(items);
                }
                Some(Err(e)) => {
                    let reason = failure_reason(&e);
                    tracing::warn!(source = %platform, %reason, "source failed during aggregation");
                    counter!("aggregate_source_errors_total").increment(1);
                    errors.push(SourceFailure {
                        source: platform,
                        reason,
                    });
                }
                None => {
                    counter!("aggregate_source_errors_total").increment(1);
                    errors.push(SourceFailure {
                        source: platform,
                        reason: "source task aborted".to_string(),
                    });
                }
            }
        }

        // 3) Dedup by exact URL, shuffle, cap.
        let removed = dedup_by_url(&mut combined);
        combined.shuffle(rng);
        combined.truncate(self.cap);

        counter!("aggregate_runs_total").increment(1);
        counter!("aggregate_content_kept_total").increment(combined.len() as u64);
        counter!("aggregate_dedup_total").increment(removed as u64);
        gauge!("aggregate_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);

        AggregationResult {
            content: combined,
            sources: sources_map,
            errors,
        }
    }
}

/// Remove items repeating an already-seen URL; the first occurrence wins.
/// Returns the number of removed items.
pub fn dedup_by_url(items: &mut Vec<ContentItem>) -> usize {
    let before = items.len();
    let mut seen: HashSet<String> = HashSet::new();
    items.retain(|item| seen.insert(item.url.clone()));
    before - items.len()
}

fn failure_reason(err: &anyhow::Error) -> String {
    // `{:#}` renders the context chain on one line.
    let msg = format!("{err:#}");
    if msg.trim().is_empty() {
        "Unknown error".to_string()
    } else {
        msg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(url: &str, title: &str) -> ContentItem {
        ContentItem {
            title: title.to_string(),
            text: "body text long enough to matter".to_string(),
            url: url.to_string(),
            source: Platform::HackerNews,
        }
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let mut items = vec![
            item("https://a.example/1", "first"),
            item("https://a.example/2", "second"),
            item("https://a.example/1", "later duplicate"),
        ];
        let removed = dedup_by_url(&mut items);
        assert_eq!(removed, 1);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "first");
    }

    #[test]
    fn dedup_without_duplicates_is_noop() {
        let mut items = vec![item("https://a.example/1", "a"), item("https://a.example/2", "b")];
        assert_eq!(dedup_by_url(&mut items), 0);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn failure_reason_never_empty() {
        let e = anyhow::anyhow!("");
        assert_eq!(failure_reason(&e), "Unknown error");
        let e = anyhow::anyhow!("boom");
        assert_eq!(failure_reason(&e), "boom");
    }
}
