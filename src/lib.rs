// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregator;
pub mod api;
pub mod config;
pub mod ideas;
pub mod llm;
pub mod metrics;
pub mod prompts;
pub mod roadmap;
pub mod sources;
pub mod stack;

// ---- Re-exports for stable public API ----
pub use crate::aggregator::{AggregationResult, SourceAggregator};
pub use crate::api::{router, AppState};
pub use crate::ideas::{Idea, IdeaOrigin};
pub use crate::sources::types::{ContentItem, ContentQuery, ContentSource, Platform, SourceFailure};
pub use crate::stack::{infer_tech_stack, TechStack};
