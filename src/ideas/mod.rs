// src/ideas/mod.rs
pub mod extract;
pub mod generate;
pub mod merge;

use serde::{Deserialize, Serialize};

/// Which track produced an idea.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdeaOrigin {
    #[serde(rename = "community")]
    Community,
    #[serde(rename = "ai-generated")]
    AiGenerated,
}

/// A candidate project idea.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Idea {
    pub title: String,
    pub problem: String,
    pub concept: String,
    pub target_user: String,
    /// Platform string for community ideas; "ai-generated" otherwise.
    pub source_platform: String,
    /// Link back to the fetched content; empty for generated ideas.
    pub source_url: String,
    pub rough_tech: Vec<String>,
    pub why_interesting: String,
    pub origin: IdeaOrigin,
    #[serde(default)]
    pub suggested_features: Vec<String>,
}

/// Inputs for parameter-only idea generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationParams {
    pub domain: String,
    pub interest: String,
}
