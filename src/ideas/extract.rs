// src/ideas/extract.rs
//! Community track: the model extracts ideas from fetched content. An idea
//! claiming a source URL we never fetched is dropped here; fabricated
//! provenance must not cross this boundary.

use std::collections::HashSet;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::ideas::{Idea, IdeaOrigin};
use crate::llm::{find_json_block, strip_code_fences, ChatRequest, DynChatModel};
use crate::prompts;
use crate::sources::types::ContentItem;

/// At most this many community ideas survive extraction.
const MAX_EXTRACTED: usize = 3;

/// Idea record as the model emits it; every field may be missing or null.
#[derive(Debug, Deserialize)]
pub(crate) struct RawIdea {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub problem: Option<String>,
    #[serde(default)]
    pub concept: Option<String>,
    #[serde(default)]
    pub target_user: Option<String>,
    #[serde(default)]
    pub source_platform: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub rough_tech: Option<Vec<String>>,
    #[serde(default)]
    pub why_interesting: Option<String>,
    #[serde(default)]
    pub suggested_features: Option<Vec<String>>,
}

/// Parse a model response into raw idea records, tolerating code fences and
/// chatty text around the array.
pub(crate) fn parse_raw_ideas(text: &str) -> Result<Vec<RawIdea>> {
    let clean = strip_code_fences(text);
    match serde_json::from_str::<Vec<RawIdea>>(clean) {
        Ok(v) => Ok(v),
        Err(_) => {
            let block = find_json_block(clean, '[', ']')
                .ok_or_else(|| anyhow::anyhow!("no valid JSON array in model response"))?;
            serde_json::from_str(block).context("parsing idea array json")
        }
    }
}

pub(crate) fn none_if_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub struct IdeaExtractor {
    model: DynChatModel,
}

impl IdeaExtractor {
    pub fn new(model: DynChatModel) -> Self {
        Self { model }
    }

    /// Extract up to 3 community ideas from fetched content.
    pub async fn extract(&self, domain: &str, content: &[ContentItem]) -> Result<Vec<Idea>> {
        if content.is_empty() {
            bail!("no content to extract ideas from");
        }

        let user = prompts::extract_user_prompt(domain, content);
        let req = ChatRequest {
            system: prompts::EXTRACT_SYSTEM_PROMPT,
            user: &user,
            temperature: 0.2,
            max_tokens: 4096,
        };
        let text = self
            .model
            .complete(req)
            .await
            .context("idea extraction completion")?;
        let raw = parse_raw_ideas(&text)?;
        if raw.is_empty() {
            bail!("model returned no ideas");
        }

        let fetched_urls: HashSet<&str> = content.iter().map(|c| c.url.as_str()).collect();

        let mut out = Vec::with_capacity(MAX_EXTRACTED);
        for idea in raw {
            if out.len() >= MAX_EXTRACTED {
                break;
            }
            let url = idea.source_url.clone().unwrap_or_default();
            if !url.is_empty() && !fetched_urls.contains(url.as_str()) {
                tracing::warn!(source_url = %url, "dropping idea with fabricated source url");
                continue;
            }
            out.push(materialize(idea, url));
        }

        Ok(out)
    }
}

fn materialize(raw: RawIdea, source_url: String) -> Idea {
    Idea {
        title: none_if_blank(raw.title).unwrap_or_else(|| "Untitled Idea".to_string()),
        problem: none_if_blank(raw.problem).unwrap_or_else(|| "No problem defined".to_string()),
        concept: none_if_blank(raw.concept).unwrap_or_else(|| "No concept defined".to_string()),
        target_user: none_if_blank(raw.target_user).unwrap_or_else(|| "General users".to_string()),
        source_platform: none_if_blank(raw.source_platform)
            .unwrap_or_else(|| "hackernews".to_string()),
        source_url: if source_url.is_empty() {
            "#".to_string()
        } else {
            source_url
        },
        rough_tech: raw.rough_tech.unwrap_or_default(),
        why_interesting: none_if_blank(raw.why_interesting)
            .unwrap_or_else(|| "Interesting project idea".to_string()),
        origin: IdeaOrigin::Community,
        suggested_features: raw.suggested_features.unwrap_or_default(),
    }
}
