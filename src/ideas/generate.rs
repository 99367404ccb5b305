// src/ideas/generate.rs
//! Generated track: the model invents ideas from the query parameters alone.
//! No post is cited, so every idea leaves here with an empty source URL.

use anyhow::{Context, Result};

use crate::ideas::extract::{none_if_blank, parse_raw_ideas};
use crate::ideas::{GenerationParams, Idea, IdeaOrigin};
use crate::llm::{ChatRequest, DynChatModel};
use crate::prompts;

/// At most this many generated ideas per request.
const MAX_GENERATED: usize = 3;

pub struct IdeaGenerator {
    model: DynChatModel,
}

impl IdeaGenerator {
    pub fn new(model: DynChatModel) -> Self {
        Self { model }
    }

    /// Invent up to 3 ideas for the given domain and interest.
    pub async fn generate(&self, params: &GenerationParams) -> Result<Vec<Idea>> {
        let user = prompts::generate_user_prompt(params);
        let req = ChatRequest {
            system: prompts::GENERATE_SYSTEM_PROMPT,
            user: &user,
            temperature: 0.8,
            max_tokens: 1500,
        };
        let text = self
            .model
            .complete(req)
            .await
            .context("idea generation completion")?;
        let raw = parse_raw_ideas(&text)?;

        let mut out = Vec::with_capacity(MAX_GENERATED);
        for idea in raw {
            if out.len() >= MAX_GENERATED {
                break;
            }
            // Invented ideas carry no provenance to fall back on, so the
            // substance fields are required rather than defaulted.
            let (Some(title), Some(problem), Some(concept)) = (
                none_if_blank(idea.title),
                none_if_blank(idea.problem),
                none_if_blank(idea.concept),
            ) else {
                continue;
            };
            out.push(Idea {
                title,
                problem,
                concept,
                target_user: none_if_blank(idea.target_user)
                    .unwrap_or_else(|| "General users".to_string()),
                source_platform: "ai-generated".to_string(),
                source_url: String::new(),
                rough_tech: idea.rough_tech.unwrap_or_default(),
                why_interesting: none_if_blank(idea.why_interesting)
                    .unwrap_or_else(|| "Interesting project idea".to_string()),
                origin: IdeaOrigin::AiGenerated,
                suggested_features: idea.suggested_features.unwrap_or_default(),
            });
        }

        Ok(out)
    }
}
