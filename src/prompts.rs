// src/prompts.rs
//! Prompt templates for the chat model calls. The user prompts embed the
//! JSON schema the adapters parse back, so the two must move together.

use crate::ideas::GenerationParams;
use crate::roadmap::{IdeaState, UserProfile};
use crate::sources::types::ContentItem;

pub const EXTRACT_SYSTEM_PROMPT: &str =
    "You are a project idea extractor. Return ONLY valid JSON. No text outside the JSON.";

pub fn extract_user_prompt(domain: &str, content: &[ContentItem]) -> String {
    let raw = serde_json::to_string(content).unwrap_or_else(|_| "[]".to_string());
    format!(
        r#"You are given raw content fetched from Reddit, Hacker News, Dev.to, and Devpost. Extract exactly 3 DISTINCT project ideas from this content.

Rules:
- Each idea must solve a DIFFERENT problem — no overlap between the 3
- Ideas must be relevant to domain: {domain}
- Each must be realistically buildable by a student or small team
- Never invent ideas not found in the source content
- source_url must be copied verbatim from the source content

Return ONLY a valid JSON array of exactly 3 objects:
[{{
  "title": string,
  "problem": string,
  "concept": string,
  "target_user": string,
  "source_platform": "reddit" | "hackernews" | "devto" | "devpost",
  "source_url": string,
  "rough_tech": string[],
  "why_interesting": string,
  "suggested_features": string[]
}}]

Raw content: {raw}"#
    )
}

pub const GENERATE_SYSTEM_PROMPT: &str =
    "You are a project idea generator. Return ONLY valid JSON. No text outside the JSON.";

pub fn generate_user_prompt(params: &GenerationParams) -> String {
    format!(
        r#"Invent exactly 3 DISTINCT project ideas for the domain "{domain}" around the interest "{interest}".

Rules:
- Each idea must solve a DIFFERENT problem — no overlap between the 3
- Each must be realistically buildable by a student or small team
- Do not reference or invent any external post, article, or URL

Return ONLY a valid JSON array of exactly 3 objects:
[{{
  "title": string,
  "problem": string,
  "concept": string,
  "target_user": string,
  "rough_tech": string[],
  "why_interesting": string,
  "suggested_features": string[]
}}]"#,
        domain = params.domain,
        interest = params.interest
    )
}

pub const ROADMAP_SYSTEM_PROMPT: &str = "You are a senior project architect. You receive a confirmed project idea and return a complete structured blueprint. Always respond with ONLY valid JSON matching the schema exactly. Never add text outside the JSON.";

pub fn roadmap_user_prompt(final_idea: &IdeaState, profile: &UserProfile) -> String {
    let idea_json = serde_json::to_string(final_idea).unwrap_or_else(|_| "{}".to_string());
    format!(
        r#"Build a complete project roadmap for this confirmed idea:
{idea_json}

User profile:
- Skill level: {skill}
- Time available: {time}
- Team size: {team}

Return ONLY valid JSON matching this schema exactly:
{{
  "title": string,
  "tagline": string,
  "problem_statement": string,
  "target_user": string,
  "unique_angle": string,
  "tech_stack": {{
    "frontend": string,
    "backend": string,
    "database": string,
    "auth": string,
    "hosting": string,
    "extras": string[]
  }},
  "core_features": [{{
    "name": string,
    "description": string,
    "priority": "must" | "should" | "nice",
    "est_hours": number
  }}],
  "roadmap": [{{
    "week": number,
    "milestone": string,
    "tasks": string[],
    "deliverable": string
  }}],
  "technical_risks": string[],
  "difficulty_score": number,
  "estimated_total_hours": number,
  "similar_products": string[],
  "first_thing_to_build": string
}}"#,
        skill = profile.skill_level,
        time = profile.time_available,
        team = profile.team_size
    )
}
