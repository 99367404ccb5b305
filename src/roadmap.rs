// src/roadmap.rs
//! Roadmap blueprint types and the chat-model builder that fills them.
//! Parsing is tolerant (the model may omit fields), validation is strict on
//! the three fields a blueprint cannot exist without.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::llm::{find_json_block, strip_code_fences, ChatRequest, DynChatModel};
use crate::prompts;
use crate::stack::TechStack;

/// How far the user wants to take the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectScope {
    #[serde(rename = "solo-weekend")]
    SoloWeekend,
    #[serde(rename = "solo-2weeks")]
    SoloTwoWeeks,
    #[serde(rename = "team-hackathon")]
    TeamHackathon,
    #[serde(rename = "mvp-startup")]
    MvpStartup,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub included: bool,
}

/// The idea as confirmed by the user; input to the roadmap call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdeaState {
    pub title: String,
    pub problem: String,
    pub concept: String,
    pub tech_stack: TechStack,
    #[serde(default)]
    pub features: Vec<Feature>,
    pub scope: ProjectScope,
    #[serde(default)]
    pub removed: Vec<String>,
    #[serde(default)]
    pub added: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// "beginner" | "intermediate" | "advanced"
    pub skill_level: String,
    /// "1 day" | "1 week" | "2 weeks" | "1 month"
    pub time_available: String,
    /// "solo" | "2 people" | "3-4 people"
    pub team_size: String,
}

fn default_rt_frontend() -> String {
    "Next.js".to_string()
}
fn default_rt_backend() -> String {
    "Node.js".to_string()
}
fn default_rt_database() -> String {
    "Firebase".to_string()
}
fn default_rt_auth() -> String {
    "Firebase Auth".to_string()
}
fn default_rt_hosting() -> String {
    "Vercel".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapTechStack {
    #[serde(default = "default_rt_frontend")]
    pub frontend: String,
    #[serde(default = "default_rt_backend")]
    pub backend: String,
    #[serde(default = "default_rt_database")]
    pub database: String,
    #[serde(default = "default_rt_auth")]
    pub auth: String,
    #[serde(default = "default_rt_hosting")]
    pub hosting: String,
    #[serde(default)]
    pub extras: Vec<String>,
}

impl Default for RoadmapTechStack {
    fn default() -> Self {
        Self {
            frontend: default_rt_frontend(),
            backend: default_rt_backend(),
            database: default_rt_database(),
            auth: default_rt_auth(),
            hosting: default_rt_hosting(),
            extras: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreFeature {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// "must" | "should" | "nice"
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub est_hours: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapWeek {
    #[serde(default)]
    pub week: u32,
    #[serde(default)]
    pub milestone: String,
    #[serde(default)]
    pub tasks: Vec<String>,
    #[serde(default)]
    pub deliverable: String,
}

fn default_difficulty() -> f32 {
    5.0
}
fn default_total_hours() -> f32 {
    40.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRoadmap {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub problem_statement: String,
    #[serde(default)]
    pub target_user: String,
    #[serde(default)]
    pub unique_angle: String,
    #[serde(default)]
    pub tech_stack: RoadmapTechStack,
    #[serde(default)]
    pub core_features: Vec<CoreFeature>,
    #[serde(default)]
    pub roadmap: Vec<RoadmapWeek>,
    #[serde(default)]
    pub technical_risks: Vec<String>,
    #[serde(default = "default_difficulty")]
    pub difficulty_score: f32,
    #[serde(default = "default_total_hours")]
    pub estimated_total_hours: f32,
    #[serde(default)]
    pub similar_products: Vec<String>,
    #[serde(default)]
    pub first_thing_to_build: String,
}

/// Builds a project blueprint from a confirmed idea via the chat model.
pub struct RoadmapBuilder {
    model: DynChatModel,
}

impl RoadmapBuilder {
    pub fn new(model: DynChatModel) -> Self {
        Self { model }
    }

    pub async fn build(&self, idea: &IdeaState, profile: &UserProfile) -> Result<ProjectRoadmap> {
        let user = prompts::roadmap_user_prompt(idea, profile);
        let req = ChatRequest {
            system: prompts::ROADMAP_SYSTEM_PROMPT,
            user: &user,
            temperature: 0.3,
            max_tokens: 6000,
        };
        let text = self.model.complete(req).await.context("roadmap completion")?;
        parse_roadmap(&text)
    }
}

/// Parse + validate a model response into a roadmap.
pub fn parse_roadmap(text: &str) -> Result<ProjectRoadmap> {
    let clean = strip_code_fences(text);
    let roadmap: ProjectRoadmap = match serde_json::from_str(clean) {
        Ok(r) => r,
        Err(_) => {
            // Recover a JSON object embedded in chatty output.
            let block = find_json_block(clean, '{', '}')
                .ok_or_else(|| anyhow::anyhow!("no valid JSON in roadmap response"))?;
            serde_json::from_str(block).context("parsing roadmap json")?
        }
    };

    if roadmap.title.trim().is_empty() {
        bail!("roadmap missing title");
    }
    if roadmap.core_features.is_empty() {
        bail!("roadmap missing core_features");
    }
    if roadmap.roadmap.is_empty() {
        bail!("roadmap missing weekly roadmap");
    }
    Ok(roadmap)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "title": "Sleep Coach",
        "core_features": [{"name": "log", "description": "log sleep", "priority": "must", "est_hours": 6}],
        "roadmap": [{"week": 1, "milestone": "mvp", "tasks": ["scaffold"], "deliverable": "demo"}]
    }"#;

    #[test]
    fn parses_minimal_roadmap_with_defaults() {
        let r = parse_roadmap(MINIMAL).expect("parse");
        assert_eq!(r.title, "Sleep Coach");
        assert_eq!(r.tech_stack.frontend, "Next.js");
        assert_eq!(r.tech_stack.auth, "Firebase Auth");
        assert!((r.difficulty_score - 5.0).abs() < f32::EPSILON);
        assert!((r.estimated_total_hours - 40.0).abs() < f32::EPSILON);
        assert!(r.similar_products.is_empty());
    }

    #[test]
    fn parses_fenced_response() {
        let fenced = format!("```json\n{MINIMAL}\n```");
        assert!(parse_roadmap(&fenced).is_ok());
    }

    #[test]
    fn recovers_object_from_chatty_response() {
        let chatty = format!("Here is your roadmap:\n{MINIMAL}\nGood luck!");
        assert!(parse_roadmap(&chatty).is_ok());
    }

    #[test]
    fn missing_core_features_fails() {
        let r = parse_roadmap(r#"{"title": "X", "roadmap": [{"week": 1}]}"#);
        assert!(r.expect_err("must fail").to_string().contains("core_features"));
    }

    #[test]
    fn missing_title_fails() {
        let r = parse_roadmap(
            r#"{"core_features": [{"name": "a"}], "roadmap": [{"week": 1}]}"#,
        );
        assert!(r.expect_err("must fail").to_string().contains("title"));
    }

    #[test]
    fn garbage_fails_with_no_json_error() {
        let r = parse_roadmap("sorry, I cannot help with that");
        assert!(r.expect_err("must fail").to_string().contains("no valid JSON"));
    }
}
