// src/stack.rs
//! Keyword-driven tech stack inference from an idea's rough tech tags.
//! Pure lookup tables, no I/O.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TechStack {
    pub frontend: String,
    pub backend: String,
    pub database: String,
    pub extra: Vec<String>,
}

/// Ordered rules: the first matching rule wins within a category, the
/// default applies when nothing matches. A rule matches when any tag
/// contains any of its needles.
const FRONTEND_RULES: &[(&[&str], &str)] = &[
    (&["vue"], "Vue"),
    (&["angular"], "Angular"),
    (&["svelte"], "Svelte"),
    (&["next"], "Next.js"),
];

const BACKEND_RULES: &[(&[&str], &str)] = &[
    (&["python", "django", "flask"], "Python/FastAPI"),
    (&["go", "golang"], "Go"),
    (&["rust"], "Rust"),
    (&["java", "spring"], "Java/Spring"),
];

const DATABASE_RULES: &[(&[&str], &str)] = &[
    (&["mongo"], "MongoDB"),
    (&["mysql"], "MySQL"),
    (&["redis"], "Redis"),
    (&["firebase"], "Firebase"),
    (&["supabase"], "Supabase"),
];

/// Extras collect every match instead of picking one.
const EXTRA_RULES: &[(&[&str], &str)] = &[
    (&["docker"], "Docker"),
    (&["kubernetes", "k8s"], "Kubernetes"),
    (&["graphql"], "GraphQL"),
    (&["websocket"], "WebSockets"),
    (&["ai", "ml", "openai"], "AI/ML"),
];

fn matches_any(tags: &[String], needles: &[&str]) -> bool {
    tags.iter().any(|t| needles.iter().any(|n| t.contains(n)))
}

fn pick(tags: &[String], rules: &[(&[&str], &str)], default: &str) -> String {
    rules
        .iter()
        .find(|(needles, _)| matches_any(tags, needles))
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| default.to_string())
}

/// Infer a concrete stack from free-form tech tags.
pub fn infer_tech_stack(rough_tech: &[String]) -> TechStack {
    let tags: Vec<String> = rough_tech.iter().map(|t| t.to_lowercase()).collect();

    let extra = EXTRA_RULES
        .iter()
        .filter(|(needles, _)| matches_any(&tags, needles))
        .map(|(_, name)| name.to_string())
        .collect();

    TechStack {
        frontend: pick(&tags, FRONTEND_RULES, "React"),
        backend: pick(&tags, BACKEND_RULES, "Node.js"),
        database: pick(&tags, DATABASE_RULES, "PostgreSQL"),
        extra,
    }
}
