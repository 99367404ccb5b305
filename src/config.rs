//! # Configuration
//!
//! Three small settings surfaces:
//! - `SourceSettings`: platform credentials from the environment. All of them
//!   are optional here; a source that needs a missing credential reports that
//!   at fetch time as a configuration failure.
//! - `DomainTagMap`: maps a user-facing domain (e.g. "health") to the dev.to
//!   tag the article search expects. Ships a built-in seed; an optional TOML
//!   file can override it.
//! - `LlmSettings`: chat-completions endpoint config from `config/ai.json`,
//!   with `"ENV"` indirection for the API key.

use serde::{Deserialize, Serialize};
use std::{collections::HashMap, env, fs, path::Path};

pub const DEFAULT_DOMAIN_TAGS_PATH: &str = "config/domain_tags.toml";
pub const ENV_DOMAIN_TAGS_PATH: &str = "DOMAIN_TAGS_PATH";

const DEFAULT_AI_CONFIG_PATH: &str = "config/ai.json";

/// Platform credentials, read once at startup.
#[derive(Debug, Clone, Default)]
pub struct SourceSettings {
    pub reddit_client_id: Option<String>,
    pub reddit_client_secret: Option<String>,
    pub devto_api_key: Option<String>,
}

impl SourceSettings {
    pub fn from_env() -> Self {
        Self {
            reddit_client_id: env_nonempty("REDDIT_CLIENT_ID"),
            reddit_client_secret: env_nonempty("REDDIT_SECRET"),
            devto_api_key: env_nonempty("DEVTO_API_KEY"),
        }
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Domain → dev.to tag lookup with a built-in seed.
#[derive(Debug, Clone, Deserialize)]
pub struct DomainTagMap {
    /// Tag used when the domain has no mapping.
    #[serde(default = "default_default_tag")]
    pub default_tag: String,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

fn default_default_tag() -> String {
    "programming".to_string()
}

impl DomainTagMap {
    /// Load from `$DOMAIN_TAGS_PATH` or the default path.
    /// Falls back to `default_seed()` when the file is absent or broken.
    pub fn load() -> Self {
        let path = env::var(ENV_DOMAIN_TAGS_PATH)
            .unwrap_or_else(|_| DEFAULT_DOMAIN_TAGS_PATH.to_string());
        Self::load_from_file(path)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(path) {
            Ok(s) => toml::from_str(&s).unwrap_or_else(|_| Self::default_seed()),
            Err(_) => Self::default_seed(),
        }
    }

    /// Case-insensitive lookup; unmapped domains get the default tag.
    pub fn tag_for(&self, domain: &str) -> String {
        let d = domain.trim().to_lowercase();
        self.tags
            .get(&d)
            .cloned()
            .unwrap_or_else(|| self.default_tag.clone())
    }

    /// Built-in seed covering the domains the picker UI offers.
    pub fn default_seed() -> Self {
        let mut tags = HashMap::new();
        for (k, v) in [
            ("ai-ml", "machinelearning"),
            ("saas", "saas"),
            ("fintech", "fintech"),
            ("healthtech", "healthtech"),
            ("edtech", "edtech"),
            ("gaming", "gamedev"),
            ("social-impact", "opensource"),
            ("ecommerce", "ecommerce"),
            ("iot", "iot"),
            ("devtools", "devtools"),
            ("health", "healthtech"),
            ("education", "edtech"),
            ("environment", "sustainability"),
            ("productivity", "productivity"),
            ("social", "webdev"),
            ("logistics", "devops"),
        ] {
            tags.insert(k.to_string(), v.to_string());
        }

        Self {
            default_tag: default_default_tag(),
            tags,
        }
    }
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}
fn default_model() -> String {
    "meta-llama/llama-4-scout-17b-16e-instruct".to_string()
}
fn default_daily_limit() -> u32 {
    200
}

/// Chat-completions config loaded from `config/ai.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    pub enabled: bool,
    /// OpenAI-compatible endpoint base, without the `/chat/completions` part.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// "ENV" means: read from GROQ_API_KEY.
    pub api_key: String,
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,
}

impl LlmSettings {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        let mut cfg: LlmSettings = serde_json::from_str(&data)?;

        // Resolve api key if "ENV"
        if cfg.api_key.trim().eq_ignore_ascii_case("env") {
            cfg.api_key = env::var("GROQ_API_KEY")
                .map_err(|_| anyhow::anyhow!("Missing GROQ_API_KEY env var"))?;
        }

        // Normalize trailing slash so URL joins stay predictable.
        while cfg.base_url.ends_with('/') {
            cfg.base_url.pop();
        }

        Ok(cfg)
    }

    /// Tolerant variant for startup: any load failure degrades to disabled.
    pub fn load() -> Self {
        match Self::load_from_file(DEFAULT_AI_CONFIG_PATH) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(error = ?e, "ai config unavailable; model calls disabled");
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            base_url: default_base_url(),
            model: default_model(),
            api_key: String::new(),
            daily_limit: default_daily_limit(),
        }
    }
}
