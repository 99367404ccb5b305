// src/llm.rs
//! Chat-model abstraction: provider trait + OpenAI-compatible client +
//! in-memory daily limit. No response caching: idea generation is supposed
//! to vary between calls.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::config::LlmSettings;
use crate::sources::SERVICE_UA;

/// One chat call. Temperature and token budget vary per use:
/// extraction/generation run hot and short, roadmaps cold and long.
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    pub system: &'a str,
    pub user: &'a str,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, req: ChatRequest<'_>) -> Result<String>;
    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Trait object used by the adapters and handlers.
pub type DynChatModel = Arc<dyn ChatModel>;

/// Factory: build a model according to config and environment.
///
/// * If `LLM_TEST_MODE=mock`, returns a deterministic mock.
/// * Else if disabled or keyless, returns a stub that fails every call.
/// * Else builds the real client wrapped with the daily limit.
pub fn build_model(settings: &LlmSettings) -> DynChatModel {
    if std::env::var("LLM_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        return Arc::new(MockModel {
            fixed: "[]".to_string(),
        });
    }

    if !settings.enabled || settings.api_key.trim().is_empty() {
        return Arc::new(DisabledModel);
    }

    Arc::new(DailyLimitModel::new(
        ChatCompletionsModel::new(settings),
        settings.daily_limit,
    ))
}

/// OpenAI-compatible chat completions client (Groq in production).
pub struct ChatCompletionsModel {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatCompletionsModel {
    pub fn new(settings: &LlmSettings) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(SERVICE_UA)
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client");
        Self {
            http,
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
        }
    }
}

#[async_trait]
impl ChatModel for ChatCompletionsModel {
    async fn complete(&self, req: ChatRequest<'_>) -> Result<String> {
        #[derive(serde::Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(serde::Serialize)]
        struct Payload<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
            max_tokens: u32,
        }
        #[derive(serde::Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(serde::Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(serde::Deserialize)]
        struct ChoiceMsg {
            content: String,
        }

        let payload = Payload {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: req.system,
                },
                Msg {
                    role: "user",
                    content: req.user,
                },
            ],
            temperature: req.temperature,
            max_tokens: req.max_tokens,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("chat completions request")?;

        let status = resp.status();
        if !status.is_success() {
            bail!("chat completions returned {status}");
        }

        let body: Resp = resp.json().await.context("chat completions response")?;
        let content = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();
        if content.trim().is_empty() {
            bail!("chat completions returned empty content");
        }
        Ok(content)
    }

    fn name(&self) -> &'static str {
        "chat-completions"
    }
}

/// Fails every call; used when the model is disabled or keyless.
pub struct DisabledModel;

#[async_trait]
impl ChatModel for DisabledModel {
    async fn complete(&self, _req: ChatRequest<'_>) -> Result<String> {
        bail!("model calls disabled")
    }
    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Deterministic mock for tests/local runs.
#[derive(Clone)]
pub struct MockModel {
    pub fixed: String,
}

#[async_trait]
impl ChatModel for MockModel {
    async fn complete(&self, _req: ChatRequest<'_>) -> Result<String> {
        Ok(self.fixed.clone())
    }
    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Day-keyed call budget around a real model. Counts successful calls only.
pub struct DailyLimitModel<M> {
    inner: M,
    max_per_day: u32,
    counter: Mutex<DayCounter>,
}

#[derive(Debug, Clone, Copy)]
struct DayCounter {
    day: i64,
    count: u32,
}

impl DayCounter {
    fn roll(&mut self, today: i64) {
        if self.day != today {
            self.day = today;
            self.count = 0;
        }
    }
}

fn today() -> i64 {
    chrono::Utc::now().timestamp() / 86_400
}

impl<M: ChatModel> DailyLimitModel<M> {
    pub fn new(inner: M, max_per_day: u32) -> Self {
        Self {
            inner,
            max_per_day,
            counter: Mutex::new(DayCounter {
                day: today(),
                count: 0,
            }),
        }
    }
}

#[async_trait]
impl<M: ChatModel> ChatModel for DailyLimitModel<M> {
    async fn complete(&self, req: ChatRequest<'_>) -> Result<String> {
        {
            let mut g = self.counter.lock().await;
            g.roll(today());
            if g.count >= self.max_per_day {
                bail!("daily model call limit reached ({})", self.max_per_day);
            }
        }

        let out = self.inner.complete(req).await?;

        // Increment after a successful real call.
        let mut g = self.counter.lock().await;
        g.roll(today());
        g.count = g.count.saturating_add(1);
        Ok(out)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

/// Strip optional markdown code fences around a JSON payload.
pub fn strip_code_fences(s: &str) -> &str {
    let t = s.trim();
    let t = t
        .strip_prefix("```json")
        .or_else(|| t.strip_prefix("```"))
        .unwrap_or(t);
    let t = t.strip_suffix("```").unwrap_or(t);
    t.trim()
}

/// Locate the outermost `open`..`close` block in loose model output.
/// ASCII delimiters only.
pub fn find_json_block(s: &str, open: char, close: char) -> Option<&str> {
    let start = s.find(open)?;
    let end = s.rfind(close)?;
    if end <= start {
        return None;
    }
    Some(&s[start..=end])
}
