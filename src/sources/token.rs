// src/sources/token.rs
//! Client-credentials token cache for the Reddit search API.
//!
//! The cache is constructor-injected into the reddit source so tests can
//! count exchanges. Expiry applies a safety margin so a token is refreshed
//! shortly before the provider would reject it.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::sources::{http_client, SERVICE_UA};

/// Safety margin subtracted from the provider-reported lifetime.
const EXPIRY_MARGIN_SECS: i64 = 60;

const REDDIT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

/// One successful client-credentials exchange.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub access_token: String,
    pub expires_in_secs: i64,
}

#[async_trait]
pub trait TokenExchanger: Send + Sync {
    async fn exchange(&self) -> Result<TokenGrant>;
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at_ms: i64,
}

/// Cache for short-lived bearer tokens. The async mutex is held across the
/// exchange, so concurrent callers wait for one refresh instead of racing.
pub struct TokenCache {
    exchanger: Box<dyn TokenExchanger>,
    slot: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new(exchanger: Box<dyn TokenExchanger>) -> Self {
        Self {
            exchanger,
            slot: Mutex::new(None),
        }
    }

    /// Current bearer token, refreshed when missing or expired.
    pub async fn bearer(&self) -> Result<String> {
        self.bearer_at(now_ms()).await
    }

    /// Same as `bearer` with the clock passed in.
    pub async fn bearer_at(&self, now_ms: i64) -> Result<String> {
        let mut slot = self.slot.lock().await;
        if let Some(cached) = slot.as_ref() {
            if now_ms < cached.expires_at_ms {
                return Ok(cached.token.clone());
            }
        }

        let grant = self.exchanger.exchange().await?;
        let ttl_secs = (grant.expires_in_secs - EXPIRY_MARGIN_SECS).max(0);
        let fresh = CachedToken {
            token: grant.access_token,
            expires_at_ms: now_ms + ttl_secs * 1000,
        };
        let token = fresh.token.clone();
        *slot = Some(fresh);
        Ok(token)
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Real exchanger: Reddit OAuth client-credentials grant with basic auth.
pub struct RedditTokenExchanger {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
}

impl RedditTokenExchanger {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            http: http_client(SERVICE_UA),
            client_id,
            client_secret,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RedditTokenResp {
    access_token: String,
    expires_in: i64,
}

#[async_trait]
impl TokenExchanger for RedditTokenExchanger {
    async fn exchange(&self) -> Result<TokenGrant> {
        let resp = self
            .http
            .post(REDDIT_TOKEN_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .context("reddit token request")?;

        if !resp.status().is_success() {
            bail!("reddit auth failed: {}", resp.status());
        }

        let body: RedditTokenResp = resp.json().await.context("reddit token response")?;
        Ok(TokenGrant {
            access_token: body.access_token,
            expires_in_secs: body.expires_in,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingExchanger {
        calls: Arc<AtomicUsize>,
        expires_in_secs: i64,
    }

    #[async_trait]
    impl TokenExchanger for CountingExchanger {
        async fn exchange(&self) -> Result<TokenGrant> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(TokenGrant {
                access_token: format!("tok-{n}"),
                expires_in_secs: self.expires_in_secs,
            })
        }
    }

    struct FailingExchanger;

    #[async_trait]
    impl TokenExchanger for FailingExchanger {
        async fn exchange(&self) -> Result<TokenGrant> {
            bail!("reddit auth failed: 401 Unauthorized")
        }
    }

    fn counting_cache(expires_in_secs: i64) -> (TokenCache, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = TokenCache::new(Box::new(CountingExchanger {
            calls: calls.clone(),
            expires_in_secs,
        }));
        (cache, calls)
    }

    #[tokio::test]
    async fn token_reused_within_validity_window() {
        let (cache, calls) = counting_cache(3600);
        let t0 = 1_700_000_000_000i64;

        let a = cache.bearer_at(t0).await.expect("first");
        let b = cache.bearer_at(t0 + 5_000).await.expect("second");

        assert_eq!(a, b);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expiry_triggers_second_exchange() {
        let (cache, calls) = counting_cache(3600);
        let t0 = 1_700_000_000_000i64;

        let a = cache.bearer_at(t0).await.expect("first");
        let b = cache.bearer_at(t0 + 5_000).await.expect("second");
        // Past (expires_in - margin): the cached token is stale.
        let t_expired = t0 + (3600 - 60) * 1000;
        let c = cache.bearer_at(t_expired).await.expect("third");

        assert_eq!(a, b);
        assert_ne!(b, c);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn margin_shortens_reported_lifetime() {
        let (cache, calls) = counting_cache(61);
        let t0 = 1_700_000_000_000i64;

        let _ = cache.bearer_at(t0).await.expect("first");
        // 61s lifetime minus 60s margin leaves a 1s window.
        let _ = cache.bearer_at(t0 + 999).await.expect("inside window");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let _ = cache.bearer_at(t0 + 1_000).await.expect("outside window");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn exchange_failure_propagates() {
        let cache = TokenCache::new(Box::new(FailingExchanger));
        let err = cache.bearer_at(0).await.expect_err("must fail");
        assert!(err.to_string().contains("reddit auth failed"));
    }
}
