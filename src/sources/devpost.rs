// src/sources/devpost.rs
//! Devpost has no public search API; this source scrapes the software search
//! page. Two strategies: the gallery card structure first, then a loose
//! anchor scan for `/software/` links when the markup shifts under us.

use std::collections::HashSet;

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::sources::types::{ContentItem, ContentQuery, ContentSource, Platform};
use crate::sources::{http_client, normalize_snippet, BROWSER_UA};

const SEARCH_URL: &str = "https://devpost.com/software/search";
const MAX_ITEMS: usize = 8;

/// Devpost hackathon project showcase.
pub struct DevpostSource {
    http: reqwest::Client,
}

impl DevpostSource {
    pub fn new() -> Self {
        Self {
            http: http_client(BROWSER_UA),
        }
    }
}

impl Default for DevpostSource {
    fn default() -> Self {
        Self::new()
    }
}

fn re_card() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<a[^>]+href="(?P<href>[^"]*/software/[^"]*)"[^>]*>(?P<body>.*?)</a>"#)
            .unwrap()
    })
}

fn re_title_class() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)class="[^"]*(?:software-entry-name|entry-title)[^"]*"[^>]*>(?P<t>[^<]*)"#)
            .unwrap()
    })
}

fn re_title_heading() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?is)<h[45][^>]*>(?P<t>.*?)</h[45]>").unwrap())
}

fn re_tagline_class() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)class="[^"]*tagline[^"]*"[^>]*>(?P<t>[^<]*)"#).unwrap()
    })
}

fn re_tagline_p() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?is)<p[^>]*>(?P<t>.*?)</p>").unwrap())
}

fn re_plain_link() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<a[^>]+href="(?P<href>[^"]*/software/[^"]*)"[^>]*>(?P<text>[^<]+)</a>"#)
            .unwrap()
    })
}

fn absolutize(href: &str) -> Option<String> {
    if href.contains("/software/search") {
        return None;
    }
    if href.starts_with("http") {
        Some(href.to_string())
    } else if href.starts_with('/') {
        Some(format!("https://devpost.com{href}"))
    } else {
        None
    }
}

/// Primary strategy: project cards (anchor wrapping name + tagline).
fn parse_entry_cards(html: &str, interest: &str) -> Vec<ContentItem> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for card in re_card().captures_iter(html) {
        if out.len() >= MAX_ITEMS {
            break;
        }
        let url = match absolutize(&card["href"]) {
            Some(u) => u,
            None => continue,
        };
        if !seen.insert(url.clone()) {
            continue;
        }

        let body = &card["body"];
        let title_raw = re_title_class()
            .captures(body)
            .or_else(|| re_title_heading().captures(body))
            .map(|c| c["t"].to_string())
            .unwrap_or_default();
        let title = normalize_snippet(&title_raw);
        if title.is_empty() {
            continue;
        }

        let tagline_raw = re_tagline_class()
            .captures(body)
            .or_else(|| re_tagline_p().captures(body))
            .map(|c| c["t"].to_string())
            .unwrap_or_default();
        let mut text = normalize_snippet(&tagline_raw);
        if text.is_empty() {
            text = format!("A project related to {interest}");
        }

        out.push(ContentItem {
            title,
            text,
            url,
            source: Platform::Devpost,
        });
    }

    out
}

/// Fallback strategy: any plain-text anchor pointing at a project page.
fn parse_software_links(html: &str, interest: &str) -> Vec<ContentItem> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for link in re_plain_link().captures_iter(html) {
        if out.len() >= MAX_ITEMS {
            break;
        }
        let url = match absolutize(&link["href"]) {
            Some(u) => u,
            None => continue,
        };
        if !seen.insert(url.clone()) {
            continue;
        }

        let title = normalize_snippet(&link["text"]);
        if title.chars().count() <= 2 {
            continue;
        }

        out.push(ContentItem {
            title,
            text: format!("Hackathon project related to {interest}"),
            url,
            source: Platform::Devpost,
        });
    }

    out
}

/// Parse a search results page. Unrecognizable markup yields an empty list.
pub fn parse_search_page(html: &str, interest: &str) -> Vec<ContentItem> {
    let items = parse_entry_cards(html, interest);
    if !items.is_empty() {
        return items;
    }
    parse_software_links(html, interest)
}

#[async_trait]
impl ContentSource for DevpostSource {
    async fn fetch(&self, query: &ContentQuery) -> Result<Vec<ContentItem>> {
        let t0 = std::time::Instant::now();

        let resp = self
            .http
            .get(SEARCH_URL)
            .query(&[("query", query.interest.as_str())])
            .send()
            .await
            .context("devpost search request")?;

        if !resp.status().is_success() {
            tracing::warn!(status = %resp.status(), source = "devpost", "non-success search response");
            return Ok(Vec::new());
        }

        let html = match resp.text().await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(error = ?e, source = "devpost", "failed to read search page");
                return Ok(Vec::new());
            }
        };
        let items = parse_search_page(&html, &query.interest);
        if items.is_empty() {
            tracing::warn!(source = "devpost", "no projects recognized in search page");
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("source_fetch_ms").record(ms);
        counter!("source_items_total").increment(items.len() as u64);

        Ok(items)
    }

    fn platform(&self) -> Platform {
        Platform::Devpost
    }
}
