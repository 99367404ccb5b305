// src/sources/mod.rs
pub mod devpost;
pub mod devto;
pub mod hackernews;
pub mod reddit;
pub mod token;
pub mod types;

use std::time::Duration;

/// User-Agent for the JSON platform APIs.
pub(crate) const SERVICE_UA: &str = "idea-forge/1.0 (+github.com/lumlich/idea-forge)";

/// Devpost serves a different page skeleton to obvious bots; use a browser UA.
pub(crate) const BROWSER_UA: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Shared client builder: bounded connect + total timeouts so one slow
/// platform cannot stall the whole aggregation.
pub(crate) fn http_client(user_agent: &str) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(4))
        .timeout(Duration::from_secs(10))
        .build()
        .expect("reqwest client")
}

/// Normalize platform text: decode entities, strip tags, collapse whitespace.
pub fn normalize_snippet(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // 5) Length cap: 1500 chars
    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_snippet_decodes_and_collapses() {
        let s = "  I built&nbsp;a <b>tool</b> for\n\n devs  ";
        assert_eq!(normalize_snippet(s), "I built a tool for devs");
    }

    #[test]
    fn normalize_snippet_caps_length() {
        let s = "x".repeat(2000);
        assert_eq!(normalize_snippet(&s).chars().count(), 1500);
    }

    #[test]
    fn normalize_snippet_keeps_plain_text() {
        assert_eq!(normalize_snippet("plain text."), "plain text.");
    }
}
