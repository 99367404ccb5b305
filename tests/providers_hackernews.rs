// tests/providers_hackernews.rs
use idea_forge::sources::hackernews::parse_search_response;
use idea_forge::sources::types::Platform;
use std::fs;

#[test]
fn parses_algolia_fixture() {
    let json = fs::read_to_string("tests/fixtures/hn_search.json").expect("fixture");
    let items = parse_search_response(&json).expect("ok");

    // Four hits; one too short, one untitled.
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|i| i.source == Platform::HackerNews));

    assert_eq!(
        items[0].title,
        "Show HN: Dispatch – a self-hosted standup bot for remote teams"
    );
    assert_eq!(items[0].url, "https://getdispatch.app");
    assert!(
        !items[0].text.contains('<'),
        "story html must be stripped: {}",
        items[0].text
    );

    // Ask HN posts carry no external url; the discussion link fills in.
    assert_eq!(items[1].url, "https://news.ycombinator.com/item?id=41089251");
    assert!(
        items[1].text.contains("Notion, plain text files, a wiki 'graveyard'"),
        "entities must be decoded: {}",
        items[1].text
    );
}

#[test]
fn malformed_payload_is_an_error() {
    assert!(parse_search_response("<!doctype html><p>rate limited</p>").is_err());
}

#[test]
fn empty_hits_parse_to_empty() {
    let items = parse_search_response(r#"{"hits": []}"#).expect("ok");
    assert!(items.is_empty());
}
