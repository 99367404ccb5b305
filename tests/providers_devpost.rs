// tests/providers_devpost.rs
use idea_forge::sources::devpost::parse_search_page;
use idea_forge::sources::types::Platform;
use std::fs;

#[test]
fn parses_gallery_cards() {
    let html = fs::read_to_string("tests/fixtures/devpost_search.html").expect("fixture");
    let items = parse_search_page(&html, "budgeting");

    // Five cards plus pagination: one duplicate url, one without a title.
    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|i| i.source == Platform::Devpost));

    assert_eq!(items[0].title, "StudyBuddy AI");
    assert_eq!(items[0].url, "https://devpost.com/software/studybuddy-ai");

    // Relative hrefs get the site prefix.
    assert_eq!(items[1].url, "https://devpost.com/software/greenroute");
    assert!(
        items[1].text.contains("Split bills & settle"),
        "entities must be decoded: {}",
        items[1].text
    );

    // No tagline on the card: filler text mentioning the interest.
    assert_eq!(items[2].title, "PocketLedger");
    assert_eq!(items[2].text, "A project related to budgeting");
}

#[test]
fn falls_back_to_plain_links() {
    let html = fs::read_to_string("tests/fixtures/devpost_links_only.html").expect("fixture");
    let items = parse_search_page(&html, "budgeting");

    // Six anchors: one duplicate, one pagination link, one too-short label.
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].title, "EcoTracker");
    assert_eq!(items[1].url, "https://devpost.com/software/splitwiser");
    assert!(items
        .iter()
        .all(|i| i.text == "Hackathon project related to budgeting"));
}

#[test]
fn unrecognizable_markup_yields_empty() {
    let items = parse_search_page("<html><body><h1>Maintenance</h1></body></html>", "budgeting");
    assert!(items.is_empty());
}
