use relay_core::{FeedEntry, IdentityKey};

fn entry(id: Option<&str>, link: Option<&str>, title: Option<&str>) -> FeedEntry {
    FeedEntry {
        id: id.map(str::to_string),
        link: link.map(str::to_string),
        title: title.map(str::to_string),
        ..FeedEntry::default()
    }
}

#[test]
fn key_is_stable_across_calls() {
    let e = entry(Some("urn:1"), Some("https://a.example/1"), Some("One"));
    assert_eq!(IdentityKey::of(&e), IdentityKey::of(&e.clone()));
    assert_eq!(IdentityKey::of(&e).as_str().len(), 40);
}

#[test]
fn id_takes_priority_over_link_and_title() {
    let a = entry(Some("x"), Some("https://a.example/1"), Some("One"));
    let b = entry(Some("x"), Some("https://b.example/2"), Some("Two"));
    assert_eq!(IdentityKey::of(&a), IdentityKey::of(&b));
    assert_eq!(IdentityKey::of(&a), IdentityKey::from_hint("x"));
}

#[test]
fn blank_id_falls_through_to_link_then_title() {
    let by_link = entry(Some("  "), Some("https://a.example/1"), Some("One"));
    assert_eq!(
        IdentityKey::of(&by_link),
        IdentityKey::from_hint("https://a.example/1")
    );

    let by_title = entry(None, None, Some("One"));
    assert_eq!(IdentityKey::of(&by_title), IdentityKey::from_hint("One"));
}

#[test]
fn entries_differing_in_all_fields_get_different_keys() {
    let a = entry(Some("a"), Some("https://a.example"), Some("A"));
    let b = entry(Some("b"), Some("https://b.example"), Some("B"));
    assert_ne!(IdentityKey::of(&a), IdentityKey::of(&b));
}

#[test]
fn entry_without_identity_fields_uses_a_dump() {
    let a = FeedEntry {
        summary_html: Some("<p>only a body</p>".into()),
        ..FeedEntry::default()
    };
    let b = FeedEntry {
        summary_html: Some("<p>another body</p>".into()),
        ..FeedEntry::default()
    };
    assert_eq!(IdentityKey::of(&a), IdentityKey::of(&a.clone()));
    assert_ne!(IdentityKey::of(&a), IdentityKey::of(&b));
}

#[test]
fn digest_matches_keys_of_existing_state_files() {
    assert_eq!(
        IdentityKey::from_hint("urn:post:1").as_str(),
        "4285c17b70a8cece4912a8cf918851d1222aba38"
    );
    let e = entry(Some("urn:post:1"), Some("https://source.example/first"), Some("First post"));
    assert_eq!(IdentityKey::of(&e), IdentityKey::from_persisted("4285c17b70a8cece4912a8cf918851d1222aba38"));
}
