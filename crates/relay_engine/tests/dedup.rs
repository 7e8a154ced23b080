mod common;

use std::fs;

use pretty_assertions::assert_eq;
use relay_core::{FeedEntry, IdentityKey, PublishRecord};
use relay_engine::DedupStore;
use tempfile::TempDir;

fn record(title: &str) -> PublishRecord {
    PublishRecord {
        source_title: title.to_string(),
        translated_title: format!("[fa]{title}"),
        destination: "https://blog.example/p/1".to_string(),
        sent_at: 1_700_000_000,
        source_link: Some("https://source.example/1".to_string()),
    }
}

#[test]
fn missing_file_loads_empty_without_warning() {
    common::init_logging();
    let temp = TempDir::new().unwrap();
    let loaded = DedupStore::load(temp.path().join("posted.json"));
    assert!(!loaded.is_degraded());
    assert!(loaded.value.is_empty());
}

#[test]
fn record_persists_before_returning() {
    common::init_logging();
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("posted.json");
    let key = IdentityKey::from_hint("x");

    let mut store = DedupStore::load(&path).value;
    assert!(store.record(key.clone(), record("Hello")).unwrap());

    // A fresh load stands in for a process restart right after `record`.
    let reloaded = DedupStore::load(&path);
    assert!(!reloaded.is_degraded());
    assert!(reloaded.value.contains(&key));
    assert_eq!(reloaded.value.get(&key), Some(&record("Hello")));
}

#[test]
fn existing_record_is_never_overwritten() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("posted.json");
    let key = IdentityKey::from_hint("x");

    let mut store = DedupStore::load(&path).value;
    store.record(key.clone(), record("First")).unwrap();
    assert!(!store.record(key.clone(), record("Second")).unwrap());

    let reloaded = DedupStore::load(&path).value;
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded.get(&key).unwrap().source_title, "First");
}

#[test]
fn corrupt_file_degrades_to_empty_with_warning() {
    common::init_logging();
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("posted.json");
    fs::write(&path, "{ not json").unwrap();

    let loaded = DedupStore::load(&path);
    assert!(loaded.is_degraded());
    assert!(loaded.warnings[0].contains("corrupt"));
    assert!(loaded.value.is_empty());

    // The next record replaces the corrupt file with a valid one.
    let mut store = loaded.value;
    store.record(IdentityKey::from_hint("y"), record("Y")).unwrap();
    let reloaded = DedupStore::load(&path);
    assert!(!reloaded.is_degraded());
    assert_eq!(reloaded.value.len(), 1);
}

#[test]
fn empty_file_is_an_empty_store() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("posted.json");
    fs::write(&path, "  \n").unwrap();

    let loaded = DedupStore::load(&path);
    assert!(!loaded.is_degraded());
    assert!(loaded.value.is_empty());
}

#[test]
fn directory_in_place_of_file_is_a_warning_not_an_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("posted.json");
    fs::create_dir(&path).unwrap();

    let loaded = DedupStore::load(&path);
    assert!(loaded.is_degraded());
    assert!(loaded.value.is_empty());
}

#[test]
fn historical_value_shapes_are_accepted() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("posted.json");
    fs::write(
        &path,
        r#"{
            "aaa": true,
            "bbb": 1700000000,
            "ccc": "https://blog.example/p/3",
            "ddd": {"title_de": "Hallo", "title_fa": "سلام", "link": "https://source.example/d", "sent_at": 1700000100}
        }"#,
    )
    .unwrap();

    let store = DedupStore::load(&path).value;
    assert_eq!(store.len(), 4);
    let legacy = store.get(&IdentityKey::from_persisted("ddd")).unwrap();
    assert_eq!(legacy.source_title, "Hallo");
    assert_eq!(legacy.translated_title, "سلام");
    assert_eq!(legacy.sent_at, 1_700_000_100);
    assert_eq!(
        store.get(&IdentityKey::from_persisted("ccc")).unwrap().destination,
        "https://blog.example/p/3"
    );
    assert_eq!(store.get(&IdentityKey::from_persisted("bbb")).unwrap().sent_at, 1_700_000_000);
}

#[test]
fn title_list_state_matches_entries_by_title() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("posted_titles.json");
    fs::write(&path, r#"["First post", "Second post"]"#).unwrap();

    let store = DedupStore::load(&path).value;
    let posted = FeedEntry {
        id: Some("urn:post:2".into()),
        link: Some("https://source.example/second".into()),
        title: Some(" Second post ".into()),
        ..FeedEntry::default()
    };
    let fresh = FeedEntry {
        id: Some("urn:post:3".into()),
        link: Some("https://source.example/third".into()),
        title: Some("Third post".into()),
        ..FeedEntry::default()
    };

    assert!(!store.contains(&IdentityKey::of(&posted)));
    assert!(store.contains_entry(&IdentityKey::of(&posted), &posted));
    assert!(!store.contains_entry(&IdentityKey::of(&fresh), &fresh));
}

#[test]
fn title_match_survives_a_rewrite_of_the_state_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("posted_titles.json");
    fs::write(&path, r#"["First post"]"#).unwrap();

    let mut store = DedupStore::load(&path).value;
    store.record(IdentityKey::from_hint("urn:new"), record("New")).unwrap();

    let reloaded = DedupStore::load(&path).value;
    let posted = FeedEntry {
        id: Some("urn:post:1".into()),
        link: Some("https://source.example/first".into()),
        title: Some("First post".into()),
        ..FeedEntry::default()
    };
    assert!(reloaded.contains_entry(&IdentityKey::of(&posted), &posted));
}

#[test]
fn keyed_state_from_the_webhook_relay_is_honoured() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("posted_titles.json");
    // Key is the hex SHA-1 of the entry id "urn:post:1".
    fs::write(
        &path,
        r#"{
            "4285c17b70a8cece4912a8cf918851d1222aba38": {
                "title_de": "First post",
                "title_fa": "پست اول",
                "link": "https://source.example/first",
                "sent_at": 1700000000
            }
        }"#,
    )
    .unwrap();

    let loaded = DedupStore::load(&path);
    assert!(!loaded.is_degraded());
    let posted = FeedEntry {
        id: Some("urn:post:1".into()),
        link: Some("https://source.example/first".into()),
        title: Some("First post".into()),
        ..FeedEntry::default()
    };
    assert!(loaded.value.contains(&IdentityKey::of(&posted)));
}

#[test]
fn persisted_file_is_a_keyed_json_object() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("posted.json");
    let key = IdentityKey::from_hint("x");

    let mut store = DedupStore::empty(&path);
    store.record(key.clone(), record("Hello")).unwrap();

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let stored = &raw[key.as_str()];
    assert_eq!(stored["source_title"], "Hello");
    assert_eq!(stored["translated_title"], "[fa]Hello");
    assert_eq!(stored["destination"], "https://blog.example/p/1");
    assert_eq!(stored["sent_at"], 1_700_000_000);
}
