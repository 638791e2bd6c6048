use lectio::core::error::LectioError;
use lectio::core::namespace::UserId;
use lectio::core::store::Store;
use lectio::plugins::archive::{self, ArchiveId, ArchivedReading, NON_SEQUENTIAL_DAY};
use lectio::plugins::content;
use tempfile::tempdir;

fn user(name: &str) -> UserId {
    UserId::new(name).expect("valid user")
}

fn reading(day: i64, reference: &str, passage: &str) -> ArchivedReading {
    ArchivedReading {
        day,
        date_saved: "2026-03-01T06:00:00.000Z".to_string(),
        reading_reference: reference.to_string(),
        passage: passage.to_string(),
        meditation_guide: "Sit with the text.".to_string(),
        context: "Written to churches in Galatia.".to_string(),
        intention: "Rest in grace.".to_string(),
        context_image_url: Some("data:image/png;base64,AAAA".to_string()),
    }
}

#[test]
fn put_strips_image_and_get_round_trips() {
    let store = Store::in_memory();
    let grace = user("grace");
    let original = reading(1, "Galatians 1-2", "Paul, an apostle...");

    archive::put(&store, Some(&grace), &ArchiveId::Day(1), &original).expect("put");

    let raw = store
        .get("grace_archived-reading-1")
        .expect("get")
        .expect("stored under the day key");
    let json: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(json["contextImageUrl"], serde_json::Value::Null);
    assert_eq!(json["readingReference"], "Galatians 1-2");
    assert_eq!(json["dateSaved"], "2026-03-01T06:00:00.000Z");

    let loaded = archive::get(&store, Some(&grace), &ArchiveId::Day(1))
        .expect("get")
        .expect("present");
    assert_eq!(loaded.context_image_url, None);
    assert_eq!(
        loaded,
        ArchivedReading {
            context_image_url: None,
            ..original.clone()
        }
    );
    // Caller's copy is untouched.
    assert!(original.context_image_url.is_some());
}

#[test]
fn manual_readings_use_reference_derived_keys() {
    let store = Store::in_memory();
    let grace = user("grace");
    let id = ArchiveId::manual_for_reference("Galatians 6, Romans 1");
    assert_eq!(id, ArchiveId::Manual("manual-Galatians6Romans1".to_string()));
    assert_eq!(id.day(), None);

    archive::put(
        &store,
        Some(&grace),
        &id,
        &reading(NON_SEQUENTIAL_DAY, "Galatians 6, Romans 1", "..."),
    )
    .expect("put");
    assert!(
        store
            .get("grace_archived-reading-manual-Galatians6Romans1")
            .expect("get")
            .is_some()
    );

    let all = archive::list_all(&store, Some(&grace)).expect("list");
    let stored = all.get(&id).expect("listed under the manual id");
    assert!(!stored.is_sequential());
}

#[test]
fn archive_ids_parse_back_from_key_fragments() {
    assert_eq!(ArchiveId::parse("12"), ArchiveId::Day(12));
    assert_eq!(
        ArchiveId::parse("manual-Romans34"),
        ArchiveId::Manual("manual-Romans34".to_string())
    );
    assert_eq!(ArchiveId::Day(3).to_string(), "3");
}

#[test]
fn list_all_is_scoped_and_skips_malformed_records() {
    let store = Store::in_memory();
    let grace = user("grace");
    let john = user("john");

    archive::put(&store, Some(&grace), &ArchiveId::Day(1), &reading(1, "Galatians 1-2", "a"))
        .expect("put");
    archive::put(&store, Some(&grace), &ArchiveId::Day(2), &reading(2, "Galatians 3-4", "b"))
        .expect("put");
    archive::put(&store, Some(&john), &ArchiveId::Day(1), &reading(1, "Galatians 1-2", "c"))
        .expect("put");
    archive::put(&store, None, &ArchiveId::Day(9), &reading(9, "Romans 11-12", "d"))
        .expect("anonymous put");
    store
        .set("grace_archived-reading-3", "{not json")
        .expect("corrupt record");

    let graces = archive::list_all(&store, Some(&grace)).expect("list");
    assert_eq!(
        graces.keys().cloned().collect::<Vec<_>>(),
        vec![ArchiveId::Day(1), ArchiveId::Day(2)]
    );
    assert_eq!(graces[&ArchiveId::Day(1)].passage, "a");

    let johns = archive::list_all(&store, Some(&john)).expect("list");
    assert_eq!(johns.len(), 1);
    assert_eq!(johns[&ArchiveId::Day(1)].passage, "c");

    let anonymous = archive::list_all(&store, None).expect("list");
    assert_eq!(anonymous.len(), 1);
    assert_eq!(anonymous[&ArchiveId::Day(9)].passage, "d");

    assert_eq!(
        archive::get(&store, Some(&grace), &ArchiveId::Day(3)).expect("get"),
        None
    );
}

#[test]
fn archive_records_without_optional_fields_still_load() {
    let store = Store::in_memory();
    let grace = user("grace");
    store
        .set(
            "grace_archived-reading-4",
            r#"{"day":4,"dateSaved":"2026-01-01T00:00:00Z","readingReference":"Romans 1-2","passage":"p","meditationGuide":"m"}"#,
        )
        .expect("set");
    let loaded = archive::get(&store, Some(&grace), &ArchiveId::Day(4))
        .expect("get")
        .expect("present");
    assert_eq!(loaded.context, "");
    assert_eq!(loaded.context_image_url, None);
}

#[test]
fn quota_pressure_evicts_content_cache_and_retries_once() {
    let store = Store::in_memory_with_quota(1_000);
    let grace = user("grace");

    store
        .set(&content::cache_key("Galatians 1-2"), &"c".repeat(400))
        .expect("cache entry");
    store
        .set(&content::cache_key("Galatians 3-4"), &"c".repeat(300))
        .expect("cache entry");
    store
        .set("reading-content-v8-OldEntry", &"c".repeat(50))
        .expect("old cache generation");

    let big = reading(1, "Galatians 1-2", &"p".repeat(400));
    archive::put(&store, Some(&grace), &ArchiveId::Day(1), &big).expect("put after eviction");

    assert!(store.scan_prefix("reading-content-v").expect("scan").is_empty());
    assert!(
        archive::get(&store, Some(&grace), &ArchiveId::Day(1))
            .expect("get")
            .is_some()
    );
}

#[test]
fn eviction_keeps_keys_that_only_look_like_cache() {
    let store = Store::in_memory_with_quota(1_000);
    let grace = user("grace");

    // Keys restored verbatim from a document can share the cache marker
    // without having the cache shape.
    store
        .set("reading-content-v9_lastCompletedDay", "7")
        .expect("lookalike progress");
    store
        .set("reading-content-v9_archived-reading-7", "{\"day\":7}")
        .expect("lookalike archive");
    store
        .set("reading-content-vX-Romans12", "kept")
        .expect("non-numeric version");
    store
        .set(&content::cache_key("Galatians 1-2"), &"c".repeat(600))
        .expect("cache entry");

    let big = reading(1, "Galatians 1-2", &"p".repeat(400));
    archive::put(&store, Some(&grace), &ArchiveId::Day(1), &big).expect("put after eviction");

    assert!(store.get(&content::cache_key("Galatians 1-2")).expect("get").is_none());
    assert_eq!(
        store
            .get("reading-content-v9_lastCompletedDay")
            .expect("get")
            .as_deref(),
        Some("7")
    );
    assert!(
        store
            .get("reading-content-v9_archived-reading-7")
            .expect("get")
            .is_some()
    );
    assert!(store.get("reading-content-vX-Romans12").expect("get").is_some());
}

#[test]
fn cache_key_shape_is_strict() {
    assert!(content::is_cache_key("reading-content-v9-Galatians12"));
    assert!(content::is_cache_key("reading-content-v10-Romans12"));
    assert!(!content::is_cache_key("reading-content-v9_lastCompletedDay"));
    assert!(!content::is_cache_key("reading-content-v-Romans12"));
    assert!(!content::is_cache_key("reading-content-v9"));
    assert!(!content::is_cache_key("grace_reading-content-v9-Romans12"));
}

#[test]
fn non_canonical_day_fragments_stay_distinct() {
    let store = Store::in_memory();
    let grace = user("grace");
    archive::put(&store, Some(&grace), &ArchiveId::Day(7), &reading(7, "Romans 5-6", "seven"))
        .expect("put");
    store
        .set(
            "grace_archived-reading-007",
            &serde_json::to_string(&reading(7, "Romans 5-6", "padded")).expect("json"),
        )
        .expect("restored key");

    assert_eq!(ArchiveId::parse("007"), ArchiveId::Manual("007".to_string()));
    assert_eq!(ArchiveId::parse("+5"), ArchiveId::Manual("+5".to_string()));

    let all = archive::list_all(&store, Some(&grace)).expect("list");
    assert_eq!(all.len(), 2);
    for (id, listed) in &all {
        let fetched = archive::get(&store, Some(&grace), id)
            .expect("get")
            .expect("every listed id resolves");
        assert_eq!(&fetched, listed);
    }
    assert_eq!(all[&ArchiveId::Day(7)].passage, "seven");
}

#[test]
fn quota_failure_after_eviction_propagates() {
    let store = Store::in_memory_with_quota(300);
    let grace = user("grace");
    store
        .set(&content::cache_key("Romans 1-2"), &"c".repeat(100))
        .expect("cache entry");

    let huge = reading(1, "Galatians 1-2", &"p".repeat(1_000));
    let err = archive::put(&store, Some(&grace), &ArchiveId::Day(1), &huge)
        .expect_err("still too large");
    assert!(matches!(err, LectioError::QuotaExceeded { quota: 300, .. }));

    // The cache was still sacrificed, the archive was not written.
    assert!(store.get(&content::cache_key("Romans 1-2")).expect("get").is_none());
    assert!(
        archive::get(&store, Some(&grace), &ArchiveId::Day(1))
            .expect("get")
            .is_none()
    );
}

#[test]
fn sqlite_archive_survives_reopen() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("lectio.db");
    let grace = user("grace");
    {
        let store = Store::sqlite(&path, None).expect("open");
        archive::put(&store, Some(&grace), &ArchiveId::Day(5), &reading(5, "Romans 3-4", "x"))
            .expect("put");
    }
    let store = Store::sqlite(&path, None).expect("reopen");
    let all = archive::list_all(&store, Some(&grace)).expect("list");
    assert_eq!(all.len(), 1);
    assert_eq!(all[&ArchiveId::Day(5)].reading_reference, "Romans 3-4");
}

#[test]
fn remove_deletes_one_slot() {
    let store = Store::in_memory();
    let grace = user("grace");
    archive::put(&store, Some(&grace), &ArchiveId::Day(1), &reading(1, "Galatians 1-2", "a"))
        .expect("put");
    archive::remove(&store, Some(&grace), &ArchiveId::Day(1)).expect("remove");
    assert!(archive::list_all(&store, Some(&grace)).expect("list").is_empty());
}
