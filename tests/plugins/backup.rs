use lectio::core::error::LectioError;
use lectio::core::namespace::UserId;
use lectio::core::session;
use lectio::core::store::Store;
use lectio::plugins::archive::{self, ArchiveId, ArchivedReading};
use lectio::plugins::backup;
use lectio::plugins::progress;
use lectio::plugins::status::{self, MeditationStatus};
use std::collections::BTreeMap;

fn user(name: &str) -> UserId {
    UserId::new(name).expect("valid user")
}

fn seed(store: &Store, who: &UserId) {
    progress::advance(store, who, 2).expect("advance");
    status::toggle(store, Some(who), 1, MeditationStatus::Good).expect("toggle");
    status::toggle(store, Some(who), 2, MeditationStatus::Ok).expect("toggle");
    archive::put(
        store,
        Some(who),
        &ArchiveId::Day(1),
        &ArchivedReading {
            day: 1,
            date_saved: "2026-02-01T05:30:00.000Z".to_string(),
            reading_reference: "갈라디아서 1-2장".to_string(),
            passage: "바울은 사도 된 것이".to_string(),
            meditation_guide: "천천히 읽으세요".to_string(),
            context: String::new(),
            intention: String::new(),
            context_image_url: None,
        },
    )
    .expect("archive");
}

#[test]
fn backup_contains_only_the_users_namespace_and_pointer() {
    let store = Store::in_memory();
    let grace = user("grace");
    let john = user("john");
    seed(&store, &grace);
    seed(&store, &john);
    session::login(&store, "john").expect("login");
    store.set("reading-content-v9-Galatians12", "{}").expect("cache");

    let document = backup::backup(&store, &grace).expect("backup");
    assert!(document.contains('\n'), "backup is pretty-printed");

    let parsed: BTreeMap<String, String> = serde_json::from_str(&document).expect("flat object");
    assert_eq!(
        parsed.keys().cloned().collect::<Vec<_>>(),
        vec![
            "currentUser",
            "grace_archived-reading-1",
            "grace_lastCompletedDay",
            "grace_meditation-status",
        ]
    );
    assert_eq!(parsed["currentUser"], "grace");
    assert_eq!(parsed["grace_lastCompletedDay"], "2");
}

#[test]
fn backup_then_restore_reproduces_the_namespace() {
    let source = Store::in_memory();
    let grace = user("grace");
    seed(&source, &grace);
    let document = backup::backup(&source, &grace).expect("backup");

    let target = Store::in_memory();
    let report = backup::restore(&target, &grace, &document).expect("restore");
    assert_eq!(report.restored, 4);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.user, grace);

    assert_eq!(
        target.scan_prefix(&grace.key_prefix()).expect("scan"),
        source.scan_prefix(&grace.key_prefix()).expect("scan")
    );
    assert_eq!(session::current_user(&target).expect("read"), Some(grace.clone()));
    assert_eq!(progress::get_progress(&target, &grace).expect("get"), 2);
    assert_eq!(archive::list_all(&target, Some(&grace)).expect("list").len(), 1);
}

#[test]
fn restore_forces_the_pointer_to_the_restoring_user() {
    let store = Store::in_memory();
    let grace = user("grace");
    let mary = user("mary");
    seed(&store, &grace);
    let document = backup::backup(&store, &grace).expect("backup");

    let target = Store::in_memory();
    backup::restore(&target, &mary, &document).expect("restore");
    // Keys land verbatim under the original namespace.
    assert!(target.get("grace_lastCompletedDay").expect("get").is_some());
    assert!(target.get("mary_lastCompletedDay").expect("get").is_none());
    assert_eq!(session::current_user(&target).expect("read"), Some(mary));
}

#[test]
fn malformed_documents_leave_the_store_untouched() {
    let store = Store::in_memory();
    let grace = user("grace");
    seed(&store, &grace);
    let before = store.scan_prefix("").expect("scan");

    for document in ["", "{\"grace_x\": ", "[1, 2]", "\"text\"", "42"] {
        let err = backup::restore(&store, &grace, document).expect_err("malformed");
        assert!(matches!(err, LectioError::MalformedBackup(_)), "{document:?}: {err}");
    }
    assert_eq!(store.scan_prefix("").expect("scan"), before);
}

#[test]
fn non_string_values_are_skipped() {
    let store = Store::in_memory();
    let grace = user("grace");
    let document = r#"{"grace_lastCompletedDay": "5", "grace_meditation-status": {"1": "good"}, "grace_flag": true}"#;
    let report = backup::restore(&store, &grace, document).expect("restore");
    assert_eq!(report.restored, 1);
    assert_eq!(report.skipped, 2);
    assert_eq!(progress::get_progress(&store, &grace).expect("get"), 5);
    assert!(store.get("grace_meditation-status").expect("get").is_none());
}

#[test]
fn storage_failure_mid_restore_keeps_earlier_writes_and_pointer() {
    let store = Store::in_memory_with_quota(100);
    let grace = user("grace");
    let document = serde_json::json!({
        "grace_a": "1",
        "grace_b": "x".repeat(200),
    })
    .to_string();

    let err = backup::restore(&store, &grace, &document).expect_err("over quota");
    assert!(err.is_quota_exceeded(), "{err}");

    assert_eq!(store.get("grace_a").expect("get").as_deref(), Some("1"));
    assert!(store.get("grace_b").expect("get").is_none());
    assert_eq!(session::current_user(&store).expect("pointer"), None);
}
