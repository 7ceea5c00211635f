use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{Connection, params};
use tempfile::TempDir;

use studylog::{
    config::ProgressConfig,
    core::{ledger::complete_lesson, streak::record_study},
    persist::{PersistError, ProfileSink, sqlite::SqliteProfileStore},
    profile::UserProfile,
    types::parse_study_date,
};

fn studied_profile() -> UserProfile {
    let cfg = ProgressConfig::default();
    let p = UserProfile::member("uid-7", "jisoo@example.com", "ja", DateTime::<Utc>::UNIX_EPOCH);
    let p = complete_lesson(p, "consonants-1", &cfg);
    record_study(p, parse_study_date("2024-02-29").unwrap())
}

fn saved_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 29, 9, 30, 0).unwrap()
}

/// Saves a profile through the store, then swaps the stored payload bytes.
fn store_with_payload(tmp: &TempDir, payload: Vec<u8>) -> SqliteProfileStore {
    let db_path = tmp.path().join("profile.db");
    let mut store = SqliteProfileStore::open(&db_path).expect("open sqlite");
    store.save_profile(&studied_profile(), saved_at()).expect("save");
    drop(store);

    let conn = Connection::open(&db_path).expect("raw open");
    conn.execute("UPDATE profiles SET payload = ?1", params![payload])
        .expect("overwrite payload");
    drop(conn);

    SqliteProfileStore::open(&db_path).expect("reopen")
}

#[test]
fn profile_survives_reopen() {
    let tmp = TempDir::new().expect("tmp");
    let db_path = tmp.path().join("profile.db");

    let profile = studied_profile();
    let mut store = SqliteProfileStore::open(&db_path).expect("open sqlite");
    store.save_profile(&profile, saved_at()).expect("save");
    store.flush().expect("flush");
    drop(store);

    let reopened = SqliteProfileStore::open(&db_path).expect("reopen");
    let loaded = reopened.load_profile().expect("load").expect("profile present");
    assert_eq!(loaded, profile);
    assert_eq!(reopened.saved_at().expect("ts"), Some(saved_at()));
}

#[test]
fn save_overwrites_previous_profile() {
    let mut store = SqliteProfileStore::open_in_memory().expect("open");
    let guest = UserProfile::guest("en", DateTime::<Utc>::UNIX_EPOCH);
    store.save_profile(&guest, DateTime::<Utc>::UNIX_EPOCH).expect("save guest");

    let member = studied_profile();
    store.save_profile(&member, saved_at()).expect("save member");

    let loaded = store.load_profile().expect("load").expect("present");
    assert_eq!(loaded.uid, "uid-7");
    assert_eq!(loaded.total_xp, 25);
    assert_eq!(store.saved_at().expect("ts"), Some(saved_at()));
}

#[test]
fn clear_removes_profile() {
    let mut store = SqliteProfileStore::open_in_memory().expect("open");
    assert_eq!(store.load_profile().expect("load"), None);

    store.save_profile(&studied_profile(), saved_at()).expect("save");
    store.clear_profile().expect("clear");
    assert_eq!(store.load_profile().expect("load"), None);
    assert_eq!(store.saved_at().expect("ts"), None);
}

#[test]
fn unknown_envelope_version_is_rejected() {
    let tmp = TempDir::new().expect("tmp");
    let payload = serde_json::to_vec(&serde_json::json!({
        "format_version": 2,
        "profile": studied_profile(),
    }))
    .expect("encode");
    let store = store_with_payload(&tmp, payload);

    match store.load_profile() {
        Err(PersistError::Message(msg)) => assert!(msg.contains("format version: 2")),
        other => panic!("expected version rejection, got {other:?}"),
    }
}

#[test]
fn bare_profile_payload_still_loads() {
    let tmp = TempDir::new().expect("tmp");
    let payload = serde_json::to_vec(&studied_profile()).expect("encode");
    let store = store_with_payload(&tmp, payload);

    assert_eq!(store.load_profile().expect("load"), Some(studied_profile()));
}

#[test]
fn garbage_payload_is_a_decode_error() {
    let tmp = TempDir::new().expect("tmp");
    let store = store_with_payload(&tmp, b"not json".to_vec());

    assert!(matches!(store.load_profile(), Err(PersistError::Message(_))));
}
