//! Integration tests for vault files and the profile store.

use std::fs;

use botvault::crypto::KdfParams;
use botvault::errors::BotVaultError;
use botvault::vault::atomic;
use botvault::vault::files::{create_file_with, load_file_with, replace_file_with};
use botvault::vault::{BotDraft, Configuration, ProfileStore, VaultCipher};
use tempfile::TempDir;
use uuid::Uuid;

fn cheap() -> VaultCipher {
    VaultCipher::with_params(KdfParams {
        memory_kib: 1_024,
        iterations: 1,
        parallelism: 1,
    })
}

fn draft(name: &str) -> BotDraft {
    BotDraft {
        name: name.into(),
        ..BotDraft::default()
    }
}

/// Helper: a fresh vault `bots.vault` inside a fresh temp dir.
fn new_store() -> (TempDir, ProfileStore) {
    let dir = TempDir::new().expect("create temp dir");
    let store = ProfileStore::create_with(cheap(), dir.path(), "bots.vault", "pw").expect("create");
    (dir, store)
}

// ---------------------------------------------------------------------------
// File wrappers
// ---------------------------------------------------------------------------

#[test]
fn create_load_replace_roundtrip() {
    let dir = TempDir::new().unwrap();
    let cipher = cheap();

    let path = create_file_with(&cipher, dir.path(), "a.vault", "pw", "first").unwrap();
    assert_eq!(load_file_with(&cipher, "pw", &path).unwrap().as_str(), "first");

    replace_file_with(&cipher, &path, "second", "pw").unwrap();
    assert_eq!(load_file_with(&cipher, "pw", &path).unwrap().as_str(), "second");
}

#[test]
fn create_never_overwrites() {
    let dir = TempDir::new().unwrap();
    let cipher = cheap();
    create_file_with(&cipher, dir.path(), "a.vault", "pw", "first").unwrap();

    let result = create_file_with(&cipher, dir.path(), "a.vault", "pw", "second");
    assert!(matches!(result, Err(BotVaultError::AlreadyExists(_))));
}

#[test]
fn load_missing_file_is_not_found() {
    let dir = TempDir::new().unwrap();
    let result = load_file_with(&cheap(), "pw", &dir.path().join("nope.vault"));
    assert!(matches!(result, Err(BotVaultError::VaultNotFound(_))));
}

#[test]
fn decrypted_non_configuration_is_invalid_vault() {
    let dir = TempDir::new().unwrap();
    let cipher = cheap();
    create_file_with(&cipher, dir.path(), "a.vault", "pw", r#"{"valid":false}"#).unwrap();
    create_file_with(&cipher, dir.path(), "b.vault", "pw", "hello").unwrap();

    for name in ["a.vault", "b.vault"] {
        let result = ProfileStore::load_with(cipher, &dir.path().join(name), "pw");
        assert!(matches!(result, Err(BotVaultError::InvalidVault)), "{name}");
    }
}

// ---------------------------------------------------------------------------
// Atomic replace
// ---------------------------------------------------------------------------

#[test]
fn interrupted_replace_leaves_old_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bots.vault");
    fs::write(&path, b"old contents").unwrap();

    let staged = atomic::stage(&path, b"new contents").unwrap();
    let tmp = staged.temp_path().to_path_buf();
    assert!(tmp.exists());
    drop(staged);

    assert_eq!(fs::read(&path).unwrap(), b"old contents");
    assert!(!tmp.exists());
}

#[test]
fn committed_replace_swaps_contents() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bots.vault");
    fs::write(&path, b"old contents").unwrap();

    atomic::stage(&path, b"new contents").unwrap().commit().unwrap();
    assert_eq!(fs::read(&path).unwrap(), b"new contents");
}

// ---------------------------------------------------------------------------
// Profile store
// ---------------------------------------------------------------------------

#[test]
fn create_bot_persists_and_reopens() {
    let (_dir, mut store) = new_store();

    let id = store.create_bot(draft("Farmer1")).unwrap();

    let reopened = ProfileStore::load_with(cheap(), store.path(), "pw").unwrap();
    assert_eq!(reopened.bot_count(), 1);
    let bot = reopened.bot(id).expect("bot persisted");
    assert_eq!(bot.name, "Farmer1");
    assert_eq!(bot.totp_secret(), None);
}

#[test]
fn ids_are_unique_and_stable() {
    let (_dir, mut store) = new_store();
    let a = store.create_bot(draft("Farmer1")).unwrap();
    let b = store.create_bot(draft("Farmer1")).unwrap();
    assert_ne!(a, b);

    let mut renamed = store.bot(a).unwrap().clone();
    renamed.name = "Farmer9".into();
    store.update_bot(renamed).unwrap();

    let ids: Vec<Uuid> = store.bots().iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![a, b], "update keeps id and position");
    assert_eq!(store.bot(a).unwrap().name, "Farmer9");
}

#[test]
fn update_with_same_profile_is_idempotent() {
    let (_dir, mut store) = new_store();
    let id = store.create_bot(draft("Farmer1")).unwrap();
    let before = store.configuration().clone();

    let same = store.bot(id).unwrap().clone();
    store.update_bot(same).unwrap();

    assert_eq!(store.configuration(), &before);
}

#[test]
fn remove_bot_twice() {
    let (_dir, mut store) = new_store();
    let id = store.create_bot(draft("Farmer1")).unwrap();

    assert!(store.remove_bot(id).unwrap());
    assert!(!store.remove_bot(id).unwrap());

    let reopened = ProfileStore::load_with(cheap(), store.path(), "pw").unwrap();
    assert_eq!(reopened.configuration(), &Configuration::empty());
}

#[test]
fn invalid_totp_secret_is_rejected() {
    let (_dir, mut store) = new_store();
    let result = store.create_bot(BotDraft {
        name: "Farmer1".into(),
        totp_secret: Some("not base32!".into()),
        ..BotDraft::default()
    });
    assert!(matches!(result, Err(BotVaultError::InvalidTotpSecret(_))));
    assert_eq!(store.bot_count(), 0);
}

#[test]
fn unknown_fields_survive_a_save() {
    let dir = TempDir::new().unwrap();
    let cipher = cheap();
    let id = Uuid::new_v4();
    let payload = format!(
        r#"{{"valid":true,"theme":"dark","bots":[{{"id":"{id}","name":"Farmer1","ghostIp":"10.0.0.1"}}]}}"#
    );
    let path = create_file_with(&cipher, dir.path(), "a.vault", "pw", &payload).unwrap();

    let mut store = ProfileStore::load_with(cipher, &path, "pw").unwrap();
    store.create_bot(draft("Farmer2")).unwrap();

    let saved = load_file_with(&cipher, "pw", &path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(json["theme"], "dark");
    assert_eq!(json["bots"][0]["ghostIp"], "10.0.0.1");
    assert_eq!(json["bots"][1]["name"], "Farmer2");
}

#[test]
fn wrong_password_cannot_load() {
    let (_dir, store) = new_store();
    let result = ProfileStore::load_with(cheap(), store.path(), "not-pw");
    assert!(matches!(result, Err(BotVaultError::AuthFailure)));
}

#[test]
fn farmer1_with_default_parameters() {
    let dir = TempDir::new().unwrap();
    let mut store = ProfileStore::create(dir.path(), "farm.start-openkore-latam", "abc123").unwrap();
    let id = store.create_bot(draft("Farmer1")).unwrap();
    let path = store.path().to_path_buf();
    store.lock();

    let reopened = ProfileStore::load(&path, "abc123").unwrap();
    assert_eq!(reopened.bots().len(), 1);
    assert_eq!(reopened.bots()[0].id, id);
    assert_eq!(reopened.bots()[0].name, "Farmer1");
}
