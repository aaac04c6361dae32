//! User store integration tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use common::AppError;
use domain::User;
use user_store_lib::{Store, UserTable};

async fn open_store() -> (tempfile::TempDir, Store) {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open_path(dir.path().join("users.json")).await.unwrap();
    (dir, store)
}

fn ann() -> User {
    User::new("Ann", "ann@example.org", "secret123")
}

fn bob() -> User {
    User::new("Ann", "bob@example.org", "secret123")
}

#[tokio::test]
async fn test_create_then_get() {
    let (_dir, store) = open_store().await;
    let repo = store.user();

    let created = repo.create(ann()).await.unwrap();
    let fetched = repo.get(&created.id.to_string()).await.unwrap();

    assert_eq!(fetched.display_name, "Ann");
    assert_eq!(fetched.email, "ann@example.org");
    assert!(fetched.password.is_empty());
    assert_ne!(fetched.encrypted_password, "secret123");
    assert!(fetched.verify_password("secret123"));
}

#[tokio::test]
async fn test_example_scenario() {
    let (_dir, store) = open_store().await;
    let repo = store.user();

    let first = repo.create(ann()).await.unwrap();
    assert_eq!(first.id, 1);
    let sanitized = first.sanitized();
    assert!(sanitized.encrypted_password.is_empty());

    let second = repo.create(bob()).await.unwrap();
    assert_eq!(second.id, 2);

    repo.delete("1").await.unwrap();
    assert!(repo.get("1").await.unwrap_err().is_not_found());
    assert_eq!(repo.get("2").await.unwrap().email, "bob@example.org");
}

#[tokio::test]
async fn test_get_unknown_id_is_not_found() {
    let (_dir, store) = open_store().await;
    let repo = store.user();

    assert!(matches!(repo.get("42").await, Err(AppError::NotFound)));
    assert!(matches!(repo.get("not-a-number").await, Err(AppError::NotFound)));
}

#[tokio::test]
async fn test_delete_removes_from_listing() {
    let (_dir, store) = open_store().await;
    let repo = store.user();
    repo.create(ann()).await.unwrap();
    repo.create(bob()).await.unwrap();

    repo.delete("1").await.unwrap();

    let users = repo.search_users().await.unwrap();
    assert_eq!(users.keys().collect::<Vec<_>>(), vec!["2"]);
    assert!(repo.delete("1").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_update_changes_only_display_name() {
    let (_dir, store) = open_store().await;
    let repo = store.user();
    let before = repo.create(ann()).await.unwrap();

    let after = repo.update("1", "NewName".to_string()).await.unwrap();

    assert_eq!(after.display_name, "NewName");
    assert_eq!(after.id, before.id);
    assert_eq!(after.created_at, before.created_at);
    assert_eq!(after.email, before.email);
    assert_eq!(after.encrypted_password, before.encrypted_password);
    assert_eq!(repo.get("1").await.unwrap(), after);
}

#[tokio::test]
async fn test_update_unknown_id_is_not_found() {
    let (_dir, store) = open_store().await;

    let err = store.user().update("7", "Ghost".to_string()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_create_rejects_invalid_input() {
    let (_dir, store) = open_store().await;
    let repo = store.user();

    for candidate in [
        User::new("", "ann@example.org", "secret123"),
        User::new("Ann", "invalid", "secret123"),
        User::new("Ann", "ann@example.org", ""),
        User::new("Ann", "ann@example.org", "short"),
    ] {
        let err = repo.create(candidate).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "got {:?}", err);
    }
    assert_eq!(repo.count().await.unwrap(), 0);

    // Rejected candidates never consume an id
    assert_eq!(repo.create(ann()).await.unwrap().id, 1);
}

#[tokio::test]
async fn test_ids_are_not_reused_after_delete() {
    let (_dir, store) = open_store().await;
    let repo = store.user();
    repo.create(ann()).await.unwrap();
    repo.create(bob()).await.unwrap();

    repo.delete("1").await.unwrap();
    let third = repo.create(ann()).await.unwrap();

    assert_eq!(third.id, 3);
    assert_eq!(repo.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");

    let listing = {
        let store = Store::open_path(&path).await.unwrap();
        let repo = store.user();
        repo.create(ann()).await.unwrap();
        repo.create(bob()).await.unwrap();
        repo.search_users().await.unwrap()
    };

    let reopened = Store::open_path(&path).await.unwrap();
    let repo = reopened.user();
    assert_eq!(repo.search_users().await.unwrap(), listing);
    assert!(listing.values().all(|u| u.encrypted_password.starts_with("$argon2")));

    let raw: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(raw["last_id"], 2);
    assert_eq!(raw["users"]["1"]["email"], "ann@example.org");
    assert!(raw["users"]["1"].get("password").is_none());
    assert!(raw["users"]["1"]["encrypted_password"].is_string());
}

#[tokio::test]
async fn test_reopened_store_continues_numbering() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");

    {
        let store = Store::open_path(&path).await.unwrap();
        let repo = store.user();
        repo.create(ann()).await.unwrap();
        repo.create(bob()).await.unwrap();
        repo.delete("2").await.unwrap();
    }

    let store = Store::open_path(&path).await.unwrap();
    assert_eq!(store.user().create(bob()).await.unwrap().id, 3);
}

#[tokio::test]
async fn test_legacy_file_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");

    let mut user = ann();
    user.id = 5;
    user.before_create().unwrap();
    let mut legacy = BTreeMap::new();
    legacy.insert("5".to_string(), user);
    std::fs::write(&path, serde_json::to_vec(&legacy).unwrap()).unwrap();

    let store = Store::open_path(&path).await.unwrap();
    let repo = store.user();
    assert_eq!(repo.get("5").await.unwrap().display_name, "Ann");
    assert_eq!(repo.create(bob()).await.unwrap().id, 6);
}

#[tokio::test]
async fn test_open_rejects_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");
    std::fs::write(&path, b"{ not json").unwrap();

    let err = Store::open_path(&path).await.err().unwrap();
    assert!(matches!(err, AppError::Serialization(_)));
}

#[tokio::test]
async fn test_user_repository_is_memoized() {
    let (_dir, store) = open_store().await;

    let a = Arc::as_ptr(&store.user()) as *const ();
    let b = Arc::as_ptr(&store.user()) as *const ();
    assert_eq!(a, b);

    store.user().create(ann()).await.unwrap();
    assert_eq!(store.user().count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_reload_picks_up_external_edit() {
    let (_dir, store) = open_store().await;
    let repo = store.user();
    repo.create(ann()).await.unwrap();

    let mut table = UserTable::default();
    let mut outsider = bob();
    outsider.before_create().unwrap();
    table.insert(outsider);
    table.insert(ann());
    std::fs::write(store.path(), table.to_vec().unwrap()).unwrap();

    store.reload().await.unwrap();
    assert_eq!(repo.count().await.unwrap(), 2);
    assert_eq!(repo.get("1").await.unwrap().email, "bob@example.org");
}

#[tokio::test]
async fn test_reload_fails_when_file_vanishes() {
    let (_dir, store) = open_store().await;
    store.user().create(ann()).await.unwrap();
    std::fs::remove_file(store.path()).unwrap();

    assert!(matches!(store.reload().await, Err(AppError::Io(_))));
    // Memory is untouched by the failed reload
    assert_eq!(store.user().count().await.unwrap(), 1);

    store.save().await.unwrap();
    assert!(store.path().exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_creates_get_distinct_ids() {
    let (_dir, store) = open_store().await;
    let repo = store.user();

    let tasks = (0..50).map(|i| {
        let repo = repo.clone();
        tokio::spawn(async move {
            repo.create(User::new(
                format!("User {}", i),
                format!("user{}@example.org", i),
                "secret123",
            ))
            .await
        })
    });
    let results = futures::future::join_all(tasks).await;

    let ids: HashSet<u64> = results
        .into_iter()
        .map(|joined| joined.unwrap().unwrap().id)
        .collect();
    assert_eq!(ids, (1..=50).collect::<HashSet<_>>());

    for id in 1..=50u64 {
        assert!(repo.get(&id.to_string()).await.is_ok());
    }

    store.reload().await.unwrap();
    assert_eq!(repo.count().await.unwrap(), 50);
}
