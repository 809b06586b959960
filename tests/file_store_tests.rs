// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! File-backed session store tests.

use serde_json::json;
use slm_agent_session::db::{keys, LocalStore};
use slm_agent_session::models::User;

mod common;
use common::{sample_agents, session_service_with_store, spawn_agent_api};

fn agent() -> User {
    serde_json::from_value(json!({
        "id": 7,
        "name": "Nguyen Van A",
        "phone": "0977879291",
        "gender": "male"
    }))
    .unwrap()
}

#[tokio::test]
async fn test_missing_file_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::open_file(dir.path().join("session.json"));

    assert!(store.get_user().await.unwrap().is_none());
    assert!(store.get_last_phone().await.unwrap().is_none());
}

#[tokio::test]
async fn test_entries_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("session.json");

    let store = LocalStore::open_file(&path);
    store.set_user(&agent()).await.unwrap();
    store.set_last_phone("0977879291").await.unwrap();
    drop(store);

    let reopened = LocalStore::open_file(&path);
    assert_eq!(reopened.get_user().await.unwrap(), Some(agent()));
    assert_eq!(
        reopened.get_last_phone().await.unwrap().as_deref(),
        Some("0977879291")
    );
    assert!(!dir.path().join("nested").join("session.tmp").exists());
}

#[tokio::test]
async fn test_corrupt_file_is_storage_fault() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, b"not json").unwrap();

    let store = LocalStore::open_file(&path);
    let err = store.get_raw(keys::USER).await.unwrap_err();
    assert!(err.is_storage_fault());
}

#[tokio::test]
async fn test_logout_on_disk_keeps_last_phone() {
    let api = spawn_agent_api(sample_agents()).await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let service = session_service_with_store(&api.base_url, LocalStore::open_file(&path));

    service.authenticate("0977879291", "abc123").await.unwrap();
    service.end_session().await.unwrap();

    let doc: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert!(doc.get(keys::USER).is_none());
    assert!(doc.get(keys::LAST_ROLE).is_none());
    assert_eq!(doc[keys::LAST_PHONE], "0977879291");
}

#[tokio::test]
async fn test_concurrent_writes_are_not_lost() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::open_file(dir.path().join("session.json"));

    let mut handles = Vec::new();
    for i in 0..16 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.set_raw(&format!("k{}", i), "v").await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    for i in 0..16 {
        assert_eq!(
            store.get_raw(&format!("k{}", i)).await.unwrap().as_deref(),
            Some("v")
        );
    }
}

#[tokio::test]
async fn test_two_stores_on_one_path_do_not_lose_writes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let first = LocalStore::open_file(&path);
    let second = LocalStore::open_file(&path);

    let mut handles = Vec::new();
    for i in 0..16 {
        let store = if i % 2 == 0 { first.clone() } else { second.clone() };
        handles.push(tokio::spawn(async move {
            store.set_raw(&format!("k{}", i), "v").await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let reopened = LocalStore::open_file(&path);
    for i in 0..16 {
        assert_eq!(
            reopened.get_raw(&format!("k{}", i)).await.unwrap().as_deref(),
            Some("v")
        );
    }
}
