// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local key/value store with typed session operations.
//!
//! Provides high-level operations for:
//! - The cached user record
//! - Login-form prefill (last phone, last display name)
//! - Last known role

use crate::db::keys;
use crate::error::AppError;
use crate::models::{Role, User};
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::Mutex;

/// Per-path write locks shared by every store opened in this process.
type FileLocks = DashMap<PathBuf, Arc<Mutex<()>>>;

/// Storage backend.
#[derive(Clone)]
enum Backend {
    /// Single JSON object document on disk.
    File {
        path: PathBuf,
        /// Serializes read-modify-write cycles on the document.
        lock: Arc<Mutex<()>>,
    },
    /// Process-local map. With a write budget, writes fail once it is spent.
    Memory {
        map: Arc<DashMap<String, String>>,
        writes_left: Option<Arc<AtomicUsize>>,
    },
    /// Every operation fails.
    Offline,
}

/// Local session store.
#[derive(Clone)]
pub struct LocalStore {
    backend: Backend,
}

impl LocalStore {
    /// Open a file-backed store. The file is created on first write.
    ///
    /// Stores opened on the same path within one process share a write lock.
    /// Other processes must not write the same file.
    pub fn open_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        tracing::info!(path = %path.display(), "Using file-backed session store");
        let lock = file_lock(&path);
        Self {
            backend: Backend::File { path, lock },
        }
    }

    /// Create an in-memory store.
    pub fn new_memory() -> Self {
        Self {
            backend: Backend::Memory {
                map: Arc::new(DashMap::new()),
                writes_left: None,
            },
        }
    }

    /// Create an in-memory store that accepts `writes` sets or removes and
    /// fails every write after that. Reads keep working.
    pub fn new_memory_with_write_budget(writes: usize) -> Self {
        Self {
            backend: Backend::Memory {
                map: Arc::new(DashMap::new()),
                writes_left: Some(Arc::new(AtomicUsize::new(writes))),
            },
        }
    }

    /// Create a store whose operations all fail (offline mode).
    pub fn new_offline() -> Self {
        Self {
            backend: Backend::Offline,
        }
    }

    // ─── Raw Operations ──────────────────────────────────────────

    /// Get the raw string stored under `key`.
    pub async fn get_raw(&self, key: &str) -> Result<Option<String>, AppError> {
        match &self.backend {
            Backend::File { path, .. } => Ok(read_document(path).await?.remove(key)),
            Backend::Memory { map, .. } => Ok(map.get(key).map(|v| v.value().clone())),
            Backend::Offline => Err(offline()),
        }
    }

    /// Store a raw string under `key`.
    pub async fn set_raw(&self, key: &str, value: &str) -> Result<(), AppError> {
        match &self.backend {
            Backend::File { path, lock } => {
                let _guard = lock.lock().await;
                let mut doc = read_document(path).await?;
                doc.insert(key.to_string(), value.to_string());
                write_document(path, &doc).await
            }
            Backend::Memory { map, writes_left } => {
                spend_write(writes_left.as_deref())?;
                map.insert(key.to_string(), value.to_string());
                Ok(())
            }
            Backend::Offline => Err(offline()),
        }
    }

    /// Remove `key`. Removing an absent key is not an error.
    pub async fn remove_raw(&self, key: &str) -> Result<(), AppError> {
        match &self.backend {
            Backend::File { path, lock } => {
                let _guard = lock.lock().await;
                let mut doc = read_document(path).await?;
                if doc.remove(key).is_some() {
                    write_document(path, &doc).await?;
                }
                Ok(())
            }
            Backend::Memory { map, writes_left } => {
                spend_write(writes_left.as_deref())?;
                map.remove(key);
                Ok(())
            }
            Backend::Offline => Err(offline()),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        match self.get_raw(key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| AppError::Storage(format!("Corrupt entry {}: {}", key, e))),
            None => Ok(None),
        }
    }

    async fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), AppError> {
        let raw = serde_json::to_string(value)
            .map_err(|e| AppError::Storage(format!("Failed to encode {}: {}", key, e)))?;
        self.set_raw(key, &raw).await
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get the cached session user.
    pub async fn get_user(&self) -> Result<Option<User>, AppError> {
        self.get_json(keys::USER).await
    }

    /// Replace the cached session user.
    pub async fn set_user(&self, user: &User) -> Result<(), AppError> {
        self.set_json(keys::USER, user).await
    }

    /// Drop the cached session user.
    pub async fn delete_user(&self) -> Result<(), AppError> {
        self.remove_raw(keys::USER).await
    }

    // ─── Login Prefill ───────────────────────────────────────────

    pub async fn get_last_phone(&self) -> Result<Option<String>, AppError> {
        self.get_raw(keys::LAST_PHONE).await
    }

    pub async fn set_last_phone(&self, phone: &str) -> Result<(), AppError> {
        self.set_raw(keys::LAST_PHONE, phone).await
    }

    pub async fn get_last_name(&self) -> Result<Option<String>, AppError> {
        self.get_raw(keys::LAST_NAME).await
    }

    pub async fn set_last_name(&self, name: &str) -> Result<(), AppError> {
        self.set_raw(keys::LAST_NAME, name).await
    }

    // ─── Role ────────────────────────────────────────────────────

    /// Get the last role successfully fetched from the agent API.
    pub async fn get_last_role(&self) -> Result<Option<Role>, AppError> {
        self.get_json(keys::LAST_ROLE).await
    }

    pub async fn set_last_role(&self, role: &Role) -> Result<(), AppError> {
        self.set_json(keys::LAST_ROLE, role).await
    }

    pub async fn delete_last_role(&self) -> Result<(), AppError> {
        self.remove_raw(keys::LAST_ROLE).await
    }
}

fn offline() -> AppError {
    AppError::Storage("Session store not available (offline mode)".to_string())
}

fn spend_write(writes_left: Option<&AtomicUsize>) -> Result<(), AppError> {
    let Some(writes_left) = writes_left else {
        return Ok(());
    };
    writes_left
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .map(|_| ())
        .map_err(|_| AppError::Storage("Write budget exhausted".to_string()))
}

/// Get the shared lock for `path`, keyed by its absolute form.
fn file_lock(path: &Path) -> Arc<Mutex<()>> {
    static LOCKS: OnceLock<FileLocks> = OnceLock::new();

    let key = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    LOCKS
        .get_or_init(DashMap::new)
        .entry(key)
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone()
}

/// Read the whole document. A missing file is an empty document.
async fn read_document(path: &Path) -> Result<BTreeMap<String, String>, AppError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => {
            return Err(AppError::Storage(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            )))
        }
    };

    serde_json::from_slice(&bytes)
        .map_err(|e| AppError::Storage(format!("Corrupt store {}: {}", path.display(), e)))
}

/// Replace the document atomically (write temp file, then rename).
async fn write_document(path: &Path, doc: &BTreeMap<String, String>) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to create {}: {}", parent.display(), e)))?;
    }

    let bytes = serde_json::to_vec_pretty(doc)
        .map_err(|e| AppError::Storage(format!("Failed to encode store: {}", e)))?;

    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, bytes)
        .await
        .map_err(|e| AppError::Storage(format!("Failed to write {}: {}", tmp.display(), e)))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| AppError::Storage(format!("Failed to replace {}: {}", path.display(), e)))?;

    Ok(())
}
