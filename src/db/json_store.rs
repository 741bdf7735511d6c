use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::sync::RwLock;

use crate::db::models::Document;
use crate::error::AppError;

/// Single-file JSON document store.
///
/// The whole [`Document`] lives in one file. Every call re-reads the file, so
/// the file is the only source of truth. Readers share the lock; a mutation
/// holds the write lock across load, change and persist, so concurrent
/// mutations cannot lose each other's updates.
///
/// The repository traits in this module tree (`PostRepository`,
/// `AccountRepository`, `RevocationRepository`) are implemented on top of
/// [`JsonStore::read`] and [`JsonStore::mutate`].
pub struct JsonStore {
    path: PathBuf,
    lock: RwLock<()>,
    hash_cost: u32,
}

impl JsonStore {
    /// Open the store at `path`, creating an empty document if the file is missing.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let store = Self::unopened(path.into());
        let exists = tokio::fs::try_exists(&store.path)
            .await
            .map_err(|e| storage_error("stat", &store.path, e))?;

        if !exists {
            tracing::info!(path = %store.path.display(), "creating empty document store");
            store.persist(&Document::default()).await?;
        }

        Ok(store)
    }

    /// Open the store at `path`, discarding whatever it held before.
    pub async fn open_fresh(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let store = Self::unopened(path.into());
        tracing::warn!(path = %store.path.display(), "resetting document store");
        store.persist(&Document::default()).await?;
        Ok(store)
    }

    /// Override the bcrypt work factor used when hashing account passwords.
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    fn unopened(path: PathBuf) -> Self {
        Self {
            path,
            lock: RwLock::new(()),
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The document file and its temp sibling: every path the store writes.
    pub fn files(&self) -> Vec<PathBuf> {
        vec![self.path.clone(), self.temp_path()]
    }

    pub(crate) fn hash_cost(&self) -> u32 {
        self.hash_cost
    }

    /// Load the document under the shared lock and project something out of it.
    pub async fn read<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&Document) -> Result<T, AppError> + Send,
        T: Send,
    {
        let _guard = self.lock.read().await;
        let doc = self.load().await?;
        f(&doc)
    }

    /// Load, change and persist the document under the exclusive lock.
    ///
    /// Nothing is written when `f` fails.
    pub async fn mutate<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Document) -> Result<T, AppError> + Send,
        T: Send,
    {
        let _guard = self.lock.write().await;
        let mut doc = self.load().await?;
        let out = f(&mut doc)?;
        self.persist(&doc).await?;
        Ok(out)
    }

    async fn load(&self) -> Result<Document, AppError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| storage_error("read", &self.path, e))?;

        serde_json::from_slice(&bytes).map_err(|e| {
            AppError::Storage(format!(
                "document at {} is not valid: {e}",
                self.path.display()
            ))
        })
    }

    /// Write to a sibling temp file, then rename it over the target so a
    /// reader never sees a half-written document.
    async fn persist(&self, doc: &Document) -> Result<(), AppError> {
        let bytes = serde_json::to_vec(doc)
            .map_err(|e| AppError::Internal(format!("Failed to serialize document: {e}")))?;

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| storage_error("write", &tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| storage_error("replace", &self.path, e))?;

        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("chirpy"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn storage_error(action: &str, path: &Path, err: std::io::Error) -> AppError {
    AppError::Storage(format!("failed to {action} {}: {err}", path.display()))
}
