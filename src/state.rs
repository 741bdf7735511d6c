use std::sync::atomic::{AtomicU64, Ordering};
use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::token::TokenAuthority;
use crate::db::account_repository::AccountRepository;
use crate::db::json_store::JsonStore;
use crate::db::repository::PostRepository;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub post_repo: Arc<dyn PostRepository>,
    pub account_repo: Arc<dyn AccountRepository>,
    pub tokens: Arc<TokenAuthority>,
    /// Key the payment provider sends with its webhooks.
    pub polka_api_key: String,
    pub file_server_hits: Arc<AtomicU64>,
    /// Files backing the document store. Never served over `/app`.
    pub store_files: Arc<[PathBuf]>,
}

impl AppState {
    /// Wire every repository and the token authority to one document store.
    pub fn new(store: Arc<JsonStore>, jwt_secret: &str, polka_api_key: String) -> Self {
        let tokens = Arc::new(TokenAuthority::new(jwt_secret, store.clone()));
        let store_files: Arc<[PathBuf]> = store.files().into();

        Self {
            post_repo: store.clone(),
            account_repo: store,
            tokens,
            polka_api_key,
            file_server_hits: Arc::new(AtomicU64::new(0)),
            store_files,
        }
    }

    pub fn hits(&self) -> u64 {
        self.file_server_hits.load(Ordering::Relaxed)
    }

    pub fn record_hit(&self) {
        self.file_server_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reset_hits(&self) {
        self.file_server_hits.store(0, Ordering::Relaxed);
    }
}
