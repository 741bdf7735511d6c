use async_trait::async_trait;
use chrono::Utc;

use crate::db::json_store::JsonStore;
use crate::error::AppError;

/// Repository trait for the refresh-token revocation list.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RevocationRepository: Send + Sync {
    /// Record `token` as revoked now. Revoking again only refreshes the timestamp.
    async fn record_revocation(&self, token: &str) -> Result<(), AppError>;

    /// Whether this exact token string has been revoked.
    async fn is_revoked(&self, token: &str) -> Result<bool, AppError>;
}

#[async_trait]
impl RevocationRepository for JsonStore {
    async fn record_revocation(&self, token: &str) -> Result<(), AppError> {
        self.mutate(|doc| {
            doc.revoked_tokens.insert(token.to_string(), Utc::now());
            Ok(())
        })
        .await
    }

    async fn is_revoked(&self, token: &str) -> Result<bool, AppError> {
        self.read(|doc| Ok(doc.revoked_tokens.contains_key(token)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_and_check() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path().join("chirps.json")).await.unwrap();

        assert!(!store.is_revoked("abc.def.ghi").await.unwrap());
        store.record_revocation("abc.def.ghi").await.unwrap();
        assert!(store.is_revoked("abc.def.ghi").await.unwrap());
        assert!(!store.is_revoked("abc.def.ghj").await.unwrap());
    }

    #[tokio::test]
    async fn test_record_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path().join("chirps.json")).await.unwrap();

        store.record_revocation("tok").await.unwrap();
        store.record_revocation("tok").await.unwrap();

        let count = store
            .read(|doc| Ok(doc.revoked_tokens.len()))
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
