use async_trait::async_trait;

use crate::auth::password::{hash_password, verify_password};
use crate::db::json_store::JsonStore;
use crate::db::models::Account;
use crate::error::AppError;

/// Repository trait for account operations.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Register a new account. Email uniqueness is not enforced.
    async fn create_account(&self, email: &str, password: &str) -> Result<Account, AppError>;

    /// Replace both the email and the password of an existing account.
    async fn update_account(
        &self,
        id: i64,
        email: &str,
        password: &str,
    ) -> Result<Account, AppError>;

    /// Find the first account (lowest id) with exactly this email and check its password.
    async fn authenticate(&self, email: &str, password: &str) -> Result<Account, AppError>;

    async fn get_account(&self, id: i64) -> Result<Account, AppError>;

    /// Every account, ascending by id.
    async fn list_accounts(&self) -> Result<Vec<Account>, AppError>;

    /// Mark an account as upgraded. Upgrading twice is a no-op.
    async fn upgrade_account(&self, id: i64) -> Result<(), AppError>;
}

fn account_not_found() -> AppError {
    AppError::NotFound("User not found".into())
}

#[async_trait]
impl AccountRepository for JsonStore {
    async fn create_account(&self, email: &str, password: &str) -> Result<Account, AppError> {
        let password_hash = hash_password(password, self.hash_cost()).await?;

        let account = self
            .mutate(|doc| {
                let account = Account {
                    email: email.to_string(),
                    id: doc.next_account_id()?,
                    password_hash,
                    is_upgraded: false,
                };
                doc.users.insert(account.id, account.clone());
                Ok(account)
            })
            .await?;

        tracing::debug!(account_id = account.id, "account created");
        Ok(account)
    }

    async fn update_account(
        &self,
        id: i64,
        email: &str,
        password: &str,
    ) -> Result<Account, AppError> {
        let password_hash = hash_password(password, self.hash_cost()).await?;

        let account = self
            .mutate(|doc| {
                let account = doc.users.get_mut(&id).ok_or_else(account_not_found)?;
                account.email = email.to_string();
                account.password_hash = password_hash;
                Ok(account.clone())
            })
            .await?;

        tracing::debug!(account_id = id, "account updated");
        Ok(account)
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Account, AppError> {
        let account = self
            .read(|doc| {
                doc.users
                    .values()
                    .find(|account| account.email == email)
                    .cloned()
                    .ok_or_else(account_not_found)
            })
            .await?;

        if verify_password(password, &account.password_hash).await? {
            Ok(account)
        } else {
            Err(AppError::InvalidCredentials)
        }
    }

    async fn get_account(&self, id: i64) -> Result<Account, AppError> {
        self.read(|doc| doc.users.get(&id).cloned().ok_or_else(account_not_found))
            .await
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, AppError> {
        self.read(|doc| Ok(doc.users.values().cloned().collect()))
            .await
    }

    async fn upgrade_account(&self, id: i64) -> Result<(), AppError> {
        self.mutate(|doc| {
            let account = doc.users.get_mut(&id).ok_or_else(account_not_found)?;
            account.is_upgraded = true;
            Ok(())
        })
        .await?;

        tracing::info!(account_id = id, "account upgraded");
        Ok(())
    }
}
