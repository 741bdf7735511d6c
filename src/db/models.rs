use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A single user-authored chirp.
///
/// Stored under the `chirps` collection of the backing document, keyed by `id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// The account that wrote this chirp.
    pub author_id: i64,
    /// Already-validated chirp text.
    pub body: String,
    /// Assigned at creation, never reused.
    pub id: i64,
    /// Soft-delete flag. Once set it is never cleared.
    #[serde(default, alias = "Deleted")]
    pub deleted: bool,
}

/// A registered account.
///
/// The on-disk field names are kept stable for existing files: the bcrypt hash
/// lives under `password` and the upgraded tier flag under `is_chirpy_red`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub email: String,
    pub id: i64,
    /// bcrypt hash of the password, never the plaintext.
    #[serde(rename = "password")]
    pub password_hash: String,
    /// Whether the account has been upgraded to Chirpy Red.
    #[serde(rename = "is_chirpy_red", default)]
    pub is_upgraded: bool,
}

/// The whole persisted state: every collection, serialized as one JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub chirps: BTreeMap<i64, Post>,
    #[serde(default)]
    pub users: BTreeMap<i64, Account>,
    /// Raw token string → time of revocation.
    #[serde(default)]
    pub revoked_tokens: BTreeMap<String, DateTime<Utc>>,
}

impl Document {
    /// Next free chirp id: one past the largest id ever stored.
    ///
    /// Chirps are only soft-deleted, so for a file written by this crate this
    /// equals `count + 1`.
    pub fn next_post_id(&self) -> Result<i64, AppError> {
        next_id(self.chirps.keys().next_back(), "chirp")
    }

    /// Next free account id, same rule as [`Document::next_post_id`].
    pub fn next_account_id(&self) -> Result<i64, AppError> {
        next_id(self.users.keys().next_back(), "account")
    }
}

fn next_id(last: Option<&i64>, collection: &str) -> Result<i64, AppError> {
    match last {
        None => Ok(1),
        Some(id) => id
            .checked_add(1)
            .ok_or_else(|| AppError::Storage(format!("no {collection} ids left after {id}"))),
    }
}

/// Ordering applied to chirp listings, always by `id`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Parse the `sort` query value. Only `desc` selects descending order;
    /// anything else falls back to ascending.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }
}

/// Predicate selecting which chirps a listing returns.
///
/// Deleted chirps never match, whatever the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    /// Every visible chirp.
    Visible,
    /// Visible chirps written by the given account.
    ByAuthor(i64),
}

impl PostFilter {
    pub fn matches(&self, post: &Post) -> bool {
        if post.deleted {
            return false;
        }
        match self {
            PostFilter::Visible => true,
            PostFilter::ByAuthor(author_id) => post.author_id == *author_id,
        }
    }
}

/// Request body for `POST /api/chirps`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChirpRequest {
    pub body: String,
}

/// Public view of a chirp. The soft-delete flag is not exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChirpResponse {
    pub id: i64,
    pub author_id: i64,
    pub body: String,
}

impl From<Post> for ChirpResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id,
            body: post.body,
        }
    }
}

/// Request body shared by `POST /api/users`, `PUT /api/users` and `POST /api/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Public view of an account. The password hash is never exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: i64,
    pub email: String,
    pub is_chirpy_red: bool,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            is_chirpy_red: account.is_upgraded,
        }
    }
}

/// Response body for a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub id: i64,
    pub email: String,
    pub is_chirpy_red: bool,
    /// Short-lived access token.
    pub token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
}

/// Response body for `POST /api/refresh`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub token: String,
}

/// Payment-provider webhook payload.
///
/// Only `user.upgraded` needs `data.user_id`; other events may omit `data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookRequest {
    pub event: String,
    #[serde(default)]
    pub data: Option<WebhookData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookData {
    #[serde(default)]
    pub user_id: Option<i64>,
}

impl WebhookRequest {
    pub fn user_id(&self) -> Option<i64> {
        self.data.as_ref().and_then(|data| data.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_on_disk_field_names() {
        let mut doc = Document::default();
        doc.users.insert(
            1,
            Account {
                email: "a@b.com".to_string(),
                id: 1,
                password_hash: "$2b$04$hash".to_string(),
                is_upgraded: true,
            },
        );
        doc.chirps.insert(
            1,
            Post {
                author_id: 1,
                body: "hello".to_string(),
                id: 1,
                deleted: false,
            },
        );

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["users"]["1"]["password"], "$2b$04$hash");
        assert_eq!(value["users"]["1"]["is_chirpy_red"], true);
        assert_eq!(value["chirps"]["1"]["author_id"], 1);
        assert!(value["revoked_tokens"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_document_reads_legacy_file() {
        // Older files spell the soft-delete flag `Deleted`.
        let json = r###"{
            "chirps": {"1": {"author_id": 1, "body": "hi", "id": 1, "Deleted": true}},
            "users": {},
            "revoked_tokens": {"abc": "2024-01-01T00:00:00Z"}
        }"###;

        let doc: Document = serde_json::from_str(json).unwrap();
        assert!(doc.chirps[&1].deleted);
        assert!(doc.revoked_tokens.contains_key("abc"));
    }

    #[test]
    fn test_missing_collections_default_to_empty() {
        let doc: Document = serde_json::from_str("{}").unwrap();
        assert_eq!(doc, Document::default());
    }

    #[test]
    fn test_next_ids() {
        let mut doc = Document::default();
        assert_eq!(doc.next_post_id().unwrap(), 1);
        assert_eq!(doc.next_account_id().unwrap(), 1);

        doc.chirps.insert(3, Post { id: 3, ..Post::default() });
        assert_eq!(doc.next_post_id().unwrap(), 4);
    }

    #[test]
    fn test_next_id_at_i64_max_is_a_storage_error() {
        let mut doc = Document::default();
        doc.chirps.insert(i64::MAX, Post { id: i64::MAX, ..Post::default() });
        doc.users.insert(i64::MAX, Account { id: i64::MAX, ..Account::default() });

        assert!(matches!(doc.next_post_id(), Err(AppError::Storage(_))));
        assert!(matches!(doc.next_account_id(), Err(AppError::Storage(_))));
    }

    #[test]
    fn test_webhook_without_data() {
        let request: WebhookRequest =
            serde_json::from_str(r#"{"event":"user.payment_failed"}"#).unwrap();
        assert_eq!(request.user_id(), None);

        let request: WebhookRequest =
            serde_json::from_str(r#"{"event":"user.upgraded","data":{"user_id":3}}"#).unwrap();
        assert_eq!(request.user_id(), Some(3));
    }

    #[test]
    fn test_filter_excludes_deleted() {
        let visible = Post { id: 1, author_id: 7, ..Post::default() };
        let deleted = Post { id: 2, author_id: 7, deleted: true, ..Post::default() };

        assert!(PostFilter::Visible.matches(&visible));
        assert!(!PostFilter::Visible.matches(&deleted));
        assert!(PostFilter::ByAuthor(7).matches(&visible));
        assert!(!PostFilter::ByAuthor(8).matches(&visible));
        assert!(!PostFilter::ByAuthor(7).matches(&deleted));
    }

    #[test]
    fn test_sort_order_from_query() {
        assert_eq!(SortOrder::from_query(Some("desc")), SortOrder::Desc);
        assert_eq!(SortOrder::from_query(Some("asc")), SortOrder::Asc);
        assert_eq!(SortOrder::from_query(Some("sideways")), SortOrder::Asc);
        assert_eq!(SortOrder::from_query(None), SortOrder::Asc);
    }

    #[test]
    fn test_account_response_hides_hash() {
        let account = Account {
            email: "a@b.com".to_string(),
            id: 4,
            password_hash: "secret-hash".to_string(),
            is_upgraded: false,
        };
        let json = serde_json::to_string(&AccountResponse::from(account)).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("\"is_chirpy_red\":false"));
    }
}
