#![allow(dead_code)]

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use tempfile::TempDir;

use chirpy::app::build_router;
use chirpy::auth::token::TokenAuthority;
use chirpy::db::json_store::JsonStore;
use chirpy::state::AppState;

pub const JWT_SECRET: &str = "integration-test-secret";
pub const POLKA_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";

/// A router wired to a real document store in a temporary directory.
///
/// The directory (and the database file in it) is removed when this struct is dropped.
pub struct TestEnv {
    _dir: TempDir,
    pub router: Router,
    pub store: Arc<JsonStore>,
    pub tokens: Arc<TokenAuthority>,
}

impl TestEnv {
    pub async fn start() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        std::fs::write(dir.path().join("index.html"), "<h1>Chirpy</h1>")
            .expect("Failed to write index.html");

        let store = Arc::new(
            JsonStore::open(dir.path().join("chirps.json"))
                .await
                .expect("Failed to open store")
                .with_hash_cost(4),
        );

        let app_state = AppState::new(store.clone(), JWT_SECRET, POLKA_KEY.to_string());
        let tokens = app_state.tokens.clone();
        let router = build_router(app_state, dir.path());

        Self {
            _dir: dir,
            router,
            store,
            tokens,
        }
    }

    /// Build an `axum_test::TestServer` that expects every request to succeed.
    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .expect_success_by_default()
            .try_build(self.router.clone())
            .expect("Failed to build TestServer")
    }

    /// Build a `TestServer` that does NOT expect success by default (for error tests).
    pub fn server_permissive(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .try_build(self.router.clone())
            .expect("Failed to build TestServer")
    }

    /// Helper: register a user via the API and return the response body.
    pub async fn create_user(
        &self,
        server: &axum_test::TestServer,
        email: &str,
        password: &str,
    ) -> serde_json::Value {
        server
            .post("/api/users")
            .json(&serde_json::json!({ "email": email, "password": password }))
            .await
            .json()
    }

    /// Helper: log in via the API and return the response body.
    pub async fn login(
        &self,
        server: &axum_test::TestServer,
        email: &str,
        password: &str,
    ) -> serde_json::Value {
        server
            .post("/api/login")
            .json(&serde_json::json!({ "email": email, "password": password }))
            .await
            .json()
    }

    /// Helper: register and log in, returning `(access_token, refresh_token)`.
    pub async fn sign_up(
        &self,
        server: &axum_test::TestServer,
        email: &str,
        password: &str,
    ) -> (String, String) {
        self.create_user(server, email, password).await;
        let body = self.login(server, email, password).await;
        (
            body["token"].as_str().expect("missing token").to_string(),
            body["refresh_token"]
                .as_str()
                .expect("missing refresh_token")
                .to_string(),
        )
    }
}

/// `Authorization: Bearer <token>`
pub fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {token}")).expect("valid header value")
}

/// `Authorization: ApiKey <key>`
pub fn api_key(key: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("ApiKey {key}")).expect("valid header value")
}

