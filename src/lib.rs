pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod state;
pub mod db {
    pub mod account_repository;
    pub mod json_store;
    pub mod models;
    pub mod repository;
    pub mod revocation_repository;
}
/// HTTP handlers. Each module keeps its core logic in a `process_*` function
/// that takes repositories directly, with a thin axum handler on top.
pub mod api {
    pub mod admin;
    pub mod chirps;
    pub mod errors;
    pub mod files;
    pub mod tokens;
    pub mod users;
    pub mod webhooks;
}
