//! Caller identity: password hashing, bearer tokens, and request extraction.

pub mod middleware;
pub mod models;
pub mod password;
pub mod token;
