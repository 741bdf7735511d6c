use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::auth::models::{ApiKey, AuthenticatedAccount};
use crate::auth::token::{TokenError, TokenKind};
use crate::error::AppError;
use crate::state::AppState;

/// Strip `<scheme> ` from an `Authorization` value.
///
/// A value without the prefix is passed through as-is and will fail
/// verification downstream.
fn strip_scheme<'a>(value: &'a str, scheme: &str) -> &'a str {
    value
        .strip_prefix(scheme)
        .and_then(|rest| rest.strip_prefix(' '))
        .unwrap_or(value)
        .trim()
}

fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
}

/// The bare token string from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = authorization(headers)
        .ok_or_else(|| TokenError::Malformed("missing Authorization header".into()))?;
    Ok(strip_scheme(value, "Bearer"))
}

/// The key from `Authorization: ApiKey <key>`, if any header is present.
pub fn api_key(headers: &HeaderMap) -> Option<ApiKey> {
    authorization(headers).map(|value| ApiKey(strip_scheme(value, "ApiKey").to_string()))
}

/// Resolves the caller from a bearer access token.
///
/// Rejects with a token error (401) when the header is missing or the token
/// does not verify as an access token.
impl FromRequestParts<AppState> for AuthenticatedAccount {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let account_id = state.tokens.verify(token, TokenKind::Access)?;
        Ok(AuthenticatedAccount { account_id })
    }
}
