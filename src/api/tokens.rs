use axum::extract::State;
use axum::http::HeaderMap;

use crate::auth::middleware::bearer_token;
use crate::db::models::RefreshResponse;
use crate::error::AppError;
use crate::state::AppState;

/// `POST /api/refresh`
///
/// Trades the bearer refresh token for a new access token.
pub async fn refresh_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<axum::Json<RefreshResponse>, AppError> {
    let refresh_token = bearer_token(&headers)?;
    let token = state.tokens.refresh(refresh_token).await?;
    Ok(axum::Json(RefreshResponse { token }))
}

/// `POST /api/revoke`
pub async fn revoke_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<axum::Json<serde_json::Value>, AppError> {
    let refresh_token = bearer_token(&headers)?;
    state.tokens.revoke(refresh_token).await?;
    Ok(axum::Json(serde_json::json!({})))
}
