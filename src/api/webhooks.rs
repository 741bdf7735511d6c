use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;

use crate::auth::middleware::api_key;
use crate::auth::models::ApiKey;
use crate::db::account_repository::AccountRepository;
use crate::db::models::WebhookRequest;
use crate::error::AppError;
use crate::state::AppState;

/// The only payment-provider event this service acts on.
pub const USER_UPGRADED: &str = "user.upgraded";

/// Authenticate and apply a payment-provider webhook.
///
/// The key is checked before the payload is parsed. Events other than
/// [`USER_UPGRADED`] are acknowledged and ignored.
pub async fn process_webhook(
    accounts: &dyn AccountRepository,
    provided_key: Option<ApiKey>,
    expected_key: &str,
    payload: &[u8],
) -> Result<(), AppError> {
    let authorized = provided_key
        .map(|key| key.matches(expected_key))
        .unwrap_or(false);
    if !authorized {
        return Err(AppError::InvalidCredentials);
    }

    let request: WebhookRequest = serde_json::from_slice(payload)
        .map_err(|e| AppError::BadRequest(format!("Invalid webhook payload: {e}")))?;

    if request.event != USER_UPGRADED {
        tracing::debug!(event = %request.event, "ignoring webhook event");
        return Ok(());
    }

    let user_id = request
        .user_id()
        .ok_or_else(|| AppError::BadRequest("Webhook is missing data.user_id".into()))?;
    accounts.upgrade_account(user_id).await
}

/// `POST /api/polka/webhooks`
pub async fn polka_webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<axum::Json<serde_json::Value>, AppError> {
    process_webhook(
        state.account_repo.as_ref(),
        api_key(&headers),
        &state.polka_api_key,
        &body,
    )
    .await?;

    Ok(axum::Json(serde_json::json!({})))
}
