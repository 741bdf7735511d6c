use axum::extract::State;
use axum::http::StatusCode;

use crate::auth::models::AuthenticatedAccount;
use crate::auth::token::{TokenAuthority, TokenKind};
use crate::db::account_repository::AccountRepository;
use crate::db::models::{AccountResponse, CredentialsRequest, LoginResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Check credentials and hand out a fresh access/refresh token pair.
///
/// An unknown email is reported as bad credentials so the response does not
/// reveal which emails are registered.
pub async fn process_login(
    accounts: &dyn AccountRepository,
    tokens: &TokenAuthority,
    request: CredentialsRequest,
) -> Result<LoginResponse, AppError> {
    let account = match accounts
        .authenticate(&request.email, &request.password)
        .await
    {
        Ok(account) => account,
        Err(AppError::NotFound(_)) => return Err(AppError::InvalidCredentials),
        Err(e) => return Err(e),
    };

    let token = tokens.issue(account.id, TokenKind::Access)?;
    let refresh_token = tokens.issue(account.id, TokenKind::Refresh)?;

    tracing::debug!(account_id = account.id, "login succeeded");

    Ok(LoginResponse {
        id: account.id,
        email: account.email,
        is_chirpy_red: account.is_upgraded,
        token,
        refresh_token,
    })
}

fn require_credentials(request: &CredentialsRequest) -> Result<(), AppError> {
    if request.email.is_empty() {
        return Err(AppError::BadRequest("Email cannot be empty".into()));
    }
    if request.password.is_empty() {
        return Err(AppError::BadRequest("Password cannot be empty".into()));
    }
    Ok(())
}

/// `POST /api/users`
pub async fn create_user_handler(
    State(state): State<AppState>,
    axum::Json(request): axum::Json<CredentialsRequest>,
) -> Result<(StatusCode, axum::Json<AccountResponse>), AppError> {
    require_credentials(&request)?;

    let account = state
        .account_repo
        .create_account(&request.email, &request.password)
        .await?;

    tracing::info!(account_id = account.id, "user created");
    Ok((StatusCode::CREATED, axum::Json(account.into())))
}

/// `PUT /api/users`
pub async fn update_user_handler(
    State(state): State<AppState>,
    caller: AuthenticatedAccount,
    axum::Json(request): axum::Json<CredentialsRequest>,
) -> Result<axum::Json<AccountResponse>, AppError> {
    require_credentials(&request)?;

    let account = state
        .account_repo
        .update_account(caller.account_id, &request.email, &request.password)
        .await?;

    Ok(axum::Json(account.into()))
}

/// `POST /api/login`
pub async fn login_handler(
    State(state): State<AppState>,
    axum::Json(request): axum::Json<CredentialsRequest>,
) -> Result<axum::Json<LoginResponse>, AppError> {
    let response =
        process_login(state.account_repo.as_ref(), state.tokens.as_ref(), request).await?;
    Ok(axum::Json(response))
}
