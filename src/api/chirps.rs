use std::sync::LazyLock;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use regex::Regex;
use serde::Deserialize;

use crate::auth::models::AuthenticatedAccount;
use crate::db::models::{ChirpResponse, CreateChirpRequest, PostFilter, SortOrder};
use crate::db::repository::PostRepository;
use crate::error::AppError;
use crate::state::AppState;

const MAX_CHIRP_LENGTH: usize = 140;
const CENSORED: &str = "****";

static PROFANITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(kerfuffle|sharbert|fornax)\b").expect("profanity pattern is valid")
});

/// Reject over-long chirps and mask banned words.
pub fn validate_chirp(body: &str) -> Result<String, AppError> {
    if body.chars().count() > MAX_CHIRP_LENGTH {
        return Err(AppError::BadRequest("Chirp is too long".into()));
    }
    Ok(PROFANITY.replace_all(body, CENSORED).into_owned())
}

/// Query string for `GET /api/chirps`.
#[derive(Debug, Default, Deserialize)]
pub struct ListChirpsQuery {
    pub sort: Option<String>,
    #[serde(alias = "user_id")]
    pub author_id: Option<String>,
}

impl ListChirpsQuery {
    fn filter(&self) -> Result<PostFilter, AppError> {
        match self.author_id.as_deref() {
            None => Ok(PostFilter::Visible),
            Some(raw) => raw
                .parse::<i64>()
                .map(PostFilter::ByAuthor)
                .map_err(|_| AppError::BadRequest(format!("Invalid author id '{raw}'"))),
        }
    }
}

fn parse_chirp_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|_| AppError::BadRequest(format!("Invalid chirp id '{raw}'")))
}

/// Validate and store a chirp for `author_id`.
pub async fn process_create_chirp(
    repo: &dyn PostRepository,
    author_id: i64,
    request: CreateChirpRequest,
) -> Result<ChirpResponse, AppError> {
    let body = validate_chirp(&request.body)?;
    let post = repo.create_post(&body, author_id).await?;
    Ok(post.into())
}

pub async fn process_list_chirps(
    repo: &dyn PostRepository,
    query: &ListChirpsQuery,
) -> Result<Vec<ChirpResponse>, AppError> {
    let filter = query.filter()?;
    let order = SortOrder::from_query(query.sort.as_deref());

    let posts = repo.list_posts(filter, order).await?;
    Ok(posts.into_iter().map(ChirpResponse::from).collect())
}

/// `GET /api/chirps`
pub async fn list_chirps_handler(
    State(state): State<AppState>,
    Query(query): Query<ListChirpsQuery>,
) -> Result<axum::Json<Vec<ChirpResponse>>, AppError> {
    let chirps = process_list_chirps(state.post_repo.as_ref(), &query).await?;
    Ok(axum::Json(chirps))
}

/// `POST /api/chirps`
pub async fn create_chirp_handler(
    State(state): State<AppState>,
    caller: AuthenticatedAccount,
    axum::Json(request): axum::Json<CreateChirpRequest>,
) -> Result<(StatusCode, axum::Json<ChirpResponse>), AppError> {
    let chirp =
        process_create_chirp(state.post_repo.as_ref(), caller.account_id, request).await?;
    Ok((StatusCode::CREATED, axum::Json(chirp)))
}

/// `GET /api/chirps/{id}`
pub async fn get_chirp_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<axum::Json<ChirpResponse>, AppError> {
    let post = state.post_repo.get_post(parse_chirp_id(&id)?).await?;
    Ok(axum::Json(post.into()))
}

/// `DELETE /api/chirps/{id}`
pub async fn delete_chirp_handler(
    State(state): State<AppState>,
    caller: AuthenticatedAccount,
    Path(id): Path<String>,
) -> Result<axum::Json<serde_json::Value>, AppError> {
    state
        .post_repo
        .delete_post(parse_chirp_id(&id)?, caller.account_id)
        .await?;
    Ok(axum::Json(serde_json::json!({})))
}
