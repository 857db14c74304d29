//! Review endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use crate::error::Result;
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// GET /api/review/next
/// Responds 404 `no_more_reviews` once nothing else is due today.
pub async fn next(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<Word>> {
    let item = state.reviews.next_word(auth.user_id).await?;
    Ok(Json(item.into()))
}

/// POST /api/review/{word_id}
pub async fn submit(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(word_id): Path<i64>,
    Json(payload): Json<ReviewResultRequest>,
) -> Result<Json<Word>> {
    let word = state
        .reviews
        .submit_review(auth.user_id, word_id, payload.was_correct)
        .await?;

    Ok(Json(word.to_api_word()))
}

/// DELETE /api/review/session
/// Drops the in-memory session; the next request starts a fresh one.
pub async fn end_session(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> StatusCode {
    state.reviews.end_session(auth.user_id).await;
    StatusCode::NO_CONTENT
}
