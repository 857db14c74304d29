//! Vocabulary endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// POST /api/words
/// New words start at difficulty 1 and are due on the current study day.
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<CreateWordRequest>,
) -> Result<(StatusCode, Json<Word>)> {
    let text = payload.text.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest("Word text must not be empty".to_string()));
    }

    let word = state
        .db
        .create_word(auth.user_id, text, payload.definition.trim(), state.reviews.today())
        .await?;

    Ok((StatusCode::CREATED, Json(word.to_api_word())))
}

/// GET /api/words
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Query(query): Query<WordListQuery>,
) -> Result<Json<WordListResponse>> {
    let (skip, limit) = query.page();
    let words = state.db.get_words(auth.user_id, skip, limit).await?;

    Ok(Json(WordListResponse {
        words: words.iter().map(DbWord::to_api_word).collect(),
    }))
}
