//! Review flow: session store in front, database behind.
//!
//! The session store decides what comes next and how a word is rescheduled;
//! this service supplies the loader for new sessions and writes each answer
//! back to PostgreSQL once the in-memory update has succeeded.

use std::sync::Arc;

use review_core::{DifficultyBackoff, ReviewItem, SessionStore};
use uuid::Uuid;

use crate::db::Database;
use crate::error::{ApiError, Result};
use crate::models::DbWord;

pub struct ReviewService {
    db: Arc<Database>,
    sessions: SessionStore<Uuid>,
    session_item_limit: i64,
}

impl ReviewService {
    pub fn new(db: Arc<Database>, session_item_limit: i64, daily_reset_hour: u32) -> Self {
        Self {
            db,
            sessions: SessionStore::new(DifficultyBackoff::default(), daily_reset_hour),
            session_item_limit,
        }
    }

    /// Next due word for the user, or `NoMoreReviews` once the session runs dry.
    pub async fn next_word(&self, user_id: Uuid) -> Result<ReviewItem> {
        let db = &self.db;
        let limit = self.session_item_limit;

        self.sessions
            .next_item(&user_id, || db.get_review_items(user_id, limit))
            .await?
            .ok_or(ApiError::NoMoreReviews)
    }

    /// Apply an answer to the user's session and persist the result.
    pub async fn submit_review(&self, user_id: Uuid, word_id: i64, was_correct: bool) -> Result<DbWord> {
        let updated = self
            .sessions
            .update_review(&user_id, word_id, was_correct)
            .await?;

        tracing::info!(
            %user_id,
            word_id,
            was_correct,
            difficulty = updated.difficulty,
            next_review_due = %updated.next_review_due,
            "Recorded review"
        );

        self.db
            .update_word_review(
                user_id,
                word_id,
                updated.next_review_due,
                i32::from(updated.difficulty),
            )
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Word {} not found", word_id)))
    }

    /// Discard the user's in-memory session.
    pub async fn end_session(&self, user_id: Uuid) {
        self.sessions.remove(&user_id).await;
    }

    /// The study day new words are first due on.
    pub fn today(&self) -> chrono::NaiveDate {
        self.sessions.today()
    }
}
