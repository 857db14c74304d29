//! Database models and API types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub use review_core::types::{clamp_difficulty, ReviewItem};

/// Default page size for word listings.
pub const DEFAULT_WORD_LIMIT: i64 = 100;

/// Largest page size a client may request.
pub const MAX_WORD_LIMIT: i64 = 1000;

// === Database Entity Types ===

/// Registered user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

/// Word stored in PostgreSQL
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbWord {
    pub id: i64,
    pub user_id: Uuid,
    pub text: String,
    pub definition: String,
    pub difficulty: i32,
    pub next_review_due: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbWord {
    /// Convert to the scheduler's item type, clamping stray difficulties.
    pub fn to_review_item(&self) -> ReviewItem {
        ReviewItem {
            id: self.id,
            text: self.text.clone(),
            definition: self.definition.clone(),
            difficulty: clamp_difficulty(i64::from(self.difficulty)),
            next_review_due: self.next_review_due,
        }
    }

    /// Convert to API word type
    pub fn to_api_word(&self) -> Word {
        Word {
            id: self.id,
            text: self.text.clone(),
            definition: self.definition.clone(),
            difficulty: self.difficulty,
            next_review_due: self.next_review_due,
        }
    }
}

// === API Types ===

/// Word as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub id: i64,
    pub text: String,
    pub definition: String,
    pub difficulty: i32,
    pub next_review_due: NaiveDate,
}

impl From<ReviewItem> for Word {
    fn from(item: ReviewItem) -> Self {
        Self {
            id: item.id,
            text: item.text,
            definition: item.definition,
            difficulty: i32::from(item.difficulty),
            next_review_due: item.next_review_due,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserResponse {
    pub user_id: Uuid,
    pub username: String,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWordRequest {
    pub text: String,
    #[serde(default)]
    pub definition: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WordListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl WordListQuery {
    /// Resolve `(skip, limit)` with defaults and bounds applied.
    pub fn page(&self) -> (i64, i64) {
        let skip = self.skip.unwrap_or(0).max(0);
        let limit = self
            .limit
            .unwrap_or(DEFAULT_WORD_LIMIT)
            .clamp(1, MAX_WORD_LIMIT);
        (skip, limit)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordListResponse {
    pub words: Vec<Word>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewResultRequest {
    pub was_correct: bool,
}
