//! PostgreSQL database operations

use chrono::NaiveDate;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a pool that only connects on first use
    pub fn connect_lazy(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new().connect_lazy(database_url)?;
        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Database(e.into()))?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // === User Repository ===

    /// Create a new user with generated token
    pub async fn create_user(&self, username: &str) -> Result<User> {
        let token = Uuid::new_v4().to_string();
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, token)
            VALUES ($1, $2)
            RETURNING id, username, token, created_at
            "#,
        )
        .bind(username)
        .bind(&token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                ApiError::BadRequest("Username already registered".to_string())
            }
            other => ApiError::Database(other),
        })?;

        Ok(user)
    }

    /// Get user by token
    pub async fn get_user_by_token(&self, token: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, token, created_at
            FROM users
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Get user by ID
    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, token, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    // === Word Repository ===

    /// Insert a new word, first due on `due`
    pub async fn create_word(
        &self,
        user_id: Uuid,
        text: &str,
        definition: &str,
        due: NaiveDate,
    ) -> Result<DbWord> {
        let word = sqlx::query_as::<_, DbWord>(
            r#"
            INSERT INTO words (user_id, text, definition, difficulty, next_review_due)
            VALUES ($1, $2, $3, 1, $4)
            RETURNING id, user_id, text, definition, difficulty, next_review_due,
                      created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(text)
        .bind(definition)
        .bind(due)
        .fetch_one(&self.pool)
        .await?;

        Ok(word)
    }

    /// Get one page of a user's words ordered by id
    pub async fn get_words(&self, user_id: Uuid, skip: i64, limit: i64) -> Result<Vec<DbWord>> {
        let words = sqlx::query_as::<_, DbWord>(
            r#"
            SELECT id, user_id, text, definition, difficulty, next_review_due,
                   created_at, updated_at
            FROM words
            WHERE user_id = $1
            ORDER BY id
            OFFSET $2
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(words)
    }

    /// Load the snapshot a review session is built from
    pub async fn get_review_items(&self, user_id: Uuid, limit: i64) -> Result<Vec<ReviewItem>> {
        let words = self.get_words(user_id, 0, limit).await?;
        Ok(words.iter().map(DbWord::to_review_item).collect())
    }

    /// Persist a rescheduled word, returning `None` if it no longer exists
    pub async fn update_word_review(
        &self,
        user_id: Uuid,
        word_id: i64,
        next_review_due: NaiveDate,
        difficulty: i32,
    ) -> Result<Option<DbWord>> {
        let word = sqlx::query_as::<_, DbWord>(
            r#"
            UPDATE words
            SET next_review_due = $3, difficulty = $4, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, text, definition, difficulty, next_review_due,
                      created_at, updated_at
            "#,
        )
        .bind(word_id)
        .bind(user_id)
        .bind(next_review_due)
        .bind(difficulty)
        .fetch_optional(&self.pool)
        .await?;

        Ok(word)
    }
}
