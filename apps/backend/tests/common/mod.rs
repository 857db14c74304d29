//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext for setting up test environment with database
//! - Helper functions for creating test data
//! - Authentication helpers
//!
//! # Requirements
//! Integration tests require a PostgreSQL database (set DATABASE_URL env var).

#![allow(dead_code)]

pub mod fixtures;

use std::sync::Arc;

use axum::Router;
use chrono::NaiveDate;
use uuid::Uuid;

use vocab_review_backend::config::Config;
use vocab_review_backend::db::Database;
use vocab_review_backend::models::DbWord;
use vocab_review_backend::{router, AppState};

/// Test context containing database connection and test server.
///
/// Each context owns its own `AppState`, so review sessions never leak
/// between tests.
pub struct TestContext {
    pub db: Arc<Database>,
    app: Router,
}

impl TestContext {
    /// Create a new test context.
    ///
    /// # Panics
    /// Panics if DATABASE_URL is not set or database connection fails.
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();

        let config = Config::from_env().expect("DATABASE_URL must be set for integration tests");

        let db = Database::connect(&config.database_url, 2)
            .await
            .expect("Failed to connect to test database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        let state = AppState::new(db, &config);
        let db = state.db.clone();
        let app = router(state);

        Self { db, app }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Create a test user and return its ID and token.
    pub async fn create_test_user(&self) -> (Uuid, String) {
        let user = self
            .db
            .create_user(&fixtures::unique_username("user"))
            .await
            .expect("Failed to create test user");
        (user.id, user.token)
    }

    /// Insert a word directly with the given schedule.
    pub async fn insert_word(
        &self,
        user_id: Uuid,
        text: &str,
        difficulty: i32,
        due: NaiveDate,
    ) -> DbWord {
        let word = self
            .db
            .create_word(user_id, text, &format!("definition of {}", text), due)
            .await
            .expect("Failed to insert word");

        if difficulty == 1 {
            return word;
        }

        self.db
            .update_word_review(user_id, word.id, due, difficulty)
            .await
            .expect("Failed to set difficulty")
            .expect("Inserted word vanished")
    }

    /// Read a word back from the database.
    pub async fn get_word(&self, user_id: Uuid, word_id: i64) -> Option<DbWord> {
        self.db
            .get_words(user_id, 0, 1000)
            .await
            .expect("Failed to list words")
            .into_iter()
            .find(|w| w.id == word_id)
    }

    /// Format authorization header value.
    pub fn auth_header_value(token: &str) -> String {
        format!("Bearer {}", token)
    }

    /// Clean up test data for a user.
    pub async fn cleanup_user(&self, user_id: Uuid) {
        let _ = sqlx::query("DELETE FROM words WHERE user_id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;

        let _ = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;
    }
}
