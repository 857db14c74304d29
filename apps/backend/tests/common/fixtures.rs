//! Test fixtures and factory functions for creating test data.

use chrono::{Days, Local, NaiveDate};
use serde_json::json;
use uuid::Uuid;

/// Today's date as the server sees it with the default reset hour.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn days_ago(days: u64) -> NaiveDate {
    today().checked_sub_days(Days::new(days)).unwrap()
}

pub fn days_ahead(days: u64) -> NaiveDate {
    today().checked_add_days(Days::new(days)).unwrap()
}

/// Create a word creation request body.
pub fn create_word_request(text: &str, definition: &str) -> serde_json::Value {
    json!({
        "text": text,
        "definition": definition,
    })
}

/// Create a review result request body.
pub fn review_result(was_correct: bool) -> serde_json::Value {
    json!({ "was_correct": was_correct })
}

/// Generate a unique username to avoid collisions.
pub fn unique_username(prefix: &str) -> String {
    format!("{}_{}", prefix, &Uuid::new_v4().to_string()[..8])
}
