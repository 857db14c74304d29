//! Core types for the review scheduler.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Easiest difficulty a word can have.
pub const MIN_DIFFICULTY: u8 = 1;

/// Hardest difficulty a word can have.
pub const MAX_DIFFICULTY: u8 = 10;

/// Clamp a stored difficulty into `[MIN_DIFFICULTY, MAX_DIFFICULTY]`.
pub fn clamp_difficulty(value: i64) -> u8 {
    value.clamp(i64::from(MIN_DIFFICULTY), i64::from(MAX_DIFFICULTY)) as u8
}

/// A vocabulary word being scheduled.
///
/// `text` and `definition` are carried through untouched; only `difficulty`
/// and `next_review_due` change when a word is reviewed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub id: i64,
    pub text: String,
    pub definition: String,
    pub difficulty: u8,
    pub next_review_due: NaiveDate,
}

impl ReviewItem {
    /// Whether the word is eligible for review on `today`.
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.next_review_due <= today
    }
}
