//! Difficulty-driven exponential backoff.
//!
//! Difficulty works as an inverse exponent: after a correct answer a word
//! waits `2^(base_exponent - difficulty)` days, so easy words drift far into
//! the future while hard ones come back almost immediately. A wrong answer
//! always brings the word back after `failure_interval` days.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::{clamp_difficulty, MAX_DIFFICULTY, MIN_DIFFICULTY};

/// Result of scheduling a word after review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulingResult {
    pub difficulty: u8,
    pub interval_days: u64,
    pub next_due: NaiveDate,
}

/// Backoff policy with configurable parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyBackoff {
    pub base_exponent: u8,
    pub failure_interval: u32,
    pub min_interval: u32,
}

impl Default for DifficultyBackoff {
    fn default() -> Self {
        Self {
            base_exponent: 8,
            failure_interval: 1,
            min_interval: 1,
        }
    }
}

impl DifficultyBackoff {
    /// Days until the next review, computed from the difficulty before it is adjusted.
    pub fn interval_days(&self, difficulty: u8, was_correct: bool) -> u64 {
        if !was_correct {
            return u64::from(self.failure_interval);
        }

        let exponent = i32::from(self.base_exponent) - i32::from(difficulty);
        // Negative exponents give fractional intervals, which round down to zero
        // before the minimum applies.
        let interval = if exponent < 0 {
            0
        } else {
            2u64.saturating_pow(exponent as u32)
        };
        interval.max(u64::from(self.min_interval))
    }

    /// Calculate the new difficulty and due date after a review on `today`.
    pub fn schedule(&self, difficulty: u8, was_correct: bool, today: NaiveDate) -> SchedulingResult {
        let difficulty = clamp_difficulty(i64::from(difficulty));
        let interval_days = self.interval_days(difficulty, was_correct);

        let new_difficulty = if was_correct {
            difficulty.saturating_sub(1).max(MIN_DIFFICULTY)
        } else {
            (difficulty + 1).min(MAX_DIFFICULTY)
        };

        let next_due = today
            .checked_add_days(Days::new(interval_days))
            .unwrap_or(NaiveDate::MAX);

        SchedulingResult {
            difficulty: new_difficulty,
            interval_days,
            next_due,
        }
    }
}
