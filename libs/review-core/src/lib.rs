//! Review scheduling core shared by the backend.
//!
//! Provides:
//! - Difficulty-driven backoff for rescheduling words
//! - Per-user review sessions (due queue plus id lookup)
//! - A concurrent session store with single-flight session creation
//! - Shared types (ReviewItem, difficulty bounds)

pub mod algorithm;
pub mod date_utils;
pub mod error;
pub mod session;
pub mod store;
pub mod types;

pub use algorithm::{DifficultyBackoff, SchedulingResult};
pub use error::{BoxError, ReviewError, Result};
pub use session::ReviewSession;
pub use store::{SessionGuard, SessionStore};
pub use types::{clamp_difficulty, ReviewItem, MAX_DIFFICULTY, MIN_DIFFICULTY};
