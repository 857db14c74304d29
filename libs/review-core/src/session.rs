//! One user's review session.
//!
//! A session is built once from a snapshot of the user's words. Words due on
//! the day the session starts go into a min-heap keyed by `(due date, id)`;
//! every word, due or not, goes into the id lookup. Each queued word is handed
//! out at most once: rescheduling updates the lookup but never re-queues.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use chrono::NaiveDate;

use crate::algorithm::DifficultyBackoff;
use crate::error::{ReviewError, Result};
use crate::types::ReviewItem;

#[derive(Debug, Clone)]
pub struct ReviewSession {
    items_by_id: HashMap<i64, ReviewItem>,
    due_queue: BinaryHeap<Reverse<(NaiveDate, i64)>>,
    backoff: DifficultyBackoff,
}

impl ReviewSession {
    /// Build a session using the default backoff policy.
    pub fn new(items: impl IntoIterator<Item = ReviewItem>, today: NaiveDate) -> Self {
        Self::with_backoff(items, today, DifficultyBackoff::default())
    }

    pub fn with_backoff(
        items: impl IntoIterator<Item = ReviewItem>,
        today: NaiveDate,
        backoff: DifficultyBackoff,
    ) -> Self {
        let items_by_id: HashMap<i64, ReviewItem> =
            items.into_iter().map(|item| (item.id, item)).collect();

        // Built from the map so a duplicated id is only queued once.
        let due_queue = items_by_id
            .values()
            .filter(|item| item.is_due(today))
            .map(|item| Reverse((item.next_review_due, item.id)))
            .collect();

        Self {
            items_by_id,
            due_queue,
            backoff,
        }
    }

    /// Pop the earliest-due word, ties broken by ascending id.
    ///
    /// Returns `Ok(None)` once the queue is exhausted.
    pub fn get_next(&mut self) -> Result<Option<ReviewItem>> {
        let Some(Reverse((_, item_id))) = self.due_queue.pop() else {
            return Ok(None);
        };

        match self.items_by_id.get(&item_id) {
            Some(item) => Ok(Some(item.clone())),
            None => {
                tracing::error!(item_id, "Due queue references an item missing from the session");
                Err(ReviewError::CorruptSession { item_id })
            }
        }
    }

    /// Record an answer for a tracked word and return its updated state.
    ///
    /// The word is not put back into the due queue, even if its new due date
    /// is `today`.
    pub fn update_review(
        &mut self,
        item_id: i64,
        was_correct: bool,
        today: NaiveDate,
    ) -> Result<ReviewItem> {
        let item = self
            .items_by_id
            .get_mut(&item_id)
            .ok_or(ReviewError::ItemNotInSession { item_id })?;

        let result = self.backoff.schedule(item.difficulty, was_correct, today);
        item.difficulty = result.difficulty;
        item.next_review_due = result.next_due;

        tracing::debug!(
            item_id,
            was_correct,
            difficulty = result.difficulty,
            interval_days = result.interval_days,
            "Rescheduled word"
        );

        Ok(item.clone())
    }

    /// Look up a tracked word.
    pub fn get(&self, item_id: i64) -> Option<&ReviewItem> {
        self.items_by_id.get(&item_id)
    }

    /// Number of words still waiting in the due queue.
    pub fn remaining(&self) -> usize {
        self.due_queue.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.due_queue.is_empty()
    }

    /// Number of words tracked by the session, due or not.
    pub fn len(&self) -> usize {
        self.items_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items_by_id.is_empty()
    }
}
