//! Process-wide registry of live review sessions.
//!
//! Each user maps to a slot guarded by its own async mutex, which serializes
//! every operation on that user's session. The outer map lock is only held
//! for short lookups and is never awaited across a loader call, so loading
//! one user's words does not block anyone else.
//!
//! A slot is only removed from the map by a task holding the slot's lock.
//! Every operation re-checks registration after locking, so a task that
//! waited on a slot which has since been dropped starts over with a fresh one
//! instead of working on a detached session.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::{Mutex, OwnedMappedMutexGuard, OwnedMutexGuard};

use crate::algorithm::DifficultyBackoff;
use crate::date_utils::get_adjusted_today;
use crate::error::{BoxError, ReviewError, Result};
use crate::session::ReviewSession;
use crate::types::ReviewItem;

type SessionSlot = Arc<Mutex<Option<ReviewSession>>>;
type SlotGuard = OwnedMutexGuard<Option<ReviewSession>>;

/// Exclusive access to one user's session.
///
/// Holding the guard blocks every other operation for that user; drop it
/// before calling [`SessionStore::remove`] for the same user.
pub type SessionGuard = OwnedMappedMutexGuard<Option<ReviewSession>, ReviewSession>;

pub struct SessionStore<K> {
    sessions: Mutex<HashMap<K, SessionSlot>>,
    backoff: DifficultyBackoff,
    daily_reset_hour: u32,
}

impl<K> Default for SessionStore<K>
where
    K: Eq + Hash + Clone + Debug,
{
    fn default() -> Self {
        Self::new(DifficultyBackoff::default(), 0)
    }
}

impl<K> SessionStore<K>
where
    K: Eq + Hash + Clone + Debug,
{
    pub fn new(backoff: DifficultyBackoff, daily_reset_hour: u32) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            backoff,
            daily_reset_hour,
        }
    }

    /// The study day sessions are built and rescheduled against.
    pub fn today(&self) -> NaiveDate {
        get_adjusted_today(self.daily_reset_hour)
    }

    /// Return the user's session, loading it through `loader` if absent.
    ///
    /// Concurrent callers for the same user share one loader invocation. If
    /// the loader fails, nothing stays registered for the user.
    pub async fn get_or_create<F, Fut, E>(&self, user_id: &K, loader: F) -> Result<SessionGuard>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Vec<ReviewItem>, E>>,
        E: Into<BoxError>,
    {
        let (_, guard) = self.lock_or_load(user_id, loader).await?;
        OwnedMutexGuard::try_map(guard, |slot| slot.as_mut()).map_err(|_| ReviewError::NoActiveSession)
    }

    /// Pop the user's next due word, creating the session on first use.
    ///
    /// Returns `Ok(None)` when nothing more is due; the exhausted session is
    /// dropped before this call returns.
    pub async fn next_item<F, Fut, E>(&self, user_id: &K, loader: F) -> Result<Option<ReviewItem>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Vec<ReviewItem>, E>>,
        E: Into<BoxError>,
    {
        let (slot, mut guard) = self.lock_or_load(user_id, loader).await?;

        let next = match guard.as_mut() {
            Some(session) => session.get_next()?,
            None => None,
        };

        if next.is_none() {
            self.unregister(user_id, &slot).await;
            tracing::info!(user_id = ?user_id, "Review session exhausted");
        }

        Ok(next)
    }

    /// Record an answer for a word in the user's active session.
    pub async fn update_review(
        &self,
        user_id: &K,
        item_id: i64,
        was_correct: bool,
    ) -> Result<ReviewItem> {
        let (_, mut guard) = self
            .lock_slot(user_id, false)
            .await
            .ok_or(ReviewError::NoActiveSession)?;

        let session = guard.as_mut().ok_or(ReviewError::NoActiveSession)?;
        session.update_review(item_id, was_correct, self.today())
    }

    /// Drop the user's session. Removing an absent session is a no-op.
    pub async fn remove(&self, user_id: &K) {
        if let Some((slot, _guard)) = self.lock_slot(user_id, false).await {
            self.unregister(user_id, &slot).await;
        }
    }

    async fn lock_or_load<F, Fut, E>(&self, user_id: &K, loader: F) -> Result<(SessionSlot, SlotGuard)>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Vec<ReviewItem>, E>>,
        E: Into<BoxError>,
    {
        let (slot, mut guard) = self
            .lock_slot(user_id, true)
            .await
            .ok_or(ReviewError::NoActiveSession)?;

        if guard.is_none() {
            match loader().await {
                Ok(items) => {
                    let session = ReviewSession::with_backoff(items, self.today(), self.backoff);
                    tracing::info!(
                        user_id = ?user_id,
                        words = session.len(),
                        due = session.remaining(),
                        "Created review session"
                    );
                    *guard = Some(session);
                }
                Err(err) => {
                    self.unregister(user_id, &slot).await;
                    let err: BoxError = err.into();
                    tracing::warn!(user_id = ?user_id, error = %err, "Failed to load review items");
                    return Err(ReviewError::LoaderFailure(err));
                }
            }
        }

        Ok((slot, guard))
    }

    /// Lock the slot registered for `user_id`, inserting an empty one when
    /// `create` is set. Returns `None` if there is no slot and `create` is off.
    async fn lock_slot(&self, user_id: &K, create: bool) -> Option<(SessionSlot, SlotGuard)> {
        loop {
            let slot = {
                let mut sessions = self.sessions.lock().await;
                match sessions.get(user_id) {
                    Some(slot) => slot.clone(),
                    None if create => {
                        let slot = SessionSlot::default();
                        sessions.insert(user_id.clone(), slot.clone());
                        slot
                    }
                    None => return None,
                }
            };

            let guard = slot.clone().lock_owned().await;
            if self.is_registered(user_id, &slot).await {
                return Some((slot, guard));
            }
        }
    }

    async fn is_registered(&self, user_id: &K, slot: &SessionSlot) -> bool {
        let sessions = self.sessions.lock().await;
        sessions
            .get(user_id)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
    }

    /// Must be called while holding `slot`'s lock.
    async fn unregister(&self, user_id: &K, slot: &SessionSlot) {
        let mut sessions = self.sessions.lock().await;
        if sessions
            .get(user_id)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
        {
            sessions.remove(user_id);
        }
    }

    #[cfg(test)]
    async fn has_session(&self, user_id: &K) -> bool {
        self.sessions.lock().await.contains_key(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn word(id: i64, difficulty: u8, next_review_due: NaiveDate) -> ReviewItem {
        ReviewItem {
            id,
            text: format!("word-{id}"),
            definition: format!("definition of word-{id}"),
            difficulty,
            next_review_due,
        }
    }

    fn days_ago(days: u64) -> NaiveDate {
        get_adjusted_today(0).checked_sub_days(Days::new(days)).unwrap()
    }

    fn days_ahead(days: u64) -> NaiveDate {
        get_adjusted_today(0).checked_add_days(Days::new(days)).unwrap()
    }

    /// Loader that counts its calls and yields before returning.
    async fn counted(calls: &AtomicUsize, items: Vec<ReviewItem>) -> io::Result<Vec<ReviewItem>> {
        calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok(items)
    }

    async fn pop_via_guard<F, Fut>(store: &SessionStore<u32>, loader: F) -> Option<i64>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = io::Result<Vec<ReviewItem>>>,
    {
        let mut session = store.get_or_create(&9, loader).await.unwrap();
        session.get_next().unwrap().map(|w| w.id)
    }

    async fn failing_loader() -> io::Result<Vec<ReviewItem>> {
        Err(io::Error::new(io::ErrorKind::ConnectionRefused, "database unavailable"))
    }

    #[tokio::test]
    async fn next_item_walks_the_queue_then_drops_session() {
        let store: SessionStore<u32> = SessionStore::default();
        let calls = AtomicUsize::new(0);
        let items = vec![word(7, 3, days_ago(1)), word(3, 3, days_ago(1))];

        let first = store.next_item(&1, || counted(&calls, items.clone())).await.unwrap();
        let second = store.next_item(&1, || counted(&calls, items.clone())).await.unwrap();
        assert_eq!(first.map(|w| w.id), Some(3));
        assert_eq!(second.map(|w| w.id), Some(7));
        assert!(store.has_session(&1).await);

        let third = store.next_item(&1, || counted(&calls, items)).await.unwrap();
        assert_eq!(third, None);
        assert!(!store.has_session(&1).await);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_first_requests_share_one_load() {
        let store: SessionStore<u32> = SessionStore::default();
        let calls = AtomicUsize::new(0);
        let items = vec![word(1, 2, days_ago(2)), word(2, 2, days_ago(1))];

        let (a, b) = tokio::join!(
            store.next_item(&5, || counted(&calls, items.clone())),
            store.next_item(&5, || counted(&calls, items.clone())),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let ids: HashSet<i64> = [a.unwrap(), b.unwrap()]
            .into_iter()
            .map(|w| w.unwrap().id)
            .collect();
        assert_eq!(ids, HashSet::from([1, 2]));
    }

    #[tokio::test]
    async fn concurrent_get_or_create_observe_same_session() {
        let store: SessionStore<u32> = SessionStore::default();
        let calls = AtomicUsize::new(0);
        let items = vec![word(1, 2, days_ago(1)), word(2, 2, days_ago(1))];

        let (a, b) = tokio::join!(
            pop_via_guard(&store, || counted(&calls, items.clone())),
            pop_via_guard(&store, || counted(&calls, items.clone())),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let mut ids = vec![a.unwrap(), b.unwrap()];
        ids.sort();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn parallel_pops_never_repeat_an_item() {
        let store: Arc<SessionStore<u32>> = Arc::new(SessionStore::default());
        let calls = Arc::new(AtomicUsize::new(0));
        let items: Vec<ReviewItem> = (1..=8).map(|id| word(id, 4, days_ago(id as u64))).collect();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            let calls = calls.clone();
            let items = items.clone();
            handles.push(tokio::spawn(async move {
                store
                    .next_item(&1, || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        Ok::<_, io::Error>(items)
                    })
                    .await
            }));
        }

        let mut ids = HashSet::new();
        for handle in handles {
            let item = handle.await.unwrap().unwrap().unwrap();
            assert!(ids.insert(item.id), "item {} returned twice", item.id);
        }
        assert_eq!(ids.len(), 8);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn loader_failure_registers_nothing() {
        let store: SessionStore<u32> = SessionStore::default();

        let err = store.next_item(&3, failing_loader).await.unwrap_err();
        assert!(matches!(err, ReviewError::LoaderFailure(_)));
        assert_eq!(err.to_string(), "failed to load review items: database unavailable");
        assert!(!store.has_session(&3).await);

        let err = store.update_review(&3, 1, true).await.unwrap_err();
        assert!(matches!(err, ReviewError::NoActiveSession));

        // A later request retries the load.
        let calls = AtomicUsize::new(0);
        let next = store
            .next_item(&3, || counted(&calls, vec![word(1, 2, days_ago(1))]))
            .await
            .unwrap();
        assert_eq!(next.map(|w| w.id), Some(1));
    }

    #[tokio::test]
    async fn update_without_session_is_rejected() {
        let store: SessionStore<u32> = SessionStore::default();
        let err = store.update_review(&1, 10, true).await.unwrap_err();
        assert!(matches!(err, ReviewError::NoActiveSession));
        assert!(!store.has_session(&1).await);
    }

    #[tokio::test]
    async fn update_unknown_item_is_rejected() {
        let store: SessionStore<u32> = SessionStore::default();
        let calls = AtomicUsize::new(0);
        let items = vec![word(1, 5, days_ago(1)), word(2, 5, days_ago(1))];
        store.next_item(&1, || counted(&calls, items)).await.unwrap();

        let err = store.update_review(&1, 42, false).await.unwrap_err();
        assert!(matches!(err, ReviewError::ItemNotInSession { item_id: 42 }));

        let session = store
            .get_or_create(&1, || counted(&calls, Vec::new()))
            .await
            .unwrap();
        assert_eq!(session.remaining(), 1);
        assert_eq!(session.get(1).map(|w| w.difficulty), Some(5));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn update_reschedules_tracked_words() {
        let store: SessionStore<u32> = SessionStore::default();
        let calls = AtomicUsize::new(0);
        let items = vec![word(1, 5, days_ago(0)), word(2, 1, days_ago(1)), word(3, 2, days_ahead(3))];
        store.next_item(&1, || counted(&calls, items)).await.unwrap();

        let wrong = store.update_review(&1, 1, false).await.unwrap();
        assert_eq!(wrong.difficulty, 6);
        assert_eq!(wrong.next_review_due, store.today().checked_add_days(Days::new(1)).unwrap());

        let right = store.update_review(&1, 2, true).await.unwrap();
        assert_eq!(right.difficulty, 1);
        assert_eq!(right.next_review_due, store.today().checked_add_days(Days::new(128)).unwrap());

        // Tracked though never due today.
        let future = store.update_review(&1, 3, true).await.unwrap();
        assert_eq!(future.difficulty, 1);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let store: SessionStore<u32> = SessionStore::default();
        store.remove(&1).await;

        let calls = AtomicUsize::new(0);
        let items = vec![word(1, 5, days_ago(1)), word(2, 5, days_ago(1))];
        store.next_item(&1, || counted(&calls, items.clone())).await.unwrap();
        store.remove(&1).await;
        store.remove(&1).await;
        assert!(!store.has_session(&1).await);

        let err = store.update_review(&1, 2, true).await.unwrap_err();
        assert!(matches!(err, ReviewError::NoActiveSession));

        // Next request rebuilds the session from the loader.
        let next = store.next_item(&1, || counted(&calls, items)).await.unwrap();
        assert_eq!(next.map(|w| w.id), Some(1));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn users_are_isolated() {
        let store: SessionStore<&'static str> = SessionStore::default();
        let calls = AtomicUsize::new(0);

        store
            .next_item(&"alice", || counted(&calls, vec![word(1, 2, days_ago(1))]))
            .await
            .unwrap();
        let bob = store
            .next_item(&"bob", || counted(&calls, vec![word(2, 2, days_ago(1))]))
            .await
            .unwrap();
        assert_eq!(bob.map(|w| w.id), Some(2));

        let err = store.update_review(&"bob", 1, true).await.unwrap_err();
        assert!(matches!(err, ReviewError::ItemNotInSession { item_id: 1 }));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_load_is_exhausted_immediately() {
        let store: SessionStore<u32> = SessionStore::default();
        let calls = AtomicUsize::new(0);
        let next = store
            .next_item(&1, || counted(&calls, vec![word(1, 2, days_ahead(2))]))
            .await
            .unwrap();
        assert_eq!(next, None);
        assert!(!store.has_session(&1).await);
    }
}
