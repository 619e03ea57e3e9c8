//! Optimistic mutations
//!
//! An optimistic mutation writes its expected outcome into the cache before
//! the server has answered, then either keeps it (by invalidating, so the
//! server's version replaces the guess) or puts the snapshot back.
//!
//! The protocol is a small state machine:
//!
//! ```text
//! Pending -> Snapshotted -> Applied -> InFlight -> Committed
//!                 |            |          |
//!                 +------------+----------+-----> RolledBack
//! ```
//!
//! `run_optimistic` drives a mutation through it and reports the outcome
//! through a `Notifier`. Nothing is retried.

use std::fmt;
use std::future::Future;

use uuid::Uuid;

use crate::client::cache::{QueryCache, QueryKey, Snapshot};
use crate::client::error::ClientError;
use crate::client::notify::{Notification, Notifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationPhase {
    Pending,
    Snapshotted,
    Applied,
    InFlight,
    Committed,
    RolledBack,
}

impl fmt::Display for MutationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Snapshotted => "snapshotted",
            Self::Applied => "applied",
            Self::InFlight => "in-flight",
            Self::Committed => "committed",
            Self::RolledBack => "rolled-back",
        };
        f.write_str(name)
    }
}

/// One optimistic change to one cache key
#[derive(Debug)]
pub struct OptimisticMutation<V> {
    id: Uuid,
    key: QueryKey,
    cache: QueryCache<V>,
    phase: MutationPhase,
    snapshot: Option<Snapshot<V>>,
    wrote: bool,
}

impl<V> OptimisticMutation<V>
where
    V: Clone + Send + 'static,
{
    pub fn new(cache: QueryCache<V>, key: QueryKey) -> Self {
        Self {
            id: Uuid::new_v4(),
            key,
            cache,
            phase: MutationPhase::Pending,
            snapshot: None,
            wrote: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn phase(&self) -> MutationPhase {
        self.phase
    }

    fn require(&self, operation: &'static str, allowed: &[MutationPhase]) -> Result<(), ClientError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(ClientError::InvalidPhase {
                operation,
                phase: self.phase,
            })
        }
    }

    fn transition(&mut self, next: MutationPhase) {
        tracing::debug!("Mutation {} on {}: {} -> {}", self.id, self.key, self.phase, next);
        self.phase = next;
    }

    /// Cancel any refetch of the key and save its current value
    pub fn snapshot(&mut self) -> Result<&Snapshot<V>, ClientError> {
        self.require("snapshot", &[MutationPhase::Pending])?;
        self.cache.cancel(&self.key);
        let snapshot = self.cache.snapshot(&self.key);
        self.transition(MutationPhase::Snapshotted);
        Ok(self.snapshot.insert(snapshot))
    }

    /// Write the optimistic value
    ///
    /// `synthesize` gets the snapshotted value and returns the guess, or
    /// `None` to leave the entry untouched.
    pub fn apply<F>(&mut self, synthesize: F) -> Result<(), ClientError>
    where
        F: FnOnce(Option<&V>) -> Option<V>,
    {
        self.require("apply", &[MutationPhase::Snapshotted])?;
        let current = self.snapshot.as_ref().and_then(Snapshot::value);
        if let Some(value) = synthesize(current) {
            self.cache.set_optimistic(self.key.clone(), value, self.id);
            self.wrote = true;
        }
        self.transition(MutationPhase::Applied);
        Ok(())
    }

    /// Mark the network request as sent
    pub fn send(&mut self) -> Result<(), ClientError> {
        self.require("send", &[MutationPhase::Applied])?;
        self.transition(MutationPhase::InFlight);
        Ok(())
    }

    /// The server accepted; let the authoritative value replace the guess
    pub fn commit(&mut self) -> Result<(), ClientError> {
        self.require("commit", &[MutationPhase::InFlight])?;
        self.cache.invalidate(&self.key);
        self.transition(MutationPhase::Committed);
        Ok(())
    }

    /// Put the snapshot back
    ///
    /// The snapshot is only written while the entry still holds this
    /// mutation's guess. If something else has written since, or the
    /// snapshot itself held another mutation's guess, the key is
    /// invalidated instead so the server value replaces it. Rolling back
    /// twice is a no-op.
    pub fn rollback(&mut self) -> Result<(), ClientError> {
        if self.phase == MutationPhase::RolledBack {
            return Ok(());
        }
        self.require(
            "roll back",
            &[
                MutationPhase::Snapshotted,
                MutationPhase::Applied,
                MutationPhase::InFlight,
            ],
        )?;
        if let (true, Some(snapshot)) = (self.wrote, &self.snapshot) {
            let restored = self.cache.restore_if_owned(&self.key, snapshot, self.id);
            if !restored || snapshot.tag().is_some() {
                self.cache.invalidate(&self.key);
            }
        }
        self.transition(MutationPhase::RolledBack);
        Ok(())
    }
}

/// Notification texts for one kind of mutation
#[derive(Debug, Clone, Copy)]
pub struct MutationMessages {
    /// Shown when the server accepts
    pub success: &'static str,
    /// Shown when the failure carries no message of its own
    pub failure: &'static str,
}

/// Run the whole optimistic protocol for one request
///
/// 1. cancel refetches of `key` and snapshot it
/// 2. write `synthesize`'s guess
/// 3. send `request`
/// 4. on success invalidate `key` and notify `messages.success`
/// 5. on failure restore the snapshot and notify the error
pub async fn run_optimistic<V, T, S, R, Fut>(
    cache: &QueryCache<V>,
    key: QueryKey,
    notifier: &dyn Notifier,
    messages: MutationMessages,
    synthesize: S,
    request: R,
) -> Result<T, ClientError>
where
    V: Clone + Send + 'static,
    S: FnOnce(Option<&V>) -> Option<V>,
    R: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let mut mutation = OptimisticMutation::new(cache.clone(), key);
    mutation.snapshot()?;
    mutation.apply(synthesize)?;
    mutation.send()?;

    match request().await {
        Ok(result) => {
            mutation.commit()?;
            notifier.notify(Notification::success(messages.success));
            Ok(result)
        }
        Err(error) => {
            mutation.rollback()?;
            notifier.notify(Notification::error(
                error.notification_message(messages.failure),
            ));
            Err(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::cache::CacheEvent;
    use crate::client::notify::{ChannelNotifier, NotificationKind};
    use assert_matches::assert_matches;

    fn key() -> QueryKey {
        QueryKey::Comments("p1".to_string())
    }

    fn appended(values: &[u32], extra: u32) -> Vec<u32> {
        let mut values = values.to_vec();
        values.push(extra);
        values
    }

    #[test]
    fn test_phases_in_order() {
        let cache: QueryCache<Vec<u32>> = QueryCache::new();
        cache.set(key(), vec![1]);

        let mut mutation = OptimisticMutation::new(cache.clone(), key());
        assert_eq!(mutation.phase(), MutationPhase::Pending);
        mutation.snapshot().unwrap();
        mutation.apply(|current| current.map(|v| appended(v, 2))).unwrap();
        assert_eq!(cache.get(&key()), Some(vec![1, 2]));
        assert_eq!(cache.optimistic_tag(&key()), Some(mutation.id()));

        mutation.send().unwrap();
        mutation.rollback().unwrap();
        assert_eq!(cache.get(&key()), Some(vec![1]));
        assert_eq!(cache.optimistic_tag(&key()), None);
        assert_eq!(mutation.phase(), MutationPhase::RolledBack);
    }

    #[tokio::test]
    async fn test_overlapping_rollbacks_reconcile_with_server() {
        let cache: QueryCache<Vec<u32>> = QueryCache::new();
        let mut subscription = cache.subscribe(key(), || async { Ok(vec![1]) });
        cache.set(key(), vec![1]);

        let mut first = OptimisticMutation::new(cache.clone(), key());
        first.snapshot().unwrap();
        first.apply(|current| current.map(|v| appended(v, 100))).unwrap();
        first.send().unwrap();

        let mut second = OptimisticMutation::new(cache.clone(), key());
        second.snapshot().unwrap();
        second.apply(|current| current.map(|v| appended(v, 200))).unwrap();
        second.send().unwrap();
        assert_eq!(cache.get(&key()), Some(vec![1, 100, 200]));

        // The first cannot restore over the second's guess
        first.rollback().unwrap();
        assert_eq!(cache.get(&key()), Some(vec![1, 100, 200]));
        assert!(cache.is_stale(&key()));

        // The second's snapshot holds the first's dead guess
        second.rollback().unwrap();
        assert!(cache.is_stale(&key()));

        let settled = tokio::time::timeout(std::time::Duration::from_secs(5), async {
            loop {
                match subscription.next().await {
                    Some(CacheEvent::Updated { value }) if !cache.is_stale(&key()) => break value,
                    Some(_) => continue,
                    None => break None,
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(settled, Some(vec![1]));
        assert_eq!(cache.get(&key()), Some(vec![1]));
        assert_eq!(cache.optimistic_tag(&key()), None);
    }

    #[test]
    fn test_rollback_after_server_value_keeps_it() {
        let cache: QueryCache<Vec<u32>> = QueryCache::new();
        cache.set(key(), vec![1]);

        let mut mutation = OptimisticMutation::new(cache.clone(), key());
        mutation.snapshot().unwrap();
        mutation.apply(|current| current.map(|v| appended(v, 2))).unwrap();
        mutation.send().unwrap();
        cache.set(key(), vec![1, 3]);

        mutation.rollback().unwrap();
        assert_eq!(cache.get(&key()), Some(vec![1, 3]));
        assert!(cache.is_stale(&key()));
    }

    #[test]
    fn test_out_of_order_calls_fail() {
        let cache: QueryCache<Vec<u32>> = QueryCache::new();
        let mut mutation = OptimisticMutation::new(cache, key());

        assert_matches!(
            mutation.apply(|_| None),
            Err(ClientError::InvalidPhase { operation: "apply", phase: MutationPhase::Pending })
        );
        assert_matches!(mutation.commit(), Err(ClientError::InvalidPhase { .. }));
        assert_matches!(mutation.rollback(), Err(ClientError::InvalidPhase { .. }));

        mutation.snapshot().unwrap();
        assert_matches!(mutation.snapshot(), Err(ClientError::InvalidPhase { .. }));
    }

    #[test]
    fn test_rollback_is_idempotent_for_absent() {
        let cache: QueryCache<Vec<u32>> = QueryCache::new();
        let mut mutation = OptimisticMutation::new(cache.clone(), key());
        mutation.snapshot().unwrap();
        mutation.apply(|current| Some(current.cloned().unwrap_or_default())).unwrap();
        assert_eq!(cache.get(&key()), Some(vec![]));

        mutation.rollback().unwrap();
        assert_eq!(cache.get(&key()), None);
        mutation.rollback().unwrap();
        assert_eq!(cache.get(&key()), None);
    }

    #[tokio::test]
    async fn test_run_optimistic_failure_restores_and_notifies() {
        let cache: QueryCache<Vec<u32>> = QueryCache::new();
        cache.set(key(), vec![1, 2, 3]);
        let (notifier, mut notifications) = ChannelNotifier::new();

        let result: Result<(), ClientError> = run_optimistic(
            &cache,
            key(),
            &notifier,
            MutationMessages {
                success: "Deleted",
                failure: "Failed to delete",
            },
            |current| current.map(|v| v.iter().copied().filter(|n| *n != 2).collect()),
            || async { Err(ClientError::Forbidden("Not authorized to delete this comment".into())) },
        )
        .await;

        assert_matches!(result, Err(ClientError::Forbidden(_)));
        assert_eq!(cache.get(&key()), Some(vec![1, 2, 3]));
        let notification = notifications.try_recv().unwrap();
        assert_eq!(notification.kind, NotificationKind::Error);
        assert_eq!(notification.message, "Not authorized to delete this comment");
    }

    #[tokio::test]
    async fn test_run_optimistic_success_invalidates() {
        let cache: QueryCache<Vec<u32>> = QueryCache::new();
        cache.set(key(), vec![1]);
        let (notifier, mut notifications) = ChannelNotifier::new();

        let value = run_optimistic(
            &cache,
            key(),
            &notifier,
            MutationMessages {
                success: "Added",
                failure: "Failed to add",
            },
            |current| current.map(|v| appended(v, 2)),
            || async { Ok::<_, ClientError>(7) },
        )
        .await
        .unwrap();

        assert_eq!(value, 7);
        assert!(cache.is_stale(&key()));
        assert_eq!(cache.get(&key()), Some(vec![1, 2]));
        assert_eq!(notifications.try_recv().unwrap().kind, NotificationKind::Success);
    }
}
