//! Server-state cache
//!
//! A keyed cache of the last value the server returned for each query,
//! plus enough bookkeeping to run optimistic updates on top of it.
//!
//! Each entry has:
//! - the value (or nothing yet)
//! - a fetch status (`Idle`, `Loading`, `Error`, `Success`)
//! - a `stale` flag set by `invalidate`
//! - an optional optimistic tag naming the mutation whose guess it holds
//! - a generation counter; a refetch only lands if the generation it
//!   started with is still current, so `cancel` (or a newer fetch)
//!   discards late results
//!
//! Invalidation tells subscribers right away (`Invalidated`, carrying the
//! previous value) and again once the background refetch lands (`Updated`).
//!
//! ```rust,no_run
//! use quill::client::cache::{QueryCache, QueryKey};
//!
//! # async fn example(api: quill::client::ApiClient) {
//! let cache: QueryCache<Vec<quill::shared::Comment>> = QueryCache::new();
//! let key = QueryKey::Comments("post-id".to_string());
//! let fetch_api = api.clone();
//! let mut subscription = cache.subscribe(key.clone(), move || {
//!     let api = fetch_api.clone();
//!     async move { api.list_comments("post-id").await }
//! });
//! cache.fetch(&key).await.ok();
//! while let Some(event) = subscription.next().await {
//!     println!("{:?}", event);
//! }
//! # }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::client::error::ClientError;
use crate::shared::models::PostQuery;

/// What a cache entry holds
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// A page of the post listing
    Posts(PostQuery),
    /// One post by id
    Post(String),
    Categories,
    /// Comments of a post
    Comments(String),
    /// The signed-in user's profile
    Me,
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Posts(query) => write!(
                f,
                "posts(page={}, limit={})",
                query.page.unwrap_or(1),
                query.limit.unwrap_or(0)
            ),
            Self::Post(id) => write!(f, "post({})", id),
            Self::Categories => write!(f, "categories"),
            Self::Comments(post_id) => write!(f, "comments({})", post_id),
            Self::Me => write!(f, "me"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Error,
    Success,
}

/// Notifications delivered to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEvent<V> {
    /// The entry went stale; carries the value it held
    Invalidated { previous: Option<V> },
    /// The entry has a new value (or went back to absent)
    Updated { value: Option<V> },
    /// A fetch failed; the value was kept
    Failed { error: ClientError },
}

/// A saved entry value, for rollback
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<V> {
    value: Option<V>,
    tag: Option<Uuid>,
}

impl<V> Snapshot<V> {
    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    /// The entry had no value when the snapshot was taken
    pub fn is_absent(&self) -> bool {
        self.value.is_none()
    }

    /// Mutation whose guess the entry held when the snapshot was taken
    pub fn tag(&self) -> Option<Uuid> {
        self.tag
    }
}

/// Loads the authoritative value for a key
pub type Fetcher<V> = Arc<dyn Fn() -> BoxFuture<'static, Result<V, ClientError>> + Send + Sync>;

struct Entry<V> {
    value: Option<V>,
    status: FetchStatus,
    stale: bool,
    optimistic: Option<Uuid>,
    last_error: Option<ClientError>,
    generation: u64,
    fetcher: Option<Fetcher<V>>,
    subscribers: Vec<mpsc::UnboundedSender<CacheEvent<V>>>,
    inflight: Option<JoinHandle<()>>,
}

impl<V> Default for Entry<V> {
    fn default() -> Self {
        Self {
            value: None,
            status: FetchStatus::Idle,
            stale: false,
            optimistic: None,
            last_error: None,
            generation: 0,
            fetcher: None,
            subscribers: Vec::new(),
            inflight: None,
        }
    }
}

impl<V: Clone> Entry<V> {
    fn notify(&mut self, event: CacheEvent<V>) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    fn has_subscribers(&self) -> bool {
        self.subscribers.iter().any(|s| !s.is_closed())
    }

    fn abort_inflight(&mut self) {
        if let Some(handle) = self.inflight.take() {
            handle.abort();
        }
    }

    /// Store a fetch result if it is still wanted
    fn settle(&mut self, generation: u64, result: Result<V, ClientError>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.inflight = None;
        match result {
            Ok(value) => {
                self.value = Some(value.clone());
                self.status = FetchStatus::Success;
                self.stale = false;
                self.optimistic = None;
                self.last_error = None;
                self.notify(CacheEvent::Updated { value: Some(value) });
            }
            Err(error) => {
                self.status = FetchStatus::Error;
                self.last_error = Some(error.clone());
                self.notify(CacheEvent::Failed { error });
            }
        }
        true
    }
}

/// Receives events for one key; the key has an active subscriber while
/// this is alive
pub struct Subscription<V> {
    key: QueryKey,
    receiver: mpsc::UnboundedReceiver<CacheEvent<V>>,
}

impl<V> Subscription<V> {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Next event, or `None` once the cache is gone
    pub async fn next(&mut self) -> Option<CacheEvent<V>> {
        self.receiver.recv().await
    }

    /// Next event if one is already queued
    pub fn try_next(&mut self) -> Option<CacheEvent<V>> {
        self.receiver.try_recv().ok()
    }
}

/// Shared query cache; clones refer to the same entries
pub struct QueryCache<V> {
    entries: Arc<Mutex<HashMap<QueryKey, Entry<V>>>>,
}

impl<V> Clone for QueryCache<V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<V> Default for QueryCache<V> {
    fn default() -> Self {
        Self {
            entries: Arc::default(),
        }
    }
}

impl<V> fmt::Debug for QueryCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("QueryCache").field("entries", &keys).finish()
    }
}

impl<V> QueryCache<V>
where
    V: Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entry<R>(&self, key: &QueryKey, f: impl FnOnce(&mut Entry<V>) -> R) -> R {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        f(entries.entry(key.clone()).or_default())
    }

    fn read<R>(&self, key: &QueryKey, f: impl FnOnce(&Entry<V>) -> R) -> Option<R> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).map(f)
    }

    pub fn get(&self, key: &QueryKey) -> Option<V> {
        self.read(key, |entry| entry.value.clone()).flatten()
    }

    /// Store a server-confirmed value
    pub fn set(&self, key: QueryKey, value: V) {
        self.with_entry(&key, |entry| {
            entry.value = Some(value.clone());
            entry.status = FetchStatus::Success;
            entry.stale = false;
            entry.optimistic = None;
            entry.notify(CacheEvent::Updated { value: Some(value) });
        });
    }

    /// Store a guessed value on behalf of mutation `tag`
    pub fn set_optimistic(&self, key: QueryKey, value: V, tag: Uuid) {
        tracing::debug!("Optimistic write to {} for mutation {}", key, tag);
        self.with_entry(&key, |entry| {
            entry.value = Some(value.clone());
            entry.optimistic = Some(tag);
            entry.notify(CacheEvent::Updated { value: Some(value) });
        });
    }

    /// Edit the current value in place, keeping its optimistic tag
    ///
    /// Does nothing when the entry has no value.
    pub fn update(&self, key: &QueryKey, f: impl FnOnce(&mut V)) {
        self.with_entry(key, |entry| {
            if let Some(value) = entry.value.as_mut() {
                f(value);
                let value = value.clone();
                entry.notify(CacheEvent::Updated { value: Some(value) });
            }
        });
    }

    pub fn snapshot(&self, key: &QueryKey) -> Snapshot<V> {
        self.read(key, |entry| Snapshot {
            value: entry.value.clone(),
            tag: entry.optimistic,
        })
        .unwrap_or(Snapshot {
            value: None,
            tag: None,
        })
    }

    /// Write a snapshot back verbatim, "absent" included
    pub fn restore(&self, key: &QueryKey, snapshot: &Snapshot<V>) {
        tracing::debug!("Restoring snapshot of {}", key);
        self.with_entry(key, |entry| {
            entry.value = snapshot.value.clone();
            entry.optimistic = snapshot.tag;
            if entry.value.is_none() && entry.status == FetchStatus::Success {
                entry.status = FetchStatus::Idle;
            }
            entry.notify(CacheEvent::Updated {
                value: snapshot.value.clone(),
            });
        });
    }

    /// Restore `snapshot` only if the entry still holds the guess of
    /// mutation `owner`
    ///
    /// Returns whether the snapshot was written.
    pub fn restore_if_owned(&self, key: &QueryKey, snapshot: &Snapshot<V>, owner: Uuid) -> bool {
        let restored = self.with_entry(key, |entry| {
            if entry.optimistic != Some(owner) {
                return false;
            }
            entry.value = snapshot.value.clone();
            entry.optimistic = snapshot.tag;
            if entry.value.is_none() && entry.status == FetchStatus::Success {
                entry.status = FetchStatus::Idle;
            }
            entry.notify(CacheEvent::Updated {
                value: snapshot.value.clone(),
            });
            true
        });
        if restored {
            tracing::debug!("Restored snapshot of {} for mutation {}", key, owner);
        }
        restored
    }

    /// Set the fetcher for `key` without subscribing
    pub fn register<F, Fut>(&self, key: QueryKey, fetcher: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V, ClientError>> + Send + 'static,
    {
        let fetcher: Fetcher<V> = Arc::new(move || fetcher().boxed());
        self.with_entry(&key, |entry| entry.fetcher = Some(fetcher));
    }

    /// Register the fetcher for `key` and start receiving its events
    pub fn subscribe<F, Fut>(&self, key: QueryKey, fetcher: F) -> Subscription<V>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V, ClientError>> + Send + 'static,
    {
        self.register(key.clone(), fetcher);
        self.listen(key)
    }

    /// Start receiving events for `key` using whatever fetcher it has
    pub fn listen(&self, key: QueryKey) -> Subscription<V> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.with_entry(&key, |entry| entry.subscribers.push(sender));
        Subscription { key, receiver }
    }

    /// Fetch in the foreground
    ///
    /// A failure sets the status to `Error` and keeps the previous value.
    /// If the fetch was cancelled or overtaken while running, the result is
    /// returned but not stored.
    pub async fn fetch(&self, key: &QueryKey) -> Result<V, ClientError> {
        let (fetcher, generation) = self.with_entry(key, |entry| {
            let fetcher = entry.fetcher.clone();
            if fetcher.is_some() {
                entry.abort_inflight();
                entry.generation += 1;
                entry.status = FetchStatus::Loading;
            }
            (fetcher, entry.generation)
        });
        let fetcher = fetcher.ok_or_else(|| ClientError::NoFetcher(key.to_string()))?;

        let result = fetcher().await;
        let stored = self.with_entry(key, |entry| entry.settle(generation, result.clone()));
        if !stored {
            tracing::debug!("Discarded superseded fetch of {}", key);
        }
        result
    }

    /// Mark `key` stale and refetch it in the background if anyone is
    /// subscribed
    ///
    /// Subscribers get `Invalidated` with the previous value before this
    /// returns, and `Updated` when the refetch lands.
    pub fn invalidate(&self, key: &QueryKey) {
        let refetch = self.with_entry(key, |entry| {
            entry.stale = true;
            let previous = entry.value.clone();
            entry.notify(CacheEvent::Invalidated { previous });

            if !entry.has_subscribers() {
                return None;
            }
            let fetcher = entry.fetcher.clone()?;
            entry.abort_inflight();
            entry.generation += 1;
            entry.status = FetchStatus::Loading;
            Some((fetcher, entry.generation))
        });

        let Some((fetcher, generation)) = refetch else {
            tracing::debug!("Invalidated {} (no active subscriber)", key);
            return;
        };

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                tracing::warn!("No async runtime; {} stays stale", key);
                return;
            }
        };

        let cache = self.clone();
        let task_key = key.clone();
        let handle = runtime.spawn(async move {
            let result = fetcher().await;
            let stored = cache.with_entry(&task_key, |entry| entry.settle(generation, result));
            if !stored {
                tracing::debug!("Discarded superseded refetch of {}", task_key);
            }
        });

        self.with_entry(key, |entry| {
            if entry.generation == generation && entry.status == FetchStatus::Loading {
                entry.inflight = Some(handle);
            }
        });
        tracing::debug!("Invalidated {}, refetching", key);
    }

    /// Abort any in-flight refetch of `key` and ignore its result
    pub fn cancel(&self, key: &QueryKey) {
        self.with_entry(key, |entry| {
            entry.abort_inflight();
            entry.generation += 1;
            if entry.status == FetchStatus::Loading {
                entry.status = if entry.value.is_some() {
                    FetchStatus::Success
                } else {
                    FetchStatus::Idle
                };
            }
        });
    }

    pub fn status(&self, key: &QueryKey) -> FetchStatus {
        self.read(key, |entry| entry.status).unwrap_or_default()
    }

    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.read(key, |entry| entry.stale).unwrap_or(false)
    }

    /// Mutation whose optimistic value the entry currently holds
    pub fn optimistic_tag(&self, key: &QueryKey) -> Option<Uuid> {
        self.read(key, |entry| entry.optimistic).flatten()
    }

    pub fn last_error(&self, key: &QueryKey) -> Option<ClientError> {
        self.read(key, |entry| entry.last_error.clone()).flatten()
    }

    /// Whether a refetch of `key` is running in the background
    pub fn is_refetching(&self, key: &QueryKey) -> bool {
        self.read(key, |entry| {
            entry
                .inflight
                .as_ref()
                .is_some_and(|handle| !handle.is_finished())
        })
        .unwrap_or(false)
    }
}
