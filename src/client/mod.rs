//! Client Library
//!
//! Typed access to the Quill API plus the data-synchronization layer a UI
//! sits on:
//!
//! - **`config`** - API base URL and session file location
//! - **`session`** - `SessionContext`, the explicit signed-in state
//! - **`http`** - `ApiClient`, bearer tokens and envelope decoding
//! - **`api`** - one method per endpoint
//! - **`cache`** - `QueryCache`, last-known server values per query
//! - **`mutation`** - the optimistic update state machine
//! - **`gate`** - which edit/delete affordances to offer
//! - **`notify`** - success/error notifications
//! - **`comments`**, **`posts`** - the shipped optimistic mutations
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use quill::client::{ApiClient, ClientConfig, CommentThread, QueryCache, SessionContext, TracingNotifier};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = ApiClient::new(ClientConfig::default(), SessionContext::new());
//! api.login("admin@quill.dev", "password123").await?;
//!
//! let thread = CommentThread::new(api, QueryCache::new(), Arc::new(TracingNotifier), "post-id");
//! thread.load().await?;
//! thread.add("Nice post!", None).await?;
//! # Ok(())
//! # }
//! ```

/// Client configuration
pub mod config;

/// Client error types
pub mod error;

/// Session context
pub mod session;

/// HTTP client wrapper
pub mod http;

/// Typed API calls
pub mod api;

/// Server-state cache
pub mod cache;

/// Optimistic mutation controller
pub mod mutation;

/// Authorization gate
pub mod gate;

/// Notifications
pub mod notify;

/// Comment thread
pub mod comments;

/// Post listing
pub mod posts;

pub use api::PostPage;
pub use cache::{CacheEvent, FetchStatus, QueryCache, QueryKey, Snapshot, Subscription};
pub use comments::CommentThread;
pub use config::{ClientConfig, ConfigError};
pub use error::ClientError;
pub use http::ApiClient;
pub use mutation::{run_optimistic, MutationMessages, MutationPhase, OptimisticMutation};
pub use notify::{ChannelNotifier, Notification, NotificationKind, Notifier, TracingNotifier};
pub use posts::PostBoard;
pub use session::{InvalidationReason, Session, SessionContext};
