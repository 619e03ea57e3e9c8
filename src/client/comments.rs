//! Comment thread
//!
//! The comments of one post, kept in the query cache. Adding a comment
//! shows a placeholder (id `temp-<uuid>`) right away; deleting hides the
//! comment right away. Both settle once the server answers.

use std::sync::Arc;

use chrono::Utc;

use crate::client::cache::{QueryCache, QueryKey, Subscription};
use crate::client::error::ClientError;
use crate::client::gate;
use crate::client::http::ApiClient;
use crate::client::mutation::{run_optimistic, MutationMessages};
use crate::client::notify::Notifier;
use crate::shared::models::{AuthorSummary, Comment, CommentInput, PLACEHOLDER_PREFIX};

const ADD_MESSAGES: MutationMessages = MutationMessages {
    success: "Comment posted",
    failure: "Failed to post comment",
};

const DELETE_MESSAGES: MutationMessages = MutationMessages {
    success: "Comment deleted",
    failure: "Failed to delete comment",
};

/// Comments of one post
#[derive(Clone)]
pub struct CommentThread {
    api: ApiClient,
    cache: QueryCache<Vec<Comment>>,
    notifier: Arc<dyn Notifier>,
    post_id: String,
}

impl CommentThread {
    /// Thread for `post_id`; registers its fetcher with `cache`
    pub fn new(
        api: ApiClient,
        cache: QueryCache<Vec<Comment>>,
        notifier: Arc<dyn Notifier>,
        post_id: impl Into<String>,
    ) -> Self {
        let thread = Self {
            api,
            cache,
            notifier,
            post_id: post_id.into(),
        };
        let api = thread.api.clone();
        let post_id = thread.post_id.clone();
        thread.cache.register(thread.key(), move || {
            let api = api.clone();
            let post_id = post_id.clone();
            async move { api.list_comments(&post_id).await }
        });
        thread
    }

    pub fn key(&self) -> QueryKey {
        QueryKey::Comments(self.post_id.clone())
    }

    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    pub fn cache(&self) -> &QueryCache<Vec<Comment>> {
        &self.cache
    }

    /// Follow changes to this thread
    pub fn subscribe(&self) -> Subscription<Vec<Comment>> {
        self.cache.listen(self.key())
    }

    /// Fetch from the server
    pub async fn load(&self) -> Result<Vec<Comment>, ClientError> {
        self.cache.fetch(&self.key()).await
    }

    /// What the cache currently holds, oldest first
    ///
    /// `None` until the thread has been loaded; `Some(vec![])` is a post
    /// without comments.
    pub fn comments(&self) -> Option<Vec<Comment>> {
        self.cache.get(&self.key())
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.get(&self.key()).is_some()
    }

    /// Whether to offer edit/delete for `comment`
    pub fn can_modify(&self, comment: &Comment) -> bool {
        gate::can_modify(self.api.session().current().as_ref(), &comment.author.id)
    }

    /// Post a comment (or a reply when `parent_comment` is set)
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` without a session (nothing is shown or sent);
    /// otherwise whatever the server answered, after rolling back.
    pub async fn add(
        &self,
        content: &str,
        parent_comment: Option<String>,
    ) -> Result<Comment, ClientError> {
        let session = self
            .api
            .session()
            .current()
            .ok_or(ClientError::NotAuthenticated)?;

        let now = Utc::now();
        let placeholder = Comment {
            id: format!("{}{}", PLACEHOLDER_PREFIX, uuid::Uuid::new_v4()),
            content: content.to_string(),
            author: AuthorSummary {
                id: session.user_id.clone(),
                name: session.name.clone(),
                avatar: String::new(),
            },
            post: self.post_id.clone(),
            parent_comment: parent_comment.clone(),
            replies: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        let input = CommentInput {
            content: content.to_string(),
            post: self.post_id.clone(),
            parent_comment,
        };

        run_optimistic(
            &self.cache,
            self.key(),
            self.notifier.as_ref(),
            ADD_MESSAGES,
            move |current| {
                let mut comments = current.cloned().unwrap_or_default();
                comments.push(placeholder);
                Some(comments)
            },
            || self.api.create_comment(&input),
        )
        .await
    }

    /// Delete a comment
    ///
    /// A placeholder that the server has not confirmed yet is only removed
    /// locally.
    pub async fn delete(&self, comment_id: &str) -> Result<(), ClientError> {
        if comment_id.starts_with(PLACEHOLDER_PREFIX) {
            self.cache.update(&self.key(), |comments| {
                comments.retain(|comment| comment.id != comment_id)
            });
            return Ok(());
        }

        run_optimistic(
            &self.cache,
            self.key(),
            self.notifier.as_ref(),
            DELETE_MESSAGES,
            |current| {
                let mut comments = current.cloned().unwrap_or_default();
                comments.retain(|comment| comment.id != comment_id);
                Some(comments)
            },
            || self.api.delete_comment(comment_id),
        )
        .await
    }
}
