//! Post listing
//!
//! One page of posts in the query cache, with optimistic deletion.

use std::sync::Arc;

use crate::client::api::PostPage;
use crate::client::cache::{QueryCache, QueryKey, Subscription};
use crate::client::error::ClientError;
use crate::client::gate::{self, Affordances};
use crate::client::http::ApiClient;
use crate::client::mutation::{run_optimistic, MutationMessages};
use crate::client::notify::Notifier;
use crate::shared::models::{Post, PostQuery};

const DELETE_MESSAGES: MutationMessages = MutationMessages {
    success: "Post deleted",
    failure: "Failed to delete post",
};

/// A page of the post listing
#[derive(Clone)]
pub struct PostBoard {
    api: ApiClient,
    cache: QueryCache<PostPage>,
    notifier: Arc<dyn Notifier>,
    query: PostQuery,
}

impl PostBoard {
    /// Board for `query`; registers its fetcher with `cache`
    pub fn new(
        api: ApiClient,
        cache: QueryCache<PostPage>,
        notifier: Arc<dyn Notifier>,
        query: PostQuery,
    ) -> Self {
        let board = Self {
            api,
            cache,
            notifier,
            query,
        };
        let api = board.api.clone();
        let query = board.query.clone();
        board.cache.register(board.key(), move || {
            let api = api.clone();
            let query = query.clone();
            async move { api.list_posts(&query).await }
        });
        board
    }

    pub fn key(&self) -> QueryKey {
        QueryKey::Posts(self.query.clone())
    }

    pub fn subscribe(&self) -> Subscription<PostPage> {
        self.cache.listen(self.key())
    }

    pub async fn load(&self) -> Result<PostPage, ClientError> {
        self.cache.fetch(&self.key()).await
    }

    /// Posts of the cached page; `None` until the page has been loaded
    pub fn posts(&self) -> Option<Vec<Post>> {
        self.cache.get(&self.key()).map(|page| page.posts)
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.get(&self.key()).is_some()
    }

    /// Edit/delete affordances for `post`
    pub fn affordances(&self, post: &Post) -> Affordances {
        gate::affordances(self.api.session().current().as_ref(), &post.author.id)
    }

    pub fn can_edit(&self, post: &Post) -> bool {
        self.affordances(post).can_edit
    }

    /// Delete a post, removing it from the cached page first
    pub async fn delete(&self, post_id: &str) -> Result<(), ClientError> {
        run_optimistic(
            &self.cache,
            self.key(),
            self.notifier.as_ref(),
            DELETE_MESSAGES,
            |current| {
                current.map(|page| {
                    let mut page = page.clone();
                    let before = page.posts.len();
                    page.posts.retain(|post| post.id != post_id);
                    if page.posts.len() < before {
                        page.pagination.total = page.pagination.total.saturating_sub(1);
                    }
                    page
                })
            },
            || self.api.delete_post(post_id),
        )
        .await
    }
}
