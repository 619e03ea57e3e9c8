//! Post calls

use reqwest::Method;

use crate::client::error::ClientError;
use crate::client::http::ApiClient;
use crate::shared::envelope::Pagination;
use crate::shared::models::{Post, PostInput, PostQuery};

/// One page of the post listing
#[derive(Debug, Clone, PartialEq)]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub pagination: Pagination,
}

impl ApiClient {
    pub async fn list_posts(&self, query: &PostQuery) -> Result<PostPage, ClientError> {
        let envelope = self
            .send::<Vec<Post>>(self.request(Method::GET, "/posts").query(query))
            .await?;
        let pagination = envelope
            .pagination
            .ok_or_else(|| ClientError::Parse("post listing has no pagination".to_string()))?;
        let posts = envelope
            .data
            .ok_or_else(|| ClientError::Parse("post listing has no data".to_string()))?;
        Ok(PostPage { posts, pagination })
    }

    pub async fn get_post(&self, id: &str) -> Result<Post, ClientError> {
        self.send_data(self.request(Method::GET, &format!("/posts/{}", id)))
            .await
    }

    pub async fn create_post(&self, input: &PostInput) -> Result<Post, ClientError> {
        self.send_data(self.authed(Method::POST, "/posts")?.json(input))
            .await
    }

    pub async fn update_post(&self, id: &str, input: &PostInput) -> Result<Post, ClientError> {
        self.send_data(self.authed(Method::PUT, &format!("/posts/{}", id))?.json(input))
            .await
    }

    pub async fn delete_post(&self, id: &str) -> Result<(), ClientError> {
        self.send::<()>(self.authed(Method::DELETE, &format!("/posts/{}", id))?)
            .await
            .map(|_| ())
    }
}
