//! Comment calls

use reqwest::Method;

use crate::client::error::ClientError;
use crate::client::http::ApiClient;
use crate::shared::models::{Comment, CommentInput, CommentUpdate};

impl ApiClient {
    /// Comments of a post, oldest first
    pub async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>, ClientError> {
        self.send_data(self.request(Method::GET, &format!("/comments/post/{}", post_id)))
            .await
    }

    pub async fn create_comment(&self, input: &CommentInput) -> Result<Comment, ClientError> {
        self.send_data(self.authed(Method::POST, "/comments")?.json(input))
            .await
    }

    pub async fn update_comment(&self, id: &str, content: &str) -> Result<Comment, ClientError> {
        let update = CommentUpdate {
            content: content.to_string(),
        };
        self.send_data(self.authed(Method::PUT, &format!("/comments/{}", id))?.json(&update))
            .await
    }

    pub async fn delete_comment(&self, id: &str) -> Result<(), ClientError> {
        self.send::<()>(self.authed(Method::DELETE, &format!("/comments/{}", id))?)
            .await
            .map(|_| ())
    }
}
