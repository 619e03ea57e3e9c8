//! Category calls

use reqwest::Method;

use crate::client::error::ClientError;
use crate::client::http::ApiClient;
use crate::shared::models::{Category, CategoryInput};

impl ApiClient {
    pub async fn list_categories(&self) -> Result<Vec<Category>, ClientError> {
        self.send_data(self.request(Method::GET, "/categories")).await
    }

    pub async fn get_category(&self, id: &str) -> Result<Category, ClientError> {
        self.send_data(self.request(Method::GET, &format!("/categories/{}", id)))
            .await
    }

    /// Admin only
    pub async fn create_category(&self, input: &CategoryInput) -> Result<Category, ClientError> {
        self.send_data(self.authed(Method::POST, "/categories")?.json(input))
            .await
    }

    /// Admin only
    pub async fn update_category(
        &self,
        id: &str,
        input: &CategoryInput,
    ) -> Result<Category, ClientError> {
        self.send_data(self.authed(Method::PUT, &format!("/categories/{}", id))?.json(input))
            .await
    }

    /// Admin only
    pub async fn delete_category(&self, id: &str) -> Result<(), ClientError> {
        self.send::<()>(self.authed(Method::DELETE, &format!("/categories/{}", id))?)
            .await
            .map(|_| ())
    }
}
