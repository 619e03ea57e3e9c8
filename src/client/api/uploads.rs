//! Image uploads

use reqwest::multipart::{Form, Part};
use reqwest::Method;

use crate::client::error::ClientError;
use crate::client::http::ApiClient;
use crate::shared::models::UploadedImage;

impl ApiClient {
    /// Upload an image and return its public URL
    pub async fn upload_image(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ClientError> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|_| ClientError::Rejected {
                status: 400,
                message: format!("Invalid content type: {}", content_type),
            })?;
        let form = Form::new().part("file", part);

        let uploaded: UploadedImage = self
            .send_data(self.authed(Method::POST, "/uploads")?.multipart(form))
            .await?;
        Ok(uploaded.url)
    }
}
