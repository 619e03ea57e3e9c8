//! HTTP client wrapper
//!
//! Every API call goes through `ApiClient`: it attaches the bearer token
//! from the session context, decodes the response envelope, and ends the
//! session when the server answers 401.

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::client::config::ClientConfig;
use crate::client::error::ClientError;
use crate::client::session::SessionContext;
use crate::shared::envelope::Envelope;

/// Authenticated API client
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ClientConfig,
    session: SessionContext,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: ClientConfig, session: SessionContext) -> Self {
        Self {
            config,
            session,
            client: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Request that carries the token when there is a session
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.config.api_url(path));
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Request that requires a session
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` without a session; nothing is sent.
    pub(crate) fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let token = self.session.token().ok_or(ClientError::NotAuthenticated)?;
        Ok(self
            .client
            .request(method, self.config.api_url(path))
            .bearer_auth(token))
    }

    /// Send and decode the envelope
    ///
    /// A 401 clears the session (and fires its hooks) before the error is
    /// returned.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<Envelope<T>, ClientError> {
        let response = builder.send().await.map_err(|e| {
            tracing::warn!("Request failed: {}", e);
            ClientError::Network(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        if status.is_success() {
            let envelope: Envelope<T> =
                serde_json::from_str(&body).map_err(|e| ClientError::Parse(e.to_string()))?;
            if !envelope.success {
                return Err(ClientError::from_status(
                    status.as_u16(),
                    envelope.message,
                    envelope.errors.unwrap_or_default(),
                ));
            }
            return Ok(envelope);
        }

        let (message, errors) = match serde_json::from_str::<Envelope<serde_json::Value>>(&body) {
            Ok(envelope) => (envelope.message, envelope.errors.unwrap_or_default()),
            Err(_) => (status.canonical_reason().map(str::to_string), Vec::new()),
        };
        let error = ClientError::from_status(status.as_u16(), message, errors);
        tracing::debug!("API answered {}: {}", status, error);

        if error.is_unauthorized() {
            self.session.invalidate_unauthorized();
        }
        Err(error)
    }

    /// Send and take the envelope's payload
    ///
    /// # Errors
    ///
    /// `Parse` when a successful envelope has no `data`.
    pub(crate) async fn send_data<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ClientError> {
        self.send(builder)
            .await?
            .into_data()
            .ok_or_else(|| ClientError::Parse("response envelope has no data".to_string()))
    }
}
