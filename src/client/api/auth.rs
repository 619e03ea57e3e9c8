//! Authentication calls

use reqwest::Method;

use crate::client::error::ClientError;
use crate::client::http::ApiClient;
use crate::client::session::Session;
use crate::shared::models::{AuthPayload, LoginRequest, ProfileUpdate, RegisterRequest, UserProfile};

impl ApiClient {
    /// Create an account and sign in as it
    pub async fn register(&self, request: &RegisterRequest) -> Result<Session, ClientError> {
        let payload: AuthPayload = self
            .send_data(self.request(Method::POST, "/auth/register").json(request))
            .await?;
        let session = Session::from_auth(&payload);
        self.session().establish(session.clone());
        Ok(session)
    }

    /// Sign in
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let payload: AuthPayload = self
            .send_data(self.request(Method::POST, "/auth/login").json(&request))
            .await?;
        let session = Session::from_auth(&payload);
        self.session().establish(session.clone());
        Ok(session)
    }

    /// Profile of the signed-in user
    pub async fn me(&self) -> Result<UserProfile, ClientError> {
        self.send_data(self.authed(Method::GET, "/auth/me")?).await
    }

    /// Update the signed-in user's profile
    ///
    /// A plain request; the session's display name follows the server's
    /// answer.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ClientError> {
        let profile: UserProfile = self
            .send_data(self.authed(Method::PUT, "/auth/profile")?.json(update))
            .await?;
        self.session().rename(&profile.name);
        Ok(profile)
    }

    /// Sign out locally
    pub fn logout(&self) {
        self.session().logout();
    }
}
