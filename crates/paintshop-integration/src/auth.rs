//! Session authentication against the model-storage server

use std::sync::{Arc, RwLock};

use reqwest::Client;
use tracing::{info, warn};

use crate::error::IntegrationError;
use crate::types::UserInfo;

/// Manages the server login session. The server tracks sessions with a
/// cookie held by the shared HTTP client's jar, so the only state kept here
/// is the active user.
pub struct AuthManager {
    client: Client,
    base_url: String,
    user: Arc<RwLock<Option<UserInfo>>>,
}

impl AuthManager {
    pub fn new(client: Client, base_url: String) -> Self {
        Self {
            client,
            base_url,
            user: Arc::new(RwLock::new(None)),
        }
    }

    /// Create an account and start a session (`POST /signup`). The server
    /// answers 422 for a taken username or missing fields.
    pub async fn signup(
        &self,
        username: String,
        password: String,
    ) -> Result<UserInfo, IntegrationError> {
        let url = format!("{}/signup", self.base_url);
        let body = serde_json::json!({
            "username": username,
            "password": password,
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let user = self.parse_user(response).await?;
        info!("Signed up as {}", user.username);
        Ok(user)
    }

    /// Log in with username and password (`POST /login`).
    pub async fn login(
        &self,
        username: String,
        password: String,
    ) -> Result<UserInfo, IntegrationError> {
        let url = format!("{}/login", self.base_url);
        let body = serde_json::json!({
            "username": username,
            "password": password,
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let user = self.parse_user(response).await?;
        info!("Logged in as {}", user.username);
        Ok(user)
    }

    /// Ask the server whether the session cookie is still good
    /// (`GET /checksession`). `None` means no live session.
    pub async fn check_session(&self) -> Result<Option<UserInfo>, IntegrationError> {
        let url = format!("{}/checksession", self.base_url);
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            if let Ok(mut u) = self.user.write() {
                *u = None;
            }
            return Ok(None);
        }
        let user = self.parse_user(response).await?;
        Ok(Some(user))
    }

    /// End the session (`DELETE /logout`).
    pub async fn logout(&self) -> Result<(), IntegrationError> {
        let url = format!("{}/logout", self.base_url);
        let response = self.client.delete(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(IntegrationError::ServerError {
                status: status.as_u16(),
                message: text,
            });
        }
        if let Ok(mut u) = self.user.write() {
            *u = None;
        }
        warn!("Logged out");
        Ok(())
    }

    /// The id of the active user, if logged in.
    pub fn user_id(&self) -> Option<i64> {
        self.user.read().ok()?.as_ref().map(|u| u.id)
    }

    /// The display name of the active user, if logged in.
    pub fn username(&self) -> Option<String> {
        self.user.read().ok()?.as_ref().map(|u| u.username.clone())
    }

    /// Whether a user is logged in as far as this client knows.
    pub fn is_authenticated(&self) -> bool {
        self.user.read().ok().map(|u| u.is_some()).unwrap_or(false)
    }

    async fn parse_user(
        &self,
        response: reqwest::Response,
    ) -> Result<UserInfo, IntegrationError> {
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::UNPROCESSABLE_ENTITY
        {
            let text = response.text().await.unwrap_or_default();
            return Err(IntegrationError::AuthFailed(text));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(IntegrationError::ServerError {
                status: status.as_u16(),
                message: text,
            });
        }

        let user: UserInfo = response.json().await?;
        if let Ok(mut u) = self.user.write() {
            *u = Some(user.clone());
        }
        Ok(user)
    }
}
