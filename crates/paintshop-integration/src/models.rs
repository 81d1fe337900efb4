//! Model record CRUD against the model-storage server

use reqwest::Client;
use tracing::debug;

use crate::auth::AuthManager;
use crate::error::IntegrationError;
use crate::types::{CreateModelRequest, StoredModel, UpdateModelRequest};

/// API client for model record CRUD.
pub struct ModelApi {
    client: Client,
    base_url: String,
}

impl ModelApi {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// List the authenticated user's model records (`GET /models`). The
    /// server returns every record; ownership filtering happens here.
    pub async fn list(&self, auth: &AuthManager) -> Result<Vec<StoredModel>, IntegrationError> {
        let user_id = auth
            .user_id()
            .ok_or_else(|| IntegrationError::AuthFailed("Not logged in".into()))?;

        let url = format!("{}/models", self.base_url);
        let response = self.client.get(&url).send().await?;
        let all: Vec<StoredModel> = handle_response(response).await?;

        Ok(all
            .into_iter()
            .filter(|m| m.user_id == Some(user_id))
            .collect())
    }

    /// Fetch one model record (`GET /models/{id}`). A 2xx body that does not
    /// carry the required record fields is reported as `MalformedRecord`.
    pub async fn get(&self, model_id: i64) -> Result<StoredModel, IntegrationError> {
        let url = format!("{}/models/{}", self.base_url, model_id);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(IntegrationError::ServerError {
                status: status.as_u16(),
                message: text,
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| IntegrationError::MalformedRecord(e.to_string()))
    }

    /// Create a model record with its painted colors (`POST /save-model`).
    /// The legacy endpoint acknowledges with a message body only; the caller
    /// already holds everything it sent.
    pub async fn create(&self, request: &CreateModelRequest) -> Result<(), IntegrationError> {
        let url = format!("{}/save-model", self.base_url);
        let response = self.client.post(&url).json(request).send().await?;
        expect_success(response).await?;
        debug!("created model '{}'", request.model_name);
        Ok(())
    }

    /// Replace a model record's painted colors (`PATCH /save-model/{id}`).
    pub async fn update(
        &self,
        model_id: i64,
        request: &UpdateModelRequest,
    ) -> Result<(), IntegrationError> {
        let url = format!("{}/save-model/{}", self.base_url, model_id);
        let response = self.client.patch(&url).json(request).send().await?;
        expect_success(response).await?;
        debug!("updated model {}", model_id);
        Ok(())
    }

    /// Delete a model record (`DELETE /models/{id}`).
    pub async fn delete(&self, model_id: i64) -> Result<(), IntegrationError> {
        let url = format!("{}/models/{}", self.base_url, model_id);
        let response = self.client.delete(&url).send().await?;
        expect_success(response).await
    }
}

async fn handle_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, IntegrationError> {
    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
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
    Ok(response.json().await?)
}

async fn expect_success(response: reqwest::Response) -> Result<(), IntegrationError> {
    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
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
    Ok(())
}
