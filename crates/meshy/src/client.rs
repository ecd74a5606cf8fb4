//! REST client for the Meshy text-to-3D HTTP endpoints.
//!
//! Wraps task submission (preview and refine) and status retrieval
//! using [`reqwest`]. All requests carry the account's bearer token.

use serde::de::DeserializeOwned;

use crate::types::{CreateTaskResponse, TextTo3DTask};

/// HTTP client for the Meshy API.
pub struct MeshyClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// Errors from the Meshy REST layer.
#[derive(Debug, thiserror::Error)]
pub enum MeshyError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Meshy returned a non-2xx status code.
    #[error("Meshy API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A status poll exhausted its attempt budget without reaching a
    /// terminal state.
    #[error("Task {task_id} did not reach a terminal state after {attempts} polls")]
    PollTimeout { task_id: String, attempts: u32 },
}

impl MeshyClient {
    /// Create a new client.
    ///
    /// * `base_url` - API origin, e.g. `https://api.meshy.ai`.
    /// * `api_key`  - bearer token for the Meshy account.
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling).
    pub fn with_client(client: reqwest::Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    /// Submit a preview (untextured mesh) generation task.
    ///
    /// Sends `POST /openapi/v2/text-to-3d` in preview mode and returns
    /// the server-assigned task id.
    pub async fn create_preview_task(&self, prompt: &str) -> Result<String, MeshyError> {
        let body = serde_json::json!({
            "mode": "preview",
            "prompt": prompt,
            "art_style": "realistic",
            "topology": "quad",
        });
        self.submit(&body).await
    }

    /// Submit a refine task for a previously generated preview.
    ///
    /// Produces a textured, PBR-mapped mesh from the preview's geometry.
    pub async fn create_refine_task(&self, preview_task_id: &str) -> Result<String, MeshyError> {
        let body = serde_json::json!({
            "mode": "refine",
            "preview_task_id": preview_task_id,
            "enable_pbr": true,
        });
        self.submit(&body).await
    }

    /// Fetch the current state of a task.
    ///
    /// Sends `GET /openapi/v2/text-to-3d/{task_id}`.
    pub async fn get_task(&self, task_id: &str) -> Result<TextTo3DTask, MeshyError> {
        let response = self
            .client
            .get(format!("{}/openapi/v2/text-to-3d/{task_id}", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    async fn submit(&self, body: &serde_json::Value) -> Result<String, MeshyError> {
        let response = self
            .client
            .post(format!("{}/openapi/v2/text-to-3d", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let created: CreateTaskResponse = Self::parse_response(response).await?;
        Ok(created.result)
    }

    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, MeshyError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MeshyError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }
}
