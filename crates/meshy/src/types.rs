//! Wire types for the Meshy text-to-3D API.

use meshforge_core::models::{MODEL_STATUS_COMPLETED, MODEL_STATUS_FAILED, MODEL_STATUS_PENDING};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Task status
// ---------------------------------------------------------------------------

/// Provider-side status of a generation task.
///
/// `InProgress` is transient and maps to a local `PENDING` record;
/// only `Succeeded`, `Failed`, and `Canceled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Succeeded,
    Failed,
    Canceled,
}

impl TaskStatus {
    /// Whether the provider will never change this status again.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Succeeded | TaskStatus::Failed | TaskStatus::Canceled
        )
    }

    /// Map the provider status onto the local model-record status.
    pub fn as_model_status(self) -> &'static str {
        match self {
            TaskStatus::Pending | TaskStatus::InProgress => MODEL_STATUS_PENDING,
            TaskStatus::Succeeded => MODEL_STATUS_COMPLETED,
            TaskStatus::Failed | TaskStatus::Canceled => MODEL_STATUS_FAILED,
        }
    }
}

// ---------------------------------------------------------------------------
// Task payloads
// ---------------------------------------------------------------------------

/// Download URLs for a finished model, by format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelUrls {
    pub glb: Option<String>,
    pub fbx: Option<String>,
    pub obj: Option<String>,
    pub usdz: Option<String>,
}

/// Provider-side error detail attached to a failed task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskError {
    pub message: Option<String>,
}

/// A text-to-3D task as returned by `GET /openapi/v2/text-to-3d/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextTo3DTask {
    pub id: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub progress: Option<i32>,
    #[serde(default)]
    pub model_urls: Option<ModelUrls>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub task_error: Option<TaskError>,
}

impl TextTo3DTask {
    /// Preferred download URL for the finished model (GLB first).
    pub fn primary_model_url(&self) -> Option<&str> {
        let urls = self.model_urls.as_ref()?;
        urls.glb
            .as_deref()
            .or(urls.fbx.as_deref())
            .or(urls.obj.as_deref())
            .or(urls.usdz.as_deref())
    }
}

/// Response from `POST /openapi/v2/text-to-3d`: the new task id.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskResponse {
    pub result: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_provider_vocabulary() {
        let status: TaskStatus = serde_json::from_str("\"IN_PROGRESS\"").unwrap();
        assert_eq!(status, TaskStatus::InProgress);
        let status: TaskStatus = serde_json::from_str("\"SUCCEEDED\"").unwrap();
        assert_eq!(status, TaskStatus::Succeeded);
    }

    #[test]
    fn terminal_statuses() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::InProgress.is_terminal());
        assert!(TaskStatus::Succeeded.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(TaskStatus::Canceled.is_terminal());
    }

    #[test]
    fn in_progress_maps_to_pending() {
        assert_eq!(TaskStatus::InProgress.as_model_status(), "PENDING");
        assert_eq!(TaskStatus::Succeeded.as_model_status(), "COMPLETED");
        assert_eq!(TaskStatus::Canceled.as_model_status(), "FAILED");
    }

    #[test]
    fn primary_model_url_prefers_glb() {
        let task = TextTo3DTask {
            id: "t".into(),
            status: TaskStatus::Succeeded,
            progress: None,
            model_urls: Some(ModelUrls {
                glb: Some("https://assets/model.glb".into()),
                obj: Some("https://assets/model.obj".into()),
                ..Default::default()
            }),
            thumbnail_url: None,
            prompt: None,
            task_error: None,
        };
        assert_eq!(task.primary_model_url(), Some("https://assets/model.glb"));
    }
}
