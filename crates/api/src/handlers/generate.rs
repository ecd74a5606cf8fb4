//! Handlers for generation requests and task-status polling.
//!
//! The POST path is the paid flow: affordability pre-check, provider
//! call, transactional spend, then the model record. A record write
//! failure after a committed spend degrades to a `warning` field on an
//! otherwise successful response -- the provider already did the paid
//! work, so the debit stands (refunds are explicit, never automatic).

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use meshforge_core::catalog::{self, SERVICE_TEXT_TO_3D_OPTIMIZED, SERVICE_TEXT_TO_3D_PREVIEW};
use meshforge_core::error::CoreError;
use meshforge_core::models::MODEL_STATUS_PENDING;
use meshforge_db::models::generated_model::CreateGeneratedModel;
use meshforge_db::repositories::{CreditRepo, ModelRepo};
use meshforge_meshy::{poll_until_terminal, MeshyError, PollConfig, TextTo3DTask};
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Create generation task
// ---------------------------------------------------------------------------

/// Generation stage: preview produces an untextured mesh, refine
/// textures a prior preview.
const MODE_PREVIEW: &str = "preview";
const MODE_REFINE: &str = "refine";

fn default_mode() -> String {
    MODE_PREVIEW.to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub prompt: Option<String>,
    #[serde(default = "default_mode")]
    pub mode: String,
    pub preview_task_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub success: bool,
    pub task_id: String,
    pub status: &'static str,
    pub service_type: String,
    pub credits_cost: i32,
    pub remaining_credits: i32,
    pub transaction_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<&'static str>,
}

/// POST /api/generate
///
/// Create a preview or refine generation task. Pre-checks
/// affordability, invokes the provider, debits on success, and persists
/// a PENDING model record keyed by the provider task id.
pub async fn create_generation(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<GenerateRequest>,
) -> AppResult<impl IntoResponse> {
    let (service_type, prompt) = match input.mode.as_str() {
        MODE_PREVIEW => {
            let prompt = input
                .prompt
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .ok_or_else(|| {
                    AppError::BadRequest("Prompt is required for preview mode".into())
                })?;
            (SERVICE_TEXT_TO_3D_PREVIEW, Some(prompt.to_string()))
        }
        MODE_REFINE => {
            if input.preview_task_id.as_deref().unwrap_or("").is_empty() {
                return Err(AppError::BadRequest(
                    "Preview task ID is required for refine mode".into(),
                ));
            }
            (SERVICE_TEXT_TO_3D_OPTIMIZED, None)
        }
        other => {
            return Err(AppError::BadRequest(format!(
                "Unknown generation mode '{other}'"
            )));
        }
    };

    let cost = catalog::cost(service_type)?;

    // Optimistic affordability check before calling the provider. The
    // spend below re-checks inside the ledger transaction.
    if !CreditRepo::can_afford(&state.pool, &auth.user_id, cost).await? {
        let available = CreditRepo::balance(&state.pool, &auth.user_id).await?;
        return Err(AppError::Core(CoreError::InsufficientCredits {
            required: cost,
            available,
        }));
    }

    // Provider call. Any failure here aborts before credits are spent.
    let task_id = match input.mode.as_str() {
        MODE_PREVIEW => {
            state
                .meshy
                .create_preview_task(prompt.as_deref().unwrap_or_default())
                .await?
        }
        _ => {
            state
                .meshy
                .create_refine_task(input.preview_task_id.as_deref().unwrap_or_default())
                .await?
        }
    };

    tracing::info!(
        user_id = %auth.user_id,
        task_id = %task_id,
        mode = %input.mode,
        "Generation task created",
    );

    let metadata = serde_json::json!({
        "taskId": task_id.as_str(),
        "mode": input.mode.as_str(),
        "prompt": prompt.as_deref(),
    });
    let outcome = CreditRepo::spend(
        &state.pool,
        &auth.user_id,
        service_type,
        cost,
        Some(metadata),
    )
    .await?;

    // The spend is final from here on: a record write failure is logged
    // and surfaced as a warning, never rolled back.
    let record = CreateGeneratedModel {
        id: task_id.clone(),
        user_id: auth.user_id.clone(),
        service_type: service_type.to_string(),
        model_url: None,
        thumbnail_url: None,
        prompt,
        credits_cost: cost,
        status: MODEL_STATUS_PENDING.to_string(),
    };
    let warning = match ModelRepo::create(&state.pool, &record).await {
        Ok(_) => None,
        Err(e) => {
            tracing::error!(
                user_id = %auth.user_id,
                task_id = %task_id,
                error = %e,
                "Failed to persist model record after successful spend",
            );
            Some("Generation started and credits were spent, but the model record could not be saved")
        }
    };

    // Fire-and-forget status watcher. Browser polls against GET
    // /generate remain advisory; this task makes sure the record
    // reaches a terminal state even if the client goes away. The
    // terminal update is keyed by task id and idempotent, so the two
    // paths can race freely.
    spawn_status_watcher(&state, task_id.clone());

    Ok(Json(GenerateResponse {
        success: true,
        task_id,
        status: MODEL_STATUS_PENDING,
        service_type: service_type.to_string(),
        credits_cost: cost,
        remaining_credits: outcome.remaining_credits,
        transaction_id: outcome.transaction.id,
        warning,
    }))
}

/// Spawn a bounded poll-until-terminal task for a freshly created
/// generation. Gives up after the configured attempt budget; the
/// record then stays PENDING until a client poll resolves it.
fn spawn_status_watcher(state: &AppState, task_id: String) {
    let meshy = state.meshy.clone();
    let pool = state.pool.clone();
    let cancel = CancellationToken::new();

    tokio::spawn(async move {
        match poll_until_terminal(&meshy, &task_id, &PollConfig::default(), &cancel).await {
            Ok(Some(task)) => {
                let status = task.status.as_model_status();
                let result = ModelRepo::mark_terminal(
                    &pool,
                    &task.id,
                    status,
                    task.primary_model_url(),
                    task.thumbnail_url.as_deref(),
                )
                .await;
                if let Err(e) = result {
                    tracing::error!(task_id = %task.id, error = %e, "Failed to persist terminal status");
                }
            }
            Ok(None) => {}
            Err(MeshyError::PollTimeout { task_id, attempts }) => {
                tracing::warn!(task_id = %task_id, attempts, "Status watcher gave up");
            }
            Err(e) => {
                tracing::warn!(task_id = %task_id, error = %e, "Status watcher failed");
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Poll task status
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusParams {
    pub task_id: Option<String>,
    pub task_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusResponse {
    #[serde(flatten)]
    pub task: TextTo3DTask,
    /// The provider status mapped onto the local record vocabulary.
    pub model_status: &'static str,
}

/// GET /api/generate?taskId=
///
/// Proxy the provider's task status. When the task has reached a
/// terminal state the local record is updated in place; the update is
/// keyed by task id and safe to apply from concurrent pollers.
pub async fn get_task_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<TaskStatusParams>,
) -> AppResult<impl IntoResponse> {
    let task_id = params
        .task_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("Task ID is required".into()))?;

    tracing::debug!(
        user_id = %auth.user_id,
        task_id,
        task_type = params.task_type.as_deref().unwrap_or("text-to-3d"),
        "Polling task status",
    );

    let task = state.meshy.get_task(task_id).await?;
    let model_status = task.status.as_model_status();

    if task.status.is_terminal() {
        let updated = ModelRepo::mark_terminal(
            &state.pool,
            &task.id,
            model_status,
            task.primary_model_url(),
            task.thumbnail_url.as_deref(),
        )
        .await?;

        if updated {
            tracing::info!(task_id, status = model_status, "Model record updated");
        }
    }

    Ok(Json(TaskStatusResponse { task, model_status }))
}
