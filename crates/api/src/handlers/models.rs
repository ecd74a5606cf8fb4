//! Handlers for model records: listing, saving, deletion, rating,
//! reuse, and similarity search. All endpoints operate on the session
//! user's records; absent and not-owned are deliberately conflated.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use meshforge_core::error::CoreError;
use meshforge_core::models::{validate_model_status, MODEL_STATUS_COMPLETED};
use meshforge_core::pagination::{clamp_limit, clamp_offset, DEFAULT_MODEL_LIMIT, MAX_MODEL_LIMIT};
use meshforge_core::similarity::{
    combined_score, DEFAULT_SIMILARITY_THRESHOLD, DEFAULT_SIMILAR_LIMIT, EXACT_MATCH_THRESHOLD,
};
use meshforge_core::types::Timestamp;
use meshforge_db::models::generated_model::{CreateGeneratedModel, GeneratedModel};
use meshforge_db::repositories::ModelRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ModelListResponse {
    pub models: Vec<GeneratedModel>,
    pub total: i64,
}

/// GET /api/models
///
/// List the caller's records, newest first. Page size defaults to 50
/// and is capped at 100.
pub async fn list_models(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit, DEFAULT_MODEL_LIMIT, MAX_MODEL_LIMIT);
    let offset = clamp_offset(params.offset);

    let models = ModelRepo::list_for_user(&state.pool, &auth.user_id, limit, offset).await?;
    let total = ModelRepo::count_for_user(&state.pool, &auth.user_id).await?;

    Ok(Json(ModelListResponse { models, total }))
}

// ---------------------------------------------------------------------------
// Save
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveModelRequest {
    pub task_id: Option<String>,
    pub service_type: Option<String>,
    pub model_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub prompt: Option<String>,
    pub credits_cost: Option<i32>,
    pub status: Option<String>,
}

/// POST /api/models
///
/// Create a record for a task id, or refresh the result fields when the
/// caller already has one (repeated saves from a polling client are
/// expected). A task id owned by another user conflicts.
pub async fn save_model(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SaveModelRequest>,
) -> AppResult<impl IntoResponse> {
    let (Some(task_id), Some(service_type), Some(credits_cost)) = (
        input.task_id.as_deref().filter(|s| !s.is_empty()),
        input.service_type.as_deref().filter(|s| !s.is_empty()),
        input.credits_cost,
    ) else {
        return Err(AppError::BadRequest(
            "Missing required fields: taskId, serviceType, creditsCost".into(),
        ));
    };

    let status = input
        .status
        .clone()
        .unwrap_or_else(|| MODEL_STATUS_COMPLETED.to_string());
    validate_model_status(&status)?;

    let record = CreateGeneratedModel {
        id: task_id.to_string(),
        user_id: auth.user_id.clone(),
        service_type: service_type.to_string(),
        model_url: input.model_url.clone(),
        thumbnail_url: input.thumbnail_url.clone(),
        prompt: input.prompt.clone(),
        credits_cost,
        status,
    };

    let model = ModelRepo::upsert_result(&state.pool, &record)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(format!(
                "Task {task_id} already belongs to another user"
            )))
        })?;

    Ok(Json(model))
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DeleteModelParams {
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteModelResponse {
    pub success: bool,
}

/// DELETE /api/models?id=
///
/// Delete one of the caller's records.
pub async fn delete_model(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<DeleteModelParams>,
) -> AppResult<impl IntoResponse> {
    let id = params
        .id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("Model ID is required".into()))?;

    let deleted = ModelRepo::delete_owned(&state.pool, id, &auth.user_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Model",
            id: id.to_string(),
        }));
    }

    tracing::info!(user_id = %auth.user_id, model_id = id, "Model deleted");

    Ok(Json(DeleteModelResponse { success: true }))
}

// ---------------------------------------------------------------------------
// Rating
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct RatingRequest {
    #[validate(required, range(min = 1, max = 5))]
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub success: bool,
    pub rating: Option<i32>,
    pub comment: Option<String>,
    pub message: &'static str,
}

/// PUT /api/models/{id}/rating
///
/// Attach a 1-5 rating and optional comment to an owned record. There
/// is no completed-only restriction: users may rate a pending preview.
pub async fn rate_model(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(model_id): Path<String>,
    Json(input): Json<RatingRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate().map_err(|_| {
        AppError::BadRequest("Rating must be an integer between 1 and 5".into())
    })?;
    let rating = input.rating.unwrap_or_default();

    let model = ModelRepo::set_rating(
        &state.pool,
        &model_id,
        &auth.user_id,
        rating,
        input.comment.as_deref(),
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Model",
        id: model_id.clone(),
    }))?;

    tracing::info!(user_id = %auth.user_id, model_id = %model_id, rating, "Model rated");

    Ok(Json(RatingResponse {
        success: true,
        rating: model.rating,
        comment: model.comment,
        message: "Rating and comment saved",
    }))
}

// ---------------------------------------------------------------------------
// Reuse
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReuseRequest {
    pub original_model_id: Option<String>,
    pub new_prompt: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReuseResponse {
    pub success: bool,
    pub reused_model: GeneratedModel,
    pub original_model_id: String,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReuseConflictResponse {
    pub error: &'static str,
    pub code: &'static str,
    pub existing_model: GeneratedModel,
}

/// POST /api/models/reuse
///
/// Clone a COMPLETED model into the caller's library at zero cost. The
/// clone is COMPLETED immediately -- no provider call is made. Refused
/// with 409 when the caller already holds the same (modelUrl, prompt)
/// pair.
pub async fn reuse_model(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ReuseRequest>,
) -> AppResult<Response> {
    let original_id = input
        .original_model_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("Original model ID is required".into()))?;

    let original = ModelRepo::find_by_id(&state.pool, original_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Model",
            id: original_id.to_string(),
        }))?;

    let Some(model_url) = original
        .model_url
        .as_deref()
        .filter(|_| original.status == MODEL_STATUS_COMPLETED)
    else {
        return Err(AppError::BadRequest(
            "Only completed models can be reused".into(),
        ));
    };

    let prompt = input.new_prompt.clone().or_else(|| original.prompt.clone());

    if let Some(existing) =
        ModelRepo::find_reuse_duplicate(&state.pool, &auth.user_id, model_url, prompt.as_deref())
            .await?
    {
        return Ok((
            StatusCode::CONFLICT,
            Json(ReuseConflictResponse {
                error: "This model has already been reused",
                code: "CONFLICT",
                existing_model: existing,
            }),
        )
            .into_response());
    }

    let record = CreateGeneratedModel {
        id: format!("reuse-{}", Uuid::new_v4()),
        user_id: auth.user_id.clone(),
        service_type: original.service_type.clone(),
        model_url: Some(model_url.to_string()),
        thumbnail_url: original.thumbnail_url.clone(),
        prompt,
        credits_cost: 0,
        status: MODEL_STATUS_COMPLETED.to_string(),
    };
    let reused = ModelRepo::create(&state.pool, &record).await?;

    tracing::info!(
        user_id = %auth.user_id,
        original_model_id = original_id,
        reused_model_id = %reused.id,
        "Model reused",
    );

    Ok(Json(ReuseResponse {
        success: true,
        reused_model: reused,
        original_model_id: original_id.to_string(),
        message: "Model reused",
    })
    .into_response())
}

// ---------------------------------------------------------------------------
// Similarity search
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SimilarRequest {
    pub prompt: Option<String>,
    pub threshold: Option<f64>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarModelEntry {
    pub id: String,
    pub prompt: Option<String>,
    pub model_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub service_type: String,
    pub created_at: Timestamp,
    pub user_id: String,
    pub similarity: f64,
    pub is_own_model: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarResponse {
    pub similar_models: Vec<SimilarModelEntry>,
    pub exact_match: bool,
    pub search_prompt: String,
    pub threshold: f64,
    pub total_checked: usize,
}

/// POST /api/models/similar
///
/// Score the caller's COMPLETED models against a candidate prompt and
/// return those at or above the threshold, best first. Cross-user
/// visibility is a future extension; only the caller's own models are
/// searched today.
pub async fn similar_models(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SimilarRequest>,
) -> AppResult<impl IntoResponse> {
    let prompt = input
        .prompt
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::BadRequest("Prompt is required".into()))?;

    let threshold = input.threshold.unwrap_or(DEFAULT_SIMILARITY_THRESHOLD);
    let limit = input.limit.unwrap_or(DEFAULT_SIMILAR_LIMIT);

    let candidates = ModelRepo::list_completed_with_prompts(&state.pool, &auth.user_id).await?;
    let total_checked = candidates.len();

    let mut scored: Vec<SimilarModelEntry> = candidates
        .into_iter()
        .filter_map(|model| {
            let candidate_prompt = model.prompt.as_deref()?;
            let similarity = combined_score(prompt, candidate_prompt);
            (similarity >= threshold).then(|| SimilarModelEntry {
                is_own_model: model.user_id == auth.user_id,
                id: model.id,
                prompt: model.prompt,
                model_url: model.model_url,
                thumbnail_url: model.thumbnail_url,
                service_type: model.service_type,
                created_at: model.created_at,
                user_id: model.user_id,
                similarity,
            })
        })
        .collect();

    scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    scored.truncate(limit);

    let exact_match = scored
        .iter()
        .any(|entry| entry.similarity >= EXACT_MATCH_THRESHOLD);

    Ok(Json(SimilarResponse {
        similar_models: scored,
        exact_match,
        search_prompt: prompt.to_string(),
        threshold,
        total_checked,
    }))
}
