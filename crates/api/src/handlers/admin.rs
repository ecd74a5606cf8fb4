//! Admin handlers: cross-user model listing with rating aggregates.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use meshforge_core::pagination::{clamp_limit, clamp_offset, DEFAULT_MODEL_LIMIT, MAX_ADMIN_MODEL_LIMIT};
use meshforge_db::models::generated_model::{AdminModelRow, RatingStats};
use meshforge_db::repositories::ModelRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AdminModelsResponse {
    pub models: Vec<AdminModelRow>,
    pub total: i64,
    pub stats: RatingStats,
}

/// GET /api/admin/models
///
/// List all model records with their owners and aggregate rating
/// statistics. Admin only; page size capped at 200.
pub async fn list_all_models(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit, DEFAULT_MODEL_LIMIT, MAX_ADMIN_MODEL_LIMIT);
    let offset = clamp_offset(params.offset);

    let models = ModelRepo::list_all(&state.pool, limit, offset).await?;
    let total = ModelRepo::count_all(&state.pool).await?;
    let stats = ModelRepo::rating_stats(&state.pool).await?;

    tracing::debug!(admin_id = %admin.user_id, limit, offset, "Admin model listing");

    Ok(Json(AdminModelsResponse {
        models,
        total,
        stats,
    }))
}
