//! Handlers for the credit ledger endpoints.
//!
//! These endpoints identify the user by an explicit `userId` (query
//! parameter or request body) rather than the session, mirroring the
//! public surface of the ledger service. Payload shapes follow the
//! original client contract (`success` flag plus domain fields).

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use meshforge_core::catalog;
use meshforge_core::credits::DEFAULT_HISTORY_LIMIT;
use meshforge_db::models::credits::{CreditStats, CreditTransaction, CreditTransactionWithService};
use meshforge_db::models::service_type::ServiceType;
use meshforge_db::repositories::{CreditRepo, ServiceTypeRepo};

use crate::error::{AppError, AppResult};
use crate::query::{HistoryParams, UserIdParams};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Initialize
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeRequest {
    pub user_id: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResponse {
    pub success: bool,
    pub credits: i32,
    pub message: &'static str,
}

/// POST /api/credits/initialize
///
/// Grant the signup bonus exactly once. Safe to call repeatedly; an
/// already-initialized account is returned unchanged.
pub async fn initialize_credits(
    State(state): State<AppState>,
    Json(input): Json<InitializeRequest>,
) -> AppResult<impl IntoResponse> {
    if input.user_id.trim().is_empty() || input.email.trim().is_empty() {
        return Err(AppError::BadRequest(
            "userId and email must not be empty".into(),
        ));
    }

    let head = CreditRepo::initialize(&state.pool, &input.user_id, &input.email).await?;

    Ok(Json(InitializeResponse {
        success: true,
        credits: head.current_credits,
        message: "Credit account initialized",
    }))
}

// ---------------------------------------------------------------------------
// Balance / stats / history
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub success: bool,
    pub credits: i32,
}

/// GET /api/credits/balance?userId=
///
/// Current balance. Uninitialized users read as zero.
pub async fn get_balance(
    State(state): State<AppState>,
    Query(params): Query<UserIdParams>,
) -> AppResult<impl IntoResponse> {
    let credits = CreditRepo::balance(&state.pool, &params.user_id).await?;

    Ok(Json(BalanceResponse {
        success: true,
        credits,
    }))
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    #[serde(flatten)]
    pub stats: CreditStats,
}

/// GET /api/credits/stats?userId=
///
/// Balance summary plus the five most recent transactions.
pub async fn get_stats(
    State(state): State<AppState>,
    Query(params): Query<UserIdParams>,
) -> AppResult<impl IntoResponse> {
    let stats = CreditRepo::stats(&state.pool, &params.user_id).await?;

    Ok(Json(StatsResponse {
        success: true,
        stats,
    }))
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub history: Vec<CreditTransactionWithService>,
}

/// GET /api/credits/history?userId=&limit=
///
/// Transaction log page, newest first. Default limit 20; no enforced
/// maximum (callers own their page sizes here).
pub async fn get_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> AppResult<impl IntoResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT).max(1);
    let history = CreditRepo::history(&state.pool, &params.user_id, limit).await?;

    Ok(Json(HistoryResponse {
        success: true,
        history,
    }))
}

// ---------------------------------------------------------------------------
// Spend
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendRequest {
    pub user_id: String,
    pub service_type: String,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendResponse {
    pub success: bool,
    pub transaction: CreditTransaction,
    pub remaining_credits: i32,
    pub message: &'static str,
}

/// POST /api/credits/spend
///
/// Debit the balance for a priced service. The affordability check runs
/// inside the ledger transaction, so concurrent spends cannot overdraw.
pub async fn spend_credits(
    State(state): State<AppState>,
    Json(input): Json<SpendRequest>,
) -> AppResult<impl IntoResponse> {
    if input.user_id.trim().is_empty() {
        return Err(AppError::BadRequest("userId must not be empty".into()));
    }

    // Rejects unknown service types with 400 before touching the ledger.
    let cost = catalog::cost(&input.service_type)?;

    let outcome = CreditRepo::spend(
        &state.pool,
        &input.user_id,
        &input.service_type,
        cost,
        input.metadata,
    )
    .await?;

    Ok(Json(SpendResponse {
        success: true,
        transaction: outcome.transaction,
        remaining_credits: outcome.remaining_credits,
        message: "Credits spent",
    }))
}

// ---------------------------------------------------------------------------
// Service catalog
// ---------------------------------------------------------------------------

/// GET /api/credits/service-types
///
/// Active catalog rows, cheapest first.
pub async fn list_service_types(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ServiceType>>>> {
    let service_types = ServiceTypeRepo::list_active(&state.pool).await?;

    Ok(Json(DataResponse {
        data: service_types,
    }))
}
