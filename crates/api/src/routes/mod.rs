pub mod health;

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /credits/initialize          grant signup bonus once (POST)
/// /credits/balance             current balance (GET, ?userId=)
/// /credits/stats               balance + recent history (GET, ?userId=)
/// /credits/history             transaction log page (GET, ?userId=&limit=)
/// /credits/spend               debit balance for a service (POST)
/// /credits/service-types       active pricing catalog (GET)
///
/// /generate                    create generation task (POST, session)
///                              poll task status (GET, ?taskId=)
///
/// /models                      list (GET), save (POST), delete (DELETE ?id=)
/// /models/{id}/rating          attach rating + comment (PUT, owner only)
/// /models/reuse                zero-cost clone of a completed model (POST)
/// /models/similar              similarity search over own models (POST)
///
/// /admin/models                all models + rating stats (GET, admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Credit ledger (public surface, identified by explicit userId).
        .route("/credits/initialize", post(handlers::credits::initialize_credits))
        .route("/credits/balance", get(handlers::credits::get_balance))
        .route("/credits/stats", get(handlers::credits::get_stats))
        .route("/credits/history", get(handlers::credits::get_history))
        .route("/credits/spend", post(handlers::credits::spend_credits))
        .route(
            "/credits/service-types",
            get(handlers::credits::list_service_types),
        )
        // Generation (session required).
        .route(
            "/generate",
            post(handlers::generate::create_generation).get(handlers::generate::get_task_status),
        )
        // Model records (session required).
        .route(
            "/models",
            get(handlers::models::list_models)
                .post(handlers::models::save_model)
                .delete(handlers::models::delete_model),
        )
        .route("/models/{id}/rating", put(handlers::models::rate_model))
        .route("/models/reuse", post(handlers::models::reuse_model))
        .route("/models/similar", post(handlers::models::similar_models))
        // Admin.
        .route("/admin/models", get(handlers::admin::list_all_models))
}
