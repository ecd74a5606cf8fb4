//! Generated model records: one row per generation attempt, keyed by
//! the external provider's task id.

use meshforge_core::types::{Timestamp, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `generated_models` table.
///
/// `id` equals the provider task id, tying the record 1:1 to a provider
/// task (reuse records carry a locally generated id instead, since no
/// provider task exists for them). `model_url`/`thumbnail_url` stay
/// null until a status poll reports a terminal state.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedModel {
    pub id: String,
    pub user_id: UserId,
    pub service_type: String,
    pub model_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub prompt: Option<String>,
    pub credits_cost: i32,
    pub status: String,
    pub rating: Option<i32>,
    pub comment: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Input for inserting a new model record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGeneratedModel {
    pub id: String,
    pub user_id: UserId,
    pub service_type: String,
    pub model_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub prompt: Option<String>,
    pub credits_cost: i32,
    pub status: String,
}

// ---------------------------------------------------------------------------
// Admin projections
// ---------------------------------------------------------------------------

/// A model row joined with its owner, for the admin listing.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminModelRow {
    pub id: String,
    pub user_id: UserId,
    pub service_type: String,
    pub model_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub prompt: Option<String>,
    pub credits_cost: i32,
    pub status: String,
    pub rating: Option<i32>,
    pub comment: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub user_email: String,
    pub user_created_at: Timestamp,
}

/// Aggregate rating statistics across all model records.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingStats {
    pub total_rated_models: i64,
    pub average_rating: f64,
}
