//! Service type rows: the persisted pricing catalog, seeded at
//! deployment time from the in-process catalog values.

use meshforge_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A service type row from the `service_types` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceType {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub credit_cost: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
