//! User rows. Ids are opaque strings issued by the identity provider;
//! rows are created on first credit initialization and never deleted.

use meshforge_core::types::{Timestamp, UserId};
use serde::Serialize;
use sqlx::FromRow;

/// A user row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
