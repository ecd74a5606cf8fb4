//! Credit ledger models: the per-user balance row (ledger head) and the
//! append-only transaction log (ledger body).

use meshforge_core::types::{DbId, Timestamp, UserId};
use serde::Serialize;
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Ledger head
// ---------------------------------------------------------------------------

/// A user's balance row from the `user_credits` table.
///
/// Invariant: `current_credits == total_earned - total_spent`, enforced
/// by only ever mutating the row inside a ledger transaction.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCredits {
    pub user_id: UserId,
    pub current_credits: i32,
    pub total_earned: i32,
    pub total_spent: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Ledger body
// ---------------------------------------------------------------------------

/// An append-only transaction row from `credit_transactions`.
///
/// Immutable once written. `balance_after` snapshots the head's
/// `current_credits` immediately after this transaction committed.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditTransaction {
    pub id: DbId,
    pub user_id: UserId,
    pub service_type_id: Option<DbId>,
    pub amount: i32,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub tx_type: String,
    pub description: String,
    pub balance_after: i32,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Timestamp,
}

/// A transaction row joined with its service type, for history views.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditTransactionWithService {
    pub id: DbId,
    pub user_id: UserId,
    pub service_type_id: Option<DbId>,
    pub amount: i32,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub tx_type: String,
    pub description: String,
    pub balance_after: i32,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub service_type_name: Option<String>,
    pub service_type_description: Option<String>,
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// Balance summary plus recent activity, for the stats endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditStats {
    pub current_credits: i32,
    pub total_earned: i32,
    pub total_spent: i32,
    pub recent_transactions: Vec<CreditTransactionWithService>,
}

/// Result of a successful spend: the appended transaction and the
/// balance it left behind.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendOutcome {
    pub transaction: CreditTransaction,
    pub remaining_credits: i32,
}

/// Result of a successful grant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantOutcome {
    pub transaction: CreditTransaction,
    pub new_balance: i32,
}
