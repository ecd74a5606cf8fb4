//! Credit ledger constants and transaction-type validation.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Transaction types
// ---------------------------------------------------------------------------

pub const TX_TYPE_EARN: &str = "EARN";
pub const TX_TYPE_SPEND: &str = "SPEND";
pub const TX_TYPE_BONUS: &str = "BONUS";
pub const TX_TYPE_REFUND: &str = "REFUND";

pub const VALID_TX_TYPES: &[&str] = &[TX_TYPE_EARN, TX_TYPE_SPEND, TX_TYPE_BONUS, TX_TYPE_REFUND];

/// Transaction types allowed on the credit (grant) path. SPEND rows are
/// only ever written by the spend operation itself.
pub const VALID_GRANT_TYPES: &[&str] = &[TX_TYPE_EARN, TX_TYPE_BONUS, TX_TYPE_REFUND];

// ---------------------------------------------------------------------------
// Signup bonus
// ---------------------------------------------------------------------------

/// Credits granted once, on first initialization of a user's account.
pub const SIGNUP_BONUS_CREDITS: i32 = 45;

/// Description stored on the signup-bonus transaction. The ledger table
/// carries a partial unique index keyed on this value, so a concurrent
/// duplicate grant fails closed.
pub const SIGNUP_BONUS_DESCRIPTION: &str = "signup bonus";

// ---------------------------------------------------------------------------
// History defaults
// ---------------------------------------------------------------------------

/// Default page size for transaction history.
pub const DEFAULT_HISTORY_LIMIT: i64 = 20;

/// Number of recent transactions included in the stats payload.
pub const STATS_RECENT_LIMIT: i64 = 5;

/// Validate that `tx_type` is allowed on the grant path.
pub fn validate_grant_type(tx_type: &str) -> Result<(), CoreError> {
    if VALID_GRANT_TYPES.contains(&tx_type) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid credit type '{tx_type}'. Must be one of: {}",
            VALID_GRANT_TYPES.join(", ")
        )))
    }
}

/// Validate that a grant amount is a positive integer.
pub fn validate_grant_amount(amount: i32) -> Result<(), CoreError> {
    if amount > 0 {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Credit amount must be positive, got {amount}"
        )))
    }
}
