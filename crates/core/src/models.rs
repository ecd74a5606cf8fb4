//! Model record status constants and validation.
//!
//! A record is `PENDING` from creation until a status poll against the
//! provider reports a terminal state, then `COMPLETED` or `FAILED`.
//! Providers may additionally report `IN_PROGRESS`; that is a transient
//! provider-side state and maps to `PENDING` locally.

use crate::error::CoreError;

pub const MODEL_STATUS_PENDING: &str = "PENDING";
pub const MODEL_STATUS_COMPLETED: &str = "COMPLETED";
pub const MODEL_STATUS_FAILED: &str = "FAILED";

pub const VALID_MODEL_STATUSES: &[&str] = &[
    MODEL_STATUS_PENDING,
    MODEL_STATUS_COMPLETED,
    MODEL_STATUS_FAILED,
];

/// Terminal statuses: once written, a record never leaves them.
pub const TERMINAL_MODEL_STATUSES: &[&str] = &[MODEL_STATUS_COMPLETED, MODEL_STATUS_FAILED];

/// Minimum and maximum user rating.
pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// Validate that `status` is one of the storable model statuses.
pub fn validate_model_status(status: &str) -> Result<(), CoreError> {
    if VALID_MODEL_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid model status '{status}'. Must be one of: {}",
            VALID_MODEL_STATUSES.join(", ")
        )))
    }
}

/// Validate a 1-5 star rating.
pub fn validate_rating(rating: i32) -> Result<(), CoreError> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Rating must be an integer between {MIN_RATING} and {MAX_RATING}, got {rating}"
        )))
    }
}
