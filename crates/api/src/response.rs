//! Shared response envelope types for API handlers.
//!
//! Generic list/detail endpoints use a `{ "data": ... }` envelope; the
//! credit and model endpoints keep their domain-specific payload shapes
//! (documented per handler).

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
