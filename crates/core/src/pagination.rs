//! Pagination clamps shared by list endpoints.

/// Default page size for model listings.
pub const DEFAULT_MODEL_LIMIT: i64 = 50;

/// Maximum page size for user-facing model listings.
pub const MAX_MODEL_LIMIT: i64 = 100;

/// Maximum page size for the admin model listing.
pub const MAX_ADMIN_MODEL_LIMIT: i64 = 200;

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_caps() {
        assert_eq!(clamp_limit(None, 50, 100), 50);
        assert_eq!(clamp_limit(Some(0), 50, 100), 1);
        assert_eq!(clamp_limit(Some(-3), 50, 100), 1);
        assert_eq!(clamp_limit(Some(250), 50, 100), 100);
        assert_eq!(clamp_limit(Some(25), 50, 100), 25);
    }

    #[test]
    fn offset_is_non_negative() {
        assert_eq!(clamp_offset(None), 0);
        assert_eq!(clamp_offset(Some(-1)), 0);
        assert_eq!(clamp_offset(Some(40)), 40);
    }
}
