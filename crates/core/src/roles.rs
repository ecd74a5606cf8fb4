//! Role names carried in identity-provider claims.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";
