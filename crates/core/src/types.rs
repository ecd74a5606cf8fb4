/// Ledger transaction primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// User ids are opaque strings issued by the identity provider.
/// Model record ids are the provider's task id. Neither is numeric.
pub type UserId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
