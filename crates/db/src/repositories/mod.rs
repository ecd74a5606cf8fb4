//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Multi-step ledger mutations
//! run inside a single database transaction.

pub mod credit_repo;
pub mod model_repo;
pub mod service_type_repo;

pub use credit_repo::{CreditRepo, GrantError, SpendError};
pub use model_repo::ModelRepo;
pub use service_type_repo::ServiceTypeRepo;
