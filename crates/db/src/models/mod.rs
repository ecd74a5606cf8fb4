//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` create/update DTOs used by the API layer
//!
//! Entities serialize with camelCase field names to match the public
//! JSON surface.

pub mod credits;
pub mod generated_model;
pub mod service_type;
pub mod user;
