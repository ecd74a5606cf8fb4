//! Client for the external Meshy text-to-3D generation API.
//!
//! [`MeshyClient`] wraps the REST endpoints (task submission and status
//! retrieval); [`poll`] provides the bounded poll-until-terminal loop
//! used after a paid generation request.

pub mod client;
pub mod poll;
pub mod types;

pub use client::{MeshyClient, MeshyError};
pub use poll::{poll_until_terminal, PollConfig};
pub use types::{TaskStatus, TextTo3DTask};
