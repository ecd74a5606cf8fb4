//! HTTP handlers, grouped by domain.

pub mod admin;
pub mod credits;
pub mod generate;
pub mod models;
