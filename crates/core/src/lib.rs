//! Core business logic for moviehub.
//!
//! Services sit between the HTTP layer and the repositories: they validate
//! input, enforce ownership and role rules, and pick the repository calls.

pub mod services;

pub use services::*;
