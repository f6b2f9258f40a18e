//! HTTP API layer for moviehub.
//!
//! - **Endpoints**: movies, votes, comments and a health check
//! - **Extractors**: authentication and validated JSON bodies
//! - **Middleware**: bearer-token resolution and shared state
//!
//! Built on Axum 0.8. Mount [`router`] under `/api`.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
