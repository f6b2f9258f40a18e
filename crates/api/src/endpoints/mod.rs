//! API endpoints.
//!
//! Request and response types mirror the JSON wire format field for field.

#![allow(missing_docs)]

mod comments;
mod health;
mod movies;
mod votes;

pub use comments::{AddCommentRequest, EditCommentRequest};
pub use movies::{CreateMovieRequest, TopMoviesQuery};
pub use votes::VoteRequest;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/health", health::router())
        .nest("/movies", movies::router())
        .nest("/votes", votes::router())
        .nest("/comments", comments::router())
}
