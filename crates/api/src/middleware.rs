//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use moviehub_common::AppError;
use moviehub_core::{CommentService, MovieService, UserService, VoteService};
use moviehub_db::repositories::{
    CommentRepository, MovieRepository, UserRepository, VoteRepository,
};
use sea_orm::DatabaseConnection;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub movie_service: MovieService,
    pub vote_service: VoteService,
    pub comment_service: CommentService,
}

impl AppState {
    /// Wire every service onto one shared connection pool.
    #[must_use]
    pub fn from_connection(db: Arc<DatabaseConnection>) -> Self {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let movie_repo = MovieRepository::new(Arc::clone(&db));
        let vote_repo = VoteRepository::new(Arc::clone(&db));
        let comment_repo = CommentRepository::new(db);

        Self {
            user_service: UserService::new(user_repo),
            movie_service: MovieService::new(movie_repo.clone(), vote_repo.clone()),
            vote_service: VoteService::new(vote_repo),
            comment_service: CommentService::new(comment_repo, movie_repo),
        }
    }
}

/// Set when the token lookup itself failed, as opposed to finding no user.
#[derive(Debug, Clone)]
pub struct IdentityLookupFailed(pub String);

/// Authentication middleware.
///
/// Resolves a `Bearer` token to its user and stores it in the request
/// extensions. Nothing is rejected here: an unknown token leaves the request
/// anonymous, and a failed lookup leaves an [`IdentityLookupFailed`] marker.
/// Endpoints that need a user reject through [`crate::extractors::AuthUser`].
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        match state.user_service.authenticate_by_token(token.trim()).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(AppError::Unauthorized) => tracing::debug!("Bearer token did not resolve"),
            Err(e) => {
                tracing::warn!(error = %e, "Bearer token lookup failed");
                let message = match e {
                    AppError::Database(message) => message,
                    other => other.to_string(),
                };
                req.extensions_mut().insert(IdentityLookupFailed(message));
            }
        }
    }

    next.run(req).await
}
