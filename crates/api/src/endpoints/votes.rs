//! Vote endpoints.

use axum::{Router, extract::State, routing::post};
use moviehub_common::AppResult;
use moviehub_db::repositories::VoteStats;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    extractors::{AuthUser, ValidJson},
    middleware::AppState,
    response::ApiResponse,
};

/// Submit vote request.
///
/// `vote_type` must be an integer; `0` removes the caller's vote.
#[derive(Debug, Deserialize, Validate)]
pub struct VoteRequest {
    #[validate(length(min = 1, message = "Valid movie ID is required"))]
    pub movie_id: String,

    #[validate(range(min = -1, max = 1, message = "vote_type must be 1, -1, or 0"))]
    pub vote_type: i64,
}

/// Vote result.
#[derive(Serialize)]
pub struct VoteResponse {
    pub message: &'static str,
    pub vote_type: i16,
    pub stats: VoteStats,
}

/// Cast, change or remove a vote.
async fn submit(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    ValidJson(req): ValidJson<VoteRequest>,
) -> AppResult<ApiResponse<VoteResponse>> {
    let outcome = state
        .vote_service
        .submit(&user.id, &req.movie_id, req.vote_type)
        .await?;

    Ok(ApiResponse::ok(VoteResponse {
        message: outcome.message(),
        vote_type: outcome.vote_type,
        stats: outcome.stats,
    }))
}

/// Vote routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(submit))
}
