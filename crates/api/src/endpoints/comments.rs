//! Comment endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use moviehub_common::AppResult;
use moviehub_db::repositories::CommentWithAuthor;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    extractors::{AuthUser, ValidJson},
    middleware::AppState,
    response::{ApiResponse, MessageResponse, message},
};

/// Comment list.
#[derive(Serialize)]
pub struct CommentsResponse {
    pub comments: Vec<CommentWithAuthor>,
}

/// Single comment with a confirmation message.
#[derive(Serialize)]
pub struct CommentResponse {
    pub message: &'static str,
    pub comment: CommentWithAuthor,
}

/// Add comment request.
#[derive(Debug, Deserialize, Validate)]
pub struct AddCommentRequest {
    #[validate(length(min = 1, message = "Valid movie ID is required"))]
    pub movie_id: String,

    #[validate(length(min = 1, message = "Comment body is required"))]
    pub body: String,
}

/// Edit comment request.
#[derive(Debug, Deserialize, Validate)]
pub struct EditCommentRequest {
    #[validate(length(min = 1, message = "Comment body is required"))]
    pub body: String,
}

/// Comments on a movie, newest first.
async fn list(
    State(state): State<AppState>,
    Path(movie_id): Path<String>,
) -> AppResult<ApiResponse<CommentsResponse>> {
    let comments = state.comment_service.list(&movie_id).await?;
    Ok(ApiResponse::ok(CommentsResponse { comments }))
}

/// Post a comment.
async fn add(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    ValidJson(req): ValidJson<AddCommentRequest>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state
        .comment_service
        .add(&user, &req.movie_id, &req.body)
        .await?;

    Ok(ApiResponse::created(CommentResponse {
        message: "Comment added successfully",
        comment,
    }))
}

/// Edit the caller's own comment.
async fn edit(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<EditCommentRequest>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state.comment_service.edit(&user, &id, &req.body).await?;

    Ok(ApiResponse::ok(CommentResponse {
        message: "Comment updated successfully",
        comment,
    }))
}

/// Delete a comment (owner or admin).
async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<MessageResponse>> {
    state.comment_service.delete(&user, &id).await?;
    Ok(message("Comment deleted successfully"))
}

/// Comment routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(add))
        .route("/movie/{movie_id}", get(list))
        .route("/{id}", put(edit).delete(remove))
}
