//! Movie endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::{delete, get},
};
use moviehub_common::AppResult;
use moviehub_core::{CreateMovieInput, MovieListing};
use moviehub_db::repositories::{RankedMovie, VoteStats};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    extractors::{AuthUser, MaybeAuthUser, ValidJson, ValidQuery},
    middleware::AppState,
    response::{ApiResponse, MessageResponse, message},
};

/// Ranked movie list.
#[derive(Serialize)]
pub struct MoviesResponse {
    pub movies: Vec<MovieListing>,
}

/// List all movies in rank order.
///
/// With a valid token each movie carries the caller's `user_vote`; an
/// invalid token is treated as anonymous.
async fn list(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<MoviesResponse>> {
    let movies = state
        .movie_service
        .list_ranked(user.as_ref().map(|u| u.id.as_str()))
        .await?;

    Ok(ApiResponse::ok(MoviesResponse { movies }))
}

/// Create movie request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMovieRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
}

/// Created movie.
#[derive(Serialize)]
pub struct CreateMovieResponse {
    pub message: &'static str,
    pub movie: RankedMovie,
}

/// Add a movie.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CreateMovieRequest>,
) -> AppResult<ApiResponse<CreateMovieResponse>> {
    let input = CreateMovieInput {
        title: req.title,
        description: req.description,
    };

    let movie = state.movie_service.create(&user, input).await?;

    Ok(ApiResponse::created(CreateMovieResponse {
        message: "Movie added successfully",
        movie,
    }))
}

/// Delete a movie (admin only).
async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<MessageResponse>> {
    state.movie_service.delete(&user, &id).await?;
    Ok(message("Movie deleted successfully"))
}

/// Leaderboard query.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct TopMoviesQuery {
    pub limit: Option<u64>,
}

/// Leaderboard.
#[derive(Serialize)]
pub struct TopMoviesResponse {
    #[serde(rename = "topMovies")]
    pub top_movies: Vec<RankedMovie>,
}

/// Top movies by score (admin only).
async fn top(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<TopMoviesQuery>,
) -> AppResult<ApiResponse<TopMoviesResponse>> {
    let top_movies = state.movie_service.top_movies(&user, query.limit).await?;
    Ok(ApiResponse::ok(TopMoviesResponse { top_movies }))
}

/// Vote aggregate for one movie.
async fn votes(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<VoteStats>> {
    let stats = state.vote_service.stats(&id).await?;
    Ok(ApiResponse::ok(stats))
}

/// Movie routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/top", get(top))
        .route("/{id}", delete(remove))
        .route("/{id}/votes", get(votes))
}
