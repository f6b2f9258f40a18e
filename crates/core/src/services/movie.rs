//! Movie service.

use std::collections::HashMap;

use chrono::Utc;
use moviehub_common::{AppError, AppResult, IdGenerator};
use moviehub_db::{
    entities::{movie, user},
    repositories::{MovieRepository, RankedMovie, VoteRepository},
};
use sea_orm::Set;
use serde::Serialize;
use tracing::{info, warn};

use super::required_text;

/// Default leaderboard size.
pub const DEFAULT_TOP_LIMIT: u64 = 10;

/// Largest leaderboard a caller may ask for.
pub const MAX_TOP_LIMIT: u64 = 100;

const MAX_TITLE_CHARS: usize = 255;
const MAX_DESCRIPTION_CHARS: usize = 5000;

/// Input for creating a movie.
pub struct CreateMovieInput {
    pub title: String,
    pub description: String,
}

/// A ranked movie, optionally annotated with the caller's vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieListing {
    #[serde(flatten)]
    pub movie: RankedMovie,
    /// The caller's vote (`0` if none). Absent for anonymous listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_vote: Option<i16>,
}

/// Movie service for business logic.
#[derive(Clone)]
pub struct MovieService {
    movie_repo: MovieRepository,
    vote_repo: VoteRepository,
    id_gen: IdGenerator,
}

impl MovieService {
    /// Create a new movie service.
    #[must_use]
    pub const fn new(movie_repo: MovieRepository, vote_repo: VoteRepository) -> Self {
        Self {
            movie_repo,
            vote_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// All movies in rank order.
    ///
    /// With a caller, each entry also carries the caller's own vote. That
    /// lookup is best effort: if it fails the plain ranking is returned.
    pub async fn list_ranked(&self, caller_id: Option<&str>) -> AppResult<Vec<MovieListing>> {
        let movies = self.movie_repo.find_ranked(None).await?;

        let votes = match caller_id {
            Some(user_id) => self.caller_votes(user_id).await,
            None => None,
        };

        Ok(movies
            .into_iter()
            .map(|movie| {
                let user_vote = votes
                    .as_ref()
                    .map(|v| v.get(&movie.id).copied().unwrap_or(0));
                MovieListing { movie, user_vote }
            })
            .collect())
    }

    async fn caller_votes(&self, user_id: &str) -> Option<HashMap<String, i16>> {
        match self.vote_repo.find_by_user(user_id).await {
            Ok(votes) => Some(
                votes
                    .into_iter()
                    .map(|v| (v.movie_id, v.vote_type))
                    .collect(),
            ),
            Err(e) => {
                warn!(error = %e, user_id = %user_id, "Failed to load caller votes");
                None
            }
        }
    }

    /// Leaderboard for admins. `limit` is clamped to `1..=100`.
    pub async fn top_movies(
        &self,
        caller: &user::Model,
        limit: Option<u64>,
    ) -> AppResult<Vec<RankedMovie>> {
        if !caller.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        let limit = limit
            .unwrap_or(DEFAULT_TOP_LIMIT)
            .clamp(1, MAX_TOP_LIMIT);

        self.movie_repo.find_ranked(Some(limit)).await
    }

    /// Add a movie on behalf of `creator`.
    pub async fn create(
        &self,
        creator: &user::Model,
        input: CreateMovieInput,
    ) -> AppResult<RankedMovie> {
        let title = required_text("title", &input.title, MAX_TITLE_CHARS)?;
        let description =
            required_text("description", &input.description, MAX_DESCRIPTION_CHARS)?;

        let model = movie::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(title),
            description: Set(description),
            added_by: Set(Some(creator.id.clone())),
            created_at: Set(Utc::now().into()),
        };

        let created = self.movie_repo.create(model).await?;

        info!(movie_id = %created.id, user_id = %creator.id, "Movie created");

        Ok(RankedMovie {
            id: created.id,
            title: created.title,
            description: created.description,
            added_by: created.added_by,
            added_by_name: Some(creator.name.clone()),
            created_at: created.created_at,
            upvotes: 0,
            downvotes: 0,
            score: 0,
            comment_count: 0,
        })
    }

    /// Delete a movie together with its votes and comments. Admin only.
    pub async fn delete(&self, caller: &user::Model, movie_id: &str) -> AppResult<()> {
        if !caller.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        if !self.movie_repo.delete(movie_id).await? {
            return Err(AppError::NotFound(format!("Movie not found: {movie_id}")));
        }

        info!(movie_id = %movie_id, user_id = %caller.id, "Movie deleted");
        Ok(())
    }
}
