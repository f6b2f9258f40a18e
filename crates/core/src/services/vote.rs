//! Vote service.

use moviehub_common::{AppError, AppResult, IdGenerator};
use moviehub_db::{
    entities::vote::VoteAction,
    repositories::{VoteRepository, VoteStats},
};
use tracing::info;

/// Result of a vote submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteOutcome {
    /// The action that was applied.
    pub action: VoteAction,
    /// Effective vote type (`1`, `-1`, or `0` for a removal).
    pub vote_type: i16,
    /// The movie's aggregate after the write.
    pub stats: VoteStats,
}

impl VoteOutcome {
    /// Human-readable confirmation.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self.action {
            VoteAction::Remove => "Vote removed",
            VoteAction::Upsert(_) => "Vote recorded",
        }
    }
}

/// Vote service for business logic.
#[derive(Clone)]
pub struct VoteService {
    vote_repo: VoteRepository,
    id_gen: IdGenerator,
}

impl VoteService {
    /// Create a new vote service.
    #[must_use]
    pub const fn new(vote_repo: VoteRepository) -> Self {
        Self {
            vote_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Cast, change or remove the user's vote on a movie.
    ///
    /// `vote_type` must be `1`, `-1` or `0`; `0` removes any existing vote.
    pub async fn submit(
        &self,
        user_id: &str,
        movie_id: &str,
        vote_type: i64,
    ) -> AppResult<VoteOutcome> {
        let action = VoteAction::from_vote_type(vote_type).ok_or_else(|| {
            AppError::invalid_field("vote_type", "vote_type must be 1, -1, or 0")
        })?;

        let stats = self
            .vote_repo
            .apply(user_id, movie_id, action, self.id_gen.generate())
            .await?;

        info!(
            user_id = %user_id,
            movie_id = %movie_id,
            vote_type = action.vote_type(),
            score = stats.score,
            "Vote applied"
        );

        Ok(VoteOutcome {
            action,
            vote_type: action.vote_type(),
            stats,
        })
    }

    /// Aggregate for one movie; zeros when it has no votes.
    pub async fn stats(&self, movie_id: &str) -> AppResult<VoteStats> {
        self.vote_repo.stats_for_movie(movie_id).await
    }
}
