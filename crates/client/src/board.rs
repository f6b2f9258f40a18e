//! Local movie list with optimistic voting.
//!
//! A vote is applied to the local copy before the request goes out. When the
//! server answers, its aggregate replaces the local guess; when the request
//! fails, the movie is put back exactly as it was. The list is not re-sorted
//! until it is replaced with a fresh listing.

use tracing::debug;

use crate::client::MovieHubClient;
use crate::error::{ClientError, ClientResult};
use crate::models::{Movie, VoteResult, VoteStats};
use crate::session::SessionContext;

/// A vote applied locally and not yet confirmed by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a pending vote must be reconciled or reverted"]
pub struct PendingVote {
    movie_id: String,
    vote_type: i16,
    previous_vote: Option<i16>,
    previous_stats: VoteStats,
}

impl PendingVote {
    /// Movie the vote targets.
    #[must_use]
    pub fn movie_id(&self) -> &str {
        &self.movie_id
    }

    /// The `vote_type` to send: `1`, `-1`, or `0` to remove.
    #[must_use]
    pub const fn vote_type(&self) -> i16 {
        self.vote_type
    }
}

/// Movies as currently shown to the user.
#[derive(Debug, Clone, Default)]
pub struct MovieBoard {
    movies: Vec<Movie>,
}

impl MovieBoard {
    /// Board over an API listing.
    #[must_use]
    pub const fn new(movies: Vec<Movie>) -> Self {
        Self { movies }
    }

    /// Movies in display order.
    #[must_use]
    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    /// Look up a movie by ID.
    #[must_use]
    pub fn get(&self, movie_id: &str) -> Option<&Movie> {
        self.movies.iter().find(|m| m.id == movie_id)
    }

    /// Swap in a fresh listing.
    pub fn replace(&mut self, movies: Vec<Movie>) {
        self.movies = movies;
    }

    fn get_mut(&mut self, movie_id: &str) -> Option<&mut Movie> {
        self.movies.iter_mut().find(|m| m.id == movie_id)
    }

    /// Apply a click on the up (`1`) or down (`-1`) button locally.
    ///
    /// Clicking the direction already voted removes the vote. Returns `None`
    /// if the movie is not on the board.
    pub fn begin_vote(&mut self, movie_id: &str, clicked: i16) -> Option<PendingVote> {
        let movie = self.get_mut(movie_id)?;

        let current = movie.user_vote.unwrap_or(0);
        let clicked = clicked.signum();
        let next = if current == clicked { 0 } else { clicked };

        let pending = PendingVote {
            movie_id: movie.id.clone(),
            vote_type: next,
            previous_vote: movie.user_vote,
            previous_stats: movie.stats(),
        };

        let mut stats = movie.stats();
        // A stale listing may not count the vote being withdrawn
        match current {
            1 => stats.upvotes = (stats.upvotes - 1).max(0),
            -1 => stats.downvotes = (stats.downvotes - 1).max(0),
            _ => {}
        }
        match next {
            1 => stats.upvotes += 1,
            -1 => stats.downvotes += 1,
            _ => {}
        }
        stats.score = stats.upvotes - stats.downvotes;

        movie.set_stats(stats);
        movie.user_vote = Some(next);

        Some(pending)
    }

    /// Replace the local guess with the server's answer.
    pub fn reconcile(&mut self, pending: PendingVote, result: &VoteResult) {
        if let Some(movie) = self.get_mut(&pending.movie_id) {
            movie.set_stats(result.stats);
            movie.user_vote = Some(result.vote_type);
        }
    }

    /// Undo a local vote whose request failed.
    pub fn revert(&mut self, pending: PendingVote) {
        if let Some(movie) = self.get_mut(&pending.movie_id) {
            movie.set_stats(pending.previous_stats);
            movie.user_vote = pending.previous_vote;
        }
    }

    /// Click a vote button: apply locally, submit, then reconcile or revert.
    ///
    /// Fails with [`ClientError::Unauthorized`] without touching the board
    /// when signed out. Returns `Ok(None)` if the movie is not on the board.
    pub async fn vote(
        &mut self,
        client: &MovieHubClient,
        session: &mut SessionContext,
        movie_id: &str,
        clicked: i16,
    ) -> ClientResult<Option<VoteResult>> {
        let Some(current) = session.current().cloned() else {
            return Err(ClientError::Unauthorized);
        };

        let Some(pending) = self.begin_vote(movie_id, clicked) else {
            return Ok(None);
        };

        let result = client
            .vote(&current, pending.movie_id(), pending.vote_type())
            .await;

        match session.check(result).await {
            Ok(result) => {
                self.reconcile(pending, &result);
                Ok(Some(result))
            }
            Err(e) => {
                debug!(movie_id = %movie_id, error = %e, "Vote failed, reverting");
                self.revert(pending);
                Err(e)
            }
        }
    }
}
