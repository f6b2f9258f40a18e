//! Wire types returned by the API.

#![allow(missing_docs)]

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// User role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// Vote aggregate for one movie.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteStats {
    pub upvotes: i64,
    pub downvotes: i64,
    pub score: i64,
}

/// A movie as listed by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: String,
    pub title: String,
    pub description: String,
    pub added_by: Option<String>,
    pub added_by_name: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub upvotes: i64,
    pub downvotes: i64,
    pub score: i64,
    pub comment_count: i64,
    /// The signed-in user's vote; absent on anonymous listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_vote: Option<i16>,
}

impl Movie {
    /// The movie's vote aggregate.
    #[must_use]
    pub const fn stats(&self) -> VoteStats {
        VoteStats {
            upvotes: self.upvotes,
            downvotes: self.downvotes,
            score: self.score,
        }
    }

    pub(crate) fn set_stats(&mut self, stats: VoteStats) {
        self.upvotes = stats.upvotes;
        self.downvotes = stats.downvotes;
        self.score = stats.score;
    }
}

/// Payload for adding a movie.
#[derive(Debug, Clone, Serialize)]
pub struct NewMovie {
    pub title: String,
    pub description: String,
}

/// Result of a vote submission.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VoteResult {
    pub message: String,
    pub vote_type: i16,
    pub stats: VoteStats,
}

/// A comment with its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub user_id: String,
    pub movie_id: String,
    pub body: String,
    pub created_at: DateTime<FixedOffset>,
    pub user_name: String,
    pub user_role: Role,
}

/// Liveness response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Health {
    pub status: String,
    pub message: String,
}
