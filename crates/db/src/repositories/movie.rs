//! Movie repository.

use std::sync::Arc;

use crate::entities::{Movie, movie};
use moviehub_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbBackend, EntityTrait, FromQueryResult, Statement,
    prelude::DateTimeWithTimeZone,
};
use serde::Serialize;

/// A movie with its aggregated votes and comment count.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct RankedMovie {
    /// Movie ID.
    pub id: String,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Creator's user ID; `None` once the creator is gone.
    pub added_by: Option<String>,
    /// Creator's display name.
    pub added_by_name: Option<String>,
    /// Creation time.
    pub created_at: DateTimeWithTimeZone,
    /// Number of +1 votes.
    pub upvotes: i64,
    /// Number of -1 votes.
    pub downvotes: i64,
    /// `upvotes - downvotes`.
    pub score: i64,
    /// Number of comments.
    pub comment_count: i64,
}

// Votes and comments are aggregated separately before joining; joining both
// raw tables would multiply each vote by the movie's comment count.
const RANKED_SQL: &str = r"
    SELECT
        m.id,
        m.title,
        m.description,
        m.added_by,
        u.name AS added_by_name,
        m.created_at,
        COALESCE(v.upvotes, 0)::BIGINT AS upvotes,
        COALESCE(v.downvotes, 0)::BIGINT AS downvotes,
        COALESCE(v.score, 0)::BIGINT AS score,
        COALESCE(c.comment_count, 0)::BIGINT AS comment_count
    FROM movies m
    LEFT JOIN users u ON u.id = m.added_by
    LEFT JOIN (
        SELECT
            movie_id,
            SUM(CASE WHEN vote_type = 1 THEN 1 ELSE 0 END) AS upvotes,
            SUM(CASE WHEN vote_type = -1 THEN 1 ELSE 0 END) AS downvotes,
            SUM(vote_type) AS score
        FROM votes
        GROUP BY movie_id
    ) v ON v.movie_id = m.id
    LEFT JOIN (
        SELECT movie_id, COUNT(DISTINCT id) AS comment_count
        FROM comments
        GROUP BY movie_id
    ) c ON c.movie_id = m.id
    ORDER BY score DESC, m.created_at DESC, m.id DESC
    LIMIT $1
";

/// Movie repository for database operations.
#[derive(Clone)]
pub struct MovieRepository {
    db: Arc<DatabaseConnection>,
}

impl MovieRepository {
    /// Create a new movie repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a movie by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<movie::Model>> {
        Movie::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from)
    }

    /// Get a movie by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<movie::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Movie not found: {id}")))
    }

    /// Create a new movie.
    pub async fn create(&self, model: movie::ActiveModel) -> AppResult<movie::Model> {
        model.insert(self.db.as_ref()).await.map_err(AppError::from)
    }

    /// Delete a movie. Returns `false` if no such movie existed.
    ///
    /// Votes and comments go with it through `ON DELETE CASCADE`.
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = Movie::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected > 0)
    }

    /// All movies with aggregates, best score first, newer first on ties.
    ///
    /// `limit = None` returns every movie. The trailing `id` sort key makes
    /// the order total, so repeated calls without writes agree.
    pub async fn find_ranked(&self, limit: Option<u64>) -> AppResult<Vec<RankedMovie>> {
        let limit = limit.map(|l| l as i64);

        RankedMovie::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            RANKED_SQL,
            [limit.into()],
        ))
        .all(self.db.as_ref())
        .await
        .map_err(AppError::from)
    }
}
