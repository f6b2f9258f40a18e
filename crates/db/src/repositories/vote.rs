//! Vote repository.
//!
//! Votes are never counted into denormalized columns; every aggregate is
//! computed from the `votes` table when asked for.

use std::sync::Arc;

use crate::entities::{
    Movie, Vote,
    vote::{self, VoteAction},
};
use chrono::Utc;
use moviehub_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, Set, Statement, TransactionTrait, sea_query::OnConflict,
};
use serde::{Deserialize, Serialize};

/// Per-movie vote aggregate.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, FromQueryResult, Serialize, Deserialize,
)]
pub struct VoteStats {
    /// Number of +1 votes.
    pub upvotes: i64,
    /// Number of -1 votes.
    pub downvotes: i64,
    /// `upvotes - downvotes`.
    pub score: i64,
}

const STATS_SQL: &str = r"
    SELECT
        COALESCE(SUM(CASE WHEN vote_type = 1 THEN 1 ELSE 0 END), 0)::BIGINT AS upvotes,
        COALESCE(SUM(CASE WHEN vote_type = -1 THEN 1 ELSE 0 END), 0)::BIGINT AS downvotes,
        COALESCE(SUM(vote_type), 0)::BIGINT AS score
    FROM votes
    WHERE movie_id = $1
";

/// Vote repository for database operations.
#[derive(Clone)]
pub struct VoteRepository {
    db: Arc<DatabaseConnection>,
}

impl VoteRepository {
    /// Create a new vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Apply a vote action and return the movie's fresh aggregate.
    ///
    /// The movie lookup, the write and the aggregate read run in one
    /// transaction. Any error drops the transaction, which rolls it back, so a
    /// failed call leaves no partial vote state behind.
    ///
    /// `vote_id` is only used when a new row is inserted; an upsert that hits
    /// the `(user_id, movie_id)` unique index keeps the existing row's ID.
    pub async fn apply(
        &self,
        user_id: &str,
        movie_id: &str,
        action: VoteAction,
        vote_id: String,
    ) -> AppResult<VoteStats> {
        let txn = self.db.begin().await?;

        if Movie::find_by_id(movie_id).one(&txn).await?.is_none() {
            txn.rollback().await?;
            return Err(AppError::NotFound(format!("Movie not found: {movie_id}")));
        }

        match action {
            VoteAction::Remove => {
                Vote::delete_many()
                    .filter(vote::Column::UserId.eq(user_id))
                    .filter(vote::Column::MovieId.eq(movie_id))
                    .exec(&txn)
                    .await?;
            }
            VoteAction::Upsert(magnitude) => {
                let model = vote::ActiveModel {
                    id: Set(vote_id),
                    user_id: Set(user_id.to_string()),
                    movie_id: Set(movie_id.to_string()),
                    vote_type: Set(magnitude.value()),
                    created_at: Set(Utc::now().into()),
                };

                Vote::insert(model)
                    .on_conflict(
                        OnConflict::columns([vote::Column::UserId, vote::Column::MovieId])
                            .update_columns([vote::Column::VoteType, vote::Column::CreatedAt])
                            .to_owned(),
                    )
                    .exec_without_returning(&txn)
                    .await?;
            }
        }

        let stats = Self::stats_on(&txn, movie_id).await?;
        txn.commit().await?;

        Ok(stats)
    }

    /// Compute the vote aggregate for a movie.
    ///
    /// Unknown movies and movies without votes both report all zeros.
    pub async fn stats_for_movie(&self, movie_id: &str) -> AppResult<VoteStats> {
        Self::stats_on(self.db.as_ref(), movie_id).await
    }

    async fn stats_on<C: ConnectionTrait>(conn: &C, movie_id: &str) -> AppResult<VoteStats> {
        let stats = VoteStats::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            STATS_SQL,
            [movie_id.into()],
        ))
        .one(conn)
        .await?;

        Ok(stats.unwrap_or_default())
    }

    /// Find a user's vote on a movie.
    pub async fn find_by_user_and_movie(
        &self,
        user_id: &str,
        movie_id: &str,
    ) -> AppResult<Option<vote::Model>> {
        Vote::find()
            .filter(vote::Column::UserId.eq(user_id))
            .filter(vote::Column::MovieId.eq(movie_id))
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from)
    }

    /// All votes cast by a user.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<vote::Model>> {
        Vote::find()
            .filter(vote::Column::UserId.eq(user_id))
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from)
    }

    /// Count stored vote rows for a movie.
    pub async fn count_by_movie(&self, movie_id: &str) -> AppResult<u64> {
        Vote::find()
            .filter(vote::Column::MovieId.eq(movie_id))
            .count(self.db.as_ref())
            .await
            .map_err(AppError::from)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::{movie, vote::VoteMagnitude};
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};

    fn create_test_movie(id: &str) -> movie::Model {
        movie::Model {
            id: id.to_string(),
            title: "The Godfather".to_string(),
            description: "The aging patriarch of an organized crime dynasty.".to_string(),
            added_by: Some("user1".to_string()),
            created_at: Utc::now().into(),
        }
    }

    fn stats_row(upvotes: i64, downvotes: i64) -> std::collections::BTreeMap<&'static str, Value> {
        btreemap! {
            "upvotes" => Value::BigInt(Some(upvotes)),
            "downvotes" => Value::BigInt(Some(downvotes)),
            "score" => Value::BigInt(Some(upvotes - downvotes)),
        }
    }

    fn exec_ok(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[tokio::test]
    async fn test_apply_upsert_returns_fresh_stats() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_movie("movie1")]])
                .append_query_results([[stats_row(2, 0)]])
                .append_exec_results([exec_ok(1)])
                .into_connection(),
        );

        let repo = VoteRepository::new(Arc::clone(&db));
        let stats = repo
            .apply(
                "user1",
                "movie1",
                VoteAction::Upsert(VoteMagnitude::Up),
                "vote1".to_string(),
            )
            .await
            .unwrap();

        assert_eq!(
            stats,
            VoteStats {
                upvotes: 2,
                downvotes: 0,
                score: 2
            }
        );

        drop(repo);
        let log = format!(
            "{:?}",
            Arc::try_unwrap(db).ok().unwrap().into_transaction_log()
        );
        assert!(log.contains("ON CONFLICT"));
        assert!(log.contains("COMMIT"));
    }

    #[tokio::test]
    async fn test_apply_remove_deletes_row() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_movie("movie1")]])
                .append_query_results([[stats_row(0, 0)]])
                .append_exec_results([exec_ok(1)])
                .into_connection(),
        );

        let repo = VoteRepository::new(Arc::clone(&db));
        let stats = repo
            .apply("user1", "movie1", VoteAction::Remove, "unused".to_string())
            .await
            .unwrap();

        assert_eq!(stats, VoteStats::default());

        drop(repo);
        let log = format!(
            "{:?}",
            Arc::try_unwrap(db).ok().unwrap().into_transaction_log()
        );
        assert!(log.contains("DELETE FROM"));
    }

    #[tokio::test]
    async fn test_apply_remove_without_existing_vote_succeeds() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_movie("movie1")]])
                .append_query_results([[stats_row(1, 1)]])
                .append_exec_results([exec_ok(0)])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let stats = repo
            .apply("user1", "movie1", VoteAction::Remove, "unused".to_string())
            .await
            .unwrap();

        assert_eq!(stats.score, 0);
        assert_eq!(stats.upvotes, 1);
    }

    #[tokio::test]
    async fn test_apply_unknown_movie_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<movie::Model>::new()])
                .into_connection(),
        );

        let repo = VoteRepository::new(Arc::clone(&db));
        let result = repo
            .apply(
                "user1",
                "missing",
                VoteAction::Upsert(VoteMagnitude::Down),
                "vote1".to_string(),
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));

        drop(repo);
        let log = format!(
            "{:?}",
            Arc::try_unwrap(db).ok().unwrap().into_transaction_log()
        );
        assert!(!log.contains("INSERT"));
        assert!(!log.contains("COMMIT"));
    }

    #[tokio::test]
    async fn test_stats_for_movie_without_votes() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[stats_row(0, 0)]])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let stats = repo.stats_for_movie("movie1").await.unwrap();

        assert_eq!(stats, VoteStats::default());
    }

    #[tokio::test]
    async fn test_find_by_user() {
        let vote = vote::Model {
            id: "vote1".to_string(),
            user_id: "user1".to_string(),
            movie_id: "movie1".to_string(),
            vote_type: -1,
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[vote]])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let votes = repo.find_by_user("user1").await.unwrap();

        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].vote_type, -1);
    }
}
