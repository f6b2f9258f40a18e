//! Comment repository.

use std::sync::Arc;

use crate::entities::{Comment, comment, user::UserRole};
use moviehub_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbBackend, EntityTrait, FromQueryResult, Statement,
    prelude::DateTimeWithTimeZone,
};
use serde::Serialize;

/// A comment joined with its author's display name and role.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct CommentWithAuthor {
    /// Comment ID.
    pub id: String,
    /// Author's user ID.
    pub user_id: String,
    /// Movie the comment belongs to.
    pub movie_id: String,
    /// Trimmed comment text.
    pub body: String,
    /// Creation time, or time of the last edit.
    pub created_at: DateTimeWithTimeZone,
    /// Author's display name.
    pub user_name: String,
    /// Author's role.
    pub user_role: UserRole,
}

const SELECT_WITH_AUTHOR: &str = r"
    SELECT
        c.id,
        c.user_id,
        c.movie_id,
        c.body,
        c.created_at,
        u.name AS user_name,
        u.role AS user_role
    FROM comments c
    JOIN users u ON u.id = c.user_id
";

/// Comment repository for database operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a comment by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<comment::Model>> {
        Comment::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from)
    }

    /// Get a comment by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<comment::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment not found: {id}")))
    }

    /// Comments on a movie, newest (or most recently edited) first.
    pub async fn find_by_movie(&self, movie_id: &str) -> AppResult<Vec<CommentWithAuthor>> {
        let sql = format!(
            "{SELECT_WITH_AUTHOR} WHERE c.movie_id = $1 ORDER BY c.created_at DESC, c.id DESC"
        );

        CommentWithAuthor::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            &sql,
            [movie_id.into()],
        ))
        .all(self.db.as_ref())
        .await
        .map_err(AppError::from)
    }

    /// Create a new comment.
    pub async fn create(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model.insert(self.db.as_ref()).await.map_err(AppError::from)
    }

    /// Update a comment.
    pub async fn update(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model.update(self.db.as_ref()).await.map_err(AppError::from)
    }

    /// Delete a comment by ID.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Comment::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    fn create_test_comment(id: &str, user_id: &str, movie_id: &str) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            movie_id: movie_id.to_string(),
            body: "Absolutely incredible movie!".to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_id_found() {
        let comment = create_test_comment("c1", "user1", "movie1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[comment.clone()]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let found = repo.find_by_id("c1").await.unwrap().unwrap();

        assert_eq!(found, comment);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<comment::Model>::new()])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_by_movie_includes_author() {
        let created_at: DateTimeWithTimeZone = Utc::now().into();
        let row = btreemap! {
            "id" => Value::from("c1".to_string()),
            "user_id" => Value::from("user1".to_string()),
            "movie_id" => Value::from("movie1".to_string()),
            "body" => Value::from("Classic Coppola.".to_string()),
            "created_at" => Value::from(created_at),
            "user_name" => Value::from("Bob Smith".to_string()),
            "user_role" => Value::from("admin".to_string()),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[row]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let comments = repo.find_by_movie("movie1").await.unwrap();

        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].user_name, "Bob Smith");
        assert_eq!(comments[0].user_role, UserRole::Admin);
    }
}
