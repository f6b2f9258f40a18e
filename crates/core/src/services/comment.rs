//! Comment service.

use chrono::Utc;
use moviehub_common::{AppError, AppResult, IdGenerator};
use moviehub_db::{
    entities::{comment, user},
    repositories::{CommentRepository, CommentWithAuthor, MovieRepository},
};
use sea_orm::{IntoActiveModel, Set};
use tracing::info;

use super::required_text;

const MAX_BODY_CHARS: usize = 2000;

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    movie_repo: MovieRepository,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(comment_repo: CommentRepository, movie_repo: MovieRepository) -> Self {
        Self {
            comment_repo,
            movie_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Comments on a movie, newest first.
    pub async fn list(&self, movie_id: &str) -> AppResult<Vec<CommentWithAuthor>> {
        self.comment_repo.find_by_movie(movie_id).await
    }

    /// Post a comment on a movie.
    pub async fn add(
        &self,
        author: &user::Model,
        movie_id: &str,
        body: &str,
    ) -> AppResult<CommentWithAuthor> {
        let body = required_text("body", body, MAX_BODY_CHARS)?;
        self.movie_repo.get_by_id(movie_id).await?;

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(author.id.clone()),
            movie_id: Set(movie_id.to_string()),
            body: Set(body),
            created_at: Set(Utc::now().into()),
        };

        let created = self.comment_repo.create(model).await?;

        info!(comment_id = %created.id, movie_id = %movie_id, user_id = %author.id, "Comment added");

        Ok(with_author(created, author))
    }

    /// Replace the body of the caller's own comment.
    ///
    /// The timestamp moves to now; author and movie never change.
    pub async fn edit(
        &self,
        caller: &user::Model,
        comment_id: &str,
        body: &str,
    ) -> AppResult<CommentWithAuthor> {
        let body = required_text("body", body, MAX_BODY_CHARS)?;
        let existing = self.comment_repo.get_by_id(comment_id).await?;

        if existing.user_id != caller.id {
            return Err(AppError::Forbidden(
                "You can only edit your own comments".to_string(),
            ));
        }

        let mut model = existing.into_active_model();
        model.body = Set(body);
        model.created_at = Set(Utc::now().into());

        let updated = self.comment_repo.update(model).await?;

        info!(comment_id = %comment_id, user_id = %caller.id, "Comment edited");

        Ok(with_author(updated, caller))
    }

    /// Delete a comment. Allowed for its author and for admins.
    pub async fn delete(&self, caller: &user::Model, comment_id: &str) -> AppResult<()> {
        let existing = self.comment_repo.get_by_id(comment_id).await?;

        if existing.user_id != caller.id && !caller.is_admin() {
            return Err(AppError::Forbidden(
                "You can only delete your own comments".to_string(),
            ));
        }

        self.comment_repo.delete(comment_id).await?;

        info!(comment_id = %comment_id, user_id = %caller.id, "Comment deleted");
        Ok(())
    }
}

fn with_author(comment: comment::Model, author: &user::Model) -> CommentWithAuthor {
    CommentWithAuthor {
        id: comment.id,
        user_id: comment.user_id,
        movie_id: comment.movie_id,
        body: comment.body,
        created_at: comment.created_at,
        user_name: author.name.clone(),
        user_role: author.role,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use moviehub_db::entities::{movie, user::UserRole};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn service(db: Arc<DatabaseConnection>) -> CommentService {
        CommentService::new(
            CommentRepository::new(Arc::clone(&db)),
            MovieRepository::new(db),
        )
    }

    fn create_test_user(id: &str, role: UserRole) -> user::Model {
        user::Model {
            id: id.to_string(),
            name: format!("User {id}"),
            email: format!("{id}@example.com"),
            password_hash: "hash".to_string(),
            role,
            token: None,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_comment(id: &str, user_id: &str) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            movie_id: "movie1".to_string(),
            body: "Original body".to_string(),
            created_at: (Utc::now() - Duration::days(1)).into(),
        }
    }

    #[tokio::test]
    async fn test_add_to_missing_movie() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<movie::Model>::new()])
                .into_connection(),
        );
        let author = create_test_user("user1", UserRole::User);

        let result = service(db).add(&author, "missing", "Great film").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_add_rejects_blank_body() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let author = create_test_user("user1", UserRole::User);

        let result = service(db).add(&author, "movie1", "  \n ").await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_add_attaches_author() {
        let movie = movie::Model {
            id: "movie1".to_string(),
            title: "Jaws".to_string(),
            description: "Shark.".to_string(),
            added_by: None,
            created_at: Utc::now().into(),
        };
        let stored = comment::Model {
            body: "Great film".to_string(),
            ..create_test_comment("c1", "user1")
        };
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[movie]])
                .append_query_results([[stored]])
                .into_connection(),
        );
        let author = create_test_user("user1", UserRole::User);

        let comment = service(db)
            .add(&author, "movie1", " Great film ")
            .await
            .unwrap();

        assert_eq!(comment.body, "Great film");
        assert_eq!(comment.user_name, "User user1");
        assert_eq!(comment.user_role, UserRole::User);
    }

    #[tokio::test]
    async fn test_edit_by_non_owner_is_forbidden() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_comment("c1", "owner")]])
                .into_connection(),
        );
        // Admins cannot edit other people's comments either.
        let admin = create_test_user("admin1", UserRole::Admin);

        let result = service(db).edit(&admin, "c1", "Rewritten").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_edit_updates_body_and_timestamp() {
        let original = create_test_comment("c1", "owner");
        let updated = comment::Model {
            body: "Rewritten".to_string(),
            created_at: Utc::now().into(),
            ..original.clone()
        };
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[original.clone()]])
                .append_query_results([[updated]])
                .into_connection(),
        );
        let owner = create_test_user("owner", UserRole::User);

        let edited = service(db).edit(&owner, "c1", "Rewritten").await.unwrap();

        assert_eq!(edited.body, "Rewritten");
        assert_eq!(edited.user_id, original.user_id);
        assert_eq!(edited.movie_id, original.movie_id);
        assert!(edited.created_at > original.created_at);
    }

    #[tokio::test]
    async fn test_delete_by_stranger_is_forbidden() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_comment("c1", "owner")]])
                .into_connection(),
        );
        let stranger = create_test_user("stranger", UserRole::User);

        let svc = service(Arc::clone(&db));
        let result = svc.delete(&stranger, "c1").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        drop(svc);
        let log = format!(
            "{:?}",
            Arc::try_unwrap(db).ok().unwrap().into_transaction_log()
        );
        assert!(!log.contains("DELETE FROM"));
    }

    #[tokio::test]
    async fn test_delete_by_admin() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_comment("c1", "owner")]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let admin = create_test_user("admin1", UserRole::Admin);

        service(db).delete(&admin, "c1").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_missing_comment() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<comment::Model>::new()])
                .into_connection(),
        );
        let owner = create_test_user("owner", UserRole::User);

        let result = service(db).delete(&owner, "missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
