//! Service integration tests against a real database.
//!
//! Run with: `cargo test --test service_integration -- --ignored`
//! Connection settings come from the same `TEST_DB_*` variables as the
//! database crate's suite.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use moviehub_common::AppError;
use moviehub_core::{CommentService, CreateMovieInput, MovieService, VoteService};
use moviehub_db::{
    entities::user::UserRole,
    repositories::{CommentRepository, MovieRepository, VoteRepository},
    test_utils::TestDatabase,
};
use sea_orm::DatabaseConnection;

fn shared(db: &TestDatabase) -> Arc<DatabaseConnection> {
    Arc::new(db.connection().get_postgres_connection_pool().clone().into())
}

fn comment_service(db: &TestDatabase) -> CommentService {
    CommentService::new(
        CommentRepository::new(shared(db)),
        MovieRepository::new(shared(db)),
    )
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_edit_changes_body_and_timestamp_only() {
    let db = TestDatabase::create_unique().await.unwrap();
    let author = db.insert_user("Ada", UserRole::User).await.unwrap();
    let movie = db
        .insert_movie("Solaris", &author.id, Utc::now().into())
        .await
        .unwrap();
    let comments = comment_service(&db);

    let original = comments.add(&author, &movie.id, "First take").await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    let edited = comments
        .edit(&author, &original.id, "  Second take  ")
        .await
        .unwrap();

    assert_eq!(edited.id, original.id);
    assert_eq!(edited.user_id, original.user_id);
    assert_eq!(edited.movie_id, original.movie_id);
    assert_eq!(edited.body, "Second take");
    assert!(edited.created_at > original.created_at);

    let listed = comments.list(&movie.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].body, "Second take");
    assert_eq!(listed[0].user_name, "Ada");

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_stranger_cannot_delete_comment() {
    let db = TestDatabase::create_unique().await.unwrap();
    let author = db.insert_user("Ada", UserRole::User).await.unwrap();
    let stranger = db.insert_user("Mallory", UserRole::User).await.unwrap();
    let admin = db.insert_user("Root", UserRole::Admin).await.unwrap();
    let movie = db
        .insert_movie("Solaris", &author.id, Utc::now().into())
        .await
        .unwrap();
    let comments = comment_service(&db);

    let comment = comments.add(&author, &movie.id, "Mine").await.unwrap();

    let result = comments.delete(&stranger, &comment.id).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert_eq!(comments.list(&movie.id).await.unwrap().len(), 1);

    let result = comments.edit(&admin, &comment.id, "Overwritten").await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    comments.delete(&admin, &comment.id).await.unwrap();
    assert!(comments.list(&movie.id).await.unwrap().is_empty());

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_comments_listed_newest_first() {
    let db = TestDatabase::create_unique().await.unwrap();
    let author = db.insert_user("Ada", UserRole::User).await.unwrap();
    let movie = db
        .insert_movie("Solaris", &author.id, Utc::now().into())
        .await
        .unwrap();
    let comments = comment_service(&db);

    let first = comments.add(&author, &movie.id, "First").await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    let second = comments.add(&author, &movie.id, "Second").await.unwrap();

    let listed = comments.list(&movie.id).await.unwrap();
    let ids: Vec<&str> = listed.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, [second.id.as_str(), first.id.as_str()]);

    let result = comments.add(&author, "missing", "Lost").await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_listing_carries_caller_vote() {
    let db = TestDatabase::create_unique().await.unwrap();
    let voter = db.insert_user("Ada", UserRole::User).await.unwrap();
    let admin = db.insert_user("Root", UserRole::Admin).await.unwrap();
    let now = Utc::now();

    let movies = MovieService::new(
        MovieRepository::new(shared(&db)),
        VoteRepository::new(shared(&db)),
    );
    let votes = VoteService::new(VoteRepository::new(shared(&db)));

    let liked = movies
        .create(
            &admin,
            CreateMovieInput {
                title: "Stalker".to_string(),
                description: "The Zone.".to_string(),
            },
        )
        .await
        .unwrap();
    let ignored = db
        .insert_movie("Mirror", &admin.id, (now - Duration::days(1)).into())
        .await
        .unwrap();

    let outcome = votes.submit(&voter.id, &liked.id, 1).await.unwrap();
    assert_eq!(outcome.stats.score, 1);

    let listing = movies.list_ranked(Some(&voter.id)).await.unwrap();
    assert_eq!(listing[0].movie.id, liked.id);
    assert_eq!(listing[0].user_vote, Some(1));
    assert_eq!(listing[1].movie.id, ignored.id);
    assert_eq!(listing[1].user_vote, Some(0));

    let anonymous = movies.list_ranked(None).await.unwrap();
    assert!(anonymous.iter().all(|m| m.user_vote.is_none()));

    let top = movies.top_movies(&admin, Some(1)).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].id, liked.id);

    movies.delete(&admin, &liked.id).await.unwrap();
    assert_eq!(votes.stats(&liked.id).await.unwrap().score, 0);

    db.drop_database().await.unwrap();
}
