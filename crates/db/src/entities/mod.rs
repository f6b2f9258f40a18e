//! Database entities.

#![allow(missing_docs)]

pub mod comment;
pub mod movie;
pub mod user;
pub mod vote;

pub use comment::Entity as Comment;
pub use movie::Entity as Movie;
pub use user::Entity as User;
pub use vote::Entity as Vote;
