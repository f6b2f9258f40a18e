//! Repositories wrapping database access per entity.

mod comment;
mod movie;
mod user;
mod vote;

pub use comment::{CommentRepository, CommentWithAuthor};
pub use movie::{MovieRepository, RankedMovie};
pub use user::UserRepository;
pub use vote::{VoteRepository, VoteStats};
