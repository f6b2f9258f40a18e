//! Typed HTTP client for the MovieHub API.
//!
//! - [`MovieHubClient`]: one method per endpoint
//! - [`SessionContext`]: the signed-in session, persisted through a
//!   [`SessionStore`] and dropped on sign-out or any 401
//! - [`MovieBoard`]: local movie list with optimistic voting
//!
//! ```no_run
//! use moviehub_client::{MovieBoard, MovieHubClient, SessionContext, SessionStore};
//!
//! # async fn run() -> moviehub_client::ClientResult<()> {
//! let client = MovieHubClient::new("http://localhost:5000/api")?;
//! let mut session = SessionContext::load(SessionStore::new("session.json")).await?;
//!
//! let mut board = MovieBoard::new(client.movies(session.current()).await?);
//! if let Some(first) = board.movies().first().map(|m| m.id.clone()) {
//!     board.vote(&client, &mut session, &first, 1).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod board;
pub mod client;
pub mod error;
pub mod models;
pub mod session;

pub use board::{MovieBoard, PendingVote};
pub use client::MovieHubClient;
pub use error::{ClientError, ClientResult};
pub use models::{Comment, Health, Movie, NewMovie, Role, VoteResult, VoteStats};
pub use session::{Session, SessionContext, SessionStore, SessionUser};
