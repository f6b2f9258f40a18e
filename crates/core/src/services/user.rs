//! User service.

use moviehub_common::{AppError, AppResult};
use moviehub_db::{entities::user, repositories::UserRepository};

/// User service for identity resolution.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    /// Resolve a bearer token to its user.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        if token.is_empty() {
            return Err(AppError::Unauthorized);
        }

        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }
}
