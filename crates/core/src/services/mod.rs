//! Business logic services.

#![allow(missing_docs)]

pub mod comment;
pub mod movie;
pub mod user;
pub mod vote;

pub use comment::CommentService;
pub use movie::{CreateMovieInput, MovieListing, MovieService};
pub use user::UserService;
pub use vote::{VoteOutcome, VoteService};

use moviehub_common::{AppError, AppResult};

/// Trim a required text field and check it against a character limit.
pub(crate) fn required_text(field: &str, value: &str, max_chars: usize) -> AppResult<String> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(AppError::invalid_field(
            field,
            format!("{field} must not be empty"),
        ));
    }
    if trimmed.chars().count() > max_chars {
        return Err(AppError::invalid_field(
            field,
            format!("{field} must be at most {max_chars} characters"),
        ));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text_trims() {
        assert_eq!(required_text("title", "  Heat  ", 10).unwrap(), "Heat");
    }

    #[test]
    fn test_required_text_rejects_blank_and_long() {
        assert!(matches!(
            required_text("title", "   ", 10),
            Err(AppError::Validation { .. })
        ));
        assert!(matches!(
            required_text("title", "abcdefghijk", 10),
            Err(AppError::Validation { .. })
        ));
        // Limit counts characters, not bytes.
        assert!(required_text("title", "ééééé", 5).is_ok());
    }
}
