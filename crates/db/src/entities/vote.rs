//! Vote entity (one signed vote per user per movie).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "votes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user who voted
    pub user_id: String,

    /// The movie being voted on
    pub movie_id: String,

    /// +1 or -1. Never 0: removing a vote deletes the row.
    pub vote_type: i16,

    /// Time of the latest (re-)vote
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::movie::Entity",
        from = "Column::MovieId",
        to = "super::movie::Column::Id",
        on_delete = "Cascade"
    )]
    Movie,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::movie::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movie.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Direction of a stored vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteMagnitude {
    /// +1
    Up,
    /// -1
    Down,
}

impl VoteMagnitude {
    /// Stored value of this magnitude.
    #[must_use]
    pub const fn value(self) -> i16 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

/// A single user's vote mutation on a single movie.
///
/// The request-level `0` sentinel maps to [`VoteAction::Remove`] and is never
/// written to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteAction {
    /// Insert the vote or overwrite the existing one.
    Upsert(VoteMagnitude),
    /// Delete the caller's vote, if any.
    Remove,
}

impl VoteAction {
    /// Decode the request's `vote_type` (`1`, `-1` or `0`).
    #[must_use]
    pub const fn from_vote_type(vote_type: i64) -> Option<Self> {
        match vote_type {
            0 => Some(Self::Remove),
            1 => Some(Self::Upsert(VoteMagnitude::Up)),
            -1 => Some(Self::Upsert(VoteMagnitude::Down)),
            _ => None,
        }
    }

    /// The effective `vote_type` echoed back to the caller.
    #[must_use]
    pub const fn vote_type(self) -> i16 {
        match self {
            Self::Upsert(magnitude) => magnitude.value(),
            Self::Remove => 0,
        }
    }
}
