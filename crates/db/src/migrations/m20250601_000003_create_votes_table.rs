//! Create votes table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Votes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Votes::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Votes::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Votes::MovieId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Votes::VoteType)
                            .small_integer()
                            .not_null()
                            .check(Expr::col(Votes::VoteType).is_in([1, -1])),
                    )
                    .col(
                        ColumnDef::new(Votes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_votes_user")
                            .from(Votes::Table, Votes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_votes_movie")
                            .from(Votes::Table, Votes::MovieId)
                            .to(Movies::Table, Movies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_id, movie_id) - one vote per user per movie.
        // The vote upsert targets this index.
        manager
            .create_index(
                Index::create()
                    .name("idx_votes_user_movie")
                    .table(Votes::Table)
                    .col(Votes::UserId)
                    .col(Votes::MovieId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: movie_id (aggregation)
        manager
            .create_index(
                Index::create()
                    .name("idx_votes_movie_id")
                    .table(Votes::Table)
                    .col(Votes::MovieId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Votes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Votes {
    Table,
    Id,
    UserId,
    MovieId,
    VoteType,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

#[derive(Iden)]
enum Movies {
    Table,
    Id,
}
