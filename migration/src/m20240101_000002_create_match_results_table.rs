use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MatchResults::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MatchResults::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MatchResults::GameType).string().not_null())
                    .col(ColumnDef::new(MatchResults::WinnerId).uuid().null())
                    .col(ColumnDef::new(MatchResults::TurnCount).integer().not_null())
                    .col(ColumnDef::new(MatchResults::Payload).text().not_null())
                    .col(
                        ColumnDef::new(MatchResults::StartedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MatchResults::FinishedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_match_results_finished_at")
                    .table(MatchResults::Table)
                    .col(MatchResults::FinishedAt)
                    .to_owned(),
            )
            .await?;

        // One row per player per match, for history by player
        manager
            .create_table(
                Table::create()
                    .table(MatchPlayers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(MatchPlayers::MatchId).uuid().not_null())
                    .col(ColumnDef::new(MatchPlayers::PlayerId).uuid().not_null())
                    .col(ColumnDef::new(MatchPlayers::Seat).integer().not_null())
                    .col(ColumnDef::new(MatchPlayers::FinalScore).integer().not_null())
                    .col(
                        ColumnDef::new(MatchPlayers::IsWinner)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .primary_key(
                        Index::create()
                            .col(MatchPlayers::MatchId)
                            .col(MatchPlayers::PlayerId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_match_players_match")
                            .from(MatchPlayers::Table, MatchPlayers::MatchId)
                            .to(MatchResults::Table, MatchResults::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_match_players_player_id")
                    .table(MatchPlayers::Table)
                    .col(MatchPlayers::PlayerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MatchPlayers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MatchResults::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum MatchResults {
    Table,
    Id,
    GameType,
    WinnerId,
    TurnCount,
    Payload,
    StartedAt,
    FinishedAt,
}

#[derive(DeriveIden)]
enum MatchPlayers {
    Table,
    MatchId,
    PlayerId,
    Seat,
    FinalScore,
    IsWinner,
}
