use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(HistoryRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HistoryRecords::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(HistoryRecords::UserId).big_integer().not_null())
                    .col(ColumnDef::new(HistoryRecords::Utterance).text().not_null())
                    .col(
                        ColumnDef::new(HistoryRecords::Classification)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(HistoryRecords::Response).text().not_null())
                    .col(
                        ColumnDef::new(HistoryRecords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(HistoryRecords::Table, HistoryRecords::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_history_records_user_id_created_at")
                    .table(HistoryRecords::Table)
                    .col(HistoryRecords::UserId)
                    .col(HistoryRecords::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(HistoryRecords::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum HistoryRecords {
    Table,
    Id,
    UserId,
    Utterance,
    Classification,
    Response,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
