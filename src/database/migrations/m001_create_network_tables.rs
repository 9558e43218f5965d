use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Users::Nick).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::Email).string())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Role).integer().not_null().default(0))
                    .col(ColumnDef::new(Users::CreatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserSessions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserSessions::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(UserSessions::SessionId).string().not_null().unique_key())
                    .col(ColumnDef::new(UserSessions::UserId).integer().not_null())
                    .col(ColumnDef::new(UserSessions::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(UserSessions::ExpiresAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(UserSessions::IsActive).boolean().not_null().default(true))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_sessions_user_id")
                            .from(UserSessions::Table, UserSessions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Networks::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Networks::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Networks::Guid).string().not_null().unique_key())
                    .col(ColumnDef::new(Networks::AuthorId).integer().not_null())
                    .col(ColumnDef::new(Networks::Title).string().not_null().default("Новая сеть"))
                    .col(ColumnDef::new(Networks::ShareMode).boolean().not_null().default(false))
                    .col(ColumnDef::new(Networks::Network).text().not_null())
                    .col(ColumnDef::new(Networks::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Networks::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_networks_author_id")
                            .from(Networks::Table, Networks::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Simulates::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Simulates::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Simulates::NetworkId).integer().not_null())
                    .col(ColumnDef::new(Simulates::Packets).text())
                    .col(ColumnDef::new(Simulates::Ready).boolean().not_null().default(false))
                    .col(ColumnDef::new(Simulates::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_simulates_network_id")
                            .from(Simulates::Table, Simulates::NetworkId)
                            .to(Networks::Table, Networks::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_networks_author_id")
                    .table(Networks::Table)
                    .col(Networks::AuthorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_simulates_network_id")
                    .table(Simulates::Table)
                    .col(Simulates::NetworkId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Simulates::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Networks::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(UserSessions::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Nick,
    Email,
    PasswordHash,
    Role,
    CreatedAt,
}

#[derive(DeriveIden)]
enum UserSessions {
    Table,
    Id,
    SessionId,
    UserId,
    CreatedAt,
    ExpiresAt,
    IsActive,
}

#[derive(DeriveIden)]
enum Networks {
    Table,
    Id,
    Guid,
    AuthorId,
    Title,
    ShareMode,
    Network,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Simulates {
    Table,
    Id,
    NetworkId,
    Packets,
    Ready,
    CreatedAt,
}
