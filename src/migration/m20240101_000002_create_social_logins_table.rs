use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum SocialLogins {
    Table,
    Id,
    UserId,
    Provider,
    Token,
    Meta,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SocialLogins::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SocialLogins::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SocialLogins::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(SocialLogins::Provider)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(SocialLogins::Token).text().not_null())
                    .col(ColumnDef::new(SocialLogins::Meta).json().not_null())
                    .col(
                        ColumnDef::new(SocialLogins::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(SocialLogins::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_social_logins_user")
                            .from(SocialLogins::Table, SocialLogins::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one entry per provider for a user.
        manager
            .create_index(
                Index::create()
                    .name("idx_social_logins_user_provider")
                    .table(SocialLogins::Table)
                    .col(SocialLogins::UserId)
                    .col(SocialLogins::Provider)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SocialLogins::Table).to_owned())
            .await
    }
}
