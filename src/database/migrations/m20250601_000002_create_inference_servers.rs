use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(InferenceServers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InferenceServers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InferenceServers::Name).string().not_null())
                    .col(ColumnDef::new(InferenceServers::Url).string().not_null())
                    .col(
                        ColumnDef::new(InferenceServers::Selected)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(InferenceServers::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(InferenceServers::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InferenceServers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum InferenceServers {
    Table,
    Id,
    Name,
    Url,
    Selected,
    CreatedAt,
    UpdatedAt,
}
