use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DrawingTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DrawingTypes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DrawingTypes::Name).string().not_null())
                    .col(ColumnDef::new(DrawingTypes::Description).text())
                    .col(
                        ColumnDef::new(DrawingTypes::Visible)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(DrawingTypes::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(DrawingTypes::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LineTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LineTypes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LineTypes::DrawingTypeId).integer().not_null())
                    .col(ColumnDef::new(LineTypes::Name).string().not_null())
                    .col(ColumnDef::new(LineTypes::Description).text())
                    .col(ColumnDef::new(LineTypes::Index).integer().not_null())
                    .col(ColumnDef::new(LineTypes::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(LineTypes::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_line_types_drawing_type_id")
                            .from(LineTypes::Table, LineTypes::DrawingTypeId)
                            .to(DrawingTypes::Table, DrawingTypes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Parts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Parts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Parts::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(Parts::Description).text())
                    .col(ColumnDef::new(Parts::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ComponentVersions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ComponentVersions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ComponentVersions::Name).string().not_null())
                    .col(ColumnDef::new(ComponentVersions::Emoji).string())
                    .col(ColumnDef::new(ComponentVersions::Description).text())
                    .col(
                        ColumnDef::new(ComponentVersions::Selected)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(ComponentVersions::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(ComponentVersions::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Components::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Components::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Components::ComponentVersionId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Components::PartId).integer())
                    .col(ColumnDef::new(Components::Name).string().not_null())
                    .col(ColumnDef::new(Components::Description).text())
                    .col(ColumnDef::new(Components::Color).string().not_null())
                    .col(ColumnDef::new(Components::Index).integer().not_null())
                    .col(ColumnDef::new(Components::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Components::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_components_component_version_id")
                            .from(Components::Table, Components::ComponentVersionId)
                            .to(ComponentVersions::Table, ComponentVersions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_components_part_id")
                            .from(Components::Table, Components::PartId)
                            .to(Parts::Table, Parts::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LineTypeComponents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LineTypeComponents::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LineTypeComponents::LineTypeId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LineTypeComponents::ComponentId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LineTypeComponents::Index).integer().not_null())
                    .col(
                        ColumnDef::new(LineTypeComponents::Count)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(LineTypeComponents::ComponentType)
                            .text()
                            .not_null()
                            .default("mandatory"),
                    )
                    .col(ColumnDef::new(LineTypeComponents::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(LineTypeComponents::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_line_type_components_line_type_id")
                            .from(LineTypeComponents::Table, LineTypeComponents::LineTypeId)
                            .to(LineTypes::Table, LineTypes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_line_type_components_component_id")
                            .from(LineTypeComponents::Table, LineTypeComponents::ComponentId)
                            .to(Components::Table, Components::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Ordered child lookups; deliberately not unique, range shifts pass
        // through a duplicate index inside their transaction.
        manager
            .create_index(
                Index::create()
                    .name("idx_line_types_drawing_type_index")
                    .table(LineTypes::Table)
                    .col(LineTypes::DrawingTypeId)
                    .col(LineTypes::Index)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_line_type_components_line_type_index")
                    .table(LineTypeComponents::Table)
                    .col(LineTypeComponents::LineTypeId)
                    .col(LineTypeComponents::Index)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_components_version_index")
                    .table(Components::Table)
                    .col(Components::ComponentVersionId)
                    .col(Components::Index)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LineTypeComponents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Components::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ComponentVersions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Parts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LineTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DrawingTypes::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum DrawingTypes {
    Table,
    Id,
    Name,
    Description,
    Visible,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum LineTypes {
    Table,
    Id,
    DrawingTypeId,
    Name,
    Description,
    Index,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum LineTypeComponents {
    Table,
    Id,
    LineTypeId,
    ComponentId,
    Index,
    Count,
    ComponentType,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Parts {
    Table,
    Id,
    Name,
    Description,
    CreatedAt,
}

#[derive(Iden)]
enum ComponentVersions {
    Table,
    Id,
    Name,
    Emoji,
    Description,
    Selected,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Components {
    Table,
    Id,
    ComponentVersionId,
    PartId,
    Name,
    Description,
    Color,
    Index,
    CreatedAt,
    UpdatedAt,
}
