use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Catalog entry for a recognisable drawing symbol. `index` orders the
/// catalog of one component version.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "components")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub component_version_id: i32,
    pub part_id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub index: i32,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::component_versions::Entity",
        from = "Column::ComponentVersionId",
        to = "super::component_versions::Column::Id"
    )]
    ComponentVersions,
    #[sea_orm(
        belongs_to = "super::parts::Entity",
        from = "Column::PartId",
        to = "super::parts::Column::Id"
    )]
    Parts,
    #[sea_orm(has_many = "super::line_type_components::Entity")]
    LineTypeComponents,
}

impl Related<super::component_versions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ComponentVersions.def()
    }
}

impl Related<super::parts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Parts.def()
    }
}

impl Related<super::line_type_components::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineTypeComponents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
