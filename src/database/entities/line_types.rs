use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A named, ordered sub-category of a drawing type. `index` is the position
/// among the drawing type's line types.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "line_types")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub drawing_type_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub index: i32,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::drawing_types::Entity",
        from = "Column::DrawingTypeId",
        to = "super::drawing_types::Column::Id"
    )]
    DrawingTypes,
    #[sea_orm(has_many = "super::line_type_components::Entity")]
    LineTypeComponents,
}

impl Related<super::drawing_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DrawingTypes.def()
    }
}

impl Related<super::line_type_components::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineTypeComponents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
