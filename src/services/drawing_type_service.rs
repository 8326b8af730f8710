use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::siblings;
use super::validation::{normalize_description, require_name};
use crate::database::entities::{components, drawing_types, line_type_components, line_types};
use crate::errors::{CoreError, CoreResult};

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDrawingType {
    pub name: String,
    pub description: Option<String>,
    pub visible: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingTypeUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub visible: Option<bool>,
}

/// A line type component together with the catalog entry it points at
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineTypeComponentView {
    #[serde(flatten)]
    pub entry: line_type_components::Model,
    pub component: Option<components::Model>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineTypeNode {
    #[serde(flatten)]
    pub line_type: line_types::Model,
    pub components: Vec<LineTypeComponentView>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingTypeTree {
    pub drawing_type: drawing_types::Model,
    pub line_types: Vec<LineTypeNode>,
}

#[derive(Clone)]
pub struct DrawingTypeService {
    db: DatabaseConnection,
}

impl DrawingTypeService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> CoreResult<Vec<drawing_types::Model>> {
        drawing_types::Entity::find()
            .order_by_asc(drawing_types::Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| CoreError::internal("Failed to list drawing types").with_source(e))
    }

    pub async fn get(&self, id: i32) -> CoreResult<drawing_types::Model> {
        find_drawing_type(&self.db, id).await
    }

    pub async fn create(&self, request: NewDrawingType) -> CoreResult<drawing_types::Model> {
        let name = require_name(&request.name, "Drawing type")?;
        let now = Utc::now();

        let drawing_type = drawing_types::ActiveModel {
            name: Set(name),
            description: Set(normalize_description(request.description)),
            visible: Set(request.visible.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| CoreError::internal("Failed to create drawing type").with_source(e))?;

        info!("Created drawing type {} ({})", drawing_type.id, drawing_type.name);
        Ok(drawing_type)
    }

    pub async fn update(
        &self,
        id: i32,
        request: DrawingTypeUpdate,
    ) -> CoreResult<drawing_types::Model> {
        let drawing_type = find_drawing_type(&self.db, id).await?;
        let mut active: drawing_types::ActiveModel = drawing_type.into();

        if let Some(name) = request.name {
            active.name = Set(require_name(&name, "Drawing type")?);
        }
        if let Some(description) = request.description {
            active.description = Set(normalize_description(Some(description)));
        }
        if let Some(visible) = request.visible {
            active.visible = Set(visible);
        }
        active.updated_at = Set(Utc::now());

        active
            .update(&self.db)
            .await
            .map_err(|e| CoreError::internal("Failed to update drawing type").with_source(e))
    }

    /// Delete a drawing type with all of its line types and their components
    pub async fn delete(&self, id: i32) -> CoreResult<()> {
        let txn = self.db.begin().await?;
        find_drawing_type(&txn, id).await?;

        let line_type_ids = line_types::Entity::find()
            .filter(line_types::Column::DrawingTypeId.eq(id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|line_type| line_type.id)
            .collect::<Vec<_>>();

        if !line_type_ids.is_empty() {
            line_type_components::Entity::delete_many()
                .filter(line_type_components::Column::LineTypeId.is_in(line_type_ids))
                .exec(&txn)
                .await?;
        }

        line_types::Entity::delete_many()
            .filter(line_types::Column::DrawingTypeId.eq(id))
            .exec(&txn)
            .await?;

        drawing_types::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        info!("Deleted drawing type {}", id);
        Ok(())
    }

    /// Line types of the drawing type in order, each with its ordered components
    pub async fn tree(&self, id: i32) -> CoreResult<DrawingTypeTree> {
        let drawing_type = find_drawing_type(&self.db, id).await?;
        let line_types = load_line_type_nodes(&self.db, id).await?;

        Ok(DrawingTypeTree {
            drawing_type,
            line_types,
        })
    }
}

pub(crate) async fn find_drawing_type<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> CoreResult<drawing_types::Model> {
    drawing_types::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| CoreError::not_found("DrawingType", id.to_string()))
}

pub(crate) async fn load_component_views<C: ConnectionTrait>(
    conn: &C,
    line_type_ids: Vec<i32>,
) -> CoreResult<Vec<LineTypeComponentView>> {
    if line_type_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = line_type_components::Entity::find()
        .find_also_related(components::Entity)
        .filter(line_type_components::Column::LineTypeId.is_in(line_type_ids))
        .order_by_asc(line_type_components::Column::LineTypeId)
        .order_by_asc(line_type_components::Column::Index)
        .order_by_asc(line_type_components::Column::Id)
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(entry, component)| LineTypeComponentView { entry, component })
        .collect())
}

pub(crate) async fn load_line_type_nodes<C: ConnectionTrait>(
    conn: &C,
    drawing_type_id: i32,
) -> CoreResult<Vec<LineTypeNode>> {
    let line_types = siblings::children::<line_types::Entity, C>(conn, drawing_type_id).await?;
    let views = load_component_views(conn, line_types.iter().map(|lt| lt.id).collect()).await?;

    let mut grouped: HashMap<i32, Vec<LineTypeComponentView>> = HashMap::new();
    for view in views {
        grouped.entry(view.entry.line_type_id).or_default().push(view);
    }

    Ok(line_types
        .into_iter()
        .map(|line_type| {
            let components = grouped.remove(&line_type.id).unwrap_or_default();
            LineTypeNode {
                line_type,
                components,
            }
        })
        .collect())
}
