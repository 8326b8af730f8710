use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::{debug, info};

use super::drawing_type_service::find_drawing_type;
use super::siblings;
use super::validation::{normalize_description, require_name};
use crate::database::entities::{line_type_components, line_types};
use crate::errors::{CoreError, CoreResult};

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLineType {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineTypeUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct LineTypeService {
    db: DatabaseConnection,
}

impl LineTypeService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self, drawing_type_id: i32) -> CoreResult<Vec<line_types::Model>> {
        find_drawing_type(&self.db, drawing_type_id).await?;
        Ok(siblings::children::<line_types::Entity, _>(&self.db, drawing_type_id).await?)
    }

    pub async fn get(&self, id: i32) -> CoreResult<line_types::Model> {
        find_line_type(&self.db, id).await
    }

    /// Append a line type to the drawing type; names are unique per drawing type
    pub async fn create(
        &self,
        drawing_type_id: i32,
        request: NewLineType,
    ) -> CoreResult<line_types::Model> {
        let name = require_name(&request.name, "Line type")?;

        let txn = self.db.begin().await?;
        find_drawing_type(&txn, drawing_type_id).await?;
        ensure_unique_name(&txn, drawing_type_id, &name, None).await?;

        let index = siblings::next_index::<line_types::Entity, _>(&txn, drawing_type_id).await?;
        let now = Utc::now();
        let line_type = line_types::ActiveModel {
            drawing_type_id: Set(drawing_type_id),
            name: Set(name),
            description: Set(normalize_description(request.description)),
            index: Set(index),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        info!(
            "Created line type {} '{}' at index {} in drawing type {}",
            line_type.id, line_type.name, line_type.index, drawing_type_id
        );
        Ok(line_type)
    }

    pub async fn update(&self, id: i32, request: LineTypeUpdate) -> CoreResult<line_types::Model> {
        let txn = self.db.begin().await?;
        let line_type = find_line_type(&txn, id).await?;
        let drawing_type_id = line_type.drawing_type_id;
        let mut active: line_types::ActiveModel = line_type.into();

        if let Some(name) = request.name {
            let name = require_name(&name, "Line type")?;
            ensure_unique_name(&txn, drawing_type_id, &name, Some(id)).await?;
            active.name = Set(name);
        }
        if let Some(description) = request.description {
            active.description = Set(normalize_description(Some(description)));
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&txn).await?;
        txn.commit().await?;
        Ok(updated)
    }

    /// Delete a line type and its components, then close the gap it leaves
    pub async fn delete(&self, id: i32) -> CoreResult<()> {
        let txn = self.db.begin().await?;
        let line_type = find_line_type(&txn, id).await?;

        line_type_components::Entity::delete_many()
            .filter(line_type_components::Column::LineTypeId.eq(id))
            .exec(&txn)
            .await?;
        line_types::Entity::delete_by_id(id).exec(&txn).await?;
        let shifted = siblings::compact_after::<line_types::Entity, _>(
            &txn,
            line_type.drawing_type_id,
            line_type.index,
        )
        .await?;

        txn.commit().await?;
        debug!("Deleted line type {}, renumbered {} siblings", id, shifted);
        Ok(())
    }

    /// Copy a line type with its components directly after the original
    pub async fn duplicate(&self, id: i32) -> CoreResult<line_types::Model> {
        let txn = self.db.begin().await?;
        let original = find_line_type(&txn, id).await?;
        let name = copy_name(&txn, original.drawing_type_id, &original.name).await?;
        let index = original.index + 1;

        siblings::open_gap_at::<line_types::Entity, _>(&txn, original.drawing_type_id, index)
            .await?;

        let now = Utc::now();
        let copy = line_types::ActiveModel {
            drawing_type_id: Set(original.drawing_type_id),
            name: Set(name),
            description: Set(original.description.clone()),
            index: Set(index),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let entries = siblings::children::<line_type_components::Entity, _>(&txn, id).await?;
        for entry in entries {
            line_type_components::ActiveModel {
                line_type_id: Set(copy.id),
                component_id: Set(entry.component_id),
                index: Set(entry.index),
                count: Set(entry.count),
                component_type: Set(entry.component_type),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        info!("Duplicated line type {} as {} '{}'", id, copy.id, copy.name);
        Ok(copy)
    }
}

pub(crate) async fn find_line_type<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> CoreResult<line_types::Model> {
    line_types::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| CoreError::not_found("LineType", id.to_string()))
}

async fn name_taken<C: ConnectionTrait>(
    conn: &C,
    drawing_type_id: i32,
    name: &str,
    exclude: Option<i32>,
) -> CoreResult<bool> {
    let mut query = line_types::Entity::find()
        .filter(line_types::Column::DrawingTypeId.eq(drawing_type_id))
        .filter(line_types::Column::Name.eq(name));
    if let Some(id) = exclude {
        query = query.filter(line_types::Column::Id.ne(id));
    }
    Ok(query.one(conn).await?.is_some())
}

async fn ensure_unique_name<C: ConnectionTrait>(
    conn: &C,
    drawing_type_id: i32,
    name: &str,
    exclude: Option<i32>,
) -> CoreResult<()> {
    if name_taken(conn, drawing_type_id, name, exclude).await? {
        return Err(CoreError::conflict(format!(
            "Line type '{}' already exists in drawing type {}",
            name, drawing_type_id
        ))
        .with_field("name", name)
        .with_field("drawingTypeId", drawing_type_id.to_string()));
    }
    Ok(())
}

/// First free name of the form `"<name> (copy)"`, `"<name> (copy 2)"`, ...
async fn copy_name<C: ConnectionTrait>(
    conn: &C,
    drawing_type_id: i32,
    name: &str,
) -> CoreResult<String> {
    let mut candidate = format!("{} (copy)", name);
    let mut attempt = 2;
    while name_taken(conn, drawing_type_id, &candidate, None).await? {
        candidate = format!("{} (copy {})", name, attempt);
        attempt += 1;
    }
    Ok(candidate)
}
