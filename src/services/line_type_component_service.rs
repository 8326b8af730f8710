use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::{debug, info};

use super::component_service::find_component;
use super::drawing_type_service::{load_component_views, LineTypeComponentView};
use super::line_type_service::find_line_type;
use super::siblings;
use super::validation::validate_count;
use crate::database::entities::line_type_components::{self, ComponentType};
use crate::errors::{CoreError, CoreResult};

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLineTypeComponent {
    pub component_id: i32,
    pub count: Option<i32>,
    pub component_type: Option<ComponentType>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineTypeComponentUpdate {
    pub component_id: Option<i32>,
    pub count: Option<i32>,
    pub component_type: Option<ComponentType>,
}

#[derive(Clone)]
pub struct LineTypeComponentService {
    db: DatabaseConnection,
}

impl LineTypeComponentService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self, line_type_id: i32) -> CoreResult<Vec<LineTypeComponentView>> {
        find_line_type(&self.db, line_type_id).await?;
        load_component_views(&self.db, vec![line_type_id]).await
    }

    pub async fn get(&self, id: i32) -> CoreResult<line_type_components::Model> {
        find_line_type_component(&self.db, id).await
    }

    /// Append a component to the line type
    pub async fn create(
        &self,
        line_type_id: i32,
        request: NewLineTypeComponent,
    ) -> CoreResult<line_type_components::Model> {
        let count = validate_count(request.count.unwrap_or(1))?;

        let txn = self.db.begin().await?;
        find_line_type(&txn, line_type_id).await?;
        find_component(&txn, request.component_id).await?;
        ensure_not_listed(&txn, line_type_id, request.component_id, None).await?;

        let index =
            siblings::next_index::<line_type_components::Entity, _>(&txn, line_type_id).await?;
        let now = Utc::now();
        let entry = line_type_components::ActiveModel {
            line_type_id: Set(line_type_id),
            component_id: Set(request.component_id),
            index: Set(index),
            count: Set(count),
            component_type: Set(request.component_type.unwrap_or(ComponentType::Mandatory)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        info!(
            "Added component {} to line type {} at index {}",
            entry.component_id, line_type_id, entry.index
        );
        Ok(entry)
    }

    pub async fn update(
        &self,
        id: i32,
        request: LineTypeComponentUpdate,
    ) -> CoreResult<line_type_components::Model> {
        let txn = self.db.begin().await?;
        let entry = find_line_type_component(&txn, id).await?;
        let line_type_id = entry.line_type_id;
        let mut active: line_type_components::ActiveModel = entry.into();

        if let Some(component_id) = request.component_id {
            find_component(&txn, component_id).await?;
            ensure_not_listed(&txn, line_type_id, component_id, Some(id)).await?;
            active.component_id = Set(component_id);
        }
        if let Some(count) = request.count {
            active.count = Set(validate_count(count)?);
        }
        if let Some(component_type) = request.component_type {
            active.component_type = Set(component_type);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&txn).await?;
        txn.commit().await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: i32) -> CoreResult<()> {
        let txn = self.db.begin().await?;
        let entry = find_line_type_component(&txn, id).await?;

        line_type_components::Entity::delete_by_id(id)
            .exec(&txn)
            .await?;
        let shifted = siblings::compact_after::<line_type_components::Entity, _>(
            &txn,
            entry.line_type_id,
            entry.index,
        )
        .await?;

        txn.commit().await?;
        debug!(
            "Deleted line type component {}, renumbered {} siblings",
            id, shifted
        );
        Ok(())
    }

    /// Insert a copy directly after the original. The copy references the same
    /// component; the one-entry-per-component rule applies to edits only.
    pub async fn duplicate(&self, id: i32) -> CoreResult<line_type_components::Model> {
        let txn = self.db.begin().await?;
        let original = find_line_type_component(&txn, id).await?;
        let index = original.index + 1;

        siblings::open_gap_at::<line_type_components::Entity, _>(
            &txn,
            original.line_type_id,
            index,
        )
        .await?;

        let now = Utc::now();
        let copy = line_type_components::ActiveModel {
            line_type_id: Set(original.line_type_id),
            component_id: Set(original.component_id),
            index: Set(index),
            count: Set(original.count),
            component_type: Set(original.component_type),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(copy)
    }
}

pub(crate) async fn find_line_type_component<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> CoreResult<line_type_components::Model> {
    line_type_components::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| CoreError::not_found("LineTypeComponent", id.to_string()))
}

pub(super) async fn ensure_not_listed<C: ConnectionTrait>(
    conn: &C,
    line_type_id: i32,
    component_id: i32,
    exclude: Option<i32>,
) -> CoreResult<()> {
    let mut query = line_type_components::Entity::find()
        .filter(line_type_components::Column::LineTypeId.eq(line_type_id))
        .filter(line_type_components::Column::ComponentId.eq(component_id));
    if let Some(id) = exclude {
        query = query.filter(line_type_components::Column::Id.ne(id));
    }

    if query.one(conn).await?.is_some() {
        return Err(CoreError::conflict(format!(
            "Component {} is already part of line type {}",
            component_id, line_type_id
        ))
        .with_field("componentId", component_id.to_string())
        .with_field("lineTypeId", line_type_id.to_string()));
    }
    Ok(())
}
