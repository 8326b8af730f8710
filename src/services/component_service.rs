use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::debug;

use super::siblings;
use super::validation::{normalize_description, require_name, validate_color};
use crate::database::entities::{component_versions, components, line_type_components, parts};
use crate::errors::{CoreError, CoreResult};

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComponent {
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub part_id: Option<i32>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    /// `Some(None)` clears the part
    #[serde(default, with = "double_option")]
    pub part_id: Option<Option<i32>>,
}

/// Distinguishes an absent field from an explicit `null`
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

#[derive(Clone)]
pub struct ComponentService {
    db: DatabaseConnection,
}

impl ComponentService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self, component_version_id: i32) -> CoreResult<Vec<components::Model>> {
        find_version(&self.db, component_version_id).await?;
        Ok(siblings::children::<components::Entity, _>(&self.db, component_version_id).await?)
    }

    pub async fn get(&self, id: i32) -> CoreResult<components::Model> {
        find_component(&self.db, id).await
    }

    /// Append a component to the end of the version's catalog
    pub async fn create(
        &self,
        component_version_id: i32,
        request: NewComponent,
    ) -> CoreResult<components::Model> {
        let name = require_name(&request.name, "Component")?;
        let color = validate_color(&request.color)?;

        let txn = self.db.begin().await?;
        find_version(&txn, component_version_id).await?;
        if let Some(part_id) = request.part_id {
            find_part(&txn, part_id).await?;
        }

        let index =
            siblings::next_index::<components::Entity, _>(&txn, component_version_id).await?;
        let now = Utc::now();
        let component = components::ActiveModel {
            component_version_id: Set(component_version_id),
            part_id: Set(request.part_id),
            name: Set(name),
            description: Set(normalize_description(request.description)),
            color: Set(color),
            index: Set(index),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(component)
    }

    pub async fn update(&self, id: i32, request: ComponentUpdate) -> CoreResult<components::Model> {
        let component = find_component(&self.db, id).await?;
        let mut active: components::ActiveModel = component.into();

        if let Some(name) = request.name {
            active.name = Set(require_name(&name, "Component")?);
        }
        if let Some(description) = request.description {
            active.description = Set(normalize_description(Some(description)));
        }
        if let Some(color) = request.color {
            active.color = Set(validate_color(&color)?);
        }
        if let Some(part_id) = request.part_id {
            if let Some(part_id) = part_id {
                find_part(&self.db, part_id).await?;
            }
            active.part_id = Set(part_id);
        }
        active.updated_at = Set(Utc::now());

        Ok(active.update(&self.db).await?)
    }

    /// Remove a catalog entry; refused while a line type still lists it
    pub async fn delete(&self, id: i32) -> CoreResult<()> {
        let txn = self.db.begin().await?;
        let component = find_component(&txn, id).await?;

        let usages = line_type_components::Entity::find()
            .filter(line_type_components::Column::ComponentId.eq(id))
            .count(&txn)
            .await?;
        if usages > 0 {
            return Err(CoreError::conflict(format!(
                "Component '{}' is used by {} line type entries",
                component.name, usages
            ))
            .with_field("componentId", id.to_string()));
        }

        components::Entity::delete_by_id(id).exec(&txn).await?;
        let shifted = siblings::compact_after::<components::Entity, _>(
            &txn,
            component.component_version_id,
            component.index,
        )
        .await?;

        txn.commit().await?;
        debug!("Deleted component {}, renumbered {} siblings", id, shifted);
        Ok(())
    }
}

pub(crate) async fn find_component<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> CoreResult<components::Model> {
    components::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| CoreError::not_found("Component", id.to_string()))
}

async fn find_version<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> CoreResult<component_versions::Model> {
    component_versions::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| CoreError::not_found("ComponentVersion", id.to_string()))
}

async fn find_part<C: ConnectionTrait>(conn: &C, id: i32) -> CoreResult<parts::Model> {
    parts::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| CoreError::not_found("Part", id.to_string()))
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPart {
    pub name: String,
    pub description: Option<String>,
}

/// Classification groups for catalog components
#[derive(Clone)]
pub struct PartService {
    db: DatabaseConnection,
}

impl PartService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> CoreResult<Vec<parts::Model>> {
        Ok(parts::Entity::find()
            .order_by_asc(parts::Column::Name)
            .all(&self.db)
            .await?)
    }

    pub async fn create(&self, request: NewPart) -> CoreResult<parts::Model> {
        let name = require_name(&request.name, "Part")?;

        let existing = parts::Entity::find()
            .filter(parts::Column::Name.eq(name.as_str()))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(CoreError::conflict(format!("Part '{}' already exists", name))
                .with_field("name", name));
        }

        Ok(parts::ActiveModel {
            name: Set(name),
            description: Set(normalize_description(request.description)),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?)
    }

    /// Delete a part; components that referenced it become unclassified
    pub async fn delete(&self, id: i32) -> CoreResult<()> {
        let txn = self.db.begin().await?;
        find_part(&txn, id).await?;

        components::Entity::update_many()
            .col_expr(
                components::Column::PartId,
                sea_orm::sea_query::Expr::value(Option::<i32>::None),
            )
            .filter(components::Column::PartId.eq(id))
            .exec(&txn)
            .await?;
        parts::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }
}
