use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::validation::{normalize_description, require_name, validate_color};
use crate::database::entities::{component_versions, components, line_type_components};
use crate::errors::{CoreError, CoreResult};
use crate::labels::parse_labels;

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComponentVersion {
    pub name: String,
    pub emoji: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelImport {
    #[serde(flatten)]
    pub version: NewComponentVersion,
    /// Raw label file contents
    pub labels: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedVersion {
    pub version: component_versions::Model,
    pub components: Vec<components::Model>,
}

#[derive(Clone)]
pub struct ComponentVersionService {
    db: DatabaseConnection,
}

impl ComponentVersionService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> CoreResult<Vec<component_versions::Model>> {
        Ok(component_versions::Entity::find()
            .order_by_desc(component_versions::Column::CreatedAt)
            .order_by_desc(component_versions::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn get(&self, id: i32) -> CoreResult<component_versions::Model> {
        find_version(&self.db, id).await
    }

    /// The version currently marked active, if any
    pub async fn selected(&self) -> CoreResult<Option<component_versions::Model>> {
        Ok(component_versions::Entity::find()
            .filter(component_versions::Column::Selected.eq(true))
            .one(&self.db)
            .await?)
    }

    pub async fn create(
        &self,
        request: NewComponentVersion,
    ) -> CoreResult<component_versions::Model> {
        insert_version(&self.db, request).await
    }

    /// Create a version whose catalog is seeded from a label file
    pub async fn import(&self, request: LabelImport) -> CoreResult<ImportedVersion> {
        let labels = parse_labels(&request.labels);
        if labels.is_empty() {
            return Err(CoreError::validation(
                "Label file contains no lines with both value and background",
            ));
        }

        let mut seeds = Vec::with_capacity(labels.len());
        for entry in labels {
            let name = require_name(&entry.label, "Component")?;
            let color = validate_color(&entry.color)
                .map_err(|e| CoreError::validation(format!("Label '{}': {}", name, e.message())))?;
            seeds.push((name, color, entry.index));
        }

        let txn = self.db.begin().await?;
        let version = insert_version(&txn, request.version).await?;

        let now = Utc::now();
        let mut created = Vec::with_capacity(seeds.len());
        for (name, color, index) in seeds {
            let component = components::ActiveModel {
                component_version_id: Set(version.id),
                part_id: Set(None),
                name: Set(name),
                description: Set(None),
                color: Set(color),
                index: Set(index),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            created.push(component);
        }

        txn.commit().await?;
        info!(
            "Imported component version {} '{}' with {} components",
            version.id,
            version.name,
            created.len()
        );

        Ok(ImportedVersion {
            version,
            components: created,
        })
    }

    /// Make `id` the only selected version
    pub async fn select(&self, id: i32) -> CoreResult<component_versions::Model> {
        let txn = self.db.begin().await?;
        find_version(&txn, id).await?;

        let now = Utc::now();
        component_versions::Entity::update_many()
            .col_expr(component_versions::Column::Selected, Expr::value(false))
            .col_expr(component_versions::Column::UpdatedAt, Expr::value(now))
            .filter(component_versions::Column::Selected.eq(true))
            .exec(&txn)
            .await?;
        component_versions::Entity::update_many()
            .col_expr(component_versions::Column::Selected, Expr::value(true))
            .col_expr(component_versions::Column::UpdatedAt, Expr::value(now))
            .filter(component_versions::Column::Id.eq(id))
            .exec(&txn)
            .await?;

        let selected = find_version(&txn, id).await?;
        txn.commit().await?;

        info!("Selected component version {}", id);
        Ok(selected)
    }

    /// Delete a version and its catalog; refused while line types reference it
    pub async fn delete(&self, id: i32) -> CoreResult<()> {
        let txn = self.db.begin().await?;
        let version = find_version(&txn, id).await?;

        let component_ids = components::Entity::find()
            .filter(components::Column::ComponentVersionId.eq(id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|component| component.id)
            .collect::<Vec<_>>();

        if !component_ids.is_empty() {
            let usages = line_type_components::Entity::find()
                .filter(line_type_components::Column::ComponentId.is_in(component_ids))
                .count(&txn)
                .await?;
            if usages > 0 {
                return Err(CoreError::conflict(format!(
                    "Component version '{}' is used by {} line type entries",
                    version.name, usages
                ))
                .with_field("componentVersionId", id.to_string()));
            }
        }

        components::Entity::delete_many()
            .filter(components::Column::ComponentVersionId.eq(id))
            .exec(&txn)
            .await?;
        component_versions::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }
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

async fn insert_version<C: ConnectionTrait>(
    conn: &C,
    request: NewComponentVersion,
) -> CoreResult<component_versions::Model> {
    let name = require_name(&request.name, "Component version")?;
    let now = Utc::now();

    Ok(component_versions::ActiveModel {
        name: Set(name),
        emoji: Set(request.emoji.filter(|emoji| !emoji.trim().is_empty())),
        description: Set(normalize_description(request.description)),
        selected: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await?)
}
