use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::info;

use super::validation::{require_name, validate_server_url};
use crate::database::entities::inference_servers;
use crate::errors::{CoreError, CoreResult};
use crate::inference::{HealthStatus, InferenceClient};

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInferenceServer {
    pub name: String,
    pub url: String,
}

/// Registered inference servers and the one currently in use
#[derive(Clone)]
pub struct InferenceServerService {
    db: DatabaseConnection,
    client: InferenceClient,
}

impl InferenceServerService {
    pub fn new(db: DatabaseConnection, client: InferenceClient) -> Self {
        Self { db, client }
    }

    pub async fn list(&self) -> CoreResult<Vec<inference_servers::Model>> {
        Ok(inference_servers::Entity::find()
            .order_by_asc(inference_servers::Column::Name)
            .all(&self.db)
            .await?)
    }

    pub async fn get(&self, id: i32) -> CoreResult<inference_servers::Model> {
        find_server(&self.db, id).await
    }

    pub async fn create(
        &self,
        request: NewInferenceServer,
    ) -> CoreResult<inference_servers::Model> {
        let name = require_name(&request.name, "Inference server")?;
        let url = validate_server_url(&request.url)?;
        let now = Utc::now();

        let server = inference_servers::ActiveModel {
            name: Set(name),
            url: Set(url),
            selected: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!("Registered inference server {} at {}", server.id, server.url);
        Ok(server)
    }

    /// Make `id` the only selected server
    pub async fn select(&self, id: i32) -> CoreResult<inference_servers::Model> {
        let txn = self.db.begin().await?;
        find_server(&txn, id).await?;
        select_only(&txn, id).await?;
        let selected = find_server(&txn, id).await?;
        txn.commit().await?;

        info!("Selected inference server {} ({})", selected.id, selected.url);
        Ok(selected)
    }

    pub async fn selected(&self) -> CoreResult<Option<inference_servers::Model>> {
        Ok(inference_servers::Entity::find()
            .filter(inference_servers::Column::Selected.eq(true))
            .one(&self.db)
            .await?)
    }

    pub async fn delete(&self, id: i32) -> CoreResult<()> {
        find_server(&self.db, id).await?;
        inference_servers::Entity::delete_by_id(id)
            .exec(&self.db)
            .await?;
        Ok(())
    }

    pub async fn health(&self, id: i32) -> CoreResult<HealthStatus> {
        let server = find_server(&self.db, id).await?;
        Ok(self.client.health(&server.url).await)
    }

    /// Register `url` as the selected server when none is registered yet.
    /// Returns the created record, or `None` when servers already exist.
    pub async fn ensure_default(&self, url: &str) -> CoreResult<Option<inference_servers::Model>> {
        if inference_servers::Entity::find().count(&self.db).await? > 0 {
            return Ok(None);
        }

        let now = Utc::now();
        let server = inference_servers::ActiveModel {
            name: Set("Default".to_string()),
            url: Set(validate_server_url(url)?),
            selected: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!("Seeded default inference server {}", server.url);
        Ok(Some(server))
    }
}

async fn find_server<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> CoreResult<inference_servers::Model> {
    inference_servers::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| CoreError::not_found("InferenceServer", id.to_string()))
}

async fn select_only<C: ConnectionTrait>(conn: &C, id: i32) -> CoreResult<()> {
    let now = Utc::now();
    inference_servers::Entity::update_many()
        .col_expr(inference_servers::Column::Selected, Expr::value(false))
        .col_expr(inference_servers::Column::UpdatedAt, Expr::value(now))
        .filter(inference_servers::Column::Selected.eq(true))
        .exec(conn)
        .await?;
    inference_servers::Entity::update_many()
        .col_expr(inference_servers::Column::Selected, Expr::value(true))
        .col_expr(inference_servers::Column::UpdatedAt, Expr::value(now))
        .filter(inference_servers::Column::Id.eq(id))
        .exec(conn)
        .await?;
    Ok(())
}
