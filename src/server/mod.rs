pub mod app;
pub mod error;
pub mod handlers;

use anyhow::{Context, Result};
use clap::Subcommand;
use sea_orm_migration::MigratorTrait;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::database::{connection::*, migrations::Migrator};
use crate::inference::InferenceClient;
use crate::services::InferenceServerService;

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum MigrateDirection {
    Up,
    Down,
    Fresh,
}

pub async fn start_server(config: &AppConfig) -> Result<()> {
    let database_url = get_database_url(Some(&config.database));
    let db = establish_connection(&database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database))?;

    Migrator::up(&db, None).await?;
    info!("Database migrations completed");

    let inference = InferenceClient::new(config.inference.health_timeout());
    if let Some(url) = &config.inference.default_server_url {
        let servers = InferenceServerService::new(db.clone(), inference.clone());
        if let Err(e) = servers.ensure_default(url).await {
            warn!("Could not register default inference server {}: {}", url, e);
        }
    }

    let state = app::AppState::new(db, inference);
    let app = app::create_app_with_state(state, config.cors_origin.as_deref())?;

    log_routes();

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    info!("Server running on http://0.0.0.0:{}", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn log_routes() {
    info!("API Endpoints:");
    info!("  /health                              - Health check");
    info!("  /api/v1/drawing-types                - Drawing types and their trees");
    info!("  /api/v1/drawing-types/:id/tree/move  - Reorder line types and components");
    info!("  /api/v1/line-types, /line-type-components");
    info!("  /api/v1/component-versions, /components, /parts - Component catalog");
    info!("  /api/v1/inference-servers            - Inference servers and health");
}

pub async fn migrate_database(database_path: &str, direction: MigrateDirection) -> Result<()> {
    let database_url = get_database_url(Some(database_path));
    let db = establish_connection(&database_url).await?;

    match direction {
        MigrateDirection::Up => {
            info!("Running migrations up");
            Migrator::up(&db, None).await?;
        }
        MigrateDirection::Down => {
            info!("Running migrations down");
            Migrator::down(&db, None).await?;
        }
        MigrateDirection::Fresh => {
            info!("Running fresh migrations (down then up)");
            Migrator::down(&db, None).await?;
            Migrator::up(&db, None).await?;
        }
    }

    info!("Database migration completed");
    Ok(())
}
