use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use taxonomy::config::AppConfig;
use taxonomy::database::{establish_connection, get_database_url, setup_database};
use taxonomy::inference::{require_healthy, InferenceClient};
use taxonomy::server;
use taxonomy::services::component_version_service::{LabelImport, NewComponentVersion};
use taxonomy::services::ComponentVersionService;

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Serve {
        #[clap(short, long)]
        port: Option<u16>,
        #[clap(short, long)]
        database: Option<String>,
        #[clap(long)]
        cors_origin: Option<String>,
        /// TOML file with service settings; flags take precedence
        #[clap(short, long)]
        config: Option<PathBuf>,
    },
    Db {
        #[clap(subcommand)]
        command: DbCommands,
    },
    /// Create a component version from a label file
    ImportLabels {
        file: PathBuf,
        #[clap(short, long)]
        name: String,
        #[clap(short, long)]
        emoji: Option<String>,
        #[clap(long)]
        description: Option<String>,
        #[clap(short, long, default_value = "taxonomy.db")]
        database: String,
    },
    /// Check an inference server once and print its status
    Probe {
        url: String,
        #[clap(short, long, default_value = "3000")]
        timeout_ms: u64,
    },
}

#[derive(Subcommand, Debug)]
enum DbCommands {
    Init {
        #[clap(short, long, default_value = "taxonomy.db")]
        database: String,
    },
    Migrate {
        #[clap(subcommand)]
        direction: server::MigrateDirection,
        #[clap(short, long, default_value = "taxonomy.db")]
        database: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    match args.command {
        Commands::Serve {
            port,
            database,
            cors_origin,
            config,
        } => {
            let mut settings = AppConfig::load(config.as_deref())?;
            if let Some(port) = port {
                settings.port = port;
            }
            if let Some(database) = database {
                settings.database = database;
            }
            if cors_origin.is_some() {
                settings.cors_origin = cors_origin;
            }

            info!("Starting server on port {}", settings.port);
            server::start_server(&settings).await?;
        }
        Commands::Db { command } => match command {
            DbCommands::Init { database } => {
                info!("Initializing database: {}", database);
                server::migrate_database(&database, server::MigrateDirection::Up).await?;
            }
            DbCommands::Migrate {
                direction,
                database,
            } => {
                info!("Running database migration: {:?}", direction);
                server::migrate_database(&database, direction).await?;
            }
        },
        Commands::ImportLabels {
            file,
            name,
            emoji,
            description,
            database,
        } => {
            let labels = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read label file {}", file.display()))?;

            let db = establish_connection(&get_database_url(Some(&database))).await?;
            setup_database(&db).await?;

            let service = ComponentVersionService::new(db);
            let imported = service
                .import(LabelImport {
                    version: NewComponentVersion {
                        name,
                        emoji,
                        description,
                    },
                    labels,
                })
                .await?;

            println!(
                "Created component version {} '{}' with {} components",
                imported.version.id,
                imported.version.name,
                imported.components.len()
            );
        }
        Commands::Probe { url, timeout_ms } => {
            let client = InferenceClient::new(Duration::from_millis(timeout_ms));
            let status = client.health(&url).await;
            println!("{}", serde_json::to_string(&status)?);
            require_healthy(&status)?;
        }
    }

    Ok(())
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_deref()
        .unwrap_or("info")
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("hyper=info,{}", log_level)))
        .init();
}
