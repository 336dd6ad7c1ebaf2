//! Catalog demo binary
//!
//! 1. Loads configuration and connects to the database
//! 2. Creates the schema
//! 3. Creates a pen acting as a product
//! 4. Lists stored pens

use acts_as::{config::AppConfig, metrics, ActsAs, DbPool, Persist, VERSION};
use anyhow::Context;
use catalog::{schema, Presenter, Repository};
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));
    if config.observability.json_logging {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }

    info!(
        service = %config.observability.service_name,
        "Starting catalog v{}", VERSION
    );

    // Initialize metrics
    metrics::register_metrics();

    // Initialize database connection
    info!("Connecting to database...");
    let pool = DbPool::new(&config.database).await?;

    if config.database.create_schema {
        schema::create_tables(pool.write()).await?;
    }

    let repo = Repository::new(pool);
    repo.ping().await?;

    let attributes = json!({ "name": "pen", "price": 0.8, "color": "red" });
    let attributes = attributes
        .as_object()
        .cloned()
        .context("sample attributes must be an object")?;

    match repo.create_pen(attributes).await {
        Ok(pen) => info!(
            id = ?pen.id(),
            acting_as = pen.acting_as_name(),
            present = %pen.present(),
            "Sample pen stored"
        ),
        Err(e) => warn!(error = %e, "Sample pen rejected"),
    }

    for pen in repo.list_pens().await? {
        info!(id = ?pen.id(), present = %pen.present(), "Pen");
    }

    info!("Catalog shutting down");
    Ok(())
}
