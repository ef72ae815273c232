use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use shiftdesk_api::config::ApiConfig;
use shiftdesk_core::store::ScheduleStore;
use shiftdesk_db::{create_pool, schema::initialize_database, InMemoryStore, PgScheduleStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;

    // `--in-memory` skips PostgreSQL entirely; nothing survives a restart
    let store: Arc<dyn ScheduleStore> = if std::env::args().any(|arg| arg == "--in-memory") {
        Arc::new(InMemoryStore::new())
    } else {
        let db_pool = create_pool(&config.database_url, config.database_max_connections).await?;
        initialize_database(&db_pool).await?;
        Arc::new(PgScheduleStore::new(db_pool))
    };

    // Start API server
    shiftdesk_api::start_server(config, store).await?;

    Ok(())
}
