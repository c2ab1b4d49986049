use std::str::FromStr;
use std::sync::Arc;

use envconfig::Envconfig;

use inventory_api::config::{Config, Mode};
use inventory_api::schema;
use inventory_api::server;
use inventory_api::store::PgProductStore;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::init_from_env().expect("failed to load configuration from env");

    let store = PgProductStore::connect(&config.database_url, config.max_pg_connections)
        .await
        .expect("failed to connect to database");

    if let Some(arg) = std::env::args().nth(1) {
        let mode = Mode::from_str(&arg).unwrap_or_else(|_| panic!("invalid mode: {}", arg));

        match mode {
            Mode::Migrate => {
                schema::migrate(store.pool()).await.expect("migration failed");
                tracing::info!("migration complete");
            }
            Mode::Seed => {
                schema::seed(store.pool()).await.expect("seeding failed");
                tracing::info!("seeding complete");
            }
        }

        return;
    }

    // Signal handlers go in before the listener so an early signal is not lost.
    let shutdown = server::shutdown_signal().expect("failed to register signal handlers");

    let listener = tokio::net::TcpListener::bind(config.bind())
        .await
        .expect("failed to bind listener");

    if let Err(e) = server::serve(&config, listener, Arc::new(store), shutdown).await {
        tracing::error!("server failed: {:?}", e);
        std::process::exit(1);
    }
}
