use std::sync::Arc;

use anyhow::Result;
use chaihouse_orderservice::{
    api::notifications::GatewayDispatcher,
    core::{app_state::AppState, bootstrap, config, db},
    routes,
    services::OrderService,
    store::PgOrderStore,
};
use diesel_migrations::{EmbeddedMigrations, embed_migrations};

/// Migrations embedded into the binary which helps with streamlining image building process
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[tokio::main]
async fn main() -> Result<()> {
    bootstrap::init_tracing();
    bootstrap::init_env();

    let config = config::load()?;

    tracing::info!("Running migrations...");
    let migrations_count = db::run_migrations_blocking(MIGRATIONS, &config.database.url).await?;
    tracing::info!("Run {} new migrations successfully", migrations_count);

    let pool = db::create_pool(&config.database).await?;
    let store = Arc::new(PgOrderStore::new(pool));
    let notifier = Arc::new(GatewayDispatcher::new(
        reqwest::Client::new(),
        config.notifications.clone(),
    ));

    let orders = OrderService::new(
        store.clone(),
        store,
        notifier.clone(),
        config.orders.clone(),
    );
    let app = routes::app(AppState { orders, notifier })?;

    tracing::info!("Bootstrapping...");
    bootstrap::serve("OrderService", app, config.server.port).await
}
