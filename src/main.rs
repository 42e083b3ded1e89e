use std::sync::Arc;

use ridecompare::config::Config;
use ridecompare::db::{DynStore, MemoryStore, PgStore};
use ridecompare::engine::Engine;
use ridecompare::error::Error;
use ridecompare::external::PlacesLoader;
use ridecompare::server::serve;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;

    let store: DynStore = match &config.database_url {
        Some(url) => Arc::new(PgStore::new(url, config.max_connections).await?),
        None => {
            tracing::warn!("DATABASE_URL not set, accounts are kept in memory");
            Arc::new(MemoryStore::default())
        }
    };

    let places = PlacesLoader::from_env();

    let engine = Engine::new(store, places, &config)?;

    serve(engine, config.listen_addr).await
}
