mod comparison_api;
mod connection_api;
mod estimate_api;
mod place_api;
mod profile_api;
mod reaper;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use oso::Oso;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::{
    api::API,
    auth::authorizor,
    config::Config,
    db::DynStore,
    error::{unauthorized_error, Error},
    estimator::{Estimator, PricingPolicy},
    external::PlacesLoader,
};

use comparison_api::TrackedSession;
use connection_api::ConnectionLedger;

pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

type Comparisons = Arc<tokio::sync::Mutex<HashMap<Uuid, TrackedSession>>>;

pub struct Engine {
    store: DynStore,
    authorizor: Oso,
    estimator: Arc<Estimator>,
    places: PlacesLoader,
    refresh_interval: Duration,
    comparisons: Comparisons,
    // connected flags per user, written optimistically
    connections: Arc<Mutex<ConnectionLedger>>,
    reaper: JoinHandle<()>,
}

impl Engine {
    /// Spawns the idle reaper, so it has to be called inside a tokio runtime.
    #[tracing::instrument(name = "Engine::new", skip_all)]
    pub fn new(store: DynStore, places: PlacesLoader, config: &Config) -> Result<Self, Error> {
        let estimator = Estimator::new(PricingPolicy::default(), config.simulated_latency)?;
        let authorizor = authorizor::new()?;

        let comparisons = Comparisons::default();
        let connections = Arc::new(Mutex::new(ConnectionLedger::default()));

        let reaper = tokio::spawn(reaper::run(
            comparisons.clone(),
            connections.clone(),
            config.idle_timeout,
            config.refresh_interval,
        ));

        Ok(Self {
            store,
            authorizor,
            estimator: Arc::new(estimator),
            places,
            refresh_interval: config.refresh_interval,
            comparisons,
            connections,
            reaper,
        })
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.reaper.abort();
    }
}

impl Engine {
    pub fn authorize<Actor, Action, Resource>(
        &self,
        actor: Actor,
        action: Action,
        resource: Resource,
    ) -> Result<(), Error>
    where
        Actor: oso::ToPolar,
        Action: oso::ToPolar,
        Resource: oso::ToPolar,
    {
        if self.authorizor.is_allowed(actor, action, resource)? {
            return Ok(());
        }

        Err(unauthorized_error())
    }
}

impl API for Engine {}

#[cfg(test)]
pub(crate) fn test_engine(store: DynStore) -> Engine {
    use crate::error::places_unavailable_error;

    let places = PlacesLoader::new(async { Err(places_unavailable_error()) });

    Engine::new(store, places, &Config::default()).unwrap()
}
