use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::{AccountStore, MemoryStore},
    entities::{Connections, Profile, Provider},
    error::{database_error, Error},
};

/// Reads like a `MemoryStore`, rejects every write.
#[derive(Debug, Default)]
pub struct FailingStore {
    inner: MemoryStore,
}

#[async_trait]
impl AccountStore for FailingStore {
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, Error> {
        self.inner.find_profile(user_id).await
    }

    async fn upsert_profile(&self, _: &Profile) -> Result<(), Error> {
        Err(database_error("connection reset"))
    }

    async fn find_connections(&self, user_id: Uuid) -> Result<Connections, Error> {
        self.inner.find_connections(user_id).await
    }

    async fn upsert_connection(&self, _: Uuid, _: Provider, _: bool) -> Result<(), Error> {
        Err(database_error("connection reset"))
    }
}

/// The first connection write waits `delay` and then fails, later writes
/// succeed.
#[derive(Debug, Default)]
pub struct SlowFirstWriteFails {
    inner: MemoryStore,
    delay: Duration,
    failed: AtomicBool,
}

impl SlowFirstWriteFails {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }
}

#[async_trait]
impl AccountStore for SlowFirstWriteFails {
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, Error> {
        self.inner.find_profile(user_id).await
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<(), Error> {
        self.inner.upsert_profile(profile).await
    }

    async fn find_connections(&self, user_id: Uuid) -> Result<Connections, Error> {
        self.inner.find_connections(user_id).await
    }

    async fn upsert_connection(
        &self,
        user_id: Uuid,
        provider: Provider,
        connected: bool,
    ) -> Result<(), Error> {
        if !self.failed.swap(true, Ordering::SeqCst) {
            tokio::time::sleep(self.delay).await;
            return Err(database_error("connection reset"));
        }

        self.inner.upsert_connection(user_id, provider, connected).await
    }
}
