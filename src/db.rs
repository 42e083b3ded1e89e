use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, types::Json, Executor, Pool, Postgres, Row};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    entities::{Connections, Profile, Provider},
    error::Error,
};

/// Persistence for per-user account data. Writes are last-write-wins
/// upserts; nothing is transactional.
#[async_trait]
pub trait AccountStore {
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, Error>;
    async fn upsert_profile(&self, profile: &Profile) -> Result<(), Error>;
    async fn find_connections(&self, user_id: Uuid) -> Result<Connections, Error>;
    async fn upsert_connection(
        &self,
        user_id: Uuid,
        provider: Provider,
        connected: bool,
    ) -> Result<(), Error>;
}

pub type DynStore = Arc<dyn AccountStore + Send + Sync>;

#[derive(Debug)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    #[tracing::instrument(name = "PgStore::new", skip(db_uri))]
    pub async fn new(db_uri: &str, max_connections: u32) -> Result<Self, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(db_uri)
            .await?;

        // TODO: move this to migrations
        pool.execute("CREATE TABLE IF NOT EXISTS profiles (user_id UUID PRIMARY KEY, data JSONB NOT NULL)")
            .await?;
        pool.execute("CREATE TABLE IF NOT EXISTS connections (user_id UUID NOT NULL, provider VARCHAR NOT NULL, connected BOOLEAN NOT NULL, PRIMARY KEY (user_id, provider))")
            .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl AccountStore for PgStore {
    #[tracing::instrument(skip(self))]
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, Error> {
        let mut conn = self.pool.acquire().await?;

        let maybe_result = conn
            .fetch_optional(
                sqlx::query("SELECT data FROM profiles WHERE user_id = $1").bind(&user_id),
            )
            .await?;

        match maybe_result {
            Some(result) => {
                let Json(profile): Json<Profile> = result.try_get("data")?;
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn upsert_profile(&self, profile: &Profile) -> Result<(), Error> {
        let mut conn = self.pool.acquire().await?;

        conn.execute(
            sqlx::query("INSERT INTO profiles (user_id, data) VALUES ($1, $2) ON CONFLICT (user_id) DO UPDATE SET data = EXCLUDED.data")
                .bind(&profile.user_id)
                .bind(Json(profile)),
        )
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn find_connections(&self, user_id: Uuid) -> Result<Connections, Error> {
        let mut conn = self.pool.acquire().await?;

        let rows = conn
            .fetch_all(
                sqlx::query("SELECT provider, connected FROM connections WHERE user_id = $1")
                    .bind(&user_id),
            )
            .await?;

        let mut connections = Connections::new(user_id);

        for row in rows {
            let name: String = row.try_get("provider")?;
            let connected: bool = row.try_get("connected")?;

            match Provider::from_name(&name) {
                Some(provider) => {
                    connections.set(provider, connected);
                }
                None => tracing::warn!("ignoring unknown provider {:?}", name),
            }
        }

        Ok(connections)
    }

    #[tracing::instrument(skip(self))]
    async fn upsert_connection(
        &self,
        user_id: Uuid,
        provider: Provider,
        connected: bool,
    ) -> Result<(), Error> {
        let mut conn = self.pool.acquire().await?;

        conn.execute(
            sqlx::query("INSERT INTO connections (user_id, provider, connected) VALUES ($1, $2, $3) ON CONFLICT (user_id, provider) DO UPDATE SET connected = EXCLUDED.connected")
                .bind(&user_id)
                .bind(provider.name())
                .bind(connected),
        )
        .await?;

        Ok(())
    }
}

/// Process-local store, used when no database is configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    profiles: Mutex<HashMap<Uuid, Profile>>,
    connections: Mutex<HashMap<Uuid, Connections>>,
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, Error> {
        Ok(self.profiles.lock().await.get(&user_id).cloned())
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<(), Error> {
        self.profiles
            .lock()
            .await
            .insert(profile.user_id, profile.clone());

        Ok(())
    }

    async fn find_connections(&self, user_id: Uuid) -> Result<Connections, Error> {
        let connections = self.connections.lock().await.get(&user_id).cloned();

        Ok(connections.unwrap_or_else(|| Connections::new(user_id)))
    }

    async fn upsert_connection(
        &self,
        user_id: Uuid,
        provider: Provider,
        connected: bool,
    ) -> Result<(), Error> {
        self.connections
            .lock()
            .await
            .entry(user_id)
            .or_insert_with(|| Connections::new(user_id))
            .set(provider, connected);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_upserts_profiles() {
        let store = MemoryStore::default();
        let user_id = Uuid::new_v4();

        assert_eq!(store.find_profile(user_id).await.unwrap(), None);

        let mut profile = Profile::new(user_id);
        profile.display_name = Some("Ravi".into());
        store.upsert_profile(&profile).await.unwrap();

        profile.display_name = Some("Ravi K".into());
        store.upsert_profile(&profile).await.unwrap();

        let found = store.find_profile(user_id).await.unwrap().unwrap();
        assert_eq!(found.display_name.as_deref(), Some("Ravi K"));
    }

    #[tokio::test]
    async fn memory_store_upserts_connections() {
        let store = MemoryStore::default();
        let user_id = Uuid::new_v4();

        let connections = store.find_connections(user_id).await.unwrap();
        assert_eq!(connections, Connections::new(user_id));

        store
            .upsert_connection(user_id, Provider::Rapido, true)
            .await
            .unwrap();

        let connections = store.find_connections(user_id).await.unwrap();
        assert!(connections.is_connected(Provider::Rapido));
        assert_eq!(connections.connected_count(), 1);
    }
}
