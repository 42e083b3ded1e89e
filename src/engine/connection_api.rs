use super::Engine;

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use uuid::Uuid;

use crate::{
    api::ConnectionAPI,
    auth::{Account, User},
    entities::{Connections, Provider},
    error::{save_failed_error, unexpected_error, Error},
};

/// Connected flags as shown to each user.
///
/// A shown flag is the newest pending change for it, or the last stored
/// value when nothing is pending. Settling a change (stored or not) removes
/// it from the pending list, so a failed write can only ever fall back to
/// what the store holds and never undoes a newer change.
#[derive(Debug, Default)]
pub(super) struct ConnectionLedger {
    next_change: u64,
    users: HashMap<Uuid, UserConnections>,
}

#[derive(Debug)]
struct UserConnections {
    stored: Connections,
    // id of the newest change stored for each flag
    stored_changes: BTreeMap<Provider, u64>,
    pending: Vec<PendingChange>,
    last_access: Instant,
}

#[derive(Clone, Copy, Debug)]
struct PendingChange {
    id: u64,
    provider: Provider,
    connected: bool,
}

impl UserConnections {
    fn new(stored: Connections) -> Self {
        Self {
            stored,
            stored_changes: BTreeMap::new(),
            pending: vec![],
            last_access: Instant::now(),
        }
    }

    fn shown(&self) -> Connections {
        let mut shown = self.stored.clone();

        for change in &self.pending {
            shown.set(change.provider, change.connected);
        }

        shown
    }
}

impl ConnectionLedger {
    fn shown(&mut self, user_id: Uuid) -> Option<Connections> {
        let user = self.users.get_mut(&user_id)?;
        user.last_access = Instant::now();

        Some(user.shown())
    }

    /// Keeps an entry that is already tracked, since it may hold newer
    /// pending changes than the store.
    fn track(&mut self, stored: Connections) -> Connections {
        self.users
            .entry(stored.user_id)
            .or_insert_with(|| UserConnections::new(stored))
            .shown()
    }

    fn begin(&mut self, user_id: Uuid, provider: Provider, connected: bool) -> u64 {
        self.next_change += 1;
        let id = self.next_change;

        let user = self
            .users
            .entry(user_id)
            .or_insert_with(|| UserConnections::new(Connections::new(user_id)));
        user.last_access = Instant::now();
        user.pending.push(PendingChange {
            id,
            provider,
            connected,
        });

        id
    }

    fn settle(&mut self, user_id: Uuid, id: u64, stored: bool) -> Option<Connections> {
        let user = self.users.get_mut(&user_id)?;
        let position = user.pending.iter().position(|change| change.id == id)?;
        let change = user.pending.remove(position);

        let newest = user.stored_changes.get(&change.provider).copied().unwrap_or(0);
        if stored && change.id > newest {
            user.stored.set(change.provider, change.connected);
            user.stored_changes.insert(change.provider, change.id);
        }

        Some(user.shown())
    }

    /// Forgets users with nothing pending that were not touched for
    /// `idle_timeout`. They are reloaded from the store on next access.
    pub(super) fn evict_idle(&mut self, now: Instant, idle_timeout: Duration) -> usize {
        let before = self.users.len();

        self.users.retain(|_, user| {
            !user.pending.is_empty() || now.duration_since(user.last_access) < idle_timeout
        });

        before - self.users.len()
    }

    #[cfg(test)]
    pub(super) fn is_tracked(&self, user_id: Uuid) -> bool {
        self.users.contains_key(&user_id)
    }
}

/// A connected flag that has been shown but not yet stored.
struct TentativeChange<'a> {
    ledger: &'a Mutex<ConnectionLedger>,
    user_id: Uuid,
    id: u64,
}

impl<'a> TentativeChange<'a> {
    fn apply(
        ledger: &'a Mutex<ConnectionLedger>,
        user_id: Uuid,
        provider: Provider,
        connected: bool,
    ) -> Result<Self, Error> {
        let id = ledger
            .lock()
            .map_err(|_| unexpected_error())?
            .begin(user_id, provider, connected);

        Ok(Self {
            ledger,
            user_id,
            id,
        })
    }

    fn commit(self) -> Result<Connections, Error> {
        self.settle(true)
    }

    fn rollback(self) -> Result<Connections, Error> {
        self.settle(false)
    }

    fn settle(self, stored: bool) -> Result<Connections, Error> {
        self.ledger
            .lock()
            .map_err(|_| unexpected_error())?
            .settle(self.user_id, self.id, stored)
            .ok_or_else(unexpected_error)
    }
}

impl Engine {
    fn cached_connections(&self, user_id: Uuid) -> Result<Option<Connections>, Error> {
        let mut ledger = self.connections.lock().map_err(|_| unexpected_error())?;

        Ok(ledger.shown(user_id))
    }

    async fn load_connections(&self, user_id: Uuid) -> Result<Connections, Error> {
        if let Some(connections) = self.cached_connections(user_id)? {
            return Ok(connections);
        }

        let stored = self.store.find_connections(user_id).await?;

        let mut ledger = self.connections.lock().map_err(|_| unexpected_error())?;
        Ok(ledger.track(stored))
    }
}

#[async_trait]
impl ConnectionAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn find_connections(&self, user: User, user_id: Uuid) -> Result<Connections, Error> {
        self.authorize(user, "read", Account::new(user_id))?;

        self.load_connections(user_id).await
    }

    #[tracing::instrument(skip(self))]
    async fn set_connection(
        &self,
        user: User,
        user_id: Uuid,
        provider: Provider,
        connected: bool,
    ) -> Result<Connections, Error> {
        self.authorize(user, "update", Account::new(user_id))?;

        self.load_connections(user_id).await?;

        let change = TentativeChange::apply(&self.connections, user_id, provider, connected)?;

        if let Err(err) = self
            .store
            .upsert_connection(user_id, provider, connected)
            .await
        {
            change.rollback()?;
            tracing::warn!(?err, "failed to store {} connection, reverted", provider.name());

            return Err(save_failed_error());
        }

        tracing::info!(
            "{} {}",
            provider.name(),
            if connected { "connected" } else { "disconnected" }
        );

        change.commit()
    }
}
