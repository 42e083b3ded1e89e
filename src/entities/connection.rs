use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::Provider;

/// Per-user "connected" flag for every provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connections {
    pub user_id: Uuid,
    pub providers: BTreeMap<Provider, bool>,
}

impl Connections {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            providers: Provider::ALL
                .into_iter()
                .map(|provider| (provider, false))
                .collect(),
        }
    }

    pub fn is_connected(&self, provider: Provider) -> bool {
        self.providers.get(&provider).copied().unwrap_or(false)
    }

    /// Sets the flag and returns the previous value.
    pub fn set(&mut self, provider: Provider, connected: bool) -> bool {
        self.providers
            .insert(provider, connected)
            .unwrap_or(false)
    }

    pub fn connected_count(&self) -> usize {
        self.providers.values().filter(|&&connected| connected).count()
    }
}

#[test]
fn every_provider_starts_disconnected() {
    let connections = Connections::new(Uuid::new_v4());

    assert_eq!(connections.providers.len(), Provider::ALL.len());
    assert_eq!(connections.connected_count(), 0);
}

#[test]
fn set_returns_previous_flag() {
    let mut connections = Connections::new(Uuid::new_v4());

    assert!(!connections.set(Provider::Uber, true));
    assert!(connections.set(Provider::Uber, true));
    assert!(connections.is_connected(Provider::Uber));
    assert_eq!(connections.connected_count(), 1);

    assert!(connections.set(Provider::Uber, false));
    assert_eq!(connections.connected_count(), 0);
}
