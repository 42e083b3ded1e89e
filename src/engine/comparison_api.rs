use super::Engine;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use uuid::Uuid;

use crate::{
    api::ComparisonAPI,
    comparison::{Comparison, ComparisonSession},
    entities::ComparisonRequest,
    error::{not_found_error, Error},
};

/// A live session and the last time anyone asked about it.
pub(super) struct TrackedSession {
    session: Arc<ComparisonSession>,
    last_access: Instant,
}

impl TrackedSession {
    fn new(session: Arc<ComparisonSession>) -> Self {
        Self {
            session,
            last_access: Instant::now(),
        }
    }

    pub(super) fn is_idle(&self, now: Instant, idle_timeout: Duration) -> bool {
        now.duration_since(self.last_access) >= idle_timeout
    }
}

impl Engine {
    async fn find_session(&self, id: Uuid) -> Result<Arc<ComparisonSession>, Error> {
        let mut sessions = self.comparisons.lock().await;
        let tracked = sessions.get_mut(&id).ok_or_else(not_found_error)?;
        tracked.last_access = Instant::now();

        Ok(tracked.session.clone())
    }
}

#[async_trait]
impl ComparisonAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn open_comparison(
        &self,
        request: Option<ComparisonRequest>,
    ) -> Result<Comparison, Error> {
        let session = Arc::new(ComparisonSession::open(
            self.estimator.clone(),
            self.refresh_interval,
        ));

        if let Some(request) = request {
            session.update(request).await?;
        }

        let comparison = session.comparison();
        self.comparisons
            .lock()
            .await
            .insert(session.id(), TrackedSession::new(session));

        tracing::info!("opened comparison {}", comparison.id);

        Ok(comparison)
    }

    #[tracing::instrument(skip(self))]
    async fn find_comparison(&self, id: Uuid) -> Result<Comparison, Error> {
        Ok(self.find_session(id).await?.comparison())
    }

    #[tracing::instrument(skip(self))]
    async fn update_comparison(
        &self,
        id: Uuid,
        request: ComparisonRequest,
    ) -> Result<Comparison, Error> {
        let snapshot = self.find_session(id).await?.update(request).await?;

        Ok(Comparison { id, snapshot })
    }

    #[tracing::instrument(skip(self))]
    async fn refresh_comparison(&self, id: Uuid) -> Result<Comparison, Error> {
        let snapshot = self.find_session(id).await?.refresh().await?;

        Ok(Comparison { id, snapshot })
    }

    #[tracing::instrument(skip(self))]
    async fn close_comparison(&self, id: Uuid) -> Result<(), Error> {
        self.comparisons
            .lock()
            .await
            .remove(&id)
            .ok_or_else(not_found_error)?;

        tracing::info!("closed comparison {}", id);

        Ok(())
    }
}
