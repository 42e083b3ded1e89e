//! One-shot asynchronous initialization shared by every caller.
//!
//! The first caller to need the value starts the initialization future;
//! everyone who arrives while it runs awaits the same shared future. The
//! outcome is kept, so a failed load is never retried.

use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;

use crate::error::{unexpected_error, Error};

type Pending<T> = Shared<BoxFuture<'static, Result<Arc<T>, Error>>>;

enum LoadState<T> {
    Uninitialized(Option<BoxFuture<'static, Result<T, Error>>>),
    Loading(Pending<T>),
    Ready(Arc<T>),
    Failed(Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoaderStatus {
    Uninitialized,
    Loading,
    Ready,
    Failed,
}

pub struct Loader<T> {
    state: Mutex<LoadState<T>>,
}

impl<T: Send + Sync + 'static> Loader<T> {
    pub fn new<F>(init: F) -> Self
    where
        F: std::future::Future<Output = Result<T, Error>> + Send + 'static,
    {
        Self {
            state: Mutex::new(LoadState::Uninitialized(Some(init.boxed()))),
        }
    }

    pub fn status(&self) -> LoaderStatus {
        match self.state.lock() {
            Ok(state) => match &*state {
                LoadState::Uninitialized(_) => LoaderStatus::Uninitialized,
                LoadState::Loading(_) => LoaderStatus::Loading,
                LoadState::Ready(_) => LoaderStatus::Ready,
                LoadState::Failed(_) => LoaderStatus::Failed,
            },
            Err(_) => LoaderStatus::Failed,
        }
    }

    pub async fn get(&self) -> Result<Arc<T>, Error> {
        let pending = {
            let mut state = self.state.lock().map_err(|_| unexpected_error())?;

            match &mut *state {
                LoadState::Ready(value) => return Ok(value.clone()),
                LoadState::Failed(err) => return Err(err.clone()),
                LoadState::Loading(pending) => pending.clone(),
                LoadState::Uninitialized(init) => {
                    let init = init.take().ok_or_else(unexpected_error)?;
                    let pending = init.map(|result| result.map(Arc::new)).boxed().shared();

                    *state = LoadState::Loading(pending.clone());
                    pending
                }
            }
        };

        let outcome = pending.await;

        let mut state = self.state.lock().map_err(|_| unexpected_error())?;
        if let LoadState::Loading(_) = &*state {
            *state = match &outcome {
                Ok(value) => LoadState::Ready(value.clone()),
                Err(err) => {
                    tracing::warn!(?err, "initialization failed");
                    LoadState::Failed(err.clone())
                }
            };
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::places_unavailable_error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counted<T: Send + 'static>(
        calls: Arc<AtomicUsize>,
        outcome: Result<T, Error>,
    ) -> impl std::future::Future<Output = Result<T, Error>> + Send + 'static {
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(100)).await;
            outcome
        }
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_share_one_initialization() {
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = Loader::new(counted(calls.clone(), Ok(42u32)));

        assert_eq!(loader.status(), LoaderStatus::Uninitialized);

        let (a, b, c) = tokio::join!(loader.get(), loader.get(), loader.get());

        assert_eq!(*a.unwrap(), 42);
        assert_eq!(*b.unwrap(), 42);
        assert_eq!(*c.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(loader.status(), LoaderStatus::Ready);

        assert_eq!(*loader.get().await.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_is_remembered_and_not_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let loader: Loader<u32> =
            Loader::new(counted(calls.clone(), Err(places_unavailable_error())));

        let (a, b) = tokio::join!(loader.get(), loader.get());
        assert_eq!(a.unwrap_err(), places_unavailable_error());
        assert_eq!(b.unwrap_err(), places_unavailable_error());
        assert_eq!(loader.status(), LoaderStatus::Failed);

        assert!(loader.get().await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn get_is_pending_until_initialization_completes() {
        let (tx, rx) = futures::channel::oneshot::channel::<u32>();
        let loader = Loader::new(async move { rx.await.map_err(|_| unexpected_error()) });

        let mut first = tokio_test::task::spawn(loader.get());
        tokio_test::assert_pending!(first.poll());
        assert_eq!(loader.status(), LoaderStatus::Loading);

        tx.send(7).unwrap();

        let value = tokio_test::assert_ready_ok!(first.poll());
        assert_eq!(*value, 7);
        assert_eq!(loader.status(), LoaderStatus::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn status_reports_loading_while_in_flight() {
        let loader = Arc::new(Loader::new(async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok("ready")
        }));

        let waiter = {
            let loader = loader.clone();
            tokio::spawn(async move { loader.get().await.map(|value| *value) })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(loader.status(), LoaderStatus::Loading);

        assert_eq!(waiter.await.unwrap().unwrap(), "ready");
        assert_eq!(loader.status(), LoaderStatus::Ready);
    }
}
