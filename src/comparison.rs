//! Live comparisons.
//!
//! A session owns one request and one result slot. It estimates as soon as
//! the request becomes complete, again on every refresh tick and on manual
//! refresh. Each invocation bumps the session revision and an estimate is
//! only committed if its revision is still current, so a slow estimate for a
//! superseded request can never overwrite a newer one.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use uuid::Uuid;

use crate::{
    entities::{ComparisonRequest, ComparisonResult},
    error::{unexpected_error, Error},
    estimator::Estimator,
};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub request: ComparisonRequest,
    pub result: Option<ComparisonResult>,
    pub is_loading: bool,
    pub revision: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct Comparison {
    pub id: Uuid,
    #[serde(flatten)]
    pub snapshot: Snapshot,
}

#[derive(Debug)]
enum Command {
    Update(ComparisonRequest, oneshot::Sender<Snapshot>),
    Refresh(oneshot::Sender<Snapshot>),
}

type Estimate = (u64, Option<ComparisonResult>);

pub struct ComparisonSession {
    id: Uuid,
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<Snapshot>,
    task: JoinHandle<()>,
}

impl ComparisonSession {
    pub fn open(estimator: Arc<Estimator>, refresh_interval: Duration) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (estimates, estimate_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshots) = watch::channel(Snapshot::default());

        let worker = Worker {
            estimator,
            refresh_interval,
            snapshots: snapshot_tx,
            estimates,
            request: ComparisonRequest::default(),
            revision: 0,
            ticker: None,
            in_flight: None,
        };

        let task = tokio::spawn(worker.run(command_rx, estimate_rx));

        Self {
            id: Uuid::new_v4(),
            commands,
            snapshots,
            task,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Replaces the request. A changed request discards whatever is shown or
    /// in flight.
    pub async fn update(&self, request: ComparisonRequest) -> Result<Snapshot, Error> {
        let (reply, ack) = oneshot::channel();
        self.send(Command::Update(request, reply))?;
        ack.await.map_err(|_| unexpected_error())
    }

    pub async fn refresh(&self) -> Result<Snapshot, Error> {
        let (reply, ack) = oneshot::channel();
        self.send(Command::Refresh(reply))?;
        ack.await.map_err(|_| unexpected_error())
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    pub fn comparison(&self) -> Comparison {
        Comparison {
            id: self.id,
            snapshot: self.snapshot(),
        }
    }

    fn send(&self, command: Command) -> Result<(), Error> {
        self.commands.send(command).map_err(|_| unexpected_error())
    }
}

impl Drop for ComparisonSession {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct Worker {
    estimator: Arc<Estimator>,
    refresh_interval: Duration,
    snapshots: watch::Sender<Snapshot>,
    estimates: mpsc::UnboundedSender<Estimate>,
    request: ComparisonRequest,
    revision: u64,
    ticker: Option<Interval>,
    in_flight: Option<JoinHandle<()>>,
}

impl Worker {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut estimates: mpsc::UnboundedReceiver<Estimate>,
    ) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Update(request, reply)) => {
                        self.update(request);
                        let _ = reply.send(self.snapshots.borrow().clone());
                    }
                    Some(Command::Refresh(reply)) => {
                        self.refresh();
                        let _ = reply.send(self.snapshots.borrow().clone());
                    }
                    None => break,
                },
                _ = next_tick(&mut self.ticker) => self.refresh(),
                Some((revision, result)) = estimates.recv() => self.commit(revision, result),
            }
        }
    }

    fn update(&mut self, request: ComparisonRequest) {
        if request == self.request {
            return;
        }

        self.request = request;
        self.supersede();

        if self.request.is_complete() {
            self.ticker = Some(periodic(self.refresh_interval));
            self.start_estimate();
            self.publish(None, true);
        } else {
            self.ticker = None;
            self.publish(None, false);
        }
    }

    fn refresh(&mut self) {
        if !self.request.is_complete() {
            return;
        }

        self.supersede();
        self.start_estimate();

        // same request, so the last result stays visible while loading
        let shown = self.snapshots.borrow().result.clone();
        self.publish(shown, true);
    }

    fn supersede(&mut self) {
        self.revision += 1;

        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }

    fn start_estimate(&mut self) {
        let estimator = self.estimator.clone();
        let request = self.request.clone();
        let revision = self.revision;
        let estimates = self.estimates.clone();

        self.in_flight = Some(tokio::spawn(async move {
            let result = estimator.estimate(&request).await;
            let _ = estimates.send((revision, result));
        }));
    }

    fn commit(&mut self, revision: u64, result: Option<ComparisonResult>) {
        if revision != self.revision {
            tracing::debug!(revision, current = self.revision, "discarding superseded estimate");
            return;
        }

        self.in_flight = None;
        self.publish(result, false);
    }

    fn publish(&self, result: Option<ComparisonResult>, is_loading: bool) {
        self.snapshots.send_replace(Snapshot {
            request: self.request.clone(),
            result,
            is_loading,
            revision: self.revision,
        });
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

fn periodic(period: Duration) -> Interval {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => futures::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Category;
    use crate::estimator::{PricingPolicy, DEFAULT_LATENCY};

    fn estimator() -> Arc<Estimator> {
        Arc::new(Estimator::new(PricingPolicy::default(), DEFAULT_LATENCY).unwrap())
    }

    fn session() -> ComparisonSession {
        ComparisonSession::open(estimator(), DEFAULT_REFRESH_INTERVAL)
    }

    fn trip(pickup: &str) -> ComparisonRequest {
        ComparisonRequest::new(pickup, "Electronic City", Category::Mini)
    }

    async fn wait_until(
        rx: &mut watch::Receiver<Snapshot>,
        done: impl Fn(&Snapshot) -> bool,
    ) -> Snapshot {
        loop {
            {
                let snapshot = rx.borrow_and_update();
                if done(&snapshot) {
                    return snapshot.clone();
                }
            }

            rx.changed().await.unwrap();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn complete_request_is_estimated_immediately() {
        let session = session();
        let mut rx = session.subscribe();

        let snapshot = session.update(trip("HSR Layout")).await.unwrap();
        assert!(snapshot.is_loading);
        assert!(snapshot.result.is_none());
        assert_eq!(snapshot.revision, 1);

        let snapshot = wait_until(&mut rx, |s| !s.is_loading).await;
        assert_eq!(snapshot.request, trip("HSR Layout"));
        assert_eq!(snapshot.revision, 1);
        assert!(snapshot.result.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn incomplete_request_shows_nothing() {
        let session = session();

        let snapshot = session
            .update(ComparisonRequest::new("HSR Layout", "", Category::Mini))
            .await
            .unwrap();

        assert!(!snapshot.is_loading);
        assert!(snapshot.result.is_none());

        time::advance(DEFAULT_REFRESH_INTERVAL * 3).await;
        assert_eq!(session.snapshot().revision, snapshot.revision);
    }

    #[tokio::test(start_paused = true)]
    async fn newer_request_supersedes_in_flight_estimate() {
        let session = session();
        let mut rx = session.subscribe();

        session.update(trip("HSR Layout")).await.unwrap();
        time::advance(DEFAULT_LATENCY / 2).await;
        let snapshot = session.update(trip("Jayanagar")).await.unwrap();

        assert!(snapshot.result.is_none());
        assert_eq!(snapshot.revision, 2);

        let snapshot = wait_until(&mut rx, |s| !s.is_loading).await;
        assert_eq!(snapshot.request, trip("Jayanagar"));
        assert_eq!(snapshot.revision, 2);
        assert!(snapshot.result.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_estimate_is_discarded_whatever_the_order() {
        let (snapshots, rx) = watch::channel(Snapshot::default());
        let (estimates, _estimate_rx) = mpsc::unbounded_channel();
        let mut worker = Worker {
            estimator: estimator(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            snapshots,
            estimates,
            request: ComparisonRequest::default(),
            revision: 0,
            ticker: None,
            in_flight: None,
        };

        worker.update(trip("HSR Layout"));
        worker.update(trip("Jayanagar"));

        let mut rng = rand::thread_rng();
        let stale = worker.estimator.quote(&trip("HSR Layout"), &mut rng);
        let fresh = worker.estimator.quote(&trip("Jayanagar"), &mut rng);

        // the fresh estimate lands first, the stale one afterwards
        worker.commit(2, fresh.clone());
        worker.commit(1, stale);

        let snapshot = rx.borrow().clone();
        assert_eq!(snapshot.request, trip("Jayanagar"));
        assert_eq!(snapshot.result, fresh);
        assert!(!snapshot.is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_keeps_result_visible_while_loading() {
        let session = session();
        let mut rx = session.subscribe();

        session.update(trip("HSR Layout")).await.unwrap();
        let first = wait_until(&mut rx, |s| !s.is_loading).await;

        let snapshot = session.refresh().await.unwrap();
        assert!(snapshot.is_loading);
        assert_eq!(snapshot.result, first.result);
        assert_eq!(snapshot.revision, 2);

        let snapshot = wait_until(&mut rx, |s| !s.is_loading).await;
        assert_eq!(snapshot.revision, 2);
        assert!(snapshot.result.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_ticks_while_complete() {
        let session = session();
        let mut rx = session.subscribe();

        session.update(trip("HSR Layout")).await.unwrap();
        wait_until(&mut rx, |s| s.revision == 1 && !s.is_loading).await;

        let snapshot = wait_until(&mut rx, |s| s.revision == 3 && !s.is_loading).await;
        assert!(snapshot.result.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn incomplete_request_clears_and_stops_refreshing() {
        let session = session();
        let mut rx = session.subscribe();

        session.update(trip("HSR Layout")).await.unwrap();
        wait_until(&mut rx, |s| !s.is_loading).await;

        let snapshot = session
            .update(ComparisonRequest::new("", "Electronic City", Category::Mini))
            .await
            .unwrap();
        assert!(snapshot.result.is_none());
        assert!(!snapshot.is_loading);

        time::advance(DEFAULT_REFRESH_INTERVAL * 4).await;
        tokio::task::yield_now().await;

        assert_eq!(session.snapshot(), snapshot);
    }

    #[tokio::test(start_paused = true)]
    async fn incomplete_request_drops_the_estimate_in_flight() {
        let session = session();

        session.update(trip("HSR Layout")).await.unwrap();
        time::advance(DEFAULT_LATENCY / 2).await;

        let cleared = session
            .update(ComparisonRequest::new("HSR Layout", " ", Category::Mini))
            .await
            .unwrap();
        assert!(cleared.result.is_none());
        assert!(!cleared.is_loading);

        time::advance(DEFAULT_LATENCY).await;
        tokio::task::yield_now().await;

        let snapshot = session.snapshot();
        assert!(snapshot.result.is_none());
        assert!(!snapshot.is_loading);
        assert_eq!(snapshot.revision, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn unchanged_request_is_a_no_op() {
        let session = session();

        let first = session.update(trip("HSR Layout")).await.unwrap();
        let second = session.update(trip("HSR Layout")).await.unwrap();

        assert_eq!(first.revision, second.revision);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_session_stops_the_worker() {
        let session = session();
        let mut rx = session.subscribe();

        session.update(trip("HSR Layout")).await.unwrap();
        drop(session);

        // the worker owns the only sender, so the channel closes once it is gone
        while rx.changed().await.is_ok() {}
    }
}
