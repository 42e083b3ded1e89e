use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};

use super::{Comparisons, ConnectionLedger};

/// Drops comparisons and cached connections nobody has touched for
/// `idle_timeout`, checking every `period`. Dropping a session aborts its
/// worker, so its refresh timer stops with it.
pub(super) async fn run(
    comparisons: Comparisons,
    connections: Arc<Mutex<ConnectionLedger>>,
    idle_timeout: Duration,
    period: Duration,
) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let now = Instant::now();

        let closed = {
            let mut sessions = comparisons.lock().await;
            let before = sessions.len();
            sessions.retain(|_, tracked| !tracked.is_idle(now, idle_timeout));
            before - sessions.len()
        };

        if closed > 0 {
            tracing::info!(closed, "closed idle comparisons");
        }

        match connections.lock() {
            Ok(mut ledger) => {
                let evicted = ledger.evict_idle(now, idle_timeout);
                if evicted > 0 {
                    tracing::debug!(evicted, "forgot idle connection flags");
                }
            }
            Err(_) => tracing::error!("connection ledger poisoned"),
        }
    }
}
