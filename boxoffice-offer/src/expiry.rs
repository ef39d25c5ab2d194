use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use boxoffice_core::{SeatAllocator, SeatId};
use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::registry::HoldRegistry;

/// Shortest sweep period, used when the TTL is too small to halve
const MIN_PERIOD: StdDuration = StdDuration::from_millis(1);

/// Seats taken out of the registry that still have to go back to the allocator.
///
/// Releases on drop, so seats from holds already removed are returned even if
/// the scan unwinds partway.
struct PendingRelease<'a> {
    allocator: &'a dyn SeatAllocator,
    seats: Vec<SeatId>,
}

impl Drop for PendingRelease<'_> {
    fn drop(&mut self) {
        for seat in self.seats.drain(..) {
            self.allocator.release(seat);
        }
    }
}

/// Returns the seats of expired holds to the allocator.
pub struct ExpirySweeper {
    registry: Arc<HoldRegistry>,
    allocator: Arc<dyn SeatAllocator>,
    period: StdDuration,
}

impl ExpirySweeper {
    /// Sweeper ticking every half TTL, so each hold is looked at twice in its lifetime
    pub fn new(registry: Arc<HoldRegistry>, allocator: Arc<dyn SeatAllocator>) -> Self {
        let period = (registry.ttl() / 2).to_std().unwrap_or(MIN_PERIOD).max(MIN_PERIOD);
        Self {
            registry,
            allocator,
            period,
        }
    }

    pub fn period(&self) -> StdDuration {
        self.period
    }

    /// Expire every hold past its deadline at `now`; returns how many were removed.
    pub fn sweep_once(&self, now: DateTime<Utc>) -> usize {
        let mut pending = PendingRelease {
            allocator: self.allocator.as_ref(),
            seats: Vec::new(),
        };

        let mut expired = 0;
        for hold in self.registry.expired(now) {
            // Lost the race to a reservation or another sweep
            if !self.registry.remove_if_unchanged(&hold) {
                continue;
            }
            debug!(hold_id = hold.id(), email = hold.email(), seats = hold.seats().len(), "Seat hold expired");
            pending.seats.extend(hold.seats().iter().copied());
            expired += 1;
        }

        if expired > 0 {
            info!(expired, seats = pending.seats.len(), "Returned expired holds to the pool");
        }
        expired
    }

    /// Run the sweeper on the current tokio runtime until `cancel` fires.
    pub fn spawn(self, cancel: CancellationToken) -> SweeperHandle {
        let token = cancel.clone();
        let join = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + self.period, self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(period_ms = self.period.as_millis() as u64, "Expiry sweeper started");

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        // A failed tick must not stop later sweeps
                        if catch_unwind(AssertUnwindSafe(|| self.sweep_once(Utc::now()))).is_err() {
                            error!("Expiry sweep panicked, retrying next tick");
                        }
                    }
                }
            }

            info!("Expiry sweeper stopped");
        });

        SweeperHandle { cancel, join }
    }
}

/// Handle to a running sweeper task
pub struct SweeperHandle {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl SweeperHandle {
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Stop the sweeper and wait for its task to exit
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.join.await {
            tracing::error!("Expiry sweeper task failed: {}", e);
        }
    }
}
