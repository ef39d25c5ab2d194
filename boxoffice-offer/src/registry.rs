use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

use boxoffice_core::SeatId;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::debug;

use crate::models::{SeatHold, SeatHoldKey};

/// Concurrent store of live seat holds.
///
/// Removal goes through [`HoldRegistry::remove_if_unchanged`], so a hold that is
/// reserved and swept at the same moment is taken by exactly one caller.
pub struct HoldRegistry {
    holds: DashMap<SeatHoldKey, SeatHold>,
    next_id: AtomicU64,
    ttl: Duration,
}

impl HoldRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            holds: DashMap::new(),
            next_id: AtomicU64::new(0),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Register a new hold expiring one TTL from now
    pub fn create(&self, email: &str, seats: BTreeSet<SeatId>) -> SeatHold {
        self.create_at(email, seats, Utc::now())
    }

    pub fn create_at(&self, email: &str, seats: BTreeSet<SeatId>, now: DateTime<Utc>) -> SeatHold {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let hold = SeatHold::new(id, email, seats, now, self.ttl);
        debug!(hold_id = id, seats = hold.seats().len(), expires_at = %hold.expires_at(), "Seat hold created");
        self.holds.insert(hold.key(), hold.clone());
        hold
    }

    pub fn get(&self, key: &SeatHoldKey) -> Option<SeatHold> {
        self.holds.get(key).map(|entry| entry.value().clone())
    }

    /// Remove `hold` only if the registry still stores exactly this hold under its key.
    ///
    /// Returns `true` for the single caller that removed it.
    pub fn remove_if_unchanged(&self, hold: &SeatHold) -> bool {
        self.holds.remove_if(&hold.key(), |_, current| current == hold).is_some()
    }

    /// Copy of every hold expired at `now`.
    ///
    /// Entries are cloned out so callers can remove them without holding a shard lock.
    pub fn expired(&self, now: DateTime<Utc>) -> Vec<SeatHold> {
        self.holds
            .iter()
            .filter(|entry| entry.value().is_expired(now))
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.holds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holds.is_empty()
    }

    /// Number of seats across all holds still registered
    pub fn held_seat_count(&self) -> usize {
        self.holds.iter().map(|entry| entry.value().seats().len()).sum()
    }

    /// Union of the seats of all registered holds
    pub fn held_seats(&self) -> BTreeSet<SeatId> {
        self.holds
            .iter()
            .flat_map(|entry| entry.value().seats().iter().copied().collect::<Vec<_>>())
            .collect()
    }
}
