use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use boxoffice_core::{CoreError, CoreResult, SeatAllocator};
use boxoffice_offer::{ExpirySweeper, HoldRegistry, SeatHold, SeatHoldKey, SweeperHandle};
use boxoffice_store::{Config, Reservation, ReservationStore};
use chrono::{DateTime, Duration, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::allocation::build_allocator;
use crate::models::ReserveError;

/// Booking front door: find and hold seats, then confirm or let them lapse.
///
/// The allocator tracks available seats, the registry tracks held seats and the
/// reservation store keeps confirmed ones. A seat is in exactly one of the three.
pub struct TicketService {
    allocator: Arc<dyn SeatAllocator>,
    holds: Arc<HoldRegistry>,
    reservations: Arc<ReservationStore>,
}

impl TicketService {
    pub fn new(allocator: Arc<dyn SeatAllocator>, hold_ttl: Duration) -> Self {
        Self {
            allocator,
            holds: Arc::new(HoldRegistry::new(hold_ttl)),
            reservations: Arc::new(ReservationStore::new()),
        }
    }

    pub fn from_config(config: &Config) -> CoreResult<Self> {
        config.validate()?;
        let allocator = build_allocator(config.venue.allocator, config.venue.rows, config.venue.columns)?;
        let ttl = i64::try_from(config.holds.ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| CoreError::ValidationError(format!("hold TTL out of range: {}", config.holds.ttl_seconds)))?;
        Ok(Self::new(allocator, ttl))
    }

    /// The number of seats in the venue that are neither held nor reserved
    pub fn num_seats_available(&self) -> usize {
        self.allocator.available()
    }

    /// Find and hold the best available seats for a customer.
    ///
    /// Returns `None` when `num_seats` contiguous seats are not available. A
    /// request for zero seats yields an empty hold.
    pub fn find_and_hold_seats(&self, num_seats: usize, customer_email: &str) -> Option<SeatHold> {
        let seats = self.allocator.acquire(num_seats);
        if seats.is_empty() && num_seats > 0 {
            debug!(num_seats, "Not enough contiguous seats to hold");
            return None;
        }
        Some(self.holds.create(customer_email, seats))
    }

    /// Commit seats held for a customer, returning a confirmation code.
    pub fn reserve_seats(&self, hold_id: u64, customer_email: &str) -> Result<String, ReserveError> {
        self.reserve_seats_at(hold_id, customer_email, Utc::now())
    }

    pub fn reserve_seats_at(&self, hold_id: u64, customer_email: &str, now: DateTime<Utc>) -> Result<String, ReserveError> {
        let key = SeatHoldKey::new(hold_id, customer_email);

        let Some(hold) = self.holds.get(&key) else {
            debug!(hold_id, "Reservation rejected: hold not found");
            return Err(ReserveError::NotFound(hold_id));
        };

        // Expired holds are left for the sweeper to release
        if hold.is_expired(now) {
            debug!(hold_id, "Reservation rejected: hold expired");
            return Err(ReserveError::Expired(hold_id));
        }

        if !self.holds.remove_if_unchanged(&hold) {
            debug!(hold_id, "Reservation rejected: hold swept concurrently");
            return Err(ReserveError::Expired(hold_id));
        }

        let id = reservation_id(&key);
        let confirmation = self.reservations.save(Reservation {
            id,
            confirmation: Reservation::confirmation_for(id),
            hold_id,
            email: hold.email().to_string(),
            seats: hold.seats().clone(),
            reserved_at: now,
        });
        info!(hold_id, seats = hold.seats().len(), confirmation = %confirmation, "Seats reserved");

        Ok(confirmation)
    }

    pub fn reservation(&self, confirmation: &str) -> Option<Reservation> {
        self.reservations.get_by_confirmation(confirmation)
    }

    pub fn held_seat_count(&self) -> usize {
        self.holds.held_seat_count()
    }

    pub fn reserved_seat_count(&self) -> usize {
        self.reservations.reserved_seat_count()
    }

    pub fn holds(&self) -> &Arc<HoldRegistry> {
        &self.holds
    }

    pub fn reservations(&self) -> &Arc<ReservationStore> {
        &self.reservations
    }

    /// Sweeper over this service's holds and allocator
    pub fn sweeper(&self) -> ExpirySweeper {
        ExpirySweeper::new(self.holds.clone(), self.allocator.clone())
    }

    /// Start the background expiry task; must be called inside a tokio runtime.
    pub fn start_sweeper(&self, cancel: CancellationToken) -> SweeperHandle {
        self.sweeper().spawn(cancel)
    }
}

/// Reservation identity: hash of the hold key
fn reservation_id(key: &SeatHoldKey) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxoffice_core::SeatId;
    use parking_lot::Mutex;
    use std::collections::{BTreeSet, HashMap};

    /// Hands out scripted seat sets per request size and records releases
    struct ScriptedAllocator {
        script: HashMap<usize, BTreeSet<SeatId>>,
        released: Mutex<Vec<SeatId>>,
        acquire_calls: Mutex<usize>,
    }

    impl ScriptedAllocator {
        fn new(script: &[(usize, &[SeatId])]) -> Self {
            Self {
                script: script.iter().map(|(n, seats)| (*n, seats.iter().copied().collect())).collect(),
                released: Mutex::new(Vec::new()),
                acquire_calls: Mutex::new(0),
            }
        }
    }

    impl SeatAllocator for ScriptedAllocator {
        fn available(&self) -> usize {
            42
        }

        fn acquire(&self, count: usize) -> BTreeSet<SeatId> {
            *self.acquire_calls.lock() += 1;
            self.script.get(&count).cloned().unwrap_or_default()
        }

        fn release(&self, seat: SeatId) {
            self.released.lock().push(seat);
        }
    }

    fn service() -> (TicketService, Arc<ScriptedAllocator>) {
        let allocator = Arc::new(ScriptedAllocator::new(&[(1, &[1]), (2, &[2, 3]), (3, &[4, 5, 6])]));
        (TicketService::new(allocator.clone(), Duration::seconds(2)), allocator)
    }

    #[test]
    fn test_basic_find_and_reserve() {
        let (ts, allocator) = service();

        let zoidberg = ts.find_and_hold_seats(1, "zoidberg@freemail.web").unwrap();
        let bender = ts.find_and_hold_seats(2, "bender@ilovebender.com").unwrap();
        let amy = ts.find_and_hold_seats(3, "awong79@marslink.web").unwrap();
        assert_eq!(*allocator.acquire_calls.lock(), 3);
        assert_eq!(ts.held_seat_count(), 6);

        // Wrong email or wrong id
        assert_eq!(
            ts.reserve_seats(bender.id(), "lkajsdfklsdj@lakjsdf.com"),
            Err(ReserveError::NotFound(bender.id()))
        );
        assert_eq!(ts.reserve_seats(100, bender.email()), Err(ReserveError::NotFound(100)));

        let confirmation = ts.reserve_seats(bender.id(), bender.email()).unwrap();
        assert!(u64::from_str_radix(&confirmation, 16).is_ok());
        assert_eq!(ts.reservation(&confirmation).unwrap().seats, BTreeSet::from([2, 3]));
        assert_eq!(ts.reserved_seat_count(), 2);

        // A reserved hold cannot be reserved again
        assert_eq!(ts.reserve_seats(bender.id(), bender.email()), Err(ReserveError::NotFound(bender.id())));

        // Sweeping after the TTL returns only the unreserved seats
        let later = Utc::now() + Duration::seconds(3);
        assert_eq!(ts.sweeper().sweep_once(later), 2);
        let mut released = allocator.released.lock().clone();
        released.sort();
        assert_eq!(released, vec![1, 4, 5, 6]);

        assert_eq!(ts.reserve_seats(amy.id(), amy.email()), Err(ReserveError::NotFound(amy.id())));
        assert_eq!(ts.reserve_seats(zoidberg.id(), zoidberg.email()), Err(ReserveError::NotFound(zoidberg.id())));
    }

    #[test]
    fn test_expired_hold_is_reported_but_not_released() {
        let (ts, allocator) = service();
        let hold = ts.find_and_hold_seats(3, "awong79@marslink.web").unwrap();

        let later = hold.expires_at();
        assert_eq!(ts.reserve_seats_at(hold.id(), hold.email(), later), Err(ReserveError::Expired(hold.id())));

        // Still registered until the sweeper takes it
        assert!(ts.holds().get(&hold.key()).is_some());
        assert!(allocator.released.lock().is_empty());
    }

    #[test]
    fn test_shortfall_returns_none() {
        let (ts, _) = service();
        assert!(ts.find_and_hold_seats(7, "fry@planetexpress.com").is_none());
        assert!(ts.holds().is_empty());
    }

    #[test]
    fn test_zero_seats_yields_empty_hold() {
        let (ts, _) = service();
        let hold = ts.find_and_hold_seats(0, "fry@planetexpress.com").unwrap();
        assert!(hold.seats().is_empty());

        let confirmation = ts.reserve_seats(hold.id(), hold.email()).unwrap();
        assert!(ts.reservation(&confirmation).unwrap().seats.is_empty());
    }

    #[test]
    fn test_confirmation_is_deterministic_per_key() {
        let key = SeatHoldKey::new(5, "leela@planetexpress.com");
        assert_eq!(reservation_id(&key), reservation_id(&key.clone()));
        assert_ne!(reservation_id(&key), reservation_id(&SeatHoldKey::new(6, "leela@planetexpress.com")));
    }

    #[test]
    fn test_from_config_rejects_bad_ttl() {
        let dir = std::env::temp_dir().join(format!("boxoffice-order-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let mut config = Config::load_from(dir.to_str().unwrap(), "test").unwrap();

        assert!(TicketService::from_config(&config).is_ok());
        config.holds.ttl_seconds = 0;
        assert!(TicketService::from_config(&config).is_err());
    }
}
