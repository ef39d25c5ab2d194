use std::collections::BTreeSet;

use boxoffice_core::SeatId;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A confirmed, final seat assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Hash of the hold key the reservation was made from
    pub id: u64,
    pub confirmation: String,
    pub hold_id: u64,
    pub email: String,
    pub seats: BTreeSet<SeatId>,
    pub reserved_at: DateTime<Utc>,
}

impl Reservation {
    /// Confirmation token for a reservation id: lower-case hex
    pub fn confirmation_for(id: u64) -> String {
        format!("{:x}", id)
    }
}

/// In-memory record of every reservation made since startup
#[derive(Default)]
pub struct ReservationStore {
    reservations: DashMap<u64, Reservation>,
}

impl ReservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a reservation and return its confirmation code.
    ///
    /// When two hold keys hash to the same id, the later record moves to the
    /// next free id so no reservation is ever overwritten.
    pub fn save(&self, mut reservation: Reservation) -> String {
        let mut id = reservation.id;
        loop {
            match self.reservations.entry(id) {
                Entry::Vacant(slot) => {
                    reservation.id = id;
                    reservation.confirmation = Reservation::confirmation_for(id);
                    let confirmation = reservation.confirmation.clone();
                    slot.insert(reservation);
                    return confirmation;
                }
                Entry::Occupied(taken) => {
                    warn!(id, taken_by_hold = taken.get().hold_id, hold_id = reservation.hold_id, "Reservation id collision, trying next id");
                }
            }
            id = id.wrapping_add(1);
        }
    }

    pub fn get(&self, id: u64) -> Option<Reservation> {
        self.reservations.get(&id).map(|entry| entry.value().clone())
    }

    pub fn get_by_confirmation(&self, confirmation: &str) -> Option<Reservation> {
        let id = u64::from_str_radix(confirmation, 16).ok()?;
        self.get(id)
    }

    pub fn len(&self) -> usize {
        self.reservations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reservations.is_empty()
    }

    pub fn reserved_seat_count(&self) -> usize {
        self.reservations.iter().map(|entry| entry.value().seats.len()).sum()
    }

    pub fn reserved_seats(&self) -> BTreeSet<SeatId> {
        self.reservations
            .iter()
            .flat_map(|entry| entry.value().seats.iter().copied().collect::<Vec<_>>())
            .collect()
    }
}
