use std::collections::BTreeSet;

use boxoffice_core::{SeatAllocator, SeatId};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::venue::Venue;

/// Fills the venue in reading order: front row first, left to right.
pub struct SequentialAllocator {
    venue: Venue,
    seats: Mutex<BTreeSet<SeatId>>,
}

impl SequentialAllocator {
    pub fn new(venue: Venue) -> Self {
        let seats = venue.seat_ids().collect();
        Self {
            venue,
            seats: Mutex::new(seats),
        }
    }

    pub fn venue(&self) -> &Venue {
        &self.venue
    }
}

impl SeatAllocator for SequentialAllocator {
    fn available(&self) -> usize {
        self.seats.lock().len()
    }

    fn acquire(&self, count: usize) -> BTreeSet<SeatId> {
        if count == 0 {
            return BTreeSet::new();
        }

        let mut seats = self.seats.lock();
        if count > seats.len() {
            debug!(requested = count, available = seats.len(), "Request exceeds available seats");
            return BTreeSet::new();
        }

        let mut run: Vec<SeatId> = Vec::with_capacity(count);
        for &seat in seats.iter() {
            if run.len() == count {
                break;
            }
            // Seat ids leave a gap between rows, so a numeric run never spans two rows
            if let Some(&last) = run.last() {
                if seat - last != 1 {
                    run.clear();
                }
            }
            run.push(seat);
        }

        if run.len() != count {
            debug!(requested = count, available = seats.len(), "No contiguous run in reading order");
            return BTreeSet::new();
        }

        for seat in &run {
            seats.remove(seat);
        }
        debug!(requested = count, first = run[0], "Sequential seats acquired");
        run.into_iter().collect()
    }

    fn release(&self, seat: SeatId) {
        if !self.venue.contains(seat) {
            warn!(seat, "Ignoring release of a seat outside the venue");
            return;
        }
        if !self.seats.lock().insert(seat) {
            warn!(seat, "Seat released twice");
        }
    }
}
