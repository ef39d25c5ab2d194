use std::collections::BTreeSet;

use crate::seat::SeatId;

/// Placement strategy over a venue's pool of available seats.
///
/// Implementations serialize their own state; every method takes `&self` so a
/// single allocator can be shared between request handlers and the expiry sweeper.
pub trait SeatAllocator: Send + Sync {
    /// Number of seats neither held nor reserved
    fn available(&self) -> usize;

    /// Take `count` contiguous seats out of the pool.
    ///
    /// Returns an empty set when `count` is zero or when no contiguous block of
    /// that size exists. Never allocates partially.
    fn acquire(&self, count: usize) -> BTreeSet<SeatId>;

    /// Return a previously acquired seat to the pool
    fn release(&self, seat: SeatId);
}
