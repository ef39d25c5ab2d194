use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap, HashMap, HashSet};

use boxoffice_core::seat::row_of;
use boxoffice_core::{SeatAllocator, SeatId};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::venue::Venue;

/// Heap entry: highest score first, leftmost seat first among equal scores.
#[derive(Debug, Clone, Copy)]
struct RankedSeat {
    score: f64,
    slot: usize,
}

impl Ord for RankedSeat {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.slot.cmp(&self.slot))
    }
}

impl PartialOrd for RankedSeat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for RankedSeat {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankedSeat {}

/// Candidate block found in one row
struct Block {
    row: usize,
    slots: Vec<usize>,
    score: f64,
}

struct PoolState {
    /// Availability per arena slot
    available: Vec<bool>,
    /// Available seats of each row, best first
    rows: Vec<BinaryHeap<RankedSeat>>,
    /// Seats handed out and not yet released
    handed_out: HashMap<SeatId, usize>,
}

/// Puts parties as close to front and center as the remaining seats allow.
///
/// Each row is searched for a contiguous block grown outward from its best
/// available seat; the block with the highest total score across all rows wins.
/// Blocks never span rows.
pub struct FrontCenterAllocator {
    venue: Venue,
    state: Mutex<PoolState>,
}

impl FrontCenterAllocator {
    pub fn new(venue: Venue) -> Self {
        let mut rows = Vec::with_capacity(venue.rows() as usize);
        for row in 1..=venue.rows() {
            let heap: BinaryHeap<RankedSeat> = venue
                .row_seats(row)
                .iter()
                .filter_map(|seat| venue.slot_of(seat.id).map(|slot| RankedSeat { score: seat.score, slot }))
                .collect();
            rows.push(heap);
        }

        let state = PoolState {
            available: vec![true; venue.capacity()],
            rows,
            handed_out: HashMap::new(),
        };

        Self {
            venue,
            state: Mutex::new(state),
        }
    }

    pub fn venue(&self) -> &Venue {
        &self.venue
    }

    pub fn is_available(&self, seat: SeatId) -> bool {
        match self.venue.slot_of(seat) {
            Some(slot) => self.state.lock().available[slot],
            None => false,
        }
    }

    /// Search one row for a block of exactly `count` seats.
    ///
    /// Seeds are tried best first; seats covered by a failed attempt are never
    /// used as a seed again.
    fn best_block_in_row(&self, available: &[bool], row: &BinaryHeap<RankedSeat>, count: usize) -> Option<Vec<usize>> {
        let mut candidates = row.clone();
        let mut consumed: HashSet<usize> = HashSet::new();

        while let Some(seed) = candidates.pop() {
            if consumed.contains(&seed.slot) {
                continue;
            }
            let block = self.grow_block(available, seed.slot, count);
            if block.len() == count {
                return Some(block);
            }
            consumed.extend(block);
        }

        None
    }

    /// Grow a block outward from `seed`, always taking the better of the two
    /// open edges. Ties go to the right.
    fn grow_block(&self, available: &[bool], seed: usize, count: usize) -> Vec<usize> {
        let open = |slot: Option<usize>| slot.filter(|s| available[*s]);
        let (mut lo, mut hi) = (seed, seed);

        while hi - lo + 1 < count {
            let left = open(self.venue.seat_at(lo).left);
            let right = open(self.venue.seat_at(hi).right);
            match (left, right) {
                (Some(l), Some(r)) => {
                    if self.venue.seat_at(l).score > self.venue.seat_at(r).score {
                        lo = l;
                    } else {
                        hi = r;
                    }
                }
                (Some(l), None) => lo = l,
                (None, Some(r)) => hi = r,
                (None, None) => break,
            }
        }

        (lo..=hi).collect()
    }
}

impl SeatAllocator for FrontCenterAllocator {
    fn available(&self) -> usize {
        self.state.lock().rows.iter().map(|row| row.len()).sum()
    }

    fn acquire(&self, count: usize) -> BTreeSet<SeatId> {
        if count == 0 {
            return BTreeSet::new();
        }

        let mut guard = self.state.lock();
        let state = &mut *guard;

        let mut best: Option<Block> = None;
        for (row, heap) in state.rows.iter().enumerate() {
            if heap.len() < count {
                continue;
            }
            let Some(slots) = self.best_block_in_row(&state.available, heap, count) else {
                continue;
            };
            let score: f64 = slots.iter().map(|s| self.venue.seat_at(*s).score).sum();
            // Strict: the earlier row keeps a tie
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(Block { row, slots, score });
            }
        }

        let Some(block) = best else {
            debug!(requested = count, "No contiguous block available in any row");
            return BTreeSet::new();
        };

        let mut seats = BTreeSet::new();
        for &slot in &block.slots {
            let id = self.venue.seat_at(slot).id;
            state.available[slot] = false;
            state.handed_out.insert(id, slot);
            seats.insert(id);
        }
        state.rows[block.row].retain(|ranked| state.available[ranked.slot]);

        debug!(requested = count, row = block.row + 1, score = block.score, "Front and center seats acquired");
        seats
    }

    fn release(&self, seat: SeatId) {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let Some(slot) = state.handed_out.remove(&seat) else {
            warn!(seat, "Ignoring release of a seat that is not handed out");
            return;
        };

        state.available[slot] = true;
        let row = (row_of(seat) - 1) as usize;
        state.rows[row].push(RankedSeat {
            score: self.venue.seat_at(slot).score,
            slot,
        });
    }
}
