use boxoffice_core::seat::{self, validate_dimensions};
use boxoffice_core::{CoreResult, SeatId};
use serde::{Deserialize, Serialize};

/// Weight of each row closer to the stage
const ROW_WEIGHT: f64 = 0.2;

/// Column rank at the exact centre of a row
const CENTER_PEAK: f64 = 0.8;

/// A single seat in the venue arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seat {
    pub id: SeatId,
    pub row: u32,
    pub column: u32,
    pub score: f64,
    /// Arena slot of the seat to the left, `None` at the row start
    pub left: Option<usize>,
    /// Arena slot of the seat to the right, `None` at the row end
    pub right: Option<usize>,
}

/// Immutable seat grid with desirability scores and in-row adjacency.
///
/// Seats are stored row-major in one arena; neighbor links are slots into that
/// arena and never cross a row boundary.
#[derive(Debug, Clone)]
pub struct Venue {
    rows: u32,
    columns: u32,
    seats: Vec<Seat>,
}

impl Venue {
    pub fn new(rows: u32, columns: u32) -> CoreResult<Self> {
        validate_dimensions(rows, columns)?;

        let mut seats: Vec<Seat> = Vec::with_capacity((rows * columns) as usize);
        for row in 1..=rows {
            let mut left: Option<usize> = None;
            for column in 1..=columns {
                let slot = seats.len();
                seats.push(Seat {
                    id: seat::seat_id(row, column),
                    row,
                    column,
                    score: seat_score(rows, columns, row, column),
                    left,
                    right: None,
                });
                if let Some(prev) = left {
                    seats[prev].right = Some(slot);
                }
                left = Some(slot);
            }
        }

        Ok(Self { rows, columns, seats })
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Total number of seats
    pub fn capacity(&self) -> usize {
        self.seats.len()
    }

    /// Arena slot for a seat identity, if the seat exists
    pub fn slot_of(&self, id: SeatId) -> Option<usize> {
        let row = seat::row_of(id);
        let column = seat::column_of(id);
        if row == 0 || row > self.rows || column == 0 || column > self.columns {
            return None;
        }
        Some(((row - 1) * self.columns + (column - 1)) as usize)
    }

    pub fn contains(&self, id: SeatId) -> bool {
        self.slot_of(id).is_some()
    }

    pub fn seat(&self, id: SeatId) -> Option<&Seat> {
        self.slot_of(id).map(|slot| &self.seats[slot])
    }

    pub fn seat_at(&self, slot: usize) -> &Seat {
        &self.seats[slot]
    }

    /// Seats of a 1-based row, left to right
    pub fn row_seats(&self, row: u32) -> &[Seat] {
        if row == 0 || row > self.rows {
            return &[];
        }
        let width = self.columns as usize;
        let start = (row as usize - 1) * width;
        &self.seats[start..start + width]
    }

    /// Every seat identity in row-major order
    pub fn seat_ids(&self) -> impl Iterator<Item = SeatId> + '_ {
        self.seats.iter().map(|s| s.id)
    }
}

/// Centrality of a column: peaks mid-row and falls off quadratically.
pub fn column_rank(column: u32, columns: u32) -> f64 {
    let offset = column as f64 / (columns as f64 / 2.0 + 0.5) - 1.0;
    -(offset * offset) + CENTER_PEAK
}

/// Desirability of a seat; front rows and central columns score higher.
pub fn seat_score(rows: u32, columns: u32, row: u32, column: u32) -> f64 {
    (rows - row) as f64 * ROW_WEIGHT + column_rank(column, columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_column_rank_peaks_in_center() {
        // 5 columns: divisor is 3.0
        assert!(approx(column_rank(3, 5), 0.8));
        assert!(approx(column_rank(1, 5), column_rank(5, 5)));
        assert!(approx(column_rank(2, 5), column_rank(4, 5)));
        assert!(column_rank(3, 5) > column_rank(2, 5));
        assert!(column_rank(2, 5) > column_rank(1, 5));
        assert!(approx(column_rank(1, 5), -(4.0 / 9.0) + 0.8));
    }

    #[test]
    fn test_front_rows_score_higher() {
        let venue = Venue::new(3, 5).unwrap();
        let front = venue.seat(103).unwrap().score;
        let middle = venue.seat(203).unwrap().score;
        let back = venue.seat(303).unwrap().score;

        assert!(approx(front, 1.2));
        assert!(approx(middle, 1.0));
        assert!(approx(back, 0.8));
    }

    #[test]
    fn test_neighbors_stay_within_row() {
        let venue = Venue::new(3, 5).unwrap();

        let first = venue.seat(201).unwrap();
        assert_eq!(first.left, None);
        assert_eq!(venue.seat_at(first.right.unwrap()).id, 202);

        let last = venue.seat(205).unwrap();
        assert_eq!(last.right, None);
        assert_eq!(venue.seat_at(last.left.unwrap()).id, 204);

        // Links are reciprocal
        for seat in venue.row_seats(2) {
            if let Some(right) = seat.right {
                assert_eq!(venue.seat_at(right).left, venue.slot_of(seat.id));
            }
        }
    }

    #[test]
    fn test_lookup_and_iteration() {
        let venue = Venue::new(2, 3).unwrap();
        assert_eq!(venue.capacity(), 6);
        assert_eq!(venue.seat_ids().collect::<Vec<_>>(), vec![101, 102, 103, 201, 202, 203]);
        assert!(venue.contains(203));
        assert!(!venue.contains(204));
        assert!(!venue.contains(301));
        assert!(!venue.contains(100));
        assert!(venue.row_seats(3).is_empty());
    }

    #[test]
    fn test_invalid_dimensions_rejected() {
        assert!(Venue::new(0, 5).is_err());
        assert!(Venue::new(5, 0).is_err());
        assert!(Venue::new(5, 120).is_err());
    }
}
