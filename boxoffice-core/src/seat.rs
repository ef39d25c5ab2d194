use crate::{CoreError, CoreResult};

/// Seat identity, encoded as `row * 100 + column` (both 1-based)
pub type SeatId = u32;

/// Numeric gap between the first seat of consecutive rows
pub const SEATS_PER_ROW_STRIDE: u32 = 100;

/// Largest column count the identity encoding can represent
pub const MAX_COLUMNS: u32 = SEATS_PER_ROW_STRIDE - 1;

/// Encode a (row, column) pair into a seat identity
pub fn seat_id(row: u32, column: u32) -> SeatId {
    row * SEATS_PER_ROW_STRIDE + column
}

/// 1-based row of a seat identity
pub fn row_of(seat: SeatId) -> u32 {
    seat / SEATS_PER_ROW_STRIDE
}

/// 1-based column of a seat identity
pub fn column_of(seat: SeatId) -> u32 {
    seat % SEATS_PER_ROW_STRIDE
}

/// Check that a venue of this shape can be encoded without rows running into each other.
pub fn validate_dimensions(rows: u32, columns: u32) -> CoreResult<()> {
    if rows == 0 {
        return Err(CoreError::ValidationError("venue needs at least one row".to_string()));
    }
    if columns == 0 || columns > MAX_COLUMNS {
        return Err(CoreError::ValidationError(format!(
            "columns must be between 1 and {}, got {}",
            MAX_COLUMNS, columns
        )));
    }
    if rows.checked_mul(SEATS_PER_ROW_STRIDE).and_then(|v| v.checked_add(columns)).is_none() {
        return Err(CoreError::ValidationError(format!("too many rows: {}", rows)));
    }
    Ok(())
}
