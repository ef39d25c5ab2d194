/// Error code for a hold whose deadline passed or that lost the race to the sweeper
pub const SEAT_HOLD_ID_EXPIRED: &str = "SEAT_HOLD_ID_EXPIRED";

/// Error code for a hold that never existed, belongs to someone else, or is gone
pub const SEAT_HOLD_ID_NOT_FOUND: &str = "SEAT_HOLD_ID_NOT_FOUND";

/// Why a hold could not be turned into a reservation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReserveError {
    #[error("Seat hold {0} expired")]
    Expired(u64),

    #[error("Seat hold {0} not found")]
    NotFound(u64),
}

impl ReserveError {
    /// Stable code callers can match on
    pub fn code(&self) -> &'static str {
        match self {
            ReserveError::Expired(_) => SEAT_HOLD_ID_EXPIRED,
            ReserveError::NotFound(_) => SEAT_HOLD_ID_NOT_FOUND,
        }
    }
}
