pub mod seat;
pub mod allocator;

pub use seat::{SeatId, MAX_COLUMNS, SEATS_PER_ROW_STRIDE};
pub use allocator::SeatAllocator;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
