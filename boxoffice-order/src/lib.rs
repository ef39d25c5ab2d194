pub mod models;
pub mod allocation;
pub mod service;

pub use models::{ReserveError, SEAT_HOLD_ID_EXPIRED, SEAT_HOLD_ID_NOT_FOUND};
pub use allocation::build_allocator;
pub use service::TicketService;
