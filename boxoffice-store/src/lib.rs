pub mod app_config;
pub mod reservation_repo;

pub use app_config::{AllocatorKind, Config};
pub use reservation_repo::{Reservation, ReservationStore};
