pub mod models;
pub mod registry;
pub mod expiry;

pub use models::{SeatHold, SeatHoldKey};
pub use registry::HoldRegistry;
pub use expiry::{ExpirySweeper, SweeperHandle};
