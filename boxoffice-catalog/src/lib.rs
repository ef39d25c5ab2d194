pub mod venue;
pub mod sequential;
pub mod front_center;

pub use venue::{Seat, Venue};
pub use sequential::SequentialAllocator;
pub use front_center::FrontCenterAllocator;
