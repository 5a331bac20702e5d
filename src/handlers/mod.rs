//! API handlers for the StayHub backend

mod bookings;
mod listings;
mod payments;
mod reviews;

pub use bookings::*;
pub use listings::*;
pub use payments::*;
pub use reviews::*;
