//! Database entities module

pub mod offering;
pub mod reservation;

pub use offering::Entity as Offering;
pub use reservation::Entity as Reservation;
