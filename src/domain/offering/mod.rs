//! Offering aggregate
//!
//! A purchasable item type (a course) with a fixed baseline capacity.

pub mod model;
pub mod repository;

pub use model::Offering;
pub use repository::OfferingRepository;
