//! Database repository implementations

pub mod offering_repository;
pub mod reservation_repository;

pub use offering_repository::SeaOrmOfferingRepository;
pub use reservation_repository::SeaOrmOrderLedger;
