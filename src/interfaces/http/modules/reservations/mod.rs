//! Reservations module: buying slots and reading the order ledger

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
