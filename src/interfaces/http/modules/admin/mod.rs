//! Administrative operations

pub mod handlers;

pub use handlers::*;
