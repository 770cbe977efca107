//! Offerings module: course catalog and remaining slots

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
