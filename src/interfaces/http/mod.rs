//! HTTP REST API
//!
//! - `common`: response envelope and validated JSON extractor
//! - `modules`: handlers and DTOs per resource
//! - `router`: route table, OpenAPI document and middleware

pub mod common;
pub mod modules;
pub mod router;

pub use router::create_api_router;
