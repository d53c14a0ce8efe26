//! Refbridge Server Library
//!
//! A local JSON bridge over a reference library. External tools create
//! highlight annotations on attachments, search items, walk item hierarchies
//! and resolve citation keys. The server binary is in main.rs.
//!
//! # Modules
//!
//! - `request`: body normalization shared by every endpoint
//! - `bridge`: the annotation and query operations
//! - `store`: item store traits and the SQLite backend
//! - `routes`: HTTP handlers and the route table

pub mod bridge;
pub mod config;
pub mod error;
pub mod request;
pub mod routes;
pub mod state;
pub mod store;
