//! tabula/crates/tb-core/src/lib.rs
//!
//! The central domain logic and interface definitions for Tabula: the filter
//! token codec, the filter-param model, the query predicate builder, the
//! view-state reconciler, and the record-store ports.

pub mod error;
pub mod fields;
pub mod filter;
pub mod models;
pub mod traits;
pub mod view_state;

// Re-exporting for easier access in other crates
pub use error::*;
pub use fields::*;
pub use models::*;
pub use traits::*;
