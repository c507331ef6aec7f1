//! # Filter Subsystem
//!
//! Everything between a raw URL query string and an executable database
//! predicate: the delimited token codec, the `FilterParams` payload persisted
//! inside views, and the predicate/sort/pagination builder.

pub mod params;
pub mod predicate;
pub mod token;
