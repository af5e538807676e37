//! Bookstore Common Types
//!
//! Shared types used across the bookstore pricing crates: currency codes,
//! book identifiers and records, and timing helpers.

pub mod book;
pub mod identifiers;
pub mod monetary;
pub mod time;

pub use book::*;
pub use identifiers::*;
pub use monetary::*;
pub use time::*;
