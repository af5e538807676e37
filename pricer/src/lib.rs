//! Bookstore Pricer
//!
//! Suggested resale pricing for the bookstore inventory. Combines the shared
//! exchange-rate cache with an in-memory book catalog.

pub mod catalog;
pub mod config;
pub mod pricer;

pub use catalog::{BookCatalog, CatalogError};
pub use config::{PricerConfig, RatesConfig};
pub use pricer::{Pricer, PricerError};
