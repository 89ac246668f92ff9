//! Shared data contracts for the bread catalog.

pub mod catalog;

pub use catalog::{Catalog, CatalogError, CatalogRow};
