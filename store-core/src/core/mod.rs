//! Core module - engine configuration and composition root
//!
//! # Module structure
//!
//! - [`StoreConfig`] - engine configuration
//! - [`Storefront`] - the engine itself
//! - [`CatalogError`] - catalog maintenance errors

pub mod config;
pub mod storefront;

pub use config::StoreConfig;
pub use storefront::{CatalogError, Storefront};
