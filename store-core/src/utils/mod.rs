//! Shared Utilities
//!
//! - [`logger`] - tracing setup for console and rolling file output
//! - [`validation`] - text length limits and input checks

pub mod logger;
pub mod validation;
