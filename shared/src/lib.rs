//! Shared types for the Circuit Store engine
//!
//! Data models for the remote-store document contract (`products/{id}`,
//! `users/{normalized_email}`) plus the event payloads the engine
//! broadcasts to connected readers.

pub mod event;
pub mod models;

// Re-exports
pub use event::StorefrontEvent;
pub use serde::{Deserialize, Serialize};
