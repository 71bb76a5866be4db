//! Data models
//!
//! Document shapes persisted in the remote store and the session-local
//! types derived from them. All prices are whole BDT (`i64`); ratings are
//! one-decimal `Decimal` values.

pub mod address;
pub mod cart;
pub mod category;
pub mod order;
pub mod product;
pub mod review;
pub mod user;

// Re-exports
pub use address::*;
pub use cart::*;
pub use category::*;
pub use order::*;
pub use product::*;
pub use review::*;
pub use user::*;
