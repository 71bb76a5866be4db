//! Remote Store Layer
//!
//! Contract for the backing document store. The engine sees two collections:
//! `products/{id}` and `users/{normalized_email}`, where a user document
//! embeds the account's addresses, orders, and authored reviews. Every
//! implementation must expose full-collection change notifications so the
//! catalog mirror can replace its caches wholesale on each delivery.

pub mod memory;

pub use memory::MemoryStore;

use std::sync::Arc;

use async_trait::async_trait;
use shared::models::{Order, Product, UserAccount};
use thiserror::Error;
use tokio::sync::watch;

/// Store layer errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Document already exists: {0}")]
    Duplicate(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Store operation result
pub type StoreResult<T> = Result<T, StoreError>;

/// Full products collection as delivered by a change notification
pub type ProductsSnapshot = Arc<Vec<Product>>;

/// Full users collection as delivered by a change notification
pub type UsersSnapshot = Arc<Vec<UserAccount>>;

/// Edit applied to a single user document under the store's write lock.
///
/// Returning an error aborts the edit: the stored document stays untouched
/// and no snapshot is published.
pub type UserMutation = Box<dyn FnOnce(&mut UserAccount) -> StoreResult<()> + Send>;

/// Edit applied to a single product document under the store's write lock.
pub type ProductMutation = Box<dyn FnOnce(&mut Product) -> StoreResult<()> + Send>;

/// Document store contract.
///
/// Writes are atomic per document. Read-modify-write cycles must go through
/// [`RemoteStore::mutate_user`] / [`RemoteStore::mutate_product`] so that
/// concurrent edits of the same document cannot overwrite each other;
/// fetching a document, editing the copy, and putting it back loses any
/// update that landed in between.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch one product by id.
    async fn get_product(&self, id: &str) -> StoreResult<Option<Product>>;

    /// Insert or overwrite one product document.
    async fn put_product(&self, product: Product) -> StoreResult<()>;

    /// Remove one product document.
    async fn delete_product(&self, id: &str) -> StoreResult<()>;

    /// Atomically edit one product document and return the committed state.
    async fn mutate_product(&self, id: &str, edit: ProductMutation) -> StoreResult<Product>;

    /// Fetch one user by normalized email.
    async fn get_user(&self, email: &str) -> StoreResult<Option<UserAccount>>;

    /// Insert a new user document; fails with [`StoreError::Duplicate`] if
    /// the email is already taken.
    async fn create_user(&self, account: UserAccount) -> StoreResult<()>;

    /// Atomically edit one user document and return the committed state.
    async fn mutate_user(&self, email: &str, edit: UserMutation) -> StoreResult<UserAccount>;

    /// Prepend an order to the user's order list. Existing orders are never
    /// rewritten by this call.
    async fn append_order(&self, email: &str, order: Order) -> StoreResult<UserAccount>;

    /// Subscribe to full products-collection snapshots.
    fn watch_products(&self) -> watch::Receiver<ProductsSnapshot>;

    /// Subscribe to full users-collection snapshots.
    fn watch_users(&self) -> watch::Receiver<UsersSnapshot>;
}

/// Shared handle to the remote store
pub type SharedStore = Arc<dyn RemoteStore>;
