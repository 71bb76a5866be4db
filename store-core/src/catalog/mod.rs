//! Catalog Mirror
//!
//! In-memory read model of the remote collections. A background task
//! subscribes to full-collection snapshots and replaces the caches wholesale
//! on every delivery, so remote state always wins over anything derived
//! locally. Commands that have just committed a write may push the committed
//! document into the caches directly; the next delivery reconciles.

pub mod reference;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use shared::StorefrontEvent;
use shared::models::{Product, UserAccount};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::session::SharedSessionCache;
use crate::store::{ProductsSnapshot, SharedStore, UsersSnapshot};

/// Local read model of the `products` and `users` collections
pub struct CatalogMirror {
    /// Products cache: product id -> Product
    products: Arc<RwLock<HashMap<String, Product>>>,
    /// Users cache: normalized email -> UserAccount
    users: Arc<RwLock<HashMap<String, UserAccount>>>,
    /// Normalized email of the identified account, if signed in
    identified: Arc<RwLock<Option<String>>>,
    session: SharedSessionCache,
    events: broadcast::Sender<StorefrontEvent>,
}

impl std::fmt::Debug for CatalogMirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogMirror")
            .field("products", &self.products.read().len())
            .field("users", &self.users.read().len())
            .field("identified", &*self.identified.read())
            .finish()
    }
}

impl CatalogMirror {
    pub fn new(session: SharedSessionCache, events: broadcast::Sender<StorefrontEvent>) -> Self {
        Self {
            products: Arc::new(RwLock::new(HashMap::new())),
            users: Arc::new(RwLock::new(HashMap::new())),
            identified: Arc::new(RwLock::new(None)),
            session,
            events,
        }
    }

    /// Start the subscription task. The current snapshots are applied before
    /// the first await, so reads are warm as soon as this returns.
    pub fn spawn(self: &Arc<Self>, store: &SharedStore, cancel: CancellationToken) -> JoinHandle<()> {
        let mut products_rx = store.watch_products();
        let mut users_rx = store.watch_users();

        // Warm both caches from the snapshots already on the channels.
        let products = products_rx.borrow_and_update().clone();
        let users = users_rx.borrow_and_update().clone();
        self.apply_products(&products);
        self.apply_users(&users);
        info!(
            products = products.len(),
            users = users.len(),
            "Catalog mirror warmed"
        );

        let mirror = Arc::clone(self);
        tokio::spawn(mirror.run(products_rx, users_rx, cancel))
    }

    async fn run(
        self: Arc<Self>,
        mut products_rx: watch::Receiver<ProductsSnapshot>,
        mut users_rx: watch::Receiver<UsersSnapshot>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Catalog mirror stopped");
                    break;
                }
                changed = products_rx.changed() => match changed {
                    Ok(()) => {
                        let snapshot = products_rx.borrow_and_update().clone();
                        self.apply_products(&snapshot);
                    }
                    // Store dropped; no more deliveries will arrive.
                    Err(_) => break,
                },
                changed = users_rx.changed() => match changed {
                    Ok(()) => {
                        let snapshot = users_rx.borrow_and_update().clone();
                        self.apply_users(&snapshot);
                    }
                    Err(_) => break,
                },
            }
        }
    }

    /// Replace the products cache with a delivered snapshot.
    fn apply_products(&self, snapshot: &[Product]) {
        {
            let mut cache = self.products.write();
            cache.clear();
            for product in snapshot {
                cache.insert(product.id.clone(), product.clone());
            }
        }
        debug!(count = snapshot.len(), "Products snapshot applied");
        let _ = self.events.send(StorefrontEvent::ProductsRefreshed {
            count: snapshot.len(),
        });
    }

    /// Replace the users cache with a delivered snapshot. If the identified
    /// account's document changed remotely, the session slot is rewritten so
    /// the refreshed copy survives a restart.
    fn apply_users(&self, snapshot: &[UserAccount]) {
        let identified = self.identified.read().clone();
        let previous = identified
            .as_ref()
            .and_then(|email| self.users.read().get(email).cloned());

        {
            let mut cache = self.users.write();
            cache.clear();
            for account in snapshot {
                cache.insert(account.email.clone(), account.clone());
            }
        }
        debug!(count = snapshot.len(), "Users snapshot applied");
        let _ = self.events.send(StorefrontEvent::UsersRefreshed {
            count: snapshot.len(),
        });

        let Some(email) = identified else {
            return;
        };
        let current = self.users.read().get(&email).cloned();
        if current == previous {
            return;
        }
        match current {
            Some(account) => {
                if let Err(e) = self.session.set(Some(&account)) {
                    warn!(error = %e, "Failed to persist refreshed session");
                }
                debug!(email = %email, "Identified account refreshed from remote");
                let _ = self
                    .events
                    .send(StorefrontEvent::AccountRefreshed { email });
            }
            None => warn!(email = %email, "Identified account missing from snapshot"),
        }
    }

    // ========== Reads ==========

    /// All products, ordered by name.
    pub fn products(&self) -> Vec<Product> {
        let cache = self.products.read();
        let mut products: Vec<_> = cache.values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        products
    }

    /// Get one product by id.
    pub fn product(&self, id: &str) -> Option<Product> {
        self.products.read().get(id).cloned()
    }

    /// Products narrowed by category and search text. The query matches the
    /// name or reference code, case-insensitively; an empty query matches
    /// everything.
    pub fn products_filtered(&self, category: Option<&str>, query: &str) -> Vec<Product> {
        let needle = query.trim().to_lowercase();
        let mut products: Vec<_> = self
            .products
            .read()
            .values()
            .filter(|p| category.is_none_or(|c| p.category == c))
            .filter(|p| {
                needle.is_empty()
                    || p.name.to_lowercase().contains(&needle)
                    || p.reference.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        products
    }

    /// All user accounts, ordered by email.
    pub fn users(&self) -> Vec<UserAccount> {
        let cache = self.users.read();
        let mut users: Vec<_> = cache.values().cloned().collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        users
    }

    /// Get one account by normalized email.
    pub fn user(&self, email: &str) -> Option<UserAccount> {
        self.users.read().get(email).cloned()
    }

    /// The identified account's current record, if signed in.
    pub fn my_account(&self) -> Option<UserAccount> {
        let identified = self.identified.read();
        identified
            .as_ref()
            .and_then(|email| self.users.read().get(email).cloned())
    }

    /// Normalized email of the identified account.
    pub fn identified_email(&self) -> Option<String> {
        self.identified.read().clone()
    }

    /// Record who is signed in. Session persistence is the caller's job.
    pub(crate) fn set_identity(&self, email: Option<String>) {
        *self.identified.write() = email;
    }

    // ========== Write-through from local commands ==========

    /// Insert a document that was just committed to the store, so reads
    /// observe it before the snapshot round-trip.
    pub(crate) fn upsert_product(&self, product: Product) {
        self.products.write().insert(product.id.clone(), product);
    }

    pub(crate) fn remove_product(&self, id: &str) {
        self.products.write().remove(id);
    }

    pub(crate) fn upsert_user(&self, account: UserAccount) {
        self.users.write().insert(account.email.clone(), account);
    }
}
