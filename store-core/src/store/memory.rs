//! In-Memory Remote Store
//!
//! Same-process store used by tests, demos, and embedders that load their
//! catalog at startup. State lives in two maps behind async locks; every
//! committed write publishes a fresh full-collection snapshot on the
//! matching watch channel.

use std::collections::HashMap;

use async_trait::async_trait;
use shared::models::{Order, Product, UserAccount};
use std::sync::Arc;
use tokio::sync::{RwLock, watch};

use super::{
    ProductMutation, ProductsSnapshot, RemoteStore, StoreError, StoreResult, UserMutation,
    UsersSnapshot,
};

/// In-memory [`RemoteStore`] implementation
pub struct MemoryStore {
    products: RwLock<HashMap<String, Product>>,
    users: RwLock<HashMap<String, UserAccount>>,
    products_tx: watch::Sender<ProductsSnapshot>,
    users_tx: watch::Sender<UsersSnapshot>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        let (products_tx, _) = watch::channel(Arc::new(Vec::new()));
        let (users_tx, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            products: RwLock::new(HashMap::new()),
            users: RwLock::new(HashMap::new()),
            products_tx,
            users_tx,
        }
    }

    /// Publish the current products collection, ordered by id so snapshots
    /// are deterministic.
    fn publish_products(&self, products: &HashMap<String, Product>) {
        let mut all: Vec<Product> = products.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        self.products_tx.send_replace(Arc::new(all));
    }

    /// Publish the current users collection, ordered by email.
    fn publish_users(&self, users: &HashMap<String, UserAccount>) {
        let mut all: Vec<UserAccount> = users.values().cloned().collect();
        all.sort_by(|a, b| a.email.cmp(&b.email));
        self.users_tx.send_replace(Arc::new(all));
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn get_product(&self, id: &str) -> StoreResult<Option<Product>> {
        Ok(self.products.read().await.get(id).cloned())
    }

    async fn put_product(&self, product: Product) -> StoreResult<()> {
        let mut products = self.products.write().await;
        products.insert(product.id.clone(), product);
        self.publish_products(&products);
        Ok(())
    }

    async fn delete_product(&self, id: &str) -> StoreResult<()> {
        let mut products = self.products.write().await;
        if products.remove(id).is_none() {
            return Err(StoreError::NotFound(format!("products/{id}")));
        }
        self.publish_products(&products);
        Ok(())
    }

    async fn mutate_product(&self, id: &str, edit: ProductMutation) -> StoreResult<Product> {
        let mut products = self.products.write().await;
        let slot = products
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("products/{id}")))?;
        // Edit a draft so a failed edit leaves the stored document untouched.
        let mut draft = slot.clone();
        edit(&mut draft)?;
        *slot = draft.clone();
        self.publish_products(&products);
        Ok(draft)
    }

    async fn get_user(&self, email: &str) -> StoreResult<Option<UserAccount>> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn create_user(&self, account: UserAccount) -> StoreResult<()> {
        let mut users = self.users.write().await;
        if users.contains_key(&account.email) {
            return Err(StoreError::Duplicate(format!("users/{}", account.email)));
        }
        users.insert(account.email.clone(), account);
        self.publish_users(&users);
        Ok(())
    }

    async fn mutate_user(&self, email: &str, edit: UserMutation) -> StoreResult<UserAccount> {
        let mut users = self.users.write().await;
        let slot = users
            .get_mut(email)
            .ok_or_else(|| StoreError::NotFound(format!("users/{email}")))?;
        let mut draft = slot.clone();
        edit(&mut draft)?;
        *slot = draft.clone();
        self.publish_users(&users);
        Ok(draft)
    }

    async fn append_order(&self, email: &str, order: Order) -> StoreResult<UserAccount> {
        let mut users = self.users.write().await;
        let slot = users
            .get_mut(email)
            .ok_or_else(|| StoreError::NotFound(format!("users/{email}")))?;
        slot.orders.insert(0, order);
        let committed = slot.clone();
        self.publish_users(&users);
        Ok(committed)
    }

    fn watch_products(&self) -> watch::Receiver<ProductsSnapshot> {
        self.products_tx.subscribe()
    }

    fn watch_users(&self) -> watch::Receiver<UsersSnapshot> {
        self.users_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use shared::models::{AdjustmentType, OrderStatus, Role};

    fn sample_product(id: &str, price: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Blueprint {id}"),
            description: "Line follower robot with PID control".to_string(),
            category: "ARDUINO PROJECTS".to_string(),
            price,
            original_price: None,
            discount: None,
            adjustment_type: AdjustmentType::None,
            adjustment_amount: 0,
            reference: "ARD-1000".to_string(),
            rating: Decimal::new(50, 1),
            review_count: 0,
            in_stock: true,
            specs: vec!["ATmega328P".to_string()],
            image: None,
            video: None,
        }
    }

    fn sample_user(email: &str) -> UserAccount {
        UserAccount {
            email: email.to_string(),
            first_name: "Rifat".to_string(),
            last_name: "Hasan".to_string(),
            phone: "01700000000".to_string(),
            credential_digest: "digest".to_string(),
            role: Role::User,
            addresses: Vec::new(),
            orders: Vec::new(),
            reviews: Vec::new(),
        }
    }

    fn sample_order(id: &str, total: i64) -> Order {
        Order {
            id: id.to_string(),
            placed_at: Utc::now(),
            items: Vec::new(),
            total,
            status: OrderStatus::Confirmed,
            payment_reference: "TRX9001".to_string(),
            shipping_address: None,
            billing_address: None,
            customer_email: "rifat@example.com".to_string(),
            customer_name: "Rifat Hasan".to_string(),
            customer_phone: "01700000000".to_string(),
        }
    }

    #[tokio::test]
    async fn test_put_get_delete_product() {
        let store = MemoryStore::new();
        store
            .put_product(sample_product("proj-1", 1299))
            .await
            .unwrap();

        let found = store.get_product("proj-1").await.unwrap().unwrap();
        assert_eq!(found.price, 1299);

        store.delete_product("proj-1").await.unwrap();
        assert!(store.get_product("proj-1").await.unwrap().is_none());
        assert!(matches!(
            store.delete_product("proj-1").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_user_rejects_duplicate_email() {
        let store = MemoryStore::new();
        store.create_user(sample_user("a@example.com")).await.unwrap();

        let result = store.create_user(sample_user("a@example.com")).await;
        assert!(matches!(result, Err(StoreError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_append_order_prepends() {
        let store = MemoryStore::new();
        store.create_user(sample_user("a@example.com")).await.unwrap();

        store
            .append_order("a@example.com", sample_order("CP-AAAAAA", 1299))
            .await
            .unwrap();
        let updated = store
            .append_order("a@example.com", sample_order("CP-BBBBBB", 4280))
            .await
            .unwrap();

        assert_eq!(updated.orders.len(), 2);
        assert_eq!(updated.orders[0].id, "CP-BBBBBB");
        assert_eq!(updated.orders[1].id, "CP-AAAAAA");
    }

    #[tokio::test]
    async fn test_mutate_aborts_when_edit_fails() {
        let store = MemoryStore::new();
        store.create_user(sample_user("a@example.com")).await.unwrap();

        let result = store
            .mutate_user(
                "a@example.com",
                Box::new(|account| {
                    account.first_name = "Changed".to_string();
                    Err(StoreError::NotFound("order CP-XXXXXX".to_string()))
                }),
            )
            .await;
        assert!(result.is_err());

        let stored = store.get_user("a@example.com").await.unwrap().unwrap();
        assert_eq!(stored.first_name, "Rifat", "failed edit must not commit");
    }

    #[tokio::test]
    async fn test_watch_delivers_full_snapshots() {
        let store = MemoryStore::new();
        let mut rx = store.watch_products();

        store
            .put_product(sample_product("proj-1", 1299))
            .await
            .unwrap();
        store
            .put_product(sample_product("proj-2", 4280))
            .await
            .unwrap();

        rx.changed().await.unwrap();
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].id, "proj-1");
    }

    #[tokio::test]
    async fn test_naive_read_modify_write_loses_concurrent_update() {
        let store = MemoryStore::new();
        store
            .put_product(sample_product("proj-1", 1299))
            .await
            .unwrap();

        // Two writers fetch the same revision, bump the counter on private
        // copies, and put the whole document back.
        let mut first = store.get_product("proj-1").await.unwrap().unwrap();
        let mut second = store.get_product("proj-1").await.unwrap().unwrap();
        first.review_count += 1;
        second.review_count += 1;
        store.put_product(first).await.unwrap();
        store.put_product(second).await.unwrap();

        let stored = store.get_product("proj-1").await.unwrap().unwrap();
        assert_eq!(stored.review_count, 1, "second writer overwrote the first");
    }

    #[tokio::test]
    async fn test_mutate_product_keeps_both_concurrent_updates() {
        let store = MemoryStore::new();
        store
            .put_product(sample_product("proj-1", 1299))
            .await
            .unwrap();

        for _ in 0..2 {
            store
                .mutate_product(
                    "proj-1",
                    Box::new(|product| {
                        product.review_count += 1;
                        Ok(())
                    }),
                )
                .await
                .unwrap();
        }

        let stored = store.get_product("proj-1").await.unwrap().unwrap();
        assert_eq!(stored.review_count, 2);
    }
}
