//! Order Repository
//!
//! Builds orders at finalize time from frozen copies of cart and address
//! data, appends them to the owning user document, and walks them through
//! their status lifecycle. An order's items and total never change after
//! creation; only the status field does.

use chrono::Utc;
use shared::models::{Address, CartItem, Order, OrderStatus, UserAccount};
use tracing::info;

use crate::store::{SharedStore, StoreError, StoreResult};

/// Persistence operations for orders
pub struct OrderRepository {
    store: SharedStore,
}

impl OrderRepository {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Build and persist an order. `items` must already be detached from the
    /// live cart; the addresses are frozen copies resolved by id. The order
    /// is prepended to the owner's list with an append-only merge, so a
    /// concurrent append by another session of the same account survives.
    pub async fn finalize(
        &self,
        customer: &UserAccount,
        items: Vec<CartItem>,
        shipping_address: Option<Address>,
        billing_address: Option<Address>,
        order_id: String,
        payment_reference: String,
    ) -> StoreResult<(Order, UserAccount)> {
        let total = items.iter().map(CartItem::line_total).sum();
        let order = Order {
            id: order_id,
            placed_at: Utc::now(),
            items,
            total,
            status: OrderStatus::Confirmed,
            payment_reference,
            shipping_address,
            billing_address,
            customer_email: customer.email.clone(),
            customer_name: customer.display_name(),
            customer_phone: customer.phone.clone(),
        };

        let account = self
            .store
            .append_order(&customer.email, order.clone())
            .await?;
        info!(order_id = %order.id, total = order.total, "Order finalized");
        Ok((order, account))
    }

    /// Change one order's status on the owning user document, leaving every
    /// other field and every other order untouched. Any status value is
    /// accepted, including walking backwards.
    pub async fn update_status(
        &self,
        owner_email: &str,
        order_id: &str,
        status: OrderStatus,
    ) -> StoreResult<(Order, UserAccount)> {
        let wanted = order_id.to_string();
        let account = self
            .store
            .mutate_user(
                owner_email,
                Box::new(move |account| {
                    let order = account
                        .orders
                        .iter_mut()
                        .find(|order| order.id == wanted)
                        .ok_or_else(|| StoreError::NotFound(format!("orders/{wanted}")))?;
                    order.status = status;
                    Ok(())
                }),
            )
            .await?;

        let order = account
            .orders
            .iter()
            .find(|order| order.id == order_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("orders/{order_id}")))?;
        info!(order_id = %order.id, status = %order.status, "Order status updated");
        Ok((order, account))
    }

    /// Every order across all accounts, re-stamped with the owning account's
    /// current contact details and ordered most recent first. Orders carry
    /// contact details frozen at purchase time; the admin overview prefers
    /// what the account says today.
    pub fn overview(accounts: &[UserAccount]) -> Vec<Order> {
        let mut orders: Vec<Order> = accounts
            .iter()
            .flat_map(|account| {
                account.orders.iter().cloned().map(|mut order| {
                    order.customer_email = account.email.clone();
                    order.customer_name = account.display_name();
                    order.customer_phone = account.phone.clone();
                    order
                })
            })
            .collect();
        orders.sort_by(|a, b| b.placed_at.cmp(&a.placed_at));
        orders
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use rust_decimal::Decimal;
    use shared::models::{AdjustmentType, Product, Role};
    use std::sync::Arc;

    fn sample_product(id: &str, price: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Blueprint {id}"),
            description: String::new(),
            category: "ARDUINO PROJECTS".to_string(),
            price,
            original_price: None,
            discount: None,
            adjustment_type: AdjustmentType::None,
            adjustment_amount: 0,
            reference: "ARD-1000".to_string(),
            rating: Decimal::from(5),
            review_count: 0,
            in_stock: true,
            specs: Vec::new(),
            image: None,
            video: None,
        }
    }

    fn line(id: &str, price: i64, quantity: u32) -> CartItem {
        CartItem {
            product: sample_product(id, price),
            quantity,
            options: None,
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

    async fn repo_with_user(email: &str) -> (OrderRepository, SharedStore) {
        let store: SharedStore = Arc::new(MemoryStore::new());
        store.create_user(sample_user(email)).await.unwrap();
        (OrderRepository::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_finalize_totals_and_appends_exactly_once() {
        let (repo, store) = repo_with_user("rifat@example.com").await;
        let items = vec![line("proj-1", 1299, 2), line("proj-2", 4280, 1)];

        let (order, account) = repo
            .finalize(
                &sample_user("rifat@example.com"),
                items.clone(),
                None,
                None,
                "CP-9X41ZK".to_string(),
                "TRX123ABC".to_string(),
            )
            .await
            .unwrap();

        assert_eq!(order.total, 6878);
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.items, items);
        assert_eq!(order.customer_name, "Rifat Hasan");
        assert_eq!(account.orders.len(), 1);

        let stored = store.get_user("rifat@example.com").await.unwrap().unwrap();
        assert_eq!(stored.orders.len(), 1);
        assert_eq!(stored.orders[0].id, "CP-9X41ZK");
    }

    #[tokio::test]
    async fn test_finalize_fails_for_unknown_user() {
        let (repo, _) = repo_with_user("rifat@example.com").await;
        let result = repo
            .finalize(
                &sample_user("ghost@example.com"),
                vec![line("proj-1", 1299, 1)],
                None,
                None,
                "CP-000000".to_string(),
                "TRX1".to_string(),
            )
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_status_maps_one_order() {
        let (repo, store) = repo_with_user("rifat@example.com").await;
        let customer = sample_user("rifat@example.com");
        repo.finalize(
            &customer,
            vec![line("proj-1", 1299, 1)],
            None,
            None,
            "CP-AAAAAA".to_string(),
            "TRX1".to_string(),
        )
        .await
        .unwrap();
        repo.finalize(
            &customer,
            vec![line("proj-2", 4280, 1)],
            None,
            None,
            "CP-BBBBBB".to_string(),
            "TRX2".to_string(),
        )
        .await
        .unwrap();

        let (updated, _) = repo
            .update_status("rifat@example.com", "CP-AAAAAA", OrderStatus::Delivered)
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Delivered);
        assert_eq!(updated.total, 1299, "only the status may change");

        let stored = store.get_user("rifat@example.com").await.unwrap().unwrap();
        let other = stored.orders.iter().find(|o| o.id == "CP-BBBBBB").unwrap();
        assert_eq!(other.status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_update_status_unknown_order_leaves_document_untouched() {
        let (repo, store) = repo_with_user("rifat@example.com").await;
        let customer = sample_user("rifat@example.com");
        repo.finalize(
            &customer,
            vec![line("proj-1", 1299, 1)],
            None,
            None,
            "CP-AAAAAA".to_string(),
            "TRX1".to_string(),
        )
        .await
        .unwrap();

        let result = repo
            .update_status("rifat@example.com", "CP-MISSING", OrderStatus::Shipped)
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));

        let stored = store.get_user("rifat@example.com").await.unwrap().unwrap();
        assert_eq!(stored.orders[0].status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_overview_restamps_current_contact_details() {
        let (repo, store) = repo_with_user("rifat@example.com").await;
        let customer = sample_user("rifat@example.com");
        repo.finalize(
            &customer,
            vec![line("proj-1", 1299, 1)],
            None,
            None,
            "CP-AAAAAA".to_string(),
            "TRX1".to_string(),
        )
        .await
        .unwrap();

        // The customer renames themselves after the purchase.
        store
            .mutate_user(
                "rifat@example.com",
                Box::new(|account| {
                    account.first_name = "Rifatul".to_string();
                    Ok(())
                }),
            )
            .await
            .unwrap();

        let accounts = vec![
            store.get_user("rifat@example.com").await.unwrap().unwrap(),
        ];
        let overview = OrderRepository::overview(&accounts);
        assert_eq!(overview.len(), 1);
        assert_eq!(overview[0].customer_name, "Rifatul Hasan");
        // The stored order still carries the name frozen at purchase time.
        assert_eq!(accounts[0].orders[0].customer_name, "Rifat Hasan");
    }
}
