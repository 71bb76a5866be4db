//! Remote snapshot propagation and catalog maintenance through the engine.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use shared::StorefrontEvent;
use shared::models::{AdjustmentType, Product, ProductDraft};
use store_core::store::{MemoryStore, SharedStore};
use store_core::{
    BufferNotifier, CatalogError, MemorySessionCache, SessionCache, SharedIdentity, SignUp,
    StoreConfig, StoreIdentity, Storefront,
};
use tokio::sync::broadcast;

fn test_config() -> StoreConfig {
    StoreConfig::with_overrides("unused-session.redb", 64)
}

struct Bed {
    engine: Storefront,
    store: Arc<MemoryStore>,
    session: Arc<MemorySessionCache>,
    notifier: Arc<BufferNotifier>,
}

fn build_bed() -> Bed {
    let store = Arc::new(MemoryStore::new());
    let shared: SharedStore = store.clone();
    let identity: SharedIdentity = Arc::new(StoreIdentity::new(shared.clone()));
    let session = Arc::new(MemorySessionCache::new());
    let notifier = Arc::new(BufferNotifier::new());
    let engine = Storefront::with_components(
        test_config(),
        shared,
        identity,
        session.clone(),
        notifier.clone(),
    );
    Bed {
        engine,
        store,
        session,
        notifier,
    }
}

fn remote_product(id: &str, name: &str, category: &str, reference: &str) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("{name} blueprint"),
        category: category.to_string(),
        price: 1299,
        original_price: None,
        discount: None,
        adjustment_type: AdjustmentType::None,
        adjustment_amount: 0,
        reference: reference.to_string(),
        rating: Decimal::new(50, 1),
        review_count: 0,
        in_stock: true,
        specs: Vec::new(),
        image: None,
        video: None,
    }
}

fn arduino_draft(name: &str, reference: Option<&str>) -> ProductDraft {
    ProductDraft {
        id: None,
        name: name.to_string(),
        description: None,
        category: "ARDUINO PROJECTS".to_string(),
        price: 1299,
        adjustment_type: AdjustmentType::None,
        adjustment_amount: 0,
        reference: reference.map(str::to_string),
        rating: None,
        review_count: None,
        in_stock: None,
        specs: Vec::new(),
        image: None,
        video: None,
    }
}

/// Await the first event matching `pred`, with a hard timeout.
async fn wait_for_event(
    rx: &mut broadcast::Receiver<StorefrontEvent>,
    pred: impl Fn(&StorefrontEvent) -> bool,
) -> StorefrontEvent {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let event = rx.recv().await.expect("event channel closed");
            if pred(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

#[tokio::test]
async fn test_remote_put_reaches_engine_reads() {
    let bed = build_bed();
    let mut events = bed.engine.subscribe_events();

    // 1. A product lands in the store behind the engine's back
    bed.store
        .put_product(remote_product(
            "proj-1",
            "Line Follower Bot",
            "BOT PROJECTS",
            "BOT-1000",
        ))
        .await
        .expect("remote put");

    // 2. The snapshot delivery refreshes the mirror
    let event = wait_for_event(&mut events, |event| {
        matches!(event, StorefrontEvent::ProductsRefreshed { count: 1 })
    })
    .await;
    assert_eq!(event, StorefrontEvent::ProductsRefreshed { count: 1 });

    let products = bed.engine.products();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, "proj-1");
    assert_eq!(bed.engine.product("proj-1").map(|p| p.reference), Some("BOT-1000".to_string()));
}

#[tokio::test]
async fn test_snapshot_replaces_catalog_wholesale() {
    let bed = build_bed();
    let mut events = bed.engine.subscribe_events();

    bed.store
        .put_product(remote_product("proj-1", "Line Follower Bot", "BOT PROJECTS", "BOT-1000"))
        .await
        .expect("remote put");
    bed.store
        .put_product(remote_product("proj-2", "Weather Station", "ESP32 PROJECTS", "ESP-1000"))
        .await
        .expect("remote put");
    wait_for_event(&mut events, |event| {
        matches!(event, StorefrontEvent::ProductsRefreshed { count: 2 })
    })
    .await;

    // A remote delete must vanish from local reads on the next delivery
    bed.store
        .delete_product("proj-2")
        .await
        .expect("remote delete");
    wait_for_event(&mut events, |event| {
        matches!(event, StorefrontEvent::ProductsRefreshed { count: 1 })
    })
    .await;

    assert_eq!(bed.engine.products().len(), 1);
    assert!(bed.engine.product("proj-2").is_none());
}

#[tokio::test]
async fn test_remote_account_edit_refreshes_session() {
    let bed = build_bed();
    let mut events = bed.engine.subscribe_events();

    // 1. Buyer signs in on this engine
    bed.engine
        .sign_up(SignUp {
            first_name: "Rifat".to_string(),
            last_name: "Hasan".to_string(),
            email: "rifat@example.com".to_string(),
            phone: "01711112222".to_string(),
            secret: "hunter2secret".to_string(),
        })
        .await
        .expect("sign up");

    // 2. The account document is edited remotely
    bed.store
        .mutate_user(
            "rifat@example.com",
            Box::new(|account| {
                account.first_name = "Rifatul".to_string();
                Ok(())
            }),
        )
        .await
        .expect("remote edit");

    // 3. The engine refreshes its identified copy and the session slot
    let event = wait_for_event(&mut events, |event| {
        matches!(event, StorefrontEvent::AccountRefreshed { .. })
    })
    .await;
    assert_eq!(
        event,
        StorefrontEvent::AccountRefreshed {
            email: "rifat@example.com".to_string(),
        }
    );
    assert_eq!(
        bed.engine.my_account().map(|a| a.first_name),
        Some("Rifatul".to_string())
    );
    let cached = bed.session.get().expect("session read").expect("session slot");
    assert_eq!(cached.first_name, "Rifatul");
}

#[tokio::test]
async fn test_save_product_generates_sequential_references() {
    let bed = build_bed();

    // 1. Fresh prefix starts at 1000 and counts up
    let first = bed
        .engine
        .save_product(arduino_draft("PID Line Follower", None))
        .await
        .expect("create");
    let second = bed
        .engine
        .save_product(arduino_draft("Solar Tracker", None))
        .await
        .expect("create");
    assert_eq!(first.reference, "ARD-1000");
    assert_eq!(second.reference, "ARD-1001");

    // 2. An explicit code is kept verbatim and moves the high-water mark
    let third = bed
        .engine
        .save_product(arduino_draft("CNC Plotter", Some("ARD-9000")))
        .await
        .expect("create");
    assert_eq!(third.reference, "ARD-9000");

    let fourth = bed
        .engine
        .save_product(arduino_draft("Smart Irrigation", None))
        .await
        .expect("create");
    assert_eq!(fourth.reference, "ARD-9001");

    assert!(
        bed.notifier
            .messages()
            .contains(&"New blueprint added to lab inventory.".to_string())
    );
}

#[tokio::test]
async fn test_save_product_rejects_bad_drafts() {
    let bed = build_bed();

    let mut unknown_category = arduino_draft("PID Line Follower", None);
    unknown_category.category = "SOLAR PROJECTS".to_string();
    assert!(matches!(
        bed.engine.save_product(unknown_category).await,
        Err(CatalogError::Validation(_))
    ));

    let mut negative_price = arduino_draft("PID Line Follower", None);
    negative_price.price = -1;
    assert!(matches!(
        bed.engine.save_product(negative_price).await,
        Err(CatalogError::Validation(_))
    ));

    let blank_name = arduino_draft("   ", None);
    assert!(matches!(
        bed.engine.save_product(blank_name).await,
        Err(CatalogError::Validation(_))
    ));

    let mut wild_rating = arduino_draft("PID Line Follower", None);
    wild_rating.rating = Some(Decimal::from(7));
    assert!(matches!(
        bed.engine.save_product(wild_rating).await,
        Err(CatalogError::Validation(_))
    ));

    assert!(bed.engine.products().is_empty());
}

#[tokio::test]
async fn test_update_keeps_reference_and_reapplies_pricing() {
    let bed = build_bed();

    // 1. Create with a reduction: 1299 selling, 1499 reconstructed
    let mut draft = arduino_draft("PID Line Follower", None);
    draft.description = Some("Tuned PID loop on ATmega328P".to_string());
    draft.adjustment_type = AdjustmentType::Reduced;
    draft.adjustment_amount = 200;
    let created = bed.engine.save_product(draft).await.expect("create");
    assert_eq!(created.price, 1299);
    assert_eq!(created.original_price, Some(1499));
    assert_eq!(created.discount.as_deref(), Some("- BDT 200"));

    // 2. Update the price and drop the adjustment
    let mut update = arduino_draft("PID Line Follower v2", None);
    update.id = Some(created.id.clone());
    update.price = 999;
    let updated = bed.engine.save_product(update).await.expect("update");

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "PID Line Follower v2");
    assert_eq!(updated.price, 999);
    assert_eq!(updated.original_price, None);
    assert_eq!(updated.discount, None);
    // Omitted fields fall back to the stored document
    assert_eq!(updated.reference, created.reference);
    assert_eq!(updated.description, "Tuned PID loop on ATmega328P");

    assert!(
        bed.notifier
            .messages()
            .contains(&"Blueprint updated successfully.".to_string())
    );
    assert_eq!(bed.engine.products().len(), 1);
}

#[tokio::test]
async fn test_update_unknown_product_fails() {
    let bed = build_bed();

    let mut update = arduino_draft("Ghost Blueprint", None);
    update.id = Some("proj-missing".to_string());
    let result = bed.engine.save_product(update).await;
    assert!(matches!(result, Err(CatalogError::Persistence(_))));
}

#[tokio::test]
async fn test_delete_product_clears_local_reads() {
    let bed = build_bed();

    let created = bed
        .engine
        .save_product(arduino_draft("PID Line Follower", None))
        .await
        .expect("create");

    bed.engine.delete_product(&created.id).await.expect("delete");
    assert!(bed.engine.product(&created.id).is_none());
    assert!(bed.engine.products().is_empty());
    assert!(
        bed.notifier
            .messages()
            .contains(&"Project removed.".to_string())
    );
}

#[tokio::test]
async fn test_filtered_reads_through_engine() {
    let bed = build_bed();

    bed.engine
        .save_product(arduino_draft("PID Line Follower", None))
        .await
        .expect("create");
    let mut esp = arduino_draft("Weather Station", None);
    esp.category = "ESP32 PROJECTS".to_string();
    bed.engine.save_product(esp).await.expect("create");

    let arduino = bed.engine.products_filtered(Some("ARDUINO PROJECTS"), "");
    assert_eq!(arduino.len(), 1);
    assert_eq!(arduino[0].name, "PID Line Follower");

    let by_query = bed.engine.products_filtered(None, "weather");
    assert_eq!(by_query.len(), 1);
    assert_eq!(by_query[0].category, "ESP32 PROJECTS");

    assert!(bed.engine.products_filtered(Some("BOT PROJECTS"), "").is_empty());
}

#[tokio::test]
async fn test_shutdown_stops_snapshot_processing() {
    let bed = build_bed();

    bed.engine.shutdown().await;

    // Deliveries after shutdown are never applied
    bed.store
        .put_product(remote_product("proj-1", "Line Follower Bot", "BOT PROJECTS", "BOT-1000"))
        .await
        .expect("remote put");
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(bed.engine.products().is_empty());
}
