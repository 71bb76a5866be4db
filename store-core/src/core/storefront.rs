//! Storefront Engine
//!
//! Composition root of the ordering core. Owns the remote-store handle and
//! every session-scoped collaborator, and exposes each user-facing command
//! as one method. Commands persist first, then push the committed document
//! into the mirror, notify, and broadcast; when persistence fails nothing
//! local changes, so a rejected command can simply be retried.

use std::sync::Arc;

use futures::Stream;
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use shared::StorefrontEvent;
use shared::models::{
    Address, AddressDraft, CartItem, CartOptions, Order, OrderStatus, Product, ProductDraft,
    Review, Role, UserAccount, is_known_category,
};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{AuthError, AuthResult, AuthService, SharedIdentity, SignUp, StoreIdentity};
use crate::catalog::{CatalogMirror, reference};
use crate::checkout::{Cart, CheckoutError, CheckoutStage, CheckoutStateMachine};
use crate::core::config::StoreConfig;
use crate::notify::{SharedNotifier, TracingNotifier};
use crate::orders::OrderRepository;
use crate::pricing;
use crate::reviews::{ReviewAggregator, ReviewError, ReviewView};
use crate::session::{RedbSessionCache, SessionResult, SharedSessionCache};
use crate::store::{MemoryStore, SharedStore, StoreError};
use crate::utils::logger;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_DESCRIPTION_LEN, MAX_NAME_LEN, validate_optional_text,
    validate_required_text,
};

/// Description stored for products created without one
const PLACEHOLDER_DESCRIPTION: &str = "Project blueprint description not available.";

/// Catalog maintenance errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Product not found: {0}")]
    UnknownProduct(String),

    #[error(transparent)]
    Persistence(#[from] StoreError),
}

/// The storefront engine
///
/// # Components
///
/// | Field | Role |
/// |-------|------|
/// | store | Remote document store (source of truth) |
/// | auth | Sign-up / sign-in over the identity provider |
/// | session | Durable slot for the identified account |
/// | notifier | Fire-and-forget user notifications |
/// | mirror | In-memory read model fed by store snapshots |
/// | orders | Order finalize / status persistence |
/// | reviews | Review submission and read views |
/// | cart, checkout | Session-scoped purchase state |
pub struct Storefront {
    config: StoreConfig,
    store: SharedStore,
    auth: AuthService,
    session: SharedSessionCache,
    notifier: SharedNotifier,
    mirror: Arc<CatalogMirror>,
    orders: OrderRepository,
    reviews: ReviewAggregator,
    events: broadcast::Sender<StorefrontEvent>,
    cancel: CancellationToken,
    mirror_task: Mutex<Option<JoinHandle<()>>>,
    cart: RwLock<Cart>,
    checkout: RwLock<CheckoutStateMachine>,
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("environment", &self.config.environment)
            .field("mirror", &self.mirror)
            .finish_non_exhaustive()
    }
}

impl Storefront {
    /// Open a storefront with the default component set: in-memory remote
    /// store, store-backed identity, redb session cache at the configured
    /// path, and log-based notifications. Initializes logging.
    ///
    /// Must be called from within a Tokio runtime; the mirror subscription
    /// task is spawned immediately.
    pub fn open(config: StoreConfig) -> SessionResult<Self> {
        logger::init_logger_with_file(Some(config.log_level.as_str()), config.log_dir.as_deref());

        let store: SharedStore = Arc::new(MemoryStore::new());
        let identity: SharedIdentity = Arc::new(StoreIdentity::new(store.clone()));
        let session: SharedSessionCache =
            Arc::new(RedbSessionCache::open(&config.session_db_path)?);
        let notifier: SharedNotifier = Arc::new(TracingNotifier::new());
        Ok(Self::with_components(
            config, store, identity, session, notifier,
        ))
    }

    /// Assemble a storefront from explicit components. Used by tests and by
    /// embedders that bring their own store or notification sink. Does not
    /// touch logging.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn with_components(
        config: StoreConfig,
        store: SharedStore,
        identity: SharedIdentity,
        session: SharedSessionCache,
        notifier: SharedNotifier,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_channel_capacity);
        let mirror = Arc::new(CatalogMirror::new(session.clone(), events.clone()));

        // Rehydrate the identified account cached by a previous run. The
        // seeded record is replaced by the first snapshot delivery.
        match session.get() {
            Ok(Some(account)) => {
                info!(email = %account.email, "Session rehydrated");
                mirror.set_identity(Some(account.email.clone()));
                mirror.upsert_user(account);
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Failed to read session cache"),
        }

        let cancel = CancellationToken::new();
        let task = mirror.spawn(&store, cancel.child_token());

        Self {
            auth: AuthService::new(identity),
            orders: OrderRepository::new(store.clone()),
            reviews: ReviewAggregator::new(store.clone(), mirror.clone()),
            config,
            store,
            session,
            notifier,
            mirror,
            events,
            cancel,
            mirror_task: Mutex::new(Some(task)),
            cart: RwLock::new(Cart::new()),
            checkout: RwLock::new(CheckoutStateMachine::new()),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Subscribe to the engine's event broadcast.
    pub fn subscribe_events(&self) -> broadcast::Receiver<StorefrontEvent> {
        self.events.subscribe()
    }

    /// Stop the mirror subscription task and wait for it to finish.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let task = self.mirror_task.lock().take();
        if let Some(task) = task
            && let Err(e) = task.await
        {
            warn!(error = %e, "Mirror task aborted");
        }
        info!("Storefront stopped");
    }

    // ========== Auth ==========

    /// Ensure the configured admin account exists, creating it on first run.
    pub async fn bootstrap(&self) -> AuthResult<()> {
        self.auth
            .ensure_account(
                SignUp {
                    first_name: self.config.admin_first_name.clone(),
                    last_name: self.config.admin_last_name.clone(),
                    email: self.config.admin_email.clone(),
                    phone: self.config.admin_phone.clone(),
                    secret: self.config.admin_secret.clone(),
                },
                Role::Admin,
            )
            .await
    }

    /// Register a new account and sign it in.
    pub async fn sign_up(&self, input: SignUp) -> AuthResult<UserAccount> {
        let account = match self.auth.sign_up(input).await {
            Ok(account) => account,
            Err(AuthError::DuplicateIdentity(email)) => {
                self.notifier.notify("Email already registered.");
                return Err(AuthError::DuplicateIdentity(email));
            }
            Err(e) => return Err(e),
        };
        self.identify(&account);
        self.notifier
            .notify(&format!("Account created! Welcome {}", account.first_name));
        Ok(account)
    }

    /// Sign in with a raw email/secret pair.
    pub async fn sign_in(&self, email: &str, secret: &str) -> AuthResult<UserAccount> {
        let account = match self.auth.sign_in(email, secret).await {
            Ok(account) => account,
            Err(AuthError::Authentication) => {
                self.notifier.notify("Invalid credentials.");
                return Err(AuthError::Authentication);
            }
            Err(e) => return Err(e),
        };
        self.identify(&account);
        self.notifier
            .notify(&format!("Welcome back, {}", account.first_name));
        Ok(account)
    }

    /// Clear the identified account. An in-flight checkout is abandoned; the
    /// cart is kept.
    pub fn sign_out(&self) {
        if let Err(e) = self.session.set(None) {
            warn!(error = %e, "Failed to clear session");
        }
        self.mirror.set_identity(None);
        self.checkout.write().abort();
        info!("Signed out");
    }

    /// The identified account's current record, if signed in.
    pub fn my_account(&self) -> Option<UserAccount> {
        self.mirror.my_account()
    }

    /// Record a fresh sign-in: persist the session slot and point the mirror
    /// at the account. A session-cache failure is logged, not raised; the
    /// sign-in stands, it just will not survive a restart.
    fn identify(&self, account: &UserAccount) {
        if let Err(e) = self.session.set(Some(account)) {
            warn!(error = %e, "Failed to persist session");
        }
        self.mirror.set_identity(Some(account.email.clone()));
        self.mirror.upsert_user(account.clone());
    }

    // ========== Catalog reads ==========

    /// All products, ordered by name.
    pub fn products(&self) -> Vec<Product> {
        self.mirror.products()
    }

    /// One product by id.
    pub fn product(&self, product_id: &str) -> Option<Product> {
        self.mirror.product(product_id)
    }

    /// Products narrowed by category and search text.
    pub fn products_filtered(&self, category: Option<&str>, query: &str) -> Vec<Product> {
        self.mirror.products_filtered(category, query)
    }

    // ========== Cart ==========

    /// Add one unit of a product to the cart.
    pub fn add_to_cart(
        &self,
        product_id: &str,
        options: Option<CartOptions>,
    ) -> Result<(), CatalogError> {
        let product = self
            .mirror
            .product(product_id)
            .ok_or_else(|| CatalogError::UnknownProduct(product_id.to_string()))?;
        let name = product.name.clone();
        self.cart.write().add(product, options);
        self.notifier.notify(&format!("{name} added."));
        Ok(())
    }

    /// Set a cart line's quantity; zero removes the line.
    pub fn set_cart_quantity(&self, product_id: &str, quantity: u32) {
        self.cart.write().set_quantity(product_id, quantity);
    }

    pub fn remove_from_cart(&self, product_id: &str) {
        self.cart.write().remove(product_id);
    }

    /// Owned copy of the current cart lines.
    pub fn cart_items(&self) -> Vec<CartItem> {
        self.cart.read().snapshot()
    }

    /// Live cart total in whole BDT.
    pub fn cart_total(&self) -> i64 {
        self.cart.read().total()
    }

    /// Total unit count across cart lines.
    pub fn cart_count(&self) -> u32 {
        self.cart.read().count()
    }

    // ========== Checkout ==========

    pub fn checkout_stage(&self) -> CheckoutStage {
        self.checkout.read().stage()
    }

    /// Start a checkout from the current cart.
    pub fn begin_checkout(&self) -> Result<(), CheckoutError> {
        let authenticated = self.mirror.identified_email().is_some();
        let cart = self.cart.read();
        self.checkout.write().begin(authenticated, &cart)
    }

    pub fn proceed_to_address(&self) -> Result<(), CheckoutError> {
        self.checkout.write().proceed_to_address()
    }

    pub fn select_shipping_address(&self, address_id: &str) -> Result<(), CheckoutError> {
        self.checkout.write().select_shipping(address_id)
    }

    pub fn select_billing_address(&self, address_id: &str) -> Result<(), CheckoutError> {
        self.checkout.write().select_billing(address_id)
    }

    pub fn use_shipping_for_billing(&self) -> Result<(), CheckoutError> {
        self.checkout.write().use_shipping_for_billing()
    }

    /// Advance to the payment stage; returns the freshly minted order token.
    pub fn proceed_to_payment(&self) -> Result<String, CheckoutError> {
        match self.checkout.write().proceed_to_payment() {
            Ok(token) => Ok(token.to_string()),
            Err(CheckoutError::MissingAddressSelection) => {
                self.notifier.notify("Please select both target addresses.");
                Err(CheckoutError::MissingAddressSelection)
            }
            Err(e) => Err(e),
        }
    }

    /// Step back one checkout stage.
    pub fn checkout_back(&self) -> Result<(), CheckoutError> {
        self.checkout.write().back()
    }

    /// Abandon the in-flight checkout.
    pub fn abort_checkout(&self) {
        self.checkout.write().abort();
    }

    /// Commit the in-flight checkout as an order.
    ///
    /// Persists first; only after the order is stored does the machine move
    /// to `Finalized` and the cart empty. On any failure the checkout stays
    /// in `Payment` with the cart intact, ready for a retry.
    pub async fn finalize_checkout(&self, payment_reference: &str) -> Result<Order, CheckoutError> {
        let Some(customer) = self.mirror.my_account() else {
            return Err(CheckoutError::AuthenticationRequired);
        };

        let plan = match self.checkout.read().prepare(payment_reference) {
            Ok(plan) => plan,
            Err(CheckoutError::MissingPaymentReference) => {
                self.notifier.notify("Please enter bKash Transaction ID.");
                return Err(CheckoutError::MissingPaymentReference);
            }
            Err(e) => return Err(e),
        };

        let items = self.cart.read().snapshot();
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        // Freeze the selected addresses by value. A selection deleted since
        // the address stage resolves to None, exactly like the source data.
        let shipping = customer
            .addresses
            .iter()
            .find(|a| a.id == plan.shipping_address_id)
            .cloned();
        let billing = customer
            .addresses
            .iter()
            .find(|a| a.id == plan.billing_address_id)
            .cloned();

        let (order, account) = self
            .orders
            .finalize(
                &customer,
                items,
                shipping,
                billing,
                plan.order_id,
                plan.payment_reference,
            )
            .await?;

        self.checkout.write().complete();
        self.cart.write().clear();
        self.mirror.upsert_user(account);
        let _ = self.events.send(StorefrontEvent::OrderFinalized {
            email: order.customer_email.clone(),
            order_id: order.id.clone(),
            total: order.total,
        });
        self.notifier.notify("Purchase successful! Database updated.");
        Ok(order)
    }

    // ========== Orders ==========

    /// Map one order to a new status on the owning account.
    pub async fn update_order_status(
        &self,
        owner_email: &str,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<Order, StoreError> {
        let email = UserAccount::normalize_email(owner_email);
        let (order, account) = self.orders.update_status(&email, order_id, status).await?;
        self.mirror.upsert_user(account);
        let _ = self.events.send(StorefrontEvent::OrderStatusChanged {
            email: order.customer_email.clone(),
            order_id: order.id.clone(),
            status: order.status,
        });
        self.notifier.notify(&format!("Status changed to {status}"));
        Ok(order)
    }

    /// Every order across all accounts, most recent first, re-stamped with
    /// current contact details.
    pub fn orders_overview(&self) -> Vec<Order> {
        OrderRepository::overview(&self.mirror.users())
    }

    // ========== Reviews ==========

    /// Submit a review for a product as the identified account.
    pub async fn submit_review(
        &self,
        product_id: &str,
        rating: Decimal,
        comment: &str,
    ) -> Result<Review, ReviewError> {
        let Some(author) = self.mirror.identified_email() else {
            return Err(ReviewError::NotSignedIn);
        };
        let outcome = self
            .reviews
            .submit(&author, product_id, rating, comment)
            .await?;
        self.mirror.upsert_user(outcome.account);
        self.mirror.upsert_product(outcome.product);
        let _ = self.events.send(StorefrontEvent::ReviewSubmitted {
            email: author,
            product_id: outcome.review.product_id.clone(),
            rating: outcome.review.rating,
        });
        self.notifier.notify("Review submitted successfully.");
        Ok(outcome.review)
    }

    /// Reviews for one product, most recent first, author names joined live.
    pub fn reviews_for(&self, product_id: &str) -> impl Stream<Item = ReviewView> + Send + 'static {
        self.reviews.reviews_for(product_id)
    }

    // ========== Catalog maintenance ==========

    /// Create or update a product from a draft.
    ///
    /// A draft with an id updates that document, keeping its reference code
    /// and falling back to stored values for fields the draft omits. A draft
    /// without an id creates a new document, generating a reference code
    /// from the category when none is supplied.
    pub async fn save_product(&self, draft: ProductDraft) -> Result<Product, CatalogError> {
        validate_required_text(&draft.name, "name", MAX_NAME_LEN)
            .map_err(CatalogError::Validation)?;
        if !is_known_category(&draft.category) {
            return Err(CatalogError::Validation(format!(
                "Unknown category: {}",
                draft.category
            )));
        }
        if draft.price < 0 {
            return Err(CatalogError::Validation(
                "price must not be negative".to_string(),
            ));
        }
        if let Some(description) = &draft.description {
            validate_optional_text(description, "description", MAX_DESCRIPTION_LEN)
                .map_err(CatalogError::Validation)?;
        }
        if let Some(rating) = draft.rating
            && (rating < Decimal::ZERO || rating > Decimal::from(5))
        {
            return Err(CatalogError::Validation(format!(
                "Rating must be between 0 and 5, got {rating}"
            )));
        }

        let applied =
            pricing::apply_adjustment(draft.price, draft.adjustment_type, draft.adjustment_amount);

        let mut draft = draft;
        if let Some(id) = draft.id.take() {
            let product = self
                .store
                .mutate_product(
                    &id,
                    Box::new(move |product| {
                        product.name = draft.name;
                        if let Some(description) = draft.description {
                            product.description = description;
                        }
                        product.category = draft.category;
                        product.price = applied.selling_price;
                        product.original_price = applied.original_price;
                        product.discount = applied.discount_label;
                        product.adjustment_type = draft.adjustment_type;
                        product.adjustment_amount = draft.adjustment_amount;
                        if let Some(reference) = draft.reference {
                            product.reference = reference;
                        }
                        if let Some(rating) = draft.rating {
                            product.rating = rating;
                        }
                        if let Some(count) = draft.review_count {
                            product.review_count = count;
                        }
                        if let Some(in_stock) = draft.in_stock {
                            product.in_stock = in_stock;
                        }
                        product.specs = draft.specs;
                        product.image = draft.image;
                        product.video = draft.video;
                        Ok(())
                    }),
                )
                .await?;
            self.mirror.upsert_product(product.clone());
            info!(product_id = %product.id, "Product updated");
            self.notifier.notify("Blueprint updated successfully.");
            Ok(product)
        } else {
            let reference = match draft.reference.take() {
                Some(reference) if !reference.trim().is_empty() => reference,
                _ => reference::next_reference(&draft.category, &self.mirror.products()),
            };
            let product = Product {
                id: format!("proj-{}", Uuid::new_v4()),
                name: draft.name,
                description: draft
                    .description
                    .take()
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or_else(|| PLACEHOLDER_DESCRIPTION.to_string()),
                category: draft.category,
                price: applied.selling_price,
                original_price: applied.original_price,
                discount: applied.discount_label,
                adjustment_type: draft.adjustment_type,
                adjustment_amount: draft.adjustment_amount,
                reference,
                rating: draft.rating.unwrap_or_else(|| Decimal::from(5)),
                review_count: draft.review_count.unwrap_or(0),
                in_stock: draft.in_stock.unwrap_or(true),
                specs: draft.specs,
                image: draft.image,
                video: draft.video,
            };
            self.store.put_product(product.clone()).await?;
            self.mirror.upsert_product(product.clone());
            info!(product_id = %product.id, reference = %product.reference, "Product created");
            self.notifier.notify("New blueprint added to lab inventory.");
            Ok(product)
        }
    }

    /// Remove a product from the catalog. Cart lines and historical orders
    /// keep their frozen copies.
    pub async fn delete_product(&self, product_id: &str) -> Result<(), CatalogError> {
        self.store.delete_product(product_id).await?;
        self.mirror.remove_product(product_id);
        info!(product_id = %product_id, "Product deleted");
        self.notifier.notify("Project removed.");
        Ok(())
    }

    // ========== Address book ==========

    /// Add or edit an address on the identified account. A draft with an id
    /// edits that address; without one a new address is appended.
    pub async fn save_address(&self, draft: AddressDraft) -> AuthResult<Address> {
        let Some(email) = self.mirror.identified_email() else {
            return Err(AuthError::NotSignedIn);
        };
        for (value, field) in [
            (&draft.street, "street"),
            (&draft.city, "city"),
            (&draft.zip, "zip"),
            (&draft.country, "country"),
        ] {
            validate_required_text(value, field, MAX_ADDRESS_LEN).map_err(AuthError::Validation)?;
        }

        let mut draft = draft;
        let editing = draft.id.take();
        let is_edit = editing.is_some();
        let address = Address {
            id: editing
                .clone()
                .unwrap_or_else(|| format!("addr-{}", Uuid::new_v4())),
            kind: draft.kind,
            street: draft.street,
            city: draft.city,
            zip: draft.zip,
            country: draft.country,
        };

        let saved = address.clone();
        let account = self
            .store
            .mutate_user(
                &email,
                Box::new(move |account| {
                    match editing {
                        Some(id) => {
                            let slot = account
                                .addresses
                                .iter_mut()
                                .find(|a| a.id == id)
                                .ok_or_else(|| StoreError::NotFound(format!("addresses/{id}")))?;
                            *slot = saved;
                        }
                        None => account.addresses.push(saved),
                    }
                    Ok(())
                }),
            )
            .await?;

        self.mirror.upsert_user(account);
        self.notifier.notify(if is_edit {
            "Address updated."
        } else {
            "New address added."
        });
        Ok(address)
    }

    /// Remove an address from the identified account. Historical orders are
    /// unaffected; they carry copies.
    pub async fn delete_address(&self, address_id: &str) -> AuthResult<()> {
        let Some(email) = self.mirror.identified_email() else {
            return Err(AuthError::NotSignedIn);
        };
        let wanted = address_id.to_string();
        let account = self
            .store
            .mutate_user(
                &email,
                Box::new(move |account| {
                    account.addresses.retain(|a| a.id != wanted);
                    Ok(())
                }),
            )
            .await?;
        self.mirror.upsert_user(account);
        self.notifier.notify("Address removed.");
        Ok(())
    }
}
