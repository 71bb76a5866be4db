//! Circuit Store Core - ordering and catalog-synchronization engine
//!
//! # Architecture overview
//!
//! The engine keeps a continuously-updated in-memory mirror of a remote
//! document store and drives every purchase-path command against it:
//!
//! - **Remote store** (`store`): document contract plus full-collection
//!   snapshot notifications
//! - **Catalog mirror** (`catalog`): wholesale-replace read model, reference
//!   code generation
//! - **Checkout** (`checkout`): session cart and the staged purchase machine
//! - **Orders** (`orders`): finalize, status lifecycle, admin overview
//! - **Reviews** (`reviews`): count-weighted rating folds, live author joins
//! - **Auth** (`auth`): digested credentials over an identity provider
//! - **Session** (`session`): durable slot for the identified account
//!
//! # Module structure
//!
//! ```text
//! store-core/src/
//! ├── core/          # configuration, storefront composition root
//! ├── store/         # remote-store contract + in-memory implementation
//! ├── catalog/       # mirror, reference codes
//! ├── checkout/      # cart, checkout state machine
//! ├── orders/        # order repository
//! ├── reviews/       # review aggregation
//! ├── auth/          # identity, credential digests
//! ├── session/       # redb session cache
//! ├── notify/        # notification sink
//! ├── pricing/       # price adjustment arithmetic
//! └── utils/         # logger, validation
//! ```

pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod core;
pub mod notify;
pub mod orders;
pub mod pricing;
pub mod reviews;
pub mod session;
pub mod store;
pub mod utils;

// Re-export public types
pub use auth::{AuthError, AuthService, IdentityProvider, SharedIdentity, SignUp, StoreIdentity};
pub use catalog::CatalogMirror;
pub use checkout::{Cart, CheckoutError, CheckoutStage, CheckoutStateMachine};
pub use core::{CatalogError, StoreConfig, Storefront};
pub use notify::{BufferNotifier, Notifier, SharedNotifier, TracingNotifier};
pub use orders::OrderRepository;
pub use reviews::{ReviewAggregator, ReviewError, ReviewView, fold_rating};
pub use session::{
    MemorySessionCache, RedbSessionCache, SessionCache, SessionError, SharedSessionCache,
};
pub use store::{MemoryStore, RemoteStore, SharedStore, StoreError, StoreResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
