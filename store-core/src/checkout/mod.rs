//! Checkout State Machine
//!
//! Drives a cart through `Idle → Info → Address → Payment → Finalized`.
//! Every transition validates its preconditions and leaves the machine
//! untouched when they fail, so a rejected step can simply be retried.
//! Persistence lives elsewhere: the machine hands out a finalize plan and
//! is only advanced to `Finalized` after the order has been committed.

pub mod cart;

pub use cart::Cart;

use rand::Rng;
use thiserror::Error;

use crate::store::StoreError;

/// Tag prepended to every order token
const ORDER_TOKEN_TAG: &str = "CP-";

/// Random characters in an order token
const ORDER_TOKEN_LEN: usize = 6;

const ORDER_TOKEN_CHARSET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Checkout stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutStage {
    #[default]
    Idle,
    Info,
    Address,
    Payment,
    Finalized,
}

/// Checkout errors
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Sign in before starting checkout")]
    AuthenticationRequired,

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Both a shipping and a billing address must be selected")]
    MissingAddressSelection,

    #[error("Payment reference must not be blank")]
    MissingPaymentReference,

    #[error("Checkout action {action} is not valid from {from:?}")]
    InvalidTransition {
        from: CheckoutStage,
        action: &'static str,
    },

    #[error(transparent)]
    Persistence(#[from] StoreError),
}

/// Everything the order builder needs from the machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizePlan {
    /// Order token minted on entry to `Payment`; becomes the order id
    pub order_id: String,
    /// Trimmed payment reference quoted by the customer
    pub payment_reference: String,
    pub shipping_address_id: String,
    pub billing_address_id: String,
}

/// Mint a fresh order token: the fixed tag plus six random characters.
pub fn mint_order_token() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ORDER_TOKEN_LEN)
        .map(|_| {
            let i = rng.gen_range(0..ORDER_TOKEN_CHARSET.len());
            ORDER_TOKEN_CHARSET[i] as char
        })
        .collect();
    format!("{ORDER_TOKEN_TAG}{suffix}")
}

/// Checkout flow for one session
#[derive(Debug, Default)]
pub struct CheckoutStateMachine {
    stage: CheckoutStage,
    shipping_address_id: Option<String>,
    billing_address_id: Option<String>,
    order_token: Option<String>,
}

impl CheckoutStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> CheckoutStage {
        self.stage
    }

    /// Token minted for the in-flight checkout, if one has reached `Payment`.
    pub fn order_token(&self) -> Option<&str> {
        self.order_token.as_deref()
    }

    pub fn shipping_address_id(&self) -> Option<&str> {
        self.shipping_address_id.as_deref()
    }

    pub fn billing_address_id(&self) -> Option<&str> {
        self.billing_address_id.as_deref()
    }

    /// Start a checkout. Requires an identified user and a non-empty cart;
    /// an unidentified user is diverted to sign in, never silently past it.
    pub fn begin(&mut self, authenticated: bool, cart: &Cart) -> Result<(), CheckoutError> {
        match self.stage {
            CheckoutStage::Idle | CheckoutStage::Finalized => {}
            from => {
                return Err(CheckoutError::InvalidTransition {
                    from,
                    action: "begin",
                });
            }
        }
        if !authenticated {
            return Err(CheckoutError::AuthenticationRequired);
        }
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        self.stage = CheckoutStage::Info;
        Ok(())
    }

    pub fn proceed_to_address(&mut self) -> Result<(), CheckoutError> {
        if self.stage != CheckoutStage::Info {
            return Err(CheckoutError::InvalidTransition {
                from: self.stage,
                action: "proceed_to_address",
            });
        }
        self.stage = CheckoutStage::Address;
        Ok(())
    }

    pub fn select_shipping(&mut self, address_id: impl Into<String>) -> Result<(), CheckoutError> {
        if self.stage != CheckoutStage::Address {
            return Err(CheckoutError::InvalidTransition {
                from: self.stage,
                action: "select_shipping",
            });
        }
        self.shipping_address_id = Some(address_id.into());
        Ok(())
    }

    pub fn select_billing(&mut self, address_id: impl Into<String>) -> Result<(), CheckoutError> {
        if self.stage != CheckoutStage::Address {
            return Err(CheckoutError::InvalidTransition {
                from: self.stage,
                action: "select_billing",
            });
        }
        self.billing_address_id = Some(address_id.into());
        Ok(())
    }

    /// Shortcut that points the billing selection at the shipping one.
    pub fn use_shipping_for_billing(&mut self) -> Result<(), CheckoutError> {
        if self.stage != CheckoutStage::Address {
            return Err(CheckoutError::InvalidTransition {
                from: self.stage,
                action: "use_shipping_for_billing",
            });
        }
        match &self.shipping_address_id {
            Some(id) => {
                self.billing_address_id = Some(id.clone());
                Ok(())
            }
            None => Err(CheckoutError::MissingAddressSelection),
        }
    }

    /// Advance to `Payment`. Requires both address selections; mints a fresh
    /// order token every time, including after stepping back.
    pub fn proceed_to_payment(&mut self) -> Result<&str, CheckoutError> {
        if self.stage != CheckoutStage::Address {
            return Err(CheckoutError::InvalidTransition {
                from: self.stage,
                action: "proceed_to_payment",
            });
        }
        if self.shipping_address_id.is_none() || self.billing_address_id.is_none() {
            return Err(CheckoutError::MissingAddressSelection);
        }
        self.stage = CheckoutStage::Payment;
        self.order_token = Some(mint_order_token());
        // Just assigned above.
        Ok(self.order_token.as_deref().unwrap_or_default())
    }

    /// Step back one stage. Selections and the minted token are kept so a
    /// forward step can reuse or replace them.
    pub fn back(&mut self) -> Result<(), CheckoutError> {
        self.stage = match self.stage {
            CheckoutStage::Payment => CheckoutStage::Address,
            CheckoutStage::Address => CheckoutStage::Info,
            CheckoutStage::Info => CheckoutStage::Idle,
            from => {
                return Err(CheckoutError::InvalidTransition {
                    from,
                    action: "back",
                });
            }
        };
        Ok(())
    }

    /// Abandon the checkout from any stage and drop all transient state.
    pub fn abort(&mut self) {
        self.stage = CheckoutStage::Idle;
        self.shipping_address_id = None;
        self.billing_address_id = None;
        self.order_token = None;
    }

    /// Validate the finalize preconditions and hand out the plan. Does not
    /// advance the machine: call [`CheckoutStateMachine::complete`] once the
    /// order is committed, or nothing on failure, and the user stays in
    /// `Payment` with everything intact.
    pub fn prepare(&self, payment_reference: &str) -> Result<FinalizePlan, CheckoutError> {
        if self.stage != CheckoutStage::Payment {
            return Err(CheckoutError::InvalidTransition {
                from: self.stage,
                action: "finalize",
            });
        }
        let reference = payment_reference.trim();
        if reference.is_empty() {
            return Err(CheckoutError::MissingPaymentReference);
        }
        let (Some(order_id), Some(shipping), Some(billing)) = (
            self.order_token.clone(),
            self.shipping_address_id.clone(),
            self.billing_address_id.clone(),
        ) else {
            return Err(CheckoutError::InvalidTransition {
                from: self.stage,
                action: "finalize",
            });
        };
        Ok(FinalizePlan {
            order_id,
            payment_reference: reference.to_string(),
            shipping_address_id: shipping,
            billing_address_id: billing,
        })
    }

    /// Mark the in-flight checkout as committed and drop transient state.
    pub fn complete(&mut self) {
        self.stage = CheckoutStage::Finalized;
        self.shipping_address_id = None;
        self.billing_address_id = None;
        self.order_token = None;
    }
}
