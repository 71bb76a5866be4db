//! Authentication
//!
//! Identity is an external collaborator: the engine only needs a
//! lookup/insert contract over account documents keyed by normalized email,
//! plus digest equality for credentials. Secrets are digested with SHA-256
//! over `email:secret` before they touch a document; the plaintext is never
//! stored or logged.

use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use shared::models::{Role, UserAccount};
use thiserror::Error;
use tracing::{debug, info};

use crate::store::{SharedStore, StoreError};
use crate::utils::validation::{
    MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_SECRET_LEN, MAX_SHORT_TEXT_LEN, validate_required_text,
};

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Email already registered: {0}")]
    DuplicateIdentity(String),

    #[error("Invalid credentials")]
    Authentication,

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// External identity book: lookup and insert over account documents.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Find an account by normalized email.
    async fn lookup(&self, email: &str) -> AuthResult<Option<UserAccount>>;

    /// Insert a new account; fails with [`AuthError::DuplicateIdentity`]
    /// when the email is already claimed.
    async fn create(&self, account: UserAccount) -> AuthResult<()>;
}

/// Shared handle to the identity provider
pub type SharedIdentity = Arc<dyn IdentityProvider>;

/// Identity provider backed by the remote store's `users` collection
pub struct StoreIdentity {
    store: SharedStore,
}

impl StoreIdentity {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl IdentityProvider for StoreIdentity {
    async fn lookup(&self, email: &str) -> AuthResult<Option<UserAccount>> {
        Ok(self.store.get_user(email).await?)
    }

    async fn create(&self, account: UserAccount) -> AuthResult<()> {
        let email = account.email.clone();
        match self.store.create_user(account).await {
            Ok(()) => Ok(()),
            Err(StoreError::Duplicate(_)) => Err(AuthError::DuplicateIdentity(email)),
            Err(e) => Err(AuthError::Persistence(e)),
        }
    }
}

/// Signup payload; the secret is digested immediately and dropped
#[derive(Debug, Clone)]
pub struct SignUp {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub secret: String,
}

/// SHA-256 hex digest of `normalized_email:secret`.
///
/// Binding the email into the digest keeps equal secrets from producing
/// equal digests across accounts.
pub fn credential_digest(normalized_email: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalized_email.as_bytes());
    hasher.update(b":");
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Sign-up and sign-in over an [`IdentityProvider`]
pub struct AuthService {
    identity: SharedIdentity,
}

impl AuthService {
    pub fn new(identity: SharedIdentity) -> Self {
        Self { identity }
    }

    /// Register a new account with the `user` role.
    pub async fn sign_up(&self, input: SignUp) -> AuthResult<UserAccount> {
        let account = build_account(&input, Role::User)?;
        self.identity.create(account.clone()).await?;
        info!(email = %account.email, "Account created");
        Ok(account)
    }

    /// Check a raw email/secret pair against the identity book.
    pub async fn sign_in(&self, email: &str, secret: &str) -> AuthResult<UserAccount> {
        let email = UserAccount::normalize_email(email);
        let Some(account) = self.identity.lookup(&email).await? else {
            debug!(email = %email, "Sign-in rejected: unknown email");
            return Err(AuthError::Authentication);
        };
        if account.credential_digest != credential_digest(&email, secret) {
            debug!(email = %email, "Sign-in rejected: digest mismatch");
            return Err(AuthError::Authentication);
        }
        Ok(account)
    }

    /// Ensure a bootstrap account exists, creating it with the given role if
    /// the email is unclaimed. An already-claimed email is left untouched.
    pub async fn ensure_account(&self, input: SignUp, role: Role) -> AuthResult<()> {
        let account = build_account(&input, role)?;
        match self.identity.create(account).await {
            Ok(()) => {
                info!(role = ?role, "Bootstrap account created");
                Ok(())
            }
            Err(AuthError::DuplicateIdentity(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

fn build_account(input: &SignUp, role: Role) -> AuthResult<UserAccount> {
    validate_required_text(&input.first_name, "first name", MAX_NAME_LEN)
        .map_err(AuthError::Validation)?;
    validate_required_text(&input.last_name, "last name", MAX_NAME_LEN)
        .map_err(AuthError::Validation)?;
    validate_required_text(&input.email, "email", MAX_EMAIL_LEN).map_err(AuthError::Validation)?;
    validate_required_text(&input.phone, "phone", MAX_SHORT_TEXT_LEN)
        .map_err(AuthError::Validation)?;
    validate_required_text(&input.secret, "password", MAX_SECRET_LEN)
        .map_err(AuthError::Validation)?;
    if !input.email.contains('@') {
        return Err(AuthError::Validation(
            "email must contain '@'".to_string(),
        ));
    }

    let email = UserAccount::normalize_email(&input.email);
    Ok(UserAccount {
        credential_digest: credential_digest(&email, &input.secret),
        email,
        first_name: input.first_name.trim().to_string(),
        last_name: input.last_name.trim().to_string(),
        phone: input.phone.trim().to_string(),
        role,
        addresses: Vec::new(),
        orders: Vec::new(),
        reviews: Vec::new(),
    })
}
