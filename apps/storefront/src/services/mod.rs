//! # Collaborator Services
//!
//! Everything outside the storefront process sits behind one of four
//! object-safe traits, so the state layer can be driven by real clients in
//! production and by in-process fakes in tests.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Trait            Production impl           Offline / test impl        │
//! │  ─────            ───────────────           ───────────────────        │
//! │  DataService      SupabaseClient (REST)     LocalCatalog (SQLite)      │
//! │  AuthService      SessionState              fakes                      │
//! │  InvoiceService   EmailJsClient (REST)      fakes                      │
//! │  ClientStorage    StorageRepository         MemoryStorage              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every backend answer is decoded into a typed result here, before it
//! reaches the cart or stock code.

pub mod catalog;
pub mod invoice;
pub mod storage;
pub mod supabase;

use async_trait::async_trait;
use thiserror::Error;

use farmease_core::{OrderSummary, Product, StockSnapshot, UserSession, UserType, ValidationError};
use farmease_store::DbError;

pub use catalog::LocalCatalog;
pub use invoice::{EmailJsClient, EmailJsConfig};
pub use storage::MemoryStorage;
pub use supabase::{SupabaseClient, SupabaseConfig};

// =============================================================================
// Service Error
// =============================================================================

/// Failures of an external collaborator.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Transport or body decoding failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response.
    #[error("unexpected response ({status}): {body}")]
    UnexpectedResponse { status: u16, body: String },

    /// The backend rejected the credentials or token.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Required credentials are missing from configuration.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    /// Local SQLite storage failed.
    #[error("storage error: {0}")]
    Storage(#[from] DbError),

    /// A stored value could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Result of creating an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUp {
    /// The account is usable right away.
    SignedIn(UserSession),
    /// The backend sent a confirmation e-mail; sign in after confirming.
    ConfirmationRequired { email: String },
}

// =============================================================================
// Traits
// =============================================================================

/// The catalog backend.
#[async_trait]
pub trait DataService: Send + Sync {
    /// Current stock for `ids`, in one batched lookup. Ids the backend does
    /// not know are absent from the snapshot.
    async fn fetch_stock_levels(&self, ids: &[String]) -> ServiceResult<StockSnapshot>;

    async fn fetch_product(&self, id: &str) -> ServiceResult<Option<Product>>;

    /// Exchanges e-mail and password for a session.
    async fn sign_in(&self, email: &str, password: &str) -> ServiceResult<UserSession>;

    /// Creates an account on one side of the marketplace.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        user_type: UserType,
    ) -> ServiceResult<SignUp>;

    /// Re-validates a restored session. `Ok(None)` means the backend no
    /// longer accepts it.
    async fn fetch_auth_session(&self, session: &UserSession)
        -> ServiceResult<Option<UserSession>>;
}

/// Gate for cart mutations.
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn is_authenticated(&self) -> bool;
}

/// Sends the invoice e-mail for a paid order.
#[async_trait]
pub trait InvoiceService: Send + Sync {
    async fn send_invoice(&self, to_email: &str, order: &OrderSummary) -> ServiceResult<()>;
}

/// Durable client key-value storage.
#[async_trait]
pub trait ClientStorage: Send + Sync {
    async fn get(&self, key: &str) -> ServiceResult<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> ServiceResult<()>;
    async fn remove(&self, key: &str) -> ServiceResult<()>;
}
