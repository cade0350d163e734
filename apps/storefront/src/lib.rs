//! # FarmEase Storefront Library
//!
//! Application layer of the FarmEase storefront: configuration, the shared
//! state, the collaborator clients and the commands the UI (or the
//! `farmease` CLI) calls.
//!
//! ## Module Organization
//! ```text
//! farmease_storefront/
//! ├── lib.rs          ◄─── You are here (AppContext, logging, paths)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── cart.rs     ◄─── Cart store (persisted, auth-gated)
//! │   ├── stock.rs    ◄─── Stock reconciliation
//! │   ├── checkout.rs ◄─── Checkout sequencer
//! │   ├── session.rs  ◄─── Signed-in user
//! │   └── config.rs   ◄─── Environment configuration
//! ├── services/
//! │   ├── mod.rs      ◄─── Collaborator traits + ServiceError
//! │   ├── supabase.rs ◄─── Hosted backend REST client
//! │   ├── catalog.rs  ◄─── Offline catalog (SQLite)
//! │   ├── invoice.rs  ◄─── Invoice e-mail client
//! │   └── storage.rs  ◄─── Client storage backends
//! ├── commands/       ◄─── One function per UI action
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Dependency Injection
//! Nothing here is a global. [`AppContext`] is built once at startup and
//! passed by reference to every command.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    AppContext                                           │
//! │                                                                         │
//! │  ┌──────────────────┐ ┌──────────────────┐ ┌──────────────────────┐   │
//! │  │  Collaborators   │ │  Shared state    │ │  Config              │   │
//! │  │                  │ │                  │ │                      │   │
//! │  │  • DataService   │ │  • CartStore     │ │  • storage keys      │   │
//! │  │  • InvoiceSvc    │ │  • StockState    │ │  • payment delay     │   │
//! │  │  • ClientStorage │ │  • Checkout      │ │  • backend creds     │   │
//! │  │  • Database      │ │  • SessionState  │ │                      │   │
//! │  └──────────────────┘ └──────────────────┘ └──────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod services;
pub mod state;

use std::path::PathBuf;
use std::sync::Arc;

use directories::ProjectDirs;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub use error::{ApiError, ErrorCode};
use farmease_store::{Database, DbConfig};
use services::{
    ClientStorage, DataService, EmailJsClient, InvoiceService, LocalCatalog, ServiceResult,
    SupabaseClient,
};
use state::{CartStore, CheckoutSequencer, SessionState, StockState, StorefrontConfig};

/// Everything a command needs, built once at startup.
pub struct AppContext {
    pub config: StorefrontConfig,
    pub db: Database,
    pub data: Arc<dyn DataService>,
    pub session: Arc<SessionState>,
    pub cart: CartStore,
    pub stock: StockState,
    pub checkout: CheckoutSequencer,
}

impl AppContext {
    /// Builds the context from configuration.
    ///
    /// ## Startup Sequence
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────────┐
    /// │  1. Open SQLite (platform data dir or FARMEASE_DB_PATH), migrate        │
    /// │  2. Pick the data service: hosted backend if configured, else the       │
    /// │     local catalog                                                       │
    /// │  3. Restore the saved session, re-validated with the data service       │
    /// │  4. Restore the saved cart (corrupt snapshot → empty cart)              │
    /// └─────────────────────────────────────────────────────────────────────────┘
    /// ```
    pub async fn initialize(config: StorefrontConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let db_path = get_database_path(&config)?;
        info!(?db_path, "Database path determined");

        let db = Database::new(DbConfig::new(db_path)).await?;
        info!("Database connected and migrations applied");

        Ok(Self::from_database(config, db).await?)
    }

    /// Builds the context over an already opened database, choosing the
    /// collaborators from `config`.
    pub async fn from_database(config: StorefrontConfig, db: Database) -> ServiceResult<Self> {
        let data: Arc<dyn DataService> = match &config.supabase {
            Some(supabase) => {
                info!(url = %supabase.url, "Using hosted backend");
                Arc::new(SupabaseClient::new(supabase.clone()))
            }
            None => {
                info!("No hosted backend configured, using local catalog");
                Arc::new(LocalCatalog::new(db.clone()))
            }
        };
        let invoices = Arc::new(EmailJsClient::new(config.emailjs.clone()));
        let storage = Arc::new(db.storage());

        Self::with_services(config, db, data, invoices, storage).await
    }

    /// Builds the context from explicit collaborators.
    pub async fn with_services(
        config: StorefrontConfig,
        db: Database,
        data: Arc<dyn DataService>,
        invoices: Arc<dyn InvoiceService>,
        storage: Arc<dyn ClientStorage>,
    ) -> ServiceResult<Self> {
        let session = Arc::new(SessionState::new(
            storage.clone(),
            data.clone(),
            config.session_key.clone(),
        ));
        session.restore().await?;

        let cart = CartStore::load(storage, session.clone(), config.cart_key.clone()).await?;
        let stock = StockState::new(data.clone());
        let checkout = CheckoutSequencer::new(invoices, config.payment_delay);

        info!("State initialized");
        Ok(AppContext {
            config,
            db,
            data,
            session,
            cart,
            stock,
            checkout,
        })
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=farmease=trace` - Show trace for farmease crates only
/// - Default: INFO, DEBUG for farmease crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,farmease=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Determines the database file path.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.farmease.storefront/farmease.db`
/// - **Windows**: `%APPDATA%\farmease\storefront\data\farmease.db`
/// - **Linux**: `~/.local/share/storefront/farmease.db`
///
/// `FARMEASE_DB_PATH` (through [`StorefrontConfig::db_path`]) overrides it.
pub fn get_database_path(config: &StorefrontConfig) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(path) = &config.db_path {
        return Ok(path.clone());
    }

    let proj_dirs = ProjectDirs::from("com", "farmease", "storefront")
        .ok_or("Could not determine app data directory")?;

    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.join("farmease.db"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use farmease_core::{Product, ProductCategory};

    #[tokio::test]
    async fn test_offline_context_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products()
            .insert(&Product {
                id: "spinach".into(),
                name: "Fresh Spinach (bunch)".into(),
                price: "₹20".into(),
                image: String::new(),
                category: ProductCategory::FruitsAndVegetables,
                stock: 35,
                description: None,
                seller_id: None,
            })
            .await
            .unwrap();

        let ctx = AppContext::from_database(StorefrontConfig::default(), db.clone())
            .await
            .unwrap();
        assert!(ctx.session.current().await.is_none());
        assert!(ctx.cart.is_empty().await);

        ctx.session.sign_in("farmer@example.com", "pw").await.unwrap();
        commands::cart::add_to_cart(&ctx, "spinach", 2).await.unwrap();

        // a second context over the same database sees the session and cart
        let again = AppContext::from_database(StorefrontConfig::default(), db)
            .await
            .unwrap();
        assert!(again.session.current().await.is_some());
        assert_eq!(again.cart.total_item_count().await, 2);
    }

    #[test]
    fn test_db_path_override() {
        let config = StorefrontConfig {
            db_path: Some(PathBuf::from("/tmp/farm.db")),
            ..StorefrontConfig::default()
        };
        assert_eq!(get_database_path(&config).unwrap(), PathBuf::from("/tmp/farm.db"));
    }
}
