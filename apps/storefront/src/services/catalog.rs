//! Offline data service backed by the local SQLite catalog.
//!
//! Used when no hosted backend is configured. Sign-in is local: any
//! well-formed e-mail with a non-empty password gets a session without an
//! access token. Accounts live in the `profiles` table so the user id and
//! type survive a sign-out; an e-mail seen for the first time at sign-in
//! becomes a buyer.

use async_trait::async_trait;
use tracing::{debug, info};

use super::{DataService, ServiceResult, SignUp};
use farmease_core::validation::validate_email;
use farmease_core::{Product, StockSnapshot, UserSession, UserType, ValidationError};
use farmease_store::{Database, Profile};

#[derive(Debug, Clone)]
pub struct LocalCatalog {
    db: Database,
}

impl LocalCatalog {
    pub fn new(db: Database) -> Self {
        LocalCatalog { db }
    }
}

fn check_credentials(email: &str, password: &str) -> ServiceResult<()> {
    validate_email(email)?;
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        }
        .into());
    }
    Ok(())
}

fn offline_session(profile: Profile) -> UserSession {
    UserSession {
        user_id: profile.id,
        email: Some(profile.email),
        access_token: None,
        user_type: profile.user_type,
    }
}

#[async_trait]
impl DataService for LocalCatalog {
    async fn fetch_stock_levels(&self, ids: &[String]) -> ServiceResult<StockSnapshot> {
        let levels = self.db.products().stock_levels(ids).await?;
        debug!(found = levels.len(), "Local stock levels");
        Ok(StockSnapshot::from_levels(levels))
    }

    async fn fetch_product(&self, id: &str) -> ServiceResult<Option<Product>> {
        Ok(self.db.products().get_by_id(id).await?)
    }

    async fn sign_in(&self, email: &str, password: &str) -> ServiceResult<UserSession> {
        check_credentials(email, password)?;

        let profiles = self.db.profiles();
        let profile = match profiles.get_by_email(email).await? {
            Some(profile) => profile,
            None => profiles.create(email, UserType::Buyer).await?,
        };

        info!(email = %profile.email, user_type = %profile.user_type, "Offline sign-in");
        Ok(offline_session(profile))
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        user_type: UserType,
    ) -> ServiceResult<SignUp> {
        check_credentials(email, password)?;

        let profile = self.db.profiles().create(email, user_type).await?;
        info!(email = %profile.email, user_type = %user_type, "Offline sign-up");
        Ok(SignUp::SignedIn(offline_session(profile)))
    }

    /// Offline sessions stay valid; the user type is re-read in case the
    /// profile was recreated.
    async fn fetch_auth_session(
        &self,
        session: &UserSession,
    ) -> ServiceResult<Option<UserSession>> {
        let mut refreshed = session.clone();
        if let Some(profile) = self.db.profiles().get_by_id(&session.user_id).await? {
            refreshed.user_type = profile.user_type;
        }
        Ok(Some(refreshed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ServiceError;
    use farmease_core::ProductCategory;
    use farmease_store::DbConfig;

    async fn catalog() -> LocalCatalog {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products()
            .insert(&Product {
                id: "seed-drill".into(),
                name: "Seed Drill".into(),
                price: "₹650".into(),
                image: String::new(),
                category: ProductCategory::RentalEquipment,
                stock: 4,
                description: None,
                seller_id: None,
            })
            .await
            .unwrap();
        LocalCatalog::new(db)
    }

    #[tokio::test]
    async fn test_stock_levels_and_product() {
        let catalog = catalog().await;
        let snapshot = catalog
            .fetch_stock_levels(&["seed-drill".to_string(), "gone".to_string()])
            .await
            .unwrap();
        assert_eq!(snapshot.available("seed-drill"), Some(4));
        assert_eq!(snapshot.available("gone"), None);

        let product = catalog.fetch_product("seed-drill").await.unwrap().unwrap();
        assert!(product.category.is_rental());
    }

    #[tokio::test]
    async fn test_offline_sign_in() {
        let catalog = catalog().await;
        let session = catalog.sign_in(" farmer@example.com ", "pw").await.unwrap();
        assert_eq!(session.email.as_deref(), Some("farmer@example.com"));
        assert!(session.access_token.is_none());
        assert_eq!(session.user_type, UserType::Buyer);

        let again = catalog.sign_in("farmer@example.com", "pw").await.unwrap();
        assert_eq!(again.user_id, session.user_id);

        assert!(matches!(
            catalog.sign_in("farmer@example.com", "").await,
            Err(ServiceError::Validation(_))
        ));
        assert!(catalog.sign_in("nope", "pw").await.is_err());
    }

    #[tokio::test]
    async fn test_offline_sign_up_keeps_user_type() {
        let catalog = catalog().await;
        let SignUp::SignedIn(created) = catalog
            .sign_up("grower@example.com", "pw", UserType::Seller)
            .await
            .unwrap()
        else {
            panic!("offline sign-up always signs in");
        };
        assert!(created.is_seller());

        let signed_in = catalog.sign_in("grower@example.com", "pw").await.unwrap();
        assert_eq!(signed_in.user_id, created.user_id);
        assert!(signed_in.is_seller());

        assert!(matches!(
            catalog.sign_up("grower@example.com", "pw", UserType::Buyer).await,
            Err(ServiceError::Storage(farmease_store::DbError::UniqueViolation { .. }))
        ));
    }
}
