//! # Session State
//!
//! Holds the signed-in user and keeps it in client storage under the
//! session key so a restart does not sign the user out.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  restore()   storage["session"] ──► DataService::fetch_auth_session    │
//! │                  Some(session)  ──► keep (refreshed)                   │
//! │                  None           ──► drop + remove key                  │
//! │                  Err(network)   ──► keep as stored, warn               │
//! │                                                                         │
//! │  sign_in()   DataService::sign_in ──► memory + storage                 │
//! │  sign_up()   DataService::sign_up ──► SignedIn: memory + storage       │
//! │                                       ConfirmationRequired: unchanged  │
//! │  sign_out()  memory cleared, key removed                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::services::{AuthService, ClientStorage, DataService, ServiceResult, SignUp};
use farmease_core::{UserSession, UserType};

pub struct SessionState {
    session: RwLock<Option<UserSession>>,
    storage: Arc<dyn ClientStorage>,
    data: Arc<dyn DataService>,
    key: String,
}

impl SessionState {
    /// Creates a signed-out session state. Call [`SessionState::restore`] to
    /// pick up a stored session.
    pub fn new(
        storage: Arc<dyn ClientStorage>,
        data: Arc<dyn DataService>,
        key: impl Into<String>,
    ) -> Self {
        SessionState {
            session: RwLock::new(None),
            storage,
            data,
            key: key.into(),
        }
    }

    /// Loads the stored session and re-validates it with the backend.
    pub async fn restore(&self) -> ServiceResult<Option<UserSession>> {
        let Some(raw) = self.storage.get(&self.key).await? else {
            return Ok(None);
        };

        let stored: UserSession = match serde_json::from_str(&raw) {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable stored session");
                self.storage.remove(&self.key).await?;
                return Ok(None);
            }
        };

        let restored = match self.data.fetch_auth_session(&stored).await {
            Ok(Some(session)) => Some(session),
            Ok(None) => {
                info!(user_id = %stored.user_id, "Stored session expired");
                self.storage.remove(&self.key).await?;
                None
            }
            Err(e) => {
                warn!(error = %e, "Could not re-validate session, keeping stored copy");
                Some(stored)
            }
        };

        *self.session.write().await = restored.clone();
        Ok(restored)
    }

    pub async fn current(&self) -> Option<UserSession> {
        self.session.read().await.clone()
    }

    /// E-mail of the signed-in user, if any.
    pub async fn email(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .and_then(|session| session.email.clone())
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> ServiceResult<UserSession> {
        let session = self.data.sign_in(email, password).await?;
        self.store(&session).await?;

        info!(user_id = %session.user_id, user_type = %session.user_type, "Signed in");
        Ok(session)
    }

    /// Creates an account. When the backend hands back a usable session the
    /// user is signed in with it, replacing any current session.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        user_type: UserType,
    ) -> ServiceResult<SignUp> {
        let outcome = self.data.sign_up(email, password, user_type).await?;

        match &outcome {
            SignUp::SignedIn(session) => {
                self.store(session).await?;
                info!(user_id = %session.user_id, user_type = %user_type, "Signed up");
            }
            SignUp::ConfirmationRequired { email } => {
                info!(email = %email, "Signed up, confirmation pending");
            }
        }
        Ok(outcome)
    }

    async fn store(&self, session: &UserSession) -> ServiceResult<()> {
        let raw = serde_json::to_string(session)?;
        self.storage.set(&self.key, &raw).await?;
        *self.session.write().await = Some(session.clone());
        Ok(())
    }

    pub async fn sign_out(&self) -> ServiceResult<()> {
        let previous = self.session.write().await.take();
        self.storage.remove(&self.key).await?;
        if let Some(session) = previous {
            info!(user_id = %session.user_id, "Signed out");
        }
        Ok(())
    }
}

#[async_trait]
impl AuthService for SessionState {
    async fn is_authenticated(&self) -> bool {
        let signed_in = self.session.read().await.is_some();
        debug!(signed_in, "Auth check");
        signed_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{MemoryStorage, ServiceError};
    use farmease_core::{Product, StockSnapshot};

    /// Data service whose session validation answer is fixed.
    struct FakeAuth {
        valid: Option<bool>,
    }

    #[async_trait]
    impl DataService for FakeAuth {
        async fn fetch_stock_levels(&self, _ids: &[String]) -> ServiceResult<StockSnapshot> {
            Ok(StockSnapshot::new())
        }

        async fn fetch_product(&self, _id: &str) -> ServiceResult<Option<Product>> {
            Ok(None)
        }

        async fn sign_in(&self, email: &str, _password: &str) -> ServiceResult<UserSession> {
            Ok(UserSession {
                user_id: "u-1".into(),
                email: Some(email.into()),
                access_token: Some("tok".into()),
                user_type: UserType::Buyer,
            })
        }

        async fn sign_up(
            &self,
            email: &str,
            _password: &str,
            user_type: UserType,
        ) -> ServiceResult<SignUp> {
            if email.starts_with("confirm") {
                return Ok(SignUp::ConfirmationRequired {
                    email: email.to_string(),
                });
            }
            Ok(SignUp::SignedIn(UserSession {
                user_id: "u-2".into(),
                email: Some(email.into()),
                access_token: Some("tok".into()),
                user_type,
            }))
        }

        async fn fetch_auth_session(
            &self,
            session: &UserSession,
        ) -> ServiceResult<Option<UserSession>> {
            match self.valid {
                Some(true) => Ok(Some(session.clone())),
                Some(false) => Ok(None),
                None => Err(ServiceError::UnexpectedResponse {
                    status: 503,
                    body: String::new(),
                }),
            }
        }
    }

    fn stored_session() -> String {
        serde_json::to_string(&UserSession {
            user_id: "u-1".into(),
            email: Some("farmer@example.com".into()),
            access_token: Some("tok".into()),
            user_type: UserType::Buyer,
        })
        .unwrap()
    }

    fn state(valid: Option<bool>, storage: Arc<MemoryStorage>) -> SessionState {
        SessionState::new(storage, Arc::new(FakeAuth { valid }), "session")
    }

    #[tokio::test]
    async fn test_sign_in_persists_and_sign_out_removes() {
        let storage = Arc::new(MemoryStorage::new());
        let sessions = state(Some(true), storage.clone());
        assert!(!sessions.is_authenticated().await);

        sessions.sign_in("farmer@example.com", "pw").await.unwrap();
        assert!(sessions.is_authenticated().await);
        assert_eq!(sessions.email().await.as_deref(), Some("farmer@example.com"));
        assert!(storage.get("session").await.unwrap().is_some());

        sessions.sign_out().await.unwrap();
        assert!(!sessions.is_authenticated().await);
        assert!(storage.get("session").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sign_up_signs_in_when_session_returned() {
        let storage = Arc::new(MemoryStorage::new());
        let sessions = state(Some(true), storage.clone());

        let outcome = sessions
            .sign_up("grower@example.com", "pw", UserType::Seller)
            .await
            .unwrap();
        assert!(matches!(outcome, SignUp::SignedIn(_)));
        assert!(sessions.current().await.unwrap().is_seller());

        let raw = storage.get("session").await.unwrap().unwrap();
        let stored: UserSession = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored.user_type, UserType::Seller);
    }

    #[tokio::test]
    async fn test_sign_up_pending_confirmation_stays_signed_out() {
        let storage = Arc::new(MemoryStorage::new());
        let sessions = state(Some(true), storage.clone());

        let outcome = sessions
            .sign_up("confirm@example.com", "pw", UserType::Buyer)
            .await
            .unwrap();
        assert!(matches!(outcome, SignUp::ConfirmationRequired { .. }));
        assert!(!sessions.is_authenticated().await);
        assert!(storage.get("session").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_restore_valid_session() {
        let storage = Arc::new(MemoryStorage::with_entry("session", stored_session()));
        let sessions = state(Some(true), storage);
        assert!(sessions.restore().await.unwrap().is_some());
        assert!(sessions.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_restore_expired_session_drops_it() {
        let storage = Arc::new(MemoryStorage::with_entry("session", stored_session()));
        let sessions = state(Some(false), storage.clone());
        assert!(sessions.restore().await.unwrap().is_none());
        assert!(!sessions.is_authenticated().await);
        assert!(storage.get("session").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_restore_offline_keeps_stored_session() {
        let storage = Arc::new(MemoryStorage::with_entry("session", stored_session()));
        let sessions = state(None, storage);
        assert!(sessions.restore().await.unwrap().is_some());
        assert!(sessions.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_restore_garbage_session() {
        let storage = Arc::new(MemoryStorage::with_entry("session", "{not json"));
        let sessions = state(Some(true), storage.clone());
        assert!(sessions.restore().await.unwrap().is_none());
        assert!(storage.get("session").await.unwrap().is_none());
    }
}
