//! Sign-up, sign-in and sign-out commands.

use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::services::SignUp;
use crate::AppContext;
use farmease_core::{UserSession, UserType};

/// The session as the UI sees it. The access token never leaves the
/// backend layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user_id: String,
    pub email: Option<String>,
    /// Decides which of the buy or sell actions the UI offers.
    pub user_type: UserType,
}

impl From<UserSession> for SessionResponse {
    fn from(session: UserSession) -> Self {
        SessionResponse {
            user_id: session.user_id,
            email: session.email,
            user_type: session.user_type,
        }
    }
}

/// What the sign-up form shows next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SignUpResponse {
    SignedIn { session: SessionResponse },
    /// "Check your e-mail to confirm your account, then sign in."
    ConfirmationRequired { email: String },
}

pub async fn sign_up(
    ctx: &AppContext,
    email: &str,
    password: &str,
    user_type: UserType,
) -> Result<SignUpResponse, ApiError> {
    debug!(email = %email, user_type = %user_type, "sign_up command");

    Ok(match ctx.session.sign_up(email, password, user_type).await? {
        SignUp::SignedIn(session) => SignUpResponse::SignedIn {
            session: session.into(),
        },
        SignUp::ConfirmationRequired { email } => SignUpResponse::ConfirmationRequired { email },
    })
}

pub async fn sign_in(
    ctx: &AppContext,
    email: &str,
    password: &str,
) -> Result<SessionResponse, ApiError> {
    debug!(email = %email, "sign_in command");
    let session = ctx.session.sign_in(email, password).await?;
    Ok(session.into())
}

/// Signs out. The cart stays as it is; only further adds are refused.
pub async fn sign_out(ctx: &AppContext) -> Result<(), ApiError> {
    debug!("sign_out command");
    Ok(ctx.session.sign_out().await?)
}

pub async fn current_session(ctx: &AppContext) -> Result<Option<SessionResponse>, ApiError> {
    debug!("current_session command");
    Ok(ctx.session.current().await.map(SessionResponse::from))
}
