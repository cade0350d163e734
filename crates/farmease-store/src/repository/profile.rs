//! # Profile Repository
//!
//! Local accounts for offline sign-up and sign-in. Passwords are not kept:
//! offline sign-in trusts the e-mail, and the profile only remembers which
//! side of the marketplace the account is on.

use chrono::Utc;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use farmease_core::UserType;

/// A local account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub user_type: UserType,
}

#[derive(Debug, FromRow)]
struct ProfileRow {
    id: String,
    email: String,
    user_type: String,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = DbError;

    fn try_from(row: ProfileRow) -> DbResult<Self> {
        let user_type = UserType::parse(&row.user_type).ok_or_else(|| {
            DbError::Internal(format!("profile {} has user type '{}'", row.id, row.user_type))
        })?;

        Ok(Profile {
            id: row.id,
            email: row.email,
            user_type,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ProfileRepository {
    pool: SqlitePool,
}

impl ProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProfileRepository { pool }
    }

    /// Creates an account. E-mails are unique ignoring ASCII case.
    pub async fn create(&self, email: &str, user_type: UserType) -> DbResult<Profile> {
        let email = email.trim();
        let id = Uuid::new_v4().to_string();

        debug!(email = %email, user_type = %user_type, "Creating profile");

        sqlx::query(
            "INSERT INTO profiles (id, email, user_type, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&id)
        .bind(email)
        .bind(user_type.as_str())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("email", email),
            other => other,
        })?;

        Ok(Profile {
            id,
            email: email.to_string(),
            user_type,
        })
    }

    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<Profile>> {
        let row: Option<ProfileRow> =
            sqlx::query_as("SELECT id, email, user_type FROM profiles WHERE email = ?1")
                .bind(email.trim())
                .fetch_optional(&self.pool)
                .await?;

        row.map(Profile::try_from).transpose()
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Profile>> {
        let row: Option<ProfileRow> =
            sqlx::query_as("SELECT id, email, user_type FROM profiles WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Profile::try_from).transpose()
    }
}
