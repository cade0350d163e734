//! # Feedback Repository
//!
//! Customer ratings left from the site footer, read back newest first on
//! the seller's feedback page.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Footer form ── insert(user?, email?, text, rating) ──► feedback       │
//! │                                                                         │
//! │  Seller page ── list(query, limit)                                     │
//! │                    WHERE feedback LIKE %q% OR user_email LIKE %q%      │
//! │                    ORDER BY created_at DESC                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use farmease_core::Feedback;

/// What the footer form submits.
#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub user_id: Option<String>,
    pub user_email: Option<String>,
    pub feedback: String,
    pub rating: u8,
}

#[derive(Debug, FromRow)]
struct FeedbackRow {
    id: String,
    user_id: Option<String>,
    user_email: Option<String>,
    feedback: String,
    rating: i64,
    created_at: String,
}

impl TryFrom<FeedbackRow> for Feedback {
    type Error = DbError;

    fn try_from(row: FeedbackRow) -> DbResult<Self> {
        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|e| DbError::Internal(format!("feedback {} created_at: {e}", row.id)))?
            .with_timezone(&Utc);
        let rating = u8::try_from(row.rating)
            .map_err(|_| DbError::Internal(format!("feedback {} rating {}", row.id, row.rating)))?;

        Ok(Feedback {
            id: row.id,
            user_id: row.user_id,
            user_email: row.user_email,
            feedback: row.feedback,
            rating,
            created_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct FeedbackRepository {
    pool: SqlitePool,
}

impl FeedbackRepository {
    pub fn new(pool: SqlitePool) -> Self {
        FeedbackRepository { pool }
    }

    /// Stores a rating. A rating outside 1..=5 is a `ConstraintViolation`.
    pub async fn insert(&self, new: &NewFeedback) -> DbResult<Feedback> {
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now();

        debug!(id = %id, rating = new.rating, signed_in = new.user_id.is_some(), "Inserting feedback");

        sqlx::query(
            r#"
            INSERT INTO feedback (id, user_id, user_email, feedback, rating, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&id)
        .bind(&new.user_id)
        .bind(&new.user_email)
        .bind(&new.feedback)
        .bind(i64::from(new.rating))
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(Feedback {
            id,
            user_id: new.user_id.clone(),
            user_email: new.user_email.clone(),
            feedback: new.feedback.clone(),
            rating: new.rating,
            created_at,
        })
    }

    /// Newest first. A non-empty `query` keeps rows whose text or author
    /// e-mail contains it, ASCII case-insensitive.
    pub async fn list(&self, query: &str, limit: u32) -> DbResult<Vec<Feedback>> {
        let query = query.trim();
        let escaped = query
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let pattern = format!("%{escaped}%");

        let rows: Vec<FeedbackRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, user_email, feedback, rating, created_at
            FROM feedback
            WHERE feedback LIKE ?1 ESCAPE '\' OR user_email LIKE ?1 ESCAPE '\'
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?2
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(query = %query, count = rows.len(), "Listed feedback");
        rows.into_iter().map(Feedback::try_from).collect()
    }
}
