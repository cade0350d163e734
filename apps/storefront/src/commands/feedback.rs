//! Customer feedback: the footer form and the seller's feedback page.
//!
//! Anyone may leave feedback; a signed-in author is recorded with their id
//! and e-mail. Reading it back is for sellers only.

use tracing::{debug, info};

use super::seller_session;
use crate::error::ApiError;
use crate::AppContext;
use farmease_core::validation::{validate_feedback_text, validate_rating, validate_search_query};
use farmease_core::{CoreError, Feedback};
use farmease_store::NewFeedback;

/// Most rows the feedback page shows.
const FEEDBACK_PAGE_LIMIT: u32 = 200;

pub async fn submit_feedback(
    ctx: &AppContext,
    text: &str,
    rating: i64,
) -> Result<Feedback, ApiError> {
    debug!(rating, "submit_feedback command");

    let feedback = validate_feedback_text(text).map_err(CoreError::from)?;
    let rating = validate_rating(rating).map_err(CoreError::from)?;
    let author = ctx.session.current().await;

    let stored = ctx
        .db
        .feedback()
        .insert(&NewFeedback {
            user_id: author.as_ref().map(|s| s.user_id.clone()),
            user_email: author.and_then(|s| s.email),
            feedback,
            rating,
        })
        .await?;

    info!(id = %stored.id, rating, "Feedback received");
    Ok(stored)
}

/// Feedback for the seller's page, newest first, optionally narrowed to
/// rows whose text or author e-mail contains `query`.
pub async fn list_feedback(ctx: &AppContext, query: &str) -> Result<Vec<Feedback>, ApiError> {
    debug!(query = %query, "list_feedback command");

    seller_session(ctx, "read customer feedback").await?;
    let query = validate_search_query(query).map_err(CoreError::from)?;
    Ok(ctx.db.feedback().list(&query, FEEDBACK_PAGE_LIMIT).await?)
}
