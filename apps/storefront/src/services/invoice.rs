//! # Invoice E-mail
//!
//! Sends the order invoice through the EmailJS REST API once a payment has
//! been accepted.
//!
//! ## Template Parameters
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  to_email         customer address                                     │
//! │  order_number     ORD-XXXXXXXXX                                        │
//! │  order_date       October 15th, 2026                                   │
//! │  total_amount     ₹1,234.50                                            │
//! │  items_list       one "Name (2x) - ₹90.00" line per item               │
//! │  items_list_html  <tr> rows: name, qty, price, line total              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::{Datelike, Local, NaiveDate};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{InvoiceService, ServiceError, ServiceResult};
use farmease_core::{line_total_display, OrderSummary};

pub const EMAILJS_API_URL: &str = "https://api.emailjs.com";

/// EmailJS credentials. Any of them may be missing; sending then fails with
/// [`ServiceError::NotConfigured`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailJsConfig {
    pub service_id: Option<String>,
    pub template_id: Option<String>,
    pub public_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EmailJsClient {
    config: EmailJsConfig,
    base_url: String,
    http: Client,
}

impl EmailJsClient {
    pub fn new(config: EmailJsConfig) -> Self {
        Self::with_base_url(config, EMAILJS_API_URL)
    }

    /// Points the client at another host (tests, proxies).
    pub fn with_base_url(config: EmailJsConfig, base_url: impl Into<String>) -> Self {
        EmailJsClient {
            config,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }
}

#[async_trait]
impl InvoiceService for EmailJsClient {
    async fn send_invoice(&self, to_email: &str, order: &OrderSummary) -> ServiceResult<()> {
        let service_id = self
            .config
            .service_id
            .as_deref()
            .ok_or(ServiceError::NotConfigured("EmailJS service id"))?;
        let template_id = self
            .config
            .template_id
            .as_deref()
            .ok_or(ServiceError::NotConfigured("EmailJS template id"))?;
        let public_key = self
            .config
            .public_key
            .as_deref()
            .ok_or(ServiceError::NotConfigured("EmailJS public key"))?;

        let body = json!({
            "service_id": service_id,
            "template_id": template_id,
            "user_id": public_key,
            "template_params": template_params(to_email, order, Local::now().date_naive()),
        });

        debug!(order = %order.order_number, "Sending invoice");
        let response = self
            .http
            .post(format!("{}/api/v1.0/email/send", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::UnexpectedResponse {
                status: status.as_u16(),
                body,
            });
        }

        info!(order = %order.order_number, to = %to_email, "Invoice sent");
        Ok(())
    }
}

// =============================================================================
// Template Rendering
// =============================================================================

/// Builds the template parameters for `order`, dated `date`.
pub fn template_params(to_email: &str, order: &OrderSummary, date: NaiveDate) -> Value {
    let items_list = order
        .items
        .iter()
        .map(|line| format!("{} ({}x) - {}", line.name, line.quantity, line.price))
        .collect::<Vec<_>>()
        .join("\n");

    let items_list_html: String = order
        .items
        .iter()
        .map(|line| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&line.name),
                line.quantity,
                escape_html(&line.price),
                escape_html(&line_total_display(&line.price, line.quantity)),
            )
        })
        .collect();

    json!({
        "to_email": to_email,
        "order_number": order.order_number,
        "order_date": long_date(date),
        "total_amount": order.total_amount,
        "items_list": items_list,
        "items_list_html": items_list_html,
    })
}

/// "October 15th, 2026"
pub fn long_date(date: NaiveDate) -> String {
    let day = date.day();
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{} {}{}, {}", date.format("%B"), day, suffix, date.year())
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// =============================================================================
// Unit Tests
// =============================================================================
