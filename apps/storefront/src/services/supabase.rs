//! # Hosted Backend Client
//!
//! REST client for the hosted Supabase project: PostgREST for the catalog,
//! GoTrue for authentication.
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  fetch_stock_levels  GET  /rest/v1/products?select=id,stock            │
//! │                                           &id=in.("a","b","c")         │
//! │  fetch_product       GET  /rest/v1/products?select=...,categories(name)│
//! │                                           &id=eq.<id>                  │
//! │  sign_in             POST /auth/v1/token?grant_type=password           │
//! │  sign_up             POST /auth/v1/signup   data: { userType }         │
//! │  fetch_auth_session  GET  /auth/v1/user          (Bearer <token>)      │
//! │                                                                         │
//! │  Every request carries `apikey: <anon key>`.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The account's user type travels in the GoTrue user metadata as
//! `userType`; accounts without it are buyers.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{DataService, ServiceError, ServiceResult, SignUp};
use farmease_core::validation::validate_email;
use farmease_core::{Product, ProductCategory, StockSnapshot, UserSession, UserType, ValidationError};

/// Connection settings for the hosted backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyzcompany.supabase.co`.
    pub url: String,
    /// Public anon key.
    pub anon_key: String,
}

#[derive(Debug, Clone)]
pub struct SupabaseClient {
    config: SupabaseConfig,
    http: Client,
}

impl SupabaseClient {
    pub fn new(config: SupabaseConfig) -> Self {
        SupabaseClient {
            config,
            http: Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.url.trim_end_matches('/'), path)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http
            .get(self.endpoint(path))
            .header("apikey", &self.config.anon_key)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.http
            .post(self.endpoint(path))
            .header("apikey", &self.config.anon_key)
    }
}

/// PostgREST `in.(...)` filter with every id double-quoted, so ids
/// containing commas or parentheses survive.
fn in_filter(ids: &[String]) -> String {
    let quoted: Vec<String> = ids
        .iter()
        .map(|id| format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    format!("in.({})", quoted.join(","))
}

/// Turns a 400/401/422 from GoTrue into `Unauthorized` with its message.
async fn auth_rejection(response: Response, fallback: &str) -> ServiceResult<Response> {
    if !matches!(
        response.status(),
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::UNPROCESSABLE_ENTITY
    ) {
        return Ok(response);
    }

    let reason = response
        .json::<AuthErrorBody>()
        .await
        .ok()
        .and_then(|body| body.error_description)
        .unwrap_or_else(|| fallback.to_string());
    Err(ServiceError::Unauthorized(reason))
}

async fn ensure_success(response: Response) -> ServiceResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ServiceError::UnexpectedResponse {
        status: status.as_u16(),
        body,
    })
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StockRow {
    id: String,
    stock: i64,
}

/// Prices were entered as text but older rows hold plain numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawPrice> for String {
    fn from(raw: RawPrice) -> Self {
        match raw {
            RawPrice::Text(text) => text,
            RawPrice::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CategoryRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ProductRow {
    id: String,
    name: String,
    price: RawPrice,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    stock: Option<i64>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    seller_id: Option<String>,
    #[serde(default)]
    categories: Option<CategoryRef>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            price: row.price.into(),
            image: row.image.unwrap_or_default(),
            category: row
                .categories
                .map(|c| ProductCategory::from_name(&c.name))
                .unwrap_or_else(|| ProductCategory::Other(String::new())),
            stock: row.stock.unwrap_or(0),
            description: row.description,
            seller_id: row.seller_id,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    #[serde(default, rename = "userType")]
    user_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<UserMetadata>,
}

impl AuthUser {
    fn user_type(&self) -> UserType {
        self.user_metadata
            .as_ref()
            .and_then(|meta| meta.user_type.as_deref())
            .and_then(UserType::parse)
            .unwrap_or_default()
    }

    fn into_session(self, access_token: Option<String>) -> UserSession {
        let user_type = self.user_type();
        UserSession {
            user_id: self.id,
            email: self.email,
            access_token,
            user_type,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: AuthUser,
}

/// With e-mail confirmation on, sign-up answers with the bare user and no
/// token.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(AuthUser),
}

#[derive(Debug, Deserialize)]
struct AuthErrorBody {
    #[serde(default, alias = "msg", alias = "message")]
    error_description: Option<String>,
}

// =============================================================================
// DataService
// =============================================================================

#[async_trait]
impl DataService for SupabaseClient {
    async fn fetch_stock_levels(&self, ids: &[String]) -> ServiceResult<StockSnapshot> {
        if ids.is_empty() {
            return Ok(StockSnapshot::new());
        }

        let response = self
            .get("/rest/v1/products")
            .bearer_auth(&self.config.anon_key)
            .query(&[("select", "id,stock".to_string()), ("id", in_filter(ids))])
            .send()
            .await?;

        let rows: Vec<StockRow> = ensure_success(response).await?.json().await?;
        debug!(requested = ids.len(), found = rows.len(), "Fetched stock levels");

        Ok(rows.into_iter().map(|row| (row.id, row.stock)).collect())
    }

    async fn fetch_product(&self, id: &str) -> ServiceResult<Option<Product>> {
        let response = self
            .get("/rest/v1/products")
            .bearer_auth(&self.config.anon_key)
            .query(&[
                (
                    "select",
                    "id,name,price,image,stock,description,seller_id,categories(name)".to_string(),
                ),
                ("id", format!("eq.{id}")),
            ])
            .send()
            .await?;

        let rows: Vec<ProductRow> = ensure_success(response).await?.json().await?;
        Ok(rows.into_iter().next().map(Product::from))
    }

    async fn sign_in(&self, email: &str, password: &str) -> ServiceResult<UserSession> {
        validate_email(email)?;

        let response = self
            .post("/auth/v1/token")
            .query(&[("grant_type", "password")])
            .json(&serde_json::json!({ "email": email.trim(), "password": password }))
            .send()
            .await?;

        let response = auth_rejection(response, "Invalid login credentials").await?;
        let token: TokenResponse = ensure_success(response).await?.json().await?;
        Ok(token.user.into_session(Some(token.access_token)))
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        user_type: UserType,
    ) -> ServiceResult<SignUp> {
        validate_email(email)?;
        if password.is_empty() {
            return Err(ValidationError::Required {
                field: "password".to_string(),
            }
            .into());
        }

        let response = self
            .post("/auth/v1/signup")
            .json(&serde_json::json!({
                "email": email.trim(),
                "password": password,
                "data": { "userType": user_type.as_str() },
            }))
            .send()
            .await?;

        let response = auth_rejection(response, "Sign-up was rejected").await?;
        let body: SignUpResponse = ensure_success(response).await?.json().await?;

        Ok(match body {
            SignUpResponse::Session(token) => {
                SignUp::SignedIn(token.user.into_session(Some(token.access_token)))
            }
            SignUpResponse::User(user) => {
                debug!(user_id = %user.id, "Sign-up awaiting e-mail confirmation");
                SignUp::ConfirmationRequired {
                    email: user.email.unwrap_or_else(|| email.trim().to_string()),
                }
            }
        })
    }

    async fn fetch_auth_session(
        &self,
        session: &UserSession,
    ) -> ServiceResult<Option<UserSession>> {
        let Some(token) = session.access_token.as_deref() else {
            warn!(user_id = %session.user_id, "Stored session has no access token");
            return Ok(None);
        };

        let response = self.get("/auth/v1/user").bearer_auth(token).send().await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Ok(None);
        }

        let user: AuthUser = ensure_success(response).await?.json().await?;
        let mut refreshed = user.into_session(Some(token.to_string()));
        if refreshed.email.is_none() {
            refreshed.email = session.email.clone();
        }
        Ok(Some(refreshed))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer) -> SupabaseClient {
        SupabaseClient::new(SupabaseConfig {
            url: server.base_url(),
            anon_key: "anon-key".to_string(),
        })
    }

    #[test]
    fn test_in_filter_quotes_ids() {
        let ids = vec!["a".to_string(), "b,c".to_string(), "q\"x".to_string()];
        assert_eq!(in_filter(&ids), r#"in.("a","b,c","q\"x")"#);
    }

    #[tokio::test]
    async fn test_fetch_stock_levels_single_batched_call() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/v1/products")
                    .header("apikey", "anon-key")
                    .query_param("select", "id,stock")
                    .query_param("id", r#"in.("p1","p2")"#);
                then.status(200)
                    .json_body(json!([{ "id": "p1", "stock": 3 }, { "id": "p2", "stock": 0 }]));
            })
            .await;

        let snapshot = client(&server)
            .fetch_stock_levels(&["p1".to_string(), "p2".to_string()])
            .await
            .unwrap();

        mock.assert_hits_async(1).await;
        assert_eq!(snapshot.available("p1"), Some(3));
        assert_eq!(snapshot.available("p2"), Some(0));
    }

    #[tokio::test]
    async fn test_fetch_stock_levels_empty_ids_skip_request() {
        let server = MockServer::start_async().await;
        let snapshot = client(&server).fetch_stock_levels(&[]).await.unwrap();
        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_stock_levels_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/rest/v1/products");
                then.status(500).body("boom");
            })
            .await;

        let err = client(&server)
            .fetch_stock_levels(&["p1".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::UnexpectedResponse { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_fetch_product_with_category() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/v1/products")
                    .query_param("id", "eq.t-1");
                then.status(200).json_body(json!([{
                    "id": "t-1",
                    "name": "Mini Tractor",
                    "price": 1500,
                    "image": "t.jpg",
                    "stock": 2,
                    "description": null,
                    "seller_id": "s-9",
                    "categories": { "name": "Rental Equipment" }
                }]));
            })
            .await;

        let product = client(&server).fetch_product("t-1").await.unwrap().unwrap();
        assert_eq!(product.price, "1500");
        assert_eq!(product.category, ProductCategory::RentalEquipment);
        assert_eq!(product.seller_id.as_deref(), Some("s-9"));
    }

    #[tokio::test]
    async fn test_fetch_product_missing() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/rest/v1/products");
                then.status(200).json_body(json!([]));
            })
            .await;

        assert!(client(&server).fetch_product("none").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sign_in_password_grant() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/auth/v1/token")
                    .query_param("grant_type", "password")
                    .json_body(json!({ "email": "farmer@example.com", "password": "secret" }));
                then.status(200).json_body(json!({
                    "access_token": "jwt-token",
                    "token_type": "bearer",
                    "user": {
                        "id": "u-1",
                        "email": "farmer@example.com",
                        "user_metadata": { "userType": "seller" }
                    }
                }));
            })
            .await;

        let session = client(&server)
            .sign_in("farmer@example.com", "secret")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(session.user_id, "u-1");
        assert_eq!(session.access_token.as_deref(), Some("jwt-token"));
        assert!(session.is_seller());
    }

    #[tokio::test]
    async fn test_sign_up_sends_user_type() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/v1/signup").json_body(json!({
                    "email": "grower@example.com",
                    "password": "secret",
                    "data": { "userType": "seller" }
                }));
                then.status(200).json_body(json!({
                    "id": "u-7",
                    "email": "grower@example.com",
                    "user_metadata": { "userType": "seller" }
                }));
            })
            .await;

        let outcome = client(&server)
            .sign_up("grower@example.com", "secret", UserType::Seller)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            outcome,
            SignUp::ConfirmationRequired {
                email: "grower@example.com".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_sign_up_with_immediate_session() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/v1/signup");
                then.status(200).json_body(json!({
                    "access_token": "jwt-new",
                    "user": { "id": "u-8", "email": "buyer@example.com" }
                }));
            })
            .await;

        let outcome = client(&server)
            .sign_up("buyer@example.com", "secret", UserType::Buyer)
            .await
            .unwrap();
        let SignUp::SignedIn(session) = outcome else {
            panic!("expected a session, got {outcome:?}");
        };
        assert_eq!(session.user_type, UserType::Buyer);
        assert_eq!(session.access_token.as_deref(), Some("jwt-new"));
    }

    #[tokio::test]
    async fn test_sign_up_taken_email() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/v1/signup");
                then.status(422).json_body(json!({ "msg": "User already registered" }));
            })
            .await;

        let err = client(&server)
            .sign_up("farmer@example.com", "secret", UserType::Buyer)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(reason) if reason == "User already registered"));
    }

    #[tokio::test]
    async fn test_sign_in_rejected() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/v1/token");
                then.status(400).json_body(json!({
                    "error": "invalid_grant",
                    "error_description": "Invalid login credentials"
                }));
            })
            .await;

        let err = client(&server)
            .sign_in("farmer@example.com", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(reason) if reason == "Invalid login credentials"));
    }

    #[tokio::test]
    async fn test_fetch_auth_session_expired() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/auth/v1/user")
                    .header("authorization", "Bearer stale");
                then.status(401);
            })
            .await;

        let session = UserSession {
            user_id: "u-1".into(),
            email: None,
            access_token: Some("stale".into()),
            user_type: UserType::Buyer,
        };
        assert!(client(&server).fetch_auth_session(&session).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_auth_session_valid() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/auth/v1/user");
                then.status(200)
                    .json_body(json!({ "id": "u-1", "email": "farmer@example.com" }));
            })
            .await;

        let session = UserSession {
            user_id: "u-1".into(),
            email: None,
            access_token: Some("fresh".into()),
            user_type: UserType::Buyer,
        };
        let restored = client(&server)
            .fetch_auth_session(&session)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(restored.email.as_deref(), Some("farmer@example.com"));
        assert_eq!(restored.access_token.as_deref(), Some("fresh"));
    }
}
