//! Black-box tests for the Tienda API.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tienda-integration-tests
//! ```
//!
//! Each test spawns the real router over a fresh in-memory store on an
//! ephemeral port and drives it with `reqwest`, exactly as a client would.
//! No external services, no shared state between tests.
//!
//! # Test Categories
//!
//! - `auth` - registration, login, and the bearer-token request gate
//! - `catalog` - product and category CRUD, public reads vs gated writes
//! - `cart` - per-owner cart flows
//! - `orders` - order placement, per-owner listing, and statistics

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{Client, StatusCode};
use secrecy::SecretString;
use serde_json::{Value, json};
use tienda_api::config::ApiConfig;
use tienda_api::routes;
use tienda_api::state::AppState;
use tienda_api::store::Stores;

/// Signing key every test server is configured with. Tests that forge
/// tokens against the running server must sign with this value.
pub const SIGNING_KEY: &str = "iT9wQ2xE5rT8yU1oP4aS7dF0gH3jK6lZ";

/// Password used for every account the tests register.
pub const PASSWORD: &str = "hunter2hunter2";

/// A live API instance bound to an ephemeral localhost port.
///
/// Dropping the server aborts the serve task, so each test owns its
/// instance for exactly the test's lifetime.
pub struct TestServer {
    pub base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Spawn the production router over a fresh in-memory store.
    ///
    /// # Panics
    ///
    /// Panics if startup seeding fails or no ephemeral port can be bound.
    pub async fn spawn() -> Self {
        let config = ApiConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            // The listener below picks the real port
            port: 0,
            token_secret: SecretString::from(SIGNING_KEY),
            token_ttl_hours: 10,
            store_timeout: Duration::from_secs(2),
            allowed_origins: Vec::new(),
            bootstrap_admin: None,
            sentry_dsn: None,
        };

        let state = AppState::new(config, Stores::in_memory());
        state.bootstrap().await.expect("startup seeding failed");

        let app = routes::router(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind an ephemeral port");
        let addr = listener.local_addr().expect("listener has no local addr");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("test server exited unexpectedly");
        });

        Self {
            base_url: format!("http://{addr}"),
            handle,
        }
    }

    /// Absolute URL for a path on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Register an account and return the created user document.
pub async fn register(server: &TestServer, client: &Client, name: &str, email: &str) -> Value {
    let response = client
        .post(server.url("/auth/register"))
        .json(&json!({ "name": name, "email": email, "password": PASSWORD }))
        .send()
        .await
        .expect("register request failed");
    assert_eq!(response.status(), StatusCode::CREATED, "register rejected");
    response.json().await.expect("register body was not JSON")
}

/// Log an account in and return its bearer token.
pub async fn login(server: &TestServer, client: &Client, email: &str) -> String {
    let response = client
        .post(server.url("/auth/login"))
        .json(&json!({ "email": email, "password": PASSWORD }))
        .send()
        .await
        .expect("login request failed");
    assert_eq!(response.status(), StatusCode::OK, "login rejected");
    let body: Value = response.json().await.expect("login body was not JSON");
    body.get("token")
        .and_then(Value::as_str)
        .expect("login body had no token")
        .to_owned()
}

/// Register a fresh account and log it in.
///
/// Returns the bearer token and the new user's id.
pub async fn register_and_login(
    server: &TestServer,
    client: &Client,
    email: &str,
) -> (String, String) {
    let user = register(server, client, "Test User", email).await;
    let user_id = user
        .get("id")
        .and_then(Value::as_str)
        .expect("registered user had no id")
        .to_owned();
    let token = login(server, client, email).await;
    (token, user_id)
}

/// Create a product through the API and return its document.
pub async fn create_product(
    server: &TestServer,
    client: &Client,
    token: &str,
    name: &str,
    price: &str,
) -> Value {
    let response = client
        .post(server.url("/products"))
        .bearer_auth(token)
        .json(&json!({ "name": name, "price": price, "stock": 50 }))
        .send()
        .await
        .expect("create product request failed");
    assert_eq!(
        response.status(),
        StatusCode::CREATED,
        "create product rejected"
    );
    response.json().await.expect("product body was not JSON")
}

/// Sign a token with arbitrary claims, bypassing the API entirely.
///
/// The claim layout matches what the server issues, so a token signed
/// with [`SIGNING_KEY`] and a live subject is accepted; anything else
/// exercises a rejection path.
#[must_use]
pub fn forge_token(signing_key: &str, sub: &str, iat: i64, exp: i64) -> String {
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &json!({ "sub": sub, "iat": iat, "exp": exp }),
        &EncodingKey::from_secret(signing_key.as_bytes()),
    )
    .expect("token signing failed")
}
