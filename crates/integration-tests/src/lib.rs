//! End-to-end test harness for La Cajonera.
//!
//! Each test spins up two real HTTP servers on ephemeral ports: a scripted
//! mock of the backend endpoint, and the storefront router pointed at it.
//! A cookie-holding `reqwest` client then drives the flows the way a
//! browser would.
//!
//! # Example
//!
//! ```rust,ignore
//! let app = TestApp::spawn().await;
//! app.backend.set_catalog(sample_catalog());
//! app.register("Rosa", "51987654321").await;
//! let page = app.get("/").await;
//! assert_eq!(page.status(), 200);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
// Harness code: panicking on setup failure is the desired behavior in tests.
#![allow(clippy::expect_used)]
#![allow(clippy::missing_panics_doc)]

use std::sync::{Arc, Mutex};

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::{Value, json};

use cajonera_core::Price;
use cajonera_storefront::config::CajoneraConfig;
use cajonera_storefront::middleware::session::create_session_layer;
use cajonera_storefront::routes;
use cajonera_storefront::state::AppState;

// =============================================================================
// Mock backend
// =============================================================================

/// A scripted stand-in for the backend endpoint.
///
/// Serves the configured catalog on GET and records every POST it
/// receives, answering registrations and orders with configurable replies.
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockBackendState>>,
}

#[derive(Default)]
struct MockBackendState {
    catalog_status: Option<u16>,
    catalog_body: Option<Value>,
    register_status: Option<u16>,
    register_body: Option<Value>,
    submit_status: Option<u16>,
    submit_body: Option<Value>,
    registrations: Vec<Value>,
    orders: Vec<Value>,
}

impl MockBackend {
    /// Serve the mock on an ephemeral port; returns its endpoint URL.
    pub async fn spawn(&self) -> String {
        let app = Router::new()
            .route("/", get(mock_get).post(mock_post))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock backend crashed");
        });

        format!("http://{addr}/")
    }

    /// Script the catalog GET response body.
    pub fn set_catalog(&self, body: Value) {
        self.lock().catalog_body = Some(body);
    }

    /// Script the catalog GET status code.
    pub fn set_catalog_status(&self, status: u16) {
        self.lock().catalog_status = Some(status);
    }

    /// Script the registration POST status code.
    pub fn set_register_status(&self, status: u16) {
        self.lock().register_status = Some(status);
    }

    /// Script the registration POST response body.
    pub fn set_register_response(&self, body: Value) {
        self.lock().register_body = Some(body);
    }

    /// Script the order POST response body.
    pub fn set_submit_response(&self, body: Value) {
        self.lock().submit_body = Some(body);
    }

    /// Script the order POST status code.
    pub fn set_submit_status(&self, status: u16) {
        self.lock().submit_status = Some(status);
    }

    /// Registration bodies received so far.
    #[must_use]
    pub fn registrations(&self) -> Vec<Value> {
        self.lock().registrations.clone()
    }

    /// Order bodies received so far.
    #[must_use]
    pub fn orders(&self) -> Vec<Value> {
        self.lock().orders.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockBackendState> {
        self.state.lock().expect("mock backend state")
    }
}

async fn mock_get(State(mock): State<MockBackend>) -> impl IntoResponse {
    let state = mock.lock();
    let status =
        StatusCode::from_u16(state.catalog_status.unwrap_or(200)).expect("valid status code");
    let body = state.catalog_body.clone().unwrap_or_else(|| json!([]));
    (status, Json(body))
}

async fn mock_post(State(mock): State<MockBackend>, Json(body): Json<Value>) -> impl IntoResponse {
    let mut state = mock.lock();

    if body.get("action").and_then(Value::as_str) == Some("REGISTER_ENTRY") {
        state.registrations.push(body);
        let status =
            StatusCode::from_u16(state.register_status.unwrap_or(200)).expect("valid status code");
        let reply = state
            .register_body
            .clone()
            .unwrap_or_else(|| json!({"status": "success"}));
        (status, Json(reply))
    } else {
        state.orders.push(body);
        let status =
            StatusCode::from_u16(state.submit_status.unwrap_or(200)).expect("valid status code");
        let reply = state
            .submit_body
            .clone()
            .unwrap_or_else(|| json!({"status": "success", "pedidoId": "PED-0001"}));
        (status, Json(reply))
    }
}

// =============================================================================
// Storefront under test
// =============================================================================

/// A storefront instance wired to its own mock backend, plus a
/// cookie-holding client. Redirects are NOT followed, so tests can assert
/// on them.
pub struct TestApp {
    pub base_url: String,
    pub backend: MockBackend,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spin up a mock backend and a storefront pointed at it.
    pub async fn spawn() -> Self {
        let backend = MockBackend::default();
        let backend_url = backend.spawn().await;

        let config = test_config(&backend_url);
        let state = AppState::new(config.clone());
        let session_layer = create_session_layer(&config);

        let app = Router::new()
            .merge(routes::routes())
            .layer(session_layer)
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind storefront");
        let addr = listener.local_addr().expect("storefront addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("storefront crashed");
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("build http client");

        Self {
            base_url: format!("http://{addr}"),
            backend,
            client,
        }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET `path` with the session cookie.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request")
    }

    /// POST `path` as a form with the session cookie.
    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(fields)
            .send()
            .await
            .expect("POST request")
    }

    /// Register through the gate and obtain today's pass.
    pub async fn register(&self, name: &str, phone: &str) -> reqwest::Response {
        self.post_form("/access/register", &[("name", name), ("phone", phone)])
            .await
    }

    /// The cart count badge as the page would show it.
    pub async fn cart_count(&self) -> String {
        self.get("/cart/count")
            .await
            .text()
            .await
            .expect("count body")
            .trim()
            .to_string()
    }
}

fn test_config(backend_url: &str) -> CajoneraConfig {
    CajoneraConfig {
        host: "127.0.0.1".parse().expect("loopback addr"),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        session_secret: SecretString::from("kJ8#mP2$vQ9@xR4!nT7&wY3*zB6^cD1%"),
        backend_url: backend_url.to_string(),
        admin_phone: "51 999 888 777".to_string(),
        yape_number: "987 654 321".to_string(),
        entry_fee: Price::new(Decimal::new(200, 2)).expect("entry fee"),
        // TTL 0 disables the catalog cache so every request sees the mock's
        // latest script.
        catalog_ttl_secs: 0,
        sentry_dsn: None,
    }
}

/// A small two-product catalog: one lot nearly full, one wide open.
#[must_use]
pub fn sample_catalog() -> Value {
    json!([
        {
            "id": 1,
            "nombre": "Queso Andino",
            "descripcion": "Queso fresco de Cajamarca",
            "precio": "3.50",
            "imagen_url": "",
            "meta_stock": 10,
            "vendidos_actual": 9
        },
        {
            "id": 2,
            "nombre": "Aceitunas de Tacna",
            "descripcion": "Botija, medio kilo",
            "precio": 10.00,
            "imagen_url": "",
            "meta_stock": 10,
            "vendidos_actual": 0
        }
    ])
}
