//! The backend endpoint client.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use cajonera_core::Catalog;
use moka::future::Cache;
use tracing::{debug, instrument};

use crate::config::CajoneraConfig;

use super::BackendError;
use super::ingest::ingest_catalog;
use super::types::{
    CatalogResponse, OrderReceipt, OrderRequest, RegisterEntryRequest, StatusReply, SubmitReply,
};

/// Cache key for the catalog snapshot (the endpoint serves exactly one).
const CATALOG_CACHE_KEY: &str = "catalog";

/// Client for the single backend endpoint.
///
/// Catalog responses are cached for the configured TTL; a cache hit counts
/// as "the latest sync" for admission checks. Refresh failures leave both
/// the cache and the last-known-good snapshot untouched. Nothing here
/// deduplicates concurrent refreshes: overlapping fetches race and the one
/// that resolves last owns the cache (last write wins).
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    http: reqwest::Client,
    endpoint: String,
    cache: Cache<&'static str, Catalog>,
    cache_enabled: bool,
    last_good: RwLock<Option<Catalog>>,
}

impl BackendClient {
    /// Create a new client for the configured endpoint.
    #[must_use]
    pub fn new(config: &CajoneraConfig) -> Self {
        let ttl = config.catalog_ttl();
        let cache_enabled = !ttl.is_zero();
        let cache = Cache::builder()
            .max_capacity(2)
            .time_to_live(if cache_enabled {
                ttl
            } else {
                Duration::from_secs(1)
            })
            .build();

        Self {
            inner: Arc::new(BackendClientInner {
                http: reqwest::Client::new(),
                endpoint: config.backend_url.clone(),
                cache,
                cache_enabled,
                last_good: RwLock::new(None),
            }),
        }
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch the current catalog snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, an unrecognized response
    /// shape, or a backend-reported error. The previous snapshot is never
    /// partially replaced: either a whole new catalog comes back, or the
    /// old one stands.
    #[instrument(skip(self))]
    pub async fn fetch_catalog(&self) -> Result<Catalog, BackendError> {
        if self.inner.cache_enabled
            && let Some(catalog) = self.inner.cache.get(CATALOG_CACHE_KEY).await
        {
            debug!("Cache hit for catalog");
            return Ok(catalog);
        }

        let response = self.inner.http.get(&self.inner.endpoint).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %body.chars().take(200).collect::<String>(),
                "backend returned non-success status for catalog"
            );
            return Err(BackendError::Status(status));
        }

        let parsed: CatalogResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "failed to parse catalog response"
            );
            BackendError::Parse(e.to_string())
        })?;

        let catalog = ingest_catalog(parsed)?;

        if self.inner.cache_enabled {
            self.inner
                .cache
                .insert(CATALOG_CACHE_KEY, catalog.clone())
                .await;
        }
        self.remember(&catalog);

        Ok(catalog)
    }

    /// The freshest catalog available for admission checks: a live fetch if
    /// it works, otherwise the last snapshot that ever did.
    pub async fn catalog_for_guard(&self) -> Option<Catalog> {
        match self.fetch_catalog().await {
            Ok(catalog) => Some(catalog),
            Err(e) => {
                tracing::warn!("catalog refresh failed, using last known snapshot: {e}");
                self.last_known()
            }
        }
    }

    /// Drop the cached catalog so the next fetch refreshes it.
    pub async fn invalidate_catalog(&self) {
        self.inner.cache.invalidate(CATALOG_CACHE_KEY).await;
    }

    fn remember(&self, catalog: &Catalog) {
        if let Ok(mut guard) = self.inner.last_good.write() {
            *guard = Some(catalog.clone());
        }
    }

    fn last_known(&self) -> Option<Catalog> {
        self.inner
            .last_good
            .read()
            .ok()
            .and_then(|guard| guard.clone())
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a daily access grant for `name` / `phone`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a backend-reported error.
    /// The endpoint's success body is not otherwise inspected.
    #[instrument(skip(self), fields(name = %name))]
    pub async fn register_entry(&self, name: &str, phone: &str) -> Result<(), BackendError> {
        let body = RegisterEntryRequest::new(name, phone);
        let response = self
            .inner
            .http
            .post(&self.inner.endpoint)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(BackendError::Status(status));
        }

        // Apps Script deployments answer registration with anything from an
        // empty body to a status envelope; only an explicit error counts.
        if let Ok(reply) = serde_json::from_str::<StatusReply>(&text)
            && reply.status.as_deref() == Some("error")
        {
            return Err(BackendError::Rejected(reply.message.unwrap_or_else(|| {
                "No se pudo registrar tu pase.".to_string()
            })));
        }

        Ok(())
    }

    // =========================================================================
    // Order submission
    // =========================================================================

    /// Submit an order. Never retried automatically.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Rejected`] with the backend's message when
    /// the order is refused (stock conflicts included), or a transport
    /// error when no usable response arrived.
    #[instrument(skip(self, order), fields(user = %order.user_name, lines = order.cart.len()))]
    pub async fn submit_order(&self, order: &OrderRequest) -> Result<OrderReceipt, BackendError> {
        let response = self
            .inner
            .http
            .post(&self.inner.endpoint)
            .json(order)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!(status = %status, "backend returned non-success status for order");
            return Err(BackendError::Status(status));
        }

        let reply: SubmitReply = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "failed to parse order submission response"
            );
            BackendError::Parse(e.to_string())
        })?;

        if reply.status == "success" {
            // Committed units just moved; the cached snapshot is stale.
            self.invalidate_catalog().await;
            Ok(OrderReceipt {
                order_id: reply.pedido_id.unwrap_or_default(),
            })
        } else {
            Err(BackendError::Rejected(reply.message.unwrap_or_else(|| {
                "Error al procesar el pedido.".to_string()
            })))
        }
    }
}
