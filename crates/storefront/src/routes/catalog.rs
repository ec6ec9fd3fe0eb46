//! Catalog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use cajonera_core::{Product, StockBand};

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAccess;
use crate::models::session::load_cart;
use crate::state::AppState;

/// Placeholder shown when a record carries no image URL.
const FALLBACK_IMAGE: &str = "https://picsum.photos/400/400";

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: String,
    pub name: String,
    pub price: String,
    pub image_url: String,
    pub progress: u8,
    pub committed: u32,
    pub capacity: u32,
    pub urgent: bool,
    pub exhausted: bool,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        let band = product.stock.band();
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: product.price.to_string(),
            image_url: if product.image_url.is_empty() {
                FALLBACK_IMAGE.to_string()
            } else {
                product.image_url.clone()
            },
            progress: product.stock.progress(),
            committed: product.stock.committed,
            capacity: product.stock.capacity,
            urgent: band == StockBand::Urgent,
            exhausted: band == StockBand::Exhausted,
        }
    }
}

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/index.html")]
pub struct CatalogTemplate {
    pub user_name: String,
    pub query: String,
    pub closed: bool,
    pub products: Vec<ProductCardView>,
    pub cart_count: u32,
}

/// Connection-error page template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/error.html")]
pub struct CatalogErrorTemplate {
    pub user_name: String,
    pub headline: String,
    pub detail: String,
}

/// Display the catalog page.
///
/// A closed lot suppresses the product grid entirely; a failed sync keeps
/// whatever the buyer already holds (cart, pass) and renders the retry
/// state instead.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAccess(pass): RequireAccess,
    Query(query): Query<SearchQuery>,
) -> Result<Response, AppError> {
    let cart = load_cart(&session).await?;

    match state.backend().fetch_catalog().await {
        Ok(catalog) => {
            let q = query.q.unwrap_or_default();
            let closed = catalog.state.is_closed();
            let products = if closed {
                Vec::new()
            } else {
                catalog.search(&q).map(ProductCardView::from).collect()
            };

            Ok(CatalogTemplate {
                user_name: pass.name,
                query: q,
                closed,
                products,
                cart_count: cart.count(),
            }
            .into_response())
        }
        Err(e) => {
            tracing::warn!("catalog fetch failed: {e}");
            Ok(CatalogErrorTemplate {
                user_name: pass.name,
                headline: e.user_message(),
                detail: e.to_string(),
            }
            .into_response())
        }
    }
}
