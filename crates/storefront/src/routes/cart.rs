//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart itself lives in the session; every mutation stores the whole
//! mapping back, and every positive quantity change is re-checked against
//! the remaining units from the latest catalog sync.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, Html, IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use cajonera_core::{Admission, Cart, CartItem, ProductId};

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAccess;
use crate::models::session::{load_cart, store_cart};
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub id: String,
    pub name: String,
    pub price: String,
    pub quantity: u32,
    pub line_total: String,
    pub image_url: String,
}

impl From<&CartItem> for CartLineView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.product.id.to_string(),
            name: item.product.name.clone(),
            price: item.product.price.to_string(),
            quantity: item.quantity,
            line_total: item.product.price.times(item.quantity).to_string(),
            image_url: item.product.image_url.clone(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub total: String,
    pub count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().map(CartLineView::from).collect(),
            total: cart.total().to_string(),
            count: cart.count(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub delta: i32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub notice: Option<String>,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
    pub notice: Option<String>,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Inline notice fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/notice.html")]
pub struct NoticeTemplate {
    pub message: String,
}

/// Display cart page.
#[instrument(skip_all)]
pub async fn show(
    session: Session,
    _access: RequireAccess,
) -> Result<CartShowTemplate, AppError> {
    let cart = load_cart(&session).await?;
    Ok(CartShowTemplate {
        cart: CartView::from(&cart),
        notice: None,
    })
}

/// Add one unit of a product to the cart (HTMX).
///
/// The remaining units are resolved from the latest sync snapshot before
/// every add; a rejection renders the notice with the maximum quantity the
/// buyer can still take and performs no mutation.
#[instrument(skip(state, session, _access))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    _access: RequireAccess,
    Form(form): Form<AddToCartForm>,
) -> Result<Response, AppError> {
    let Some(catalog) = state.backend().catalog_for_guard().await else {
        return Ok(NoticeTemplate {
            message: "No pudimos verificar el stock. Inténtalo de nuevo.".to_string(),
        }
        .into_response());
    };

    let id = ProductId::from(form.product_id.as_str());
    let Some(product) = catalog.product(&id) else {
        return Ok(NoticeTemplate {
            message: "Ese producto ya no está disponible.".to_string(),
        }
        .into_response());
    };

    let mut cart = load_cart(&session).await?;
    match cart.add(product) {
        Admission::Accepted { .. } => {
            store_cart(&session, &cart).await?;
            Ok((
                AppendHeaders([("HX-Trigger", "cart-updated")]),
                Html(String::new()),
            )
                .into_response())
        }
        Admission::Rejected { max_allowed } => Ok(NoticeTemplate {
            message: format!(
                "¡Casero! Solo quedan {max_allowed} unidades de \"{}\" disponibles.",
                product.name
            ),
        }
        .into_response()),
    }
}

/// Change a cart line's quantity by a delta (HTMX).
#[instrument(skip(state, session, _access))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    _access: RequireAccess,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response, AppError> {
    let mut cart = load_cart(&session).await?;
    let id = ProductId::from(form.product_id.as_str());

    // Only increases need the latest remaining units; decreases are always
    // admissible.
    let remaining = if form.delta > 0 {
        state
            .backend()
            .catalog_for_guard()
            .await
            .as_ref()
            .and_then(|catalog| catalog.product(&id))
            .map_or(0, |product| product.stock.remaining())
    } else {
        0
    };

    match cart.change_quantity(&id, form.delta, remaining) {
        Some(Admission::Accepted { .. }) => {
            store_cart(&session, &cart).await?;
            Ok((
                AppendHeaders([("HX-Trigger", "cart-updated")]),
                CartItemsTemplate {
                    cart: CartView::from(&cart),
                    notice: None,
                },
            )
                .into_response())
        }
        Some(Admission::Rejected { max_allowed }) => Ok(CartItemsTemplate {
            cart: CartView::from(&cart),
            notice: Some(format!("Solo hay {max_allowed} disponibles.")),
        }
        .into_response()),
        None => Ok(CartItemsTemplate {
            cart: CartView::from(&cart),
            notice: None,
        }
        .into_response()),
    }
}

/// Remove a whole line from the cart (HTMX).
#[instrument(skip(session, _access))]
pub async fn remove(
    session: Session,
    _access: RequireAccess,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response, AppError> {
    let mut cart = load_cart(&session).await?;
    let id = ProductId::from(form.product_id.as_str());

    let held = cart.quantity_of(&id);
    if held > 0 {
        cart.change_quantity(&id, -i32::try_from(held).unwrap_or(i32::MAX), 0);
        store_cart(&session, &cart).await?;
    }

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
            notice: None,
        },
    )
        .into_response())
}

/// Get cart count badge (HTMX).
#[instrument(skip_all)]
pub async fn count(
    session: Session,
    _access: RequireAccess,
) -> Result<CartCountTemplate, AppError> {
    let cart = load_cart(&session).await?;
    Ok(CartCountTemplate { count: cart.count() })
}
