//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                   - Catalog page (search via ?q=)
//! GET  /health             - Health check (wired in main)
//!
//! # Access gate
//! GET  /access             - Daily access gate
//! POST /access/register    - Register + grant today's pass
//! POST /access/logout      - Clear the whole session
//!
//! # Cart (HTMX fragments)
//! GET  /cart               - Cart page
//! POST /cart/add           - Add one unit (returns empty or a notice,
//!                            triggers cart-updated)
//! POST /cart/update        - Quantity delta (returns cart_items fragment)
//! POST /cart/remove        - Remove line (returns cart_items fragment)
//! GET  /cart/count         - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout           - Review step
//! POST /checkout/continue  - Review -> payment step
//! GET  /checkout/pay       - Payment step (Yape instructions)
//! POST /checkout/submit    - Submit the order; on success clears the cart
//!                            and redirects to the WhatsApp hand-off
//! ```

pub mod access;
pub mod cart;
pub mod catalog;
pub mod checkout;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the access gate routes router.
pub fn access_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(access::gate))
        .route("/register", post(access::register))
        .route("/logout", post(access::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::review))
        .route("/continue", post(checkout::continue_to_pay))
        .route("/pay", get(checkout::pay))
        .route("/submit", post(checkout::submit))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Catalog page
        .route("/", get(catalog::index))
        // Access gate
        .nest("/access", access_routes())
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout flow
        .nest("/checkout", checkout_routes())
}
