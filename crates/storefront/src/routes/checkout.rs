//! Checkout route handlers.
//!
//! The flow walks review -> pay -> submit. A submission is attempted at
//! most once per button press; failures route the buyer back to the step
//! they can act on (review for stock conflicts, pay for everything else)
//! with the backend's message, and the cart is never cleared on failure.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use cajonera_core::{CheckoutStage, FailureCause};

use crate::backend::BackendError;
use crate::backend::types::{OrderLine, OrderRequest};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAccess;
use crate::models::session::{
    checkout_stage, clear_checkout_stage, load_cart, set_checkout_stage, set_notice, store_cart,
    take_notice,
};
use crate::services::whatsapp;
use crate::state::AppState;

use super::cart::CartView;

/// Review step template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/review.html")]
pub struct ReviewTemplate {
    pub cart: CartView,
    pub notice: Option<String>,
}

/// Payment step template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/pay.html")]
pub struct PayTemplate {
    pub total: String,
    pub yape_number: String,
    pub notice: Option<String>,
}

/// Display the review step.
#[instrument(skip_all)]
pub async fn review(
    session: Session,
    _access: RequireAccess,
) -> Result<Response, AppError> {
    let cart = load_cart(&session).await?;
    if cart.is_empty() {
        return Ok(Redirect::to("/").into_response());
    }

    set_checkout_stage(&session, CheckoutStage::Review).await?;
    let notice = take_notice(&session).await;

    Ok(ReviewTemplate {
        cart: CartView::from(&cart),
        notice,
    }
    .into_response())
}

/// Advance from review to the payment step.
#[instrument(skip_all)]
pub async fn continue_to_pay(
    session: Session,
    _access: RequireAccess,
) -> Result<Response, AppError> {
    let stage = checkout_stage(&session).await?;
    if !stage.can_advance_to(CheckoutStage::Paying) {
        return Ok(Redirect::to("/checkout").into_response());
    }

    set_checkout_stage(&session, CheckoutStage::Paying).await?;
    Ok(Redirect::to("/checkout/pay").into_response())
}

/// Display the payment step.
#[instrument(skip_all)]
pub async fn pay(
    State(state): State<AppState>,
    session: Session,
    _access: RequireAccess,
) -> Result<Response, AppError> {
    let cart = load_cart(&session).await?;
    if cart.is_empty() {
        return Ok(Redirect::to("/").into_response());
    }

    let stage = checkout_stage(&session).await?;
    if stage == CheckoutStage::Review {
        return Ok(Redirect::to("/checkout").into_response());
    }

    let notice = take_notice(&session).await;
    Ok(PayTemplate {
        total: cart.total().to_string(),
        yape_number: state.config().yape_number.clone(),
        notice,
    }
    .into_response())
}

/// Submit the order.
///
/// On acceptance the cart is cleared and the buyer is redirected to the
/// WhatsApp hand-off carrying the order id. A rejection leaves the cart
/// intact and surfaces the backend's message verbatim.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    RequireAccess(pass): RequireAccess,
) -> Result<Response, AppError> {
    let mut cart = load_cart(&session).await?;
    if cart.is_empty() {
        return Ok(Redirect::to("/").into_response());
    }

    let stage = checkout_stage(&session).await?;
    if !stage.can_advance_to(CheckoutStage::Submitting) {
        return Ok(Redirect::to("/checkout").into_response());
    }
    set_checkout_stage(&session, CheckoutStage::Submitting).await?;

    let order = OrderRequest {
        user_name: pass.name.clone(),
        cart: cart
            .items()
            .map(|item| OrderLine {
                id: item.product.id.clone(),
                nombre: item.product.name.clone(),
                precio: item.product.price.amount(),
                quantity: item.quantity,
            })
            .collect(),
        total: cart.total().amount(),
        voucher_base64: None,
    };

    match state.backend().submit_order(&order).await {
        Ok(receipt) => {
            let handoff = whatsapp::order_link(
                &state.config().admin_phone,
                &pass.name,
                &cart,
                &receipt.order_id,
            );

            cart.clear();
            store_cart(&session, &cart).await?;
            clear_checkout_stage(&session).await?;

            Ok(Redirect::to(&handoff).into_response())
        }
        Err(BackendError::Rejected(message)) => {
            let cause = FailureCause::from_rejection(message);
            tracing::warn!("order rejected: {}", cause.message());

            set_notice(&session, cause.message()).await?;
            let retry = cause.retry_stage();
            set_checkout_stage(&session, retry).await?;

            let target = if retry == CheckoutStage::Review {
                "/checkout"
            } else {
                "/checkout/pay"
            };
            Ok(Redirect::to(target).into_response())
        }
        Err(e) => {
            tracing::warn!("order submission failed: {e}");
            let cause = FailureCause::Connectivity(e.user_message());

            set_notice(&session, cause.message()).await?;
            set_checkout_stage(&session, cause.retry_stage()).await?;

            Ok(Redirect::to("/checkout/pay").into_response())
        }
    }
}
