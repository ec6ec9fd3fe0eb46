//! Session-stored state and helpers.
//!
//! Everything a visitor accumulates lives under these keys: the daily
//! access pass, the cart, the checkout stage, and a one-shot notice. Cart
//! writes always store the whole value back, so concurrent readers only
//! ever see a complete mapping.

use cajonera_core::{AccessPass, Cart, CheckoutStage};
use tower_sessions::Session;

type SessionResult<T> = Result<T, tower_sessions::session::Error>;

/// Session keys for visitor state.
pub mod keys {
    /// Key for the daily access pass.
    pub const ACCESS_PASS: &str = "access_pass";

    /// Key for the cart mapping.
    pub const CART: &str = "cart";

    /// Key for the checkout stage.
    pub const CHECKOUT_STAGE: &str = "checkout_stage";

    /// Key for a one-shot notice shown on the next page render.
    pub const NOTICE: &str = "notice";
}

/// Load the session cart, empty if none was stored yet.
pub async fn load_cart(session: &Session) -> SessionResult<Cart> {
    Ok(session.get(keys::CART).await?.unwrap_or_default())
}

/// Replace the stored cart wholesale.
pub async fn store_cart(session: &Session, cart: &Cart) -> SessionResult<()> {
    session.insert(keys::CART, cart).await
}

/// Get the stored access pass, if any. Validity is the caller's check.
pub async fn access_pass(session: &Session) -> Option<AccessPass> {
    session.get(keys::ACCESS_PASS).await.ok().flatten()
}

/// Store a freshly granted access pass.
pub async fn grant_access(session: &Session, pass: &AccessPass) -> SessionResult<()> {
    session.insert(keys::ACCESS_PASS, pass).await
}

/// Current checkout stage, `Review` if the flow has not started.
pub async fn checkout_stage(session: &Session) -> SessionResult<CheckoutStage> {
    Ok(session.get(keys::CHECKOUT_STAGE).await?.unwrap_or_default())
}

/// Persist the checkout stage.
pub async fn set_checkout_stage(session: &Session, stage: CheckoutStage) -> SessionResult<()> {
    session.insert(keys::CHECKOUT_STAGE, stage).await
}

/// Drop the checkout stage (flow finished or abandoned).
pub async fn clear_checkout_stage(session: &Session) -> SessionResult<()> {
    session.remove::<CheckoutStage>(keys::CHECKOUT_STAGE).await?;
    Ok(())
}

/// Queue a one-shot notice for the next render.
pub async fn set_notice(session: &Session, message: impl Into<String>) -> SessionResult<()> {
    session.insert(keys::NOTICE, message.into()).await
}

/// Take the queued notice, clearing it.
pub async fn take_notice(session: &Session) -> Option<String> {
    session.remove::<String>(keys::NOTICE).await.ok().flatten()
}
