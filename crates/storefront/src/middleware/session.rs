//! Session middleware configuration.
//!
//! Sets up in-memory sessions using tower-sessions. The storefront has no
//! database, and the state a session carries (daily pass, cart) is scoped
//! to a single day anyway, so losing sessions on restart is acceptable.

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::CajoneraConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "cajonera_session";

/// Session expiry time in seconds (24 hours; passes expire daily regardless).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &CajoneraConfig) -> SessionManagerLayer<MemoryStore> {
    let store = MemoryStore::default();

    // Determine if we're in production (HTTPS)
    let is_secure = config.base_url.starts_with("https://");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
