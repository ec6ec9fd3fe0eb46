//! Access-gate extractor.
//!
//! Provides an extractor for requiring a valid daily access pass in route
//! handlers. The pass is re-validated against today's date on every
//! request: a pass granted yesterday is treated as if it were never
//! granted, and the visitor is sent back through the gate.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use cajonera_core::AccessPass;

use crate::models::session::access_pass;

/// Extractor that requires a valid daily access pass.
///
/// If the visitor holds no pass for today, page requests are redirected to
/// the gate and fragment requests get 401.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAccess(pass): RequireAccess,
/// ) -> impl IntoResponse {
///     format!("Hola, {}!", pass.name)
/// }
/// ```
pub struct RequireAccess(pub AccessPass);

/// Rejection for requests without a valid pass.
pub enum AccessRejection {
    /// Redirect to the gate (for page requests).
    RedirectToGate,
    /// Unauthorized response (for HTMX fragment requests).
    Unauthorized,
}

impl IntoResponse for AccessRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToGate => Redirect::to("/access").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAccess
where
    S: Send + Sync,
{
    type Rejection = AccessRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // HTMX requests expect fragments; a redirect would be swapped into
        // the page, so they reject with a bare status instead.
        let wants_fragment = parts.headers.contains_key("hx-request");
        let reject = || {
            if wants_fragment {
                AccessRejection::Unauthorized
            } else {
                AccessRejection::RedirectToGate
            }
        };

        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AccessRejection::Unauthorized)?;

        let pass = access_pass(session).await.ok_or_else(reject)?;

        let today = chrono::Local::now().date_naive();
        if !pass.is_valid_on(today) {
            return Err(reject());
        }

        Ok(Self(pass))
    }
}
