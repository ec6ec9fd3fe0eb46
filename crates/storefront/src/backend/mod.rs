//! Client for the inventory/order backend endpoint.
//!
//! # Architecture
//!
//! The backend is a single JSON-over-HTTP endpoint (an Apps-Script-style
//! web app). One URL serves everything:
//!
//! - `GET` returns the catalog, either as a bare array of product records
//!   or wrapped in an `{status, message, estado, products}` envelope
//! - `POST {action: "REGISTER_ENTRY", ...}` registers a daily access grant
//! - `POST {userName, cart, total, ...}` submits an order
//!
//! The backend is the source of truth for stock; this module only
//! transports and normalizes its answers. Catalog responses are cached
//! in-memory (`moka`, short TTL) and the last successfully ingested
//! snapshot is retained so a failed refresh never erases what the buyer is
//! already looking at.

mod client;
mod ingest;
pub mod types;

pub use client::BackendClient;

use thiserror::Error;

/// Errors that can occur when talking to the backend endpoint.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed outright.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status code.
    #[error("Error HTTP: {0}")]
    Status(reqwest::StatusCode),

    /// The response body was not a shape we recognize. Treated like a
    /// connectivity failure: surfaced, never applied.
    #[error("Respuesta inesperada del servidor: {0}")]
    Parse(String),

    /// The backend reported `status: "error"`; the message is verbatim.
    #[error("{0}")]
    Rejected(String),
}

impl BackendError {
    /// The line to show the buyer for this failure.
    ///
    /// Business rejections surface verbatim. Apps Script has a recognizable
    /// way of failing when the spreadsheet connection was never authorized,
    /// which gets its own wording; every other transport failure collapses
    /// into a generic retry prompt.
    #[must_use]
    pub fn user_message(&self) -> String {
        const AUTH_HINTS: [&str; 3] = ["ERROR DE PERMISOS", "Unexpected error", "openById"];

        let raw = self.to_string();
        if AUTH_HINTS.iter().any(|hint| raw.contains(hint)) {
            return "AUTORIZACIÓN PENDIENTE: Google bloqueó la conexión automática.".to_string();
        }

        match self {
            Self::Rejected(message) => message.clone(),
            Self::Http(_) | Self::Status(_) => {
                "Error de conexión. Inténtalo de nuevo.".to_string()
            }
            Self::Parse(_) => "Respuesta inesperada del servidor.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_message_is_verbatim() {
        let err = BackendError::Rejected("Sin stock de Queso Andino".to_string());
        assert_eq!(err.to_string(), "Sin stock de Queso Andino");
        assert_eq!(err.user_message(), "Sin stock de Queso Andino");
    }

    #[test]
    fn test_status_error_collapses_to_retry_prompt() {
        let err = BackendError::Status(reqwest::StatusCode::BAD_GATEWAY);
        assert_eq!(err.user_message(), "Error de conexión. Inténtalo de nuevo.");
    }

    #[test]
    fn test_parse_error_collapses_to_unexpected_response() {
        let err = BackendError::Parse("expected value at line 1".to_string());
        assert_eq!(err.user_message(), "Respuesta inesperada del servidor.");
    }

    #[test]
    fn test_apps_script_permission_failures_get_guidance() {
        let err = BackendError::Rejected(
            "Exception: Unexpected error while calling openById".to_string(),
        );
        assert_eq!(
            err.user_message(),
            "AUTORIZACIÓN PENDIENTE: Google bloqueó la conexión automática."
        );
    }
}
