//! Wire types for the backend endpoint.
//!
//! The endpoint is duck-typed: numeric fields arrive as JSON numbers or
//! strings depending on how the spreadsheet row was edited, and the catalog
//! comes back either bare or wrapped in an envelope. Raw types here accept
//! everything the endpoint is known to emit; `ingest` turns them into
//! validated domain values exactly once.

use cajonera_core::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Catalog (GET)
// =============================================================================

/// A catalog response, in either of the endpoint's two shapes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CatalogResponse {
    /// Bare list of product records (the original shape).
    Products(Vec<RawProduct>),
    /// Envelope with global lot state (the extended shape).
    Envelope(CatalogEnvelope),
}

/// The enveloped catalog shape: `{status, message, estado, products}`.
#[derive(Debug, Deserialize)]
pub struct CatalogEnvelope {
    pub status: Option<String>,
    pub message: Option<String>,
    /// Global lot state: `ABIERTO` or `CERRADO`.
    pub estado: Option<String>,
    pub products: Option<Vec<RawProduct>>,
}

impl CatalogEnvelope {
    /// Whether this object is recognizably a catalog envelope at all.
    ///
    /// Untagged parsing accepts any JSON object; one that carries none of
    /// the envelope's fields is an unexpected shape, not an empty catalog.
    #[must_use]
    pub const fn is_recognized(&self) -> bool {
        self.status.is_some() || self.estado.is_some() || self.products.is_some()
    }
}

/// One product record as the endpoint sends it. Every field that should be
/// numeric may arrive as a string instead; `id` may be either too.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProduct {
    pub id: Option<Value>,
    pub nombre: Option<String>,
    #[serde(default)]
    pub descripcion: String,
    pub precio: Option<Value>,
    #[serde(default)]
    pub imagen_url: String,
    pub meta_stock: Option<Value>,
    pub vendidos_actual: Option<Value>,
}

// =============================================================================
// Registration (POST)
// =============================================================================

/// Body for the daily access registration action.
#[derive(Debug, Serialize)]
pub struct RegisterEntryRequest<'a> {
    pub action: &'static str,
    #[serde(rename = "userName")]
    pub user_name: &'a str,
    #[serde(rename = "userPhone")]
    pub user_phone: &'a str,
}

impl<'a> RegisterEntryRequest<'a> {
    /// Build the registration body for `name` / `phone`.
    #[must_use]
    pub const fn new(name: &'a str, phone: &'a str) -> Self {
        Self {
            action: "REGISTER_ENTRY",
            user_name: name,
            user_phone: phone,
        }
    }
}

// =============================================================================
// Order submission (POST)
// =============================================================================

/// Body for an order submission.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    #[serde(rename = "userName")]
    pub user_name: String,
    pub cart: Vec<OrderLine>,
    pub total: Decimal,
    /// Kept for wire compatibility; this storefront relies on the WhatsApp
    /// hand-off for the payment proof, so it is always `None`.
    #[serde(rename = "voucherBase64")]
    pub voucher_base64: Option<String>,
}

/// One cart line as submitted to the backend.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLine {
    pub id: ProductId,
    pub nombre: String,
    pub precio: Decimal,
    pub quantity: u32,
}

/// The backend's answer to an order submission.
#[derive(Debug, Deserialize)]
pub struct SubmitReply {
    pub status: String,
    pub message: Option<String>,
    #[serde(rename = "pedidoId")]
    pub pedido_id: Option<String>,
}

/// A lenient `{status, message}` reply, used where the endpoint's answer is
/// only inspected for an error flag.
#[derive(Debug, Deserialize)]
pub struct StatusReply {
    pub status: Option<String>,
    pub message: Option<String>,
}

/// An accepted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderReceipt {
    /// The order identifier assigned by the backend (`pedidoId`).
    pub order_id: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_response_bare_array() {
        let json = r#"[{"id": 1, "nombre": "Queso", "precio": "3.50"}]"#;
        let parsed: CatalogResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(parsed, CatalogResponse::Products(ref v) if v.len() == 1));
    }

    #[test]
    fn test_catalog_response_envelope() {
        let json = r#"{"status": "success", "estado": "CERRADO", "products": []}"#;
        let parsed: CatalogResponse = serde_json::from_str(json).unwrap();
        match parsed {
            CatalogResponse::Envelope(env) => {
                assert!(env.is_recognized());
                assert_eq!(env.estado.as_deref(), Some("CERRADO"));
                assert_eq!(env.products.map(|p| p.len()), Some(0));
            }
            CatalogResponse::Products(_) => panic!("expected envelope"),
        }
    }

    #[test]
    fn test_register_entry_wire_names() {
        let body = RegisterEntryRequest::new("Rosa", "51987654321");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["action"], "REGISTER_ENTRY");
        assert_eq!(json["userName"], "Rosa");
        assert_eq!(json["userPhone"], "51987654321");
    }

    #[test]
    fn test_order_request_wire_names() {
        let order = OrderRequest {
            user_name: "Rosa".to_string(),
            cart: vec![OrderLine {
                id: ProductId::from("7"),
                nombre: "Queso".to_string(),
                precio: Decimal::new(350, 2),
                quantity: 2,
            }],
            total: Decimal::new(700, 2),
            voucher_base64: None,
        };
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["userName"], "Rosa");
        assert_eq!(json["cart"][0]["nombre"], "Queso");
        assert_eq!(json["cart"][0]["quantity"], 2);
        assert!(json["voucherBase64"].is_null());
    }

    #[test]
    fn test_submit_reply_pedido_id() {
        let json = r#"{"status": "success", "pedidoId": "PED-0042"}"#;
        let reply: SubmitReply = serde_json::from_str(json).unwrap();
        assert_eq!(reply.status, "success");
        assert_eq!(reply.pedido_id.as_deref(), Some("PED-0042"));
    }
}
