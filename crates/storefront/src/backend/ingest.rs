//! Normalization of raw backend records into domain values.
//!
//! This is the single boundary where duck-typed wire data becomes strictly
//! typed. Records without a usable id or name are dropped (with a warning);
//! malformed numeric fields default to zero. Downstream code never sees a
//! string-or-number again.

use cajonera_core::{Catalog, LotState, Price, Product, ProductId, StockLevel};
use rust_decimal::Decimal;
use serde_json::Value;

use super::BackendError;
use super::types::{CatalogResponse, RawProduct};

/// Turn a parsed catalog response into a validated [`Catalog`].
///
/// # Errors
///
/// Returns [`BackendError::Rejected`] when the envelope carries
/// `status: "error"`.
pub fn ingest_catalog(response: CatalogResponse) -> Result<Catalog, BackendError> {
    let (state, raw_products) = match response {
        CatalogResponse::Products(products) => (LotState::Abierto, products),
        CatalogResponse::Envelope(envelope) => {
            if !envelope.is_recognized() {
                return Err(BackendError::Parse(
                    "object carries no catalog fields".to_string(),
                ));
            }
            if envelope.status.as_deref() == Some("error") {
                return Err(BackendError::Rejected(
                    envelope
                        .message
                        .unwrap_or_else(|| "Respuesta inesperada del servidor.".to_string()),
                ));
            }
            (
                parse_lot_state(envelope.estado.as_deref()),
                envelope.products.unwrap_or_default(),
            )
        }
    };

    let total = raw_products.len();
    let products: Vec<Product> = raw_products.into_iter().filter_map(normalize).collect();
    if products.len() < total {
        tracing::warn!(
            dropped = total - products.len(),
            kept = products.len(),
            "dropped catalog records without id or name"
        );
    }

    Ok(Catalog { state, products })
}

/// Map the envelope's `estado` to a lot state. Anything that is not
/// recognizably `CERRADO` leaves the lot open.
fn parse_lot_state(estado: Option<&str>) -> LotState {
    match estado.map(|s| s.trim().to_uppercase()) {
        Some(ref s) if s == "CERRADO" => LotState::Cerrado,
        _ => LotState::Abierto,
    }
}

/// Normalize one raw record. `None` means the record is unusable.
fn normalize(raw: RawProduct) -> Option<Product> {
    let id = raw.id.as_ref().and_then(value_as_string)?;
    let name = raw.nombre.filter(|n| !n.trim().is_empty())?;

    let mut price_amount = raw.precio.as_ref().map_or(Decimal::ZERO, |v| {
        value_as_decimal(v).unwrap_or_else(|| {
            tracing::warn!(product = %id, "malformed precio, defaulting to 0");
            Decimal::ZERO
        })
    });
    // Prices are soles and céntimos; pin the scale so `10`, `10.0` and
    // `"10.00"` all mean the same money.
    price_amount.rescale(2);
    // Negative prices are as malformed as unparseable ones.
    let price = Price::new(price_amount).unwrap_or_else(|_| {
        tracing::warn!(product = %id, "negative precio, defaulting to 0");
        Price::ZERO
    });

    let capacity = numeric_field(raw.meta_stock.as_ref(), &id, "meta_stock");
    let committed = numeric_field(raw.vendidos_actual.as_ref(), &id, "vendidos_actual");

    Some(Product {
        id: ProductId::new(id),
        name,
        description: raw.descripcion,
        price,
        image_url: raw.imagen_url,
        stock: StockLevel::new(capacity, committed),
    })
}

/// Parse a count field that may be a number or a numeric string.
fn numeric_field(value: Option<&Value>, id: &str, field: &'static str) -> u32 {
    value.map_or(0, |v| {
        value_as_u32(v).unwrap_or_else(|| {
            tracing::warn!(product = %id, field, "malformed count, defaulting to 0");
            0
        })
    })
}

/// A string or number becomes its string form; anything else is unusable.
fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

fn value_as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n.to_string().parse::<Decimal>().ok(),
        Value::String(s) => s.trim().parse::<Decimal>().ok(),
        _ => None,
    }
}
