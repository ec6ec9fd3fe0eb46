//! WhatsApp deep-link construction.
//!
//! After a registration or an accepted order the storefront hands the buyer
//! off to WhatsApp with a pre-filled message. The navigation is
//! fire-and-forget: nothing observes whether the message was actually sent.

use cajonera_core::{Cart, Price};

/// Deep link for the daily entry registration hand-off.
#[must_use]
pub fn entry_link(admin_phone: &str, name: &str, phone: &str, fee: &Price) -> String {
    let message = format!(
        "Hola, soy *{name}* ({phone}). Ya yapeé los {fee} para entrar a la Cajonera de hoy. 🎫"
    );
    link(admin_phone, &message)
}

/// Deep link for the order confirmation hand-off.
///
/// Carries the buyer's name, a one-line order summary, the total, and the
/// order id the backend assigned, plus the prompt to attach the Yape
/// voucher.
#[must_use]
pub fn order_link(admin_phone: &str, name: &str, cart: &Cart, order_id: &str) -> String {
    let detail = cart
        .items()
        .map(|item| format!("{}x {}", item.quantity, item.product.name))
        .collect::<Vec<_>>()
        .join(", ");
    let total = cart.total();

    let message = format!(
        "✅ *PEDIDO REGISTRADO*\n\nHola, soy *{name}*.\nHe realizado un pedido por la web:\n📦 *Detalle:* {detail}\n💰 *Total:* {total}\n🆔 *Pedido:* {order_id}\n\n👇 *ADJUNTO MI COMPROBANTE DE YAPE AQUÍ:*"
    );
    link(admin_phone, &message)
}

/// Build a `wa.me` link for `phone` with `message` pre-filled.
fn link(phone: &str, message: &str) -> String {
    format!(
        "https://wa.me/{}?text={}",
        digits(phone),
        urlencoding::encode(message)
    )
}

/// Keep only digits; numbers are often configured with spaces or a `+`.
fn digits(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}
