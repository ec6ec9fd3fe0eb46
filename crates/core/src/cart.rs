//! The cart mapping and the availability guard.
//!
//! The [`Cart`] is the sole owner of the product-to-quantity mapping for a
//! visitor's session. Every mutation goes through [`admit`], which checks
//! the requested quantity against the remaining units reported by the
//! latest catalog sync. The check is deliberately stateless: remaining
//! capacity is shared across all buyers and only as fresh as the last sync,
//! so admission decisions are recomputed on every call and never cached.
//!
//! The backend performs its own final check at order submission; this guard
//! only keeps the UI honest in the meantime.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::{Price, ProductId};

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The change is admissible; `quantity` is the resulting held quantity.
    Accepted { quantity: u32 },
    /// The change would exceed remaining units. `max_allowed` is the largest
    /// quantity currently admissible for this product, so callers can tell
    /// the buyer what they *can* still have.
    Rejected { max_allowed: u32 },
}

impl Admission {
    /// Whether the change was admitted.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Decide whether a quantity change is admissible.
///
/// * `held` - quantity currently in the cart (0 if absent)
/// * `delta` - requested change
/// * `remaining` - sellable units per the latest sync
///
/// A positive delta is rejected when it would push the held quantity past
/// `remaining`. Zero and negative deltas are always accepted, clamping the
/// result at zero.
#[must_use]
pub fn admit(held: u32, delta: i32, remaining: u32) -> Admission {
    if delta > 0 {
        let requested = held.saturating_add(delta.unsigned_abs());
        if requested > remaining {
            Admission::Rejected {
                max_allowed: remaining,
            }
        } else {
            Admission::Accepted {
                quantity: requested,
            }
        }
    } else {
        Admission::Accepted {
            quantity: held.saturating_sub(delta.unsigned_abs()),
        }
    }
}

/// A product held in the cart with its quantity.
///
/// The quantity is strictly positive while the item exists; entries that
/// reach zero are removed from the cart, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

/// The session's cart: a mapping from product id to held quantity.
///
/// Mutations return the guard's verdict and only touch the mapping on
/// acceptance. The whole value is meant to be persisted and replaced
/// wholesale by its owner; nothing here performs I/O.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: BTreeMap<ProductId, CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of `product`, guarded against its remaining units.
    ///
    /// On acceptance the item is upserted (and its stored product snapshot
    /// refreshed to the one passed in). On rejection the cart is untouched.
    pub fn add(&mut self, product: &Product) -> Admission {
        let held = self.quantity_of(&product.id);
        let verdict = admit(held, 1, product.stock.remaining());
        if let Admission::Accepted { quantity } = verdict {
            self.items.insert(
                product.id.clone(),
                CartItem {
                    product: product.clone(),
                    quantity,
                },
            );
        }
        verdict
    }

    /// Change the held quantity of an existing item by `delta`.
    ///
    /// Returns `None` when the item is not in the cart (no-op). Positive
    /// deltas are re-checked against `remaining`; an accepted result
    /// replaces the quantity and drops the entry once it reaches zero.
    pub fn change_quantity(
        &mut self,
        id: &ProductId,
        delta: i32,
        remaining: u32,
    ) -> Option<Admission> {
        let held = self.items.get(id)?.quantity;
        let verdict = admit(held, delta, remaining);
        if let Admission::Accepted { quantity } = verdict {
            if quantity == 0 {
                self.items.remove(id);
            } else if let Some(item) = self.items.get_mut(id) {
                item.quantity = quantity;
            }
        }
        Some(verdict)
    }

    /// Empty the cart. Called only after a confirmed order submission or an
    /// explicit logout.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of line totals.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items
            .values()
            .fold(Price::ZERO, |acc, item| {
                let line = item.product.price.times(item.quantity);
                // Sums of non-negative prices stay non-negative.
                Price::new(acc.amount() + line.amount()).unwrap_or(acc)
            })
    }

    /// Total number of units across all items.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.items.values().map(|item| item.quantity).sum()
    }

    /// Held quantity for `id`, 0 when absent.
    #[must_use]
    pub fn quantity_of(&self, id: &ProductId) -> u32 {
        self.items.get(id).map_or(0, |item| item.quantity)
    }

    /// Whether the cart holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate items in deterministic (id) order.
    pub fn items(&self) -> impl Iterator<Item = &CartItem> {
        self.items.values()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::catalog::StockLevel;

    fn product(id: &str, price_cents: i64, capacity: u32, committed: u32) -> Product {
        Product {
            id: ProductId::from(id),
            name: format!("Producto {id}"),
            description: String::new(),
            price: Price::new(Decimal::new(price_cents, 2)).unwrap(),
            image_url: String::new(),
            stock: StockLevel::new(capacity, committed),
        }
    }

    #[test]
    fn test_admit_positive_delta_against_remaining() {
        assert_eq!(admit(0, 1, 3), Admission::Accepted { quantity: 1 });
        assert_eq!(admit(2, 1, 3), Admission::Accepted { quantity: 3 });
        assert_eq!(admit(3, 1, 3), Admission::Rejected { max_allowed: 3 });
        assert_eq!(admit(0, 5, 3), Admission::Rejected { max_allowed: 3 });
    }

    #[test]
    fn test_admit_negative_delta_clamps_at_zero() {
        assert_eq!(admit(2, -1, 0), Admission::Accepted { quantity: 1 });
        assert_eq!(admit(2, -9, 0), Admission::Accepted { quantity: 0 });
    }

    #[test]
    fn test_admit_zero_delta_is_identity() {
        assert_eq!(admit(4, 0, 10), Admission::Accepted { quantity: 4 });
        // Even when the latest sync says the lot shrank under us, a zero
        // delta is not a new reservation and passes through.
        assert_eq!(admit(4, 0, 2), Admission::Accepted { quantity: 4 });
    }

    #[test]
    fn test_add_upserts_until_remaining() {
        // capacity 10, committed 9: exactly one unit left.
        let p = product("a", 350, 10, 9);
        let mut cart = Cart::new();

        assert_eq!(cart.add(&p), Admission::Accepted { quantity: 1 });
        assert_eq!(cart.add(&p), Admission::Rejected { max_allowed: 1 });
        assert_eq!(cart.quantity_of(&p.id), 1);
    }

    #[test]
    fn test_add_exhausted_never_mutates() {
        let p = product("a", 350, 5, 5);
        let mut cart = Cart::new();

        for _ in 0..3 {
            assert_eq!(cart.add(&p), Admission::Rejected { max_allowed: 0 });
        }
        assert!(cart.is_empty());
    }

    #[test]
    fn test_held_never_exceeds_remaining() {
        let p = product("a", 100, 8, 5); // remaining 3
        let mut cart = Cart::new();

        for _ in 0..10 {
            cart.add(&p);
        }
        cart.change_quantity(&p.id, 7, p.stock.remaining());
        assert!(cart.quantity_of(&p.id) <= p.stock.remaining());
        assert_eq!(cart.quantity_of(&p.id), 3);
    }

    #[test]
    fn test_change_quantity_absent_is_noop() {
        let mut cart = Cart::new();
        assert_eq!(cart.change_quantity(&ProductId::from("ghost"), 1, 5), None);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_change_quantity_to_zero_removes_item() {
        let p = product("a", 100, 10, 0);
        let mut cart = Cart::new();
        cart.add(&p);
        cart.add(&p);

        let verdict = cart.change_quantity(&p.id, -5, p.stock.remaining());
        assert_eq!(verdict, Some(Admission::Accepted { quantity: 0 }));
        assert_eq!(cart.quantity_of(&p.id), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_change_quantity_zero_delta_leaves_cart_unchanged() {
        let p = product("a", 100, 10, 0);
        let mut cart = Cart::new();
        cart.add(&p);
        let before = cart.clone();

        cart.change_quantity(&p.id, 0, p.stock.remaining());
        assert_eq!(cart, before);
    }

    #[test]
    fn test_change_quantity_rejected_keeps_quantity() {
        let p = product("a", 100, 4, 2); // remaining 2
        let mut cart = Cart::new();
        cart.add(&p);

        let verdict = cart.change_quantity(&p.id, 5, p.stock.remaining());
        assert_eq!(verdict, Some(Admission::Rejected { max_allowed: 2 }));
        assert_eq!(cart.quantity_of(&p.id), 1);
    }

    #[test]
    fn test_totals() {
        let a = product("a", 350, 10, 0); // S/ 3.50
        let b = product("b", 1000, 10, 0); // S/ 10.00
        let mut cart = Cart::new();
        cart.add(&a);
        cart.add(&a);
        cart.add(&b);

        assert_eq!(cart.total().amount(), Decimal::new(1700, 2));
        assert_eq!(cart.count(), 3);
    }

    #[test]
    fn test_clear_resets_aggregates() {
        let p = product("a", 350, 10, 0);
        let mut cart = Cart::new();
        cart.add(&p);
        cart.add(&p);

        cart.clear();
        assert_eq!(cart.count(), 0);
        assert_eq!(cart.total(), Price::ZERO);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_items_iterate_in_id_order() {
        let mut cart = Cart::new();
        cart.add(&product("b", 100, 10, 0));
        cart.add(&product("a", 100, 10, 0));

        let ids: Vec<_> = cart.items().map(|i| i.product.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
