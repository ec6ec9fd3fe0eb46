//! Products, stock levels, and lot classification.
//!
//! A "lot" is one group-buy batch: a product declares how many units the
//! batch can absorb (`capacity`) and the backend reports how many units all
//! buyers together have committed so far. Everything the UI derives from
//! those two numbers lives here.

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// Declared capacity and globally committed units for one product, as of the
/// last successful catalog sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StockLevel {
    /// Maximum units sellable in the current batch.
    pub capacity: u32,
    /// Units already sold or reserved by all buyers, as reported by the
    /// backend. May equal or exceed `capacity` once the lot closes.
    pub committed: u32,
}

/// Display/guard classification of a stock level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockBand {
    /// Plenty of units left.
    Normal,
    /// 80% or more of the batch is committed; nudge the buyer.
    Urgent,
    /// The batch is full (or was declared with zero capacity).
    Exhausted,
}

impl StockLevel {
    /// Create a new stock level.
    #[must_use]
    pub const fn new(capacity: u32, committed: u32) -> Self {
        Self {
            capacity,
            committed,
        }
    }

    /// Units still sellable, clamped at zero.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.capacity.saturating_sub(self.committed)
    }

    /// Batch fill percentage in `0..=100`, for progress bars.
    ///
    /// A zero-capacity batch is already exhausted, so it reports 100 rather
    /// than dividing by zero.
    #[must_use]
    pub fn progress(&self) -> u8 {
        if self.capacity == 0 {
            return 100;
        }
        let pct = u64::from(self.committed) * 100 / u64::from(self.capacity);
        u8::try_from(pct.min(100)).unwrap_or(100)
    }

    /// Classify this level for guard and display decisions.
    ///
    /// The urgency threshold compares exact ratios rather than the rounded
    /// [`progress`](Self::progress) value, so 79.9% never reads as urgent.
    #[must_use]
    pub fn band(&self) -> StockBand {
        if self.committed >= self.capacity {
            StockBand::Exhausted
        } else if u64::from(self.committed) * 5 >= u64::from(self.capacity) * 4 {
            StockBand::Urgent
        } else {
            StockBand::Normal
        }
    }

    /// Whether the batch accepts no further units.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self.band(), StockBand::Exhausted)
    }
}

/// One catalog product.
///
/// Created and superseded wholesale by catalog syncs; never patched in
/// place, so a `Product` value is immutable between syncs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image_url: String,
    pub stock: StockLevel,
}

/// Global lot state reported by the backend envelope (`estado`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LotState {
    /// The lot is open; the catalog renders.
    #[default]
    Abierto,
    /// The lot is closed; the catalog is suppressed entirely, whatever the
    /// payload contains.
    Cerrado,
}

impl LotState {
    /// Whether the lot is closed.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Cerrado)
    }
}

/// One catalog sync snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Catalog {
    pub state: LotState,
    pub products: Vec<Product>,
}

impl Catalog {
    /// Look up a product by id.
    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Products whose name contains `query`, case-insensitively. An empty
    /// query matches everything.
    pub fn search<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a Product> {
        let needle = query.trim().to_lowercase();
        self.products
            .iter()
            .filter(move |p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
    }
}
