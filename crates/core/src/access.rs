//! Daily access pass validity.
//!
//! Entry to the shop is sold per calendar day: the buyer registers a name
//! and WhatsApp number, pays the small entry fee out-of-band, and the pass
//! is stamped with the grant date. A pass from any other day is worthless,
//! so whoever loads one must re-check it against today before honoring it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A visitor's daily access pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPass {
    /// Display name, as used in the WhatsApp group.
    pub name: String,
    /// WhatsApp number for the hand-off messages.
    pub phone: String,
    /// Calendar day the pass was granted.
    pub granted_on: NaiveDate,
}

impl AccessPass {
    /// Create a pass granted on `granted_on`.
    #[must_use]
    pub fn new(name: impl Into<String>, phone: impl Into<String>, granted_on: NaiveDate) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            granted_on,
        }
    }

    /// Whether the pass grants access on `today`.
    ///
    /// Strict equality: a pass from yesterday (or tomorrow, should a clock
    /// misbehave) does not grant access.
    #[must_use]
    pub fn is_valid_on(&self, today: NaiveDate) -> bool {
        self.granted_on == today
    }
}
