//! The order submission state machine.
//!
//! `Review -> Paying -> Submitting -> {success, failure}`. Success is
//! terminal for the flow: the caller clears the cart and hands off to the
//! messaging app. Failures never clear anything; each failure cause knows
//! which stage the buyer should land back on for a manual retry. Nothing is
//! ever retried automatically.

use serde::{Deserialize, Serialize};

/// Stage of the checkout flow, persisted per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStage {
    /// Reviewing cart contents and the computed total.
    #[default]
    Review,
    /// Payment instructions shown; waiting for the buyer to confirm.
    Paying,
    /// The order POST is in flight.
    Submitting,
}

impl CheckoutStage {
    /// Whether the flow may move from `self` to `next`.
    ///
    /// Forward moves advance one stage at a time; moving backward is always
    /// allowed (the buyer can return to review whenever they like).
    #[must_use]
    pub fn can_advance_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Review, Self::Paying) | (Self::Paying, Self::Submitting) => true,
            (_, Self::Review) | (Self::Submitting, Self::Paying) => true,
            _ => self == next,
        }
    }
}

/// Why an order submission failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCause {
    /// The backend refused the order over stock: someone else took the
    /// units first. The buyer must adjust quantities.
    StockConflict(String),
    /// Any other business rejection reported by the backend.
    Rejected(String),
    /// The request never produced a usable response.
    Connectivity(String),
}

impl FailureCause {
    /// Classify a backend rejection message.
    ///
    /// The endpoint reports errors as free text, so stock conflicts are
    /// recognized by the vocabulary the sheet scripts use when units run
    /// out.
    #[must_use]
    pub fn from_rejection(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        const STOCK_HINTS: [&str; 4] = ["stock", "agotado", "disponible", "sin existencias"];
        if STOCK_HINTS.iter().any(|hint| lower.contains(hint)) {
            Self::StockConflict(message)
        } else {
            Self::Rejected(message)
        }
    }

    /// The stage the buyer should land back on to retry by hand.
    ///
    /// Stock conflicts go back to review so quantities can be adjusted;
    /// everything else returns to the payment step.
    #[must_use]
    pub fn retry_stage(&self) -> CheckoutStage {
        match self {
            Self::StockConflict(_) => CheckoutStage::Review,
            Self::Rejected(_) | Self::Connectivity(_) => CheckoutStage::Paying,
        }
    }

    /// The message to surface to the buyer, verbatim.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::StockConflict(m) | Self::Rejected(m) | Self::Connectivity(m) => m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert!(CheckoutStage::Review.can_advance_to(CheckoutStage::Paying));
        assert!(CheckoutStage::Paying.can_advance_to(CheckoutStage::Submitting));
        assert!(!CheckoutStage::Review.can_advance_to(CheckoutStage::Submitting));
    }

    #[test]
    fn test_backward_transitions_always_allowed() {
        assert!(CheckoutStage::Paying.can_advance_to(CheckoutStage::Review));
        assert!(CheckoutStage::Submitting.can_advance_to(CheckoutStage::Review));
        assert!(CheckoutStage::Submitting.can_advance_to(CheckoutStage::Paying));
    }

    #[test]
    fn test_stock_conflict_returns_to_review() {
        let cause = FailureCause::from_rejection("Sin stock suficiente de Queso Andino");
        assert!(matches!(cause, FailureCause::StockConflict(_)));
        assert_eq!(cause.retry_stage(), CheckoutStage::Review);
    }

    #[test]
    fn test_agotado_counts_as_stock_conflict() {
        let cause = FailureCause::from_rejection("Producto AGOTADO en este lote");
        assert!(matches!(cause, FailureCause::StockConflict(_)));
    }

    #[test]
    fn test_other_rejections_return_to_paying() {
        let cause = FailureCause::from_rejection("Pedido duplicado");
        assert!(matches!(cause, FailureCause::Rejected(_)));
        assert_eq!(cause.retry_stage(), CheckoutStage::Paying);
    }

    #[test]
    fn test_connectivity_returns_to_paying() {
        let cause = FailureCause::Connectivity("timeout".to_string());
        assert_eq!(cause.retry_stage(), CheckoutStage::Paying);
    }

    #[test]
    fn test_message_is_verbatim() {
        let cause = FailureCause::from_rejection("Sin Stock de Aceitunas");
        assert_eq!(cause.message(), "Sin Stock de Aceitunas");
    }
}
