use std::sync::Arc;

use tracing::debug;

use crate::models::{PaymentError, PaymentIntentStatus, ProviderCategory};
use crate::services::client::PaymentVerifier;

/// Checkpoint between a booking request and the claim of a slot. Bookings
/// against prepaid categories must present a reference resolving to a
/// succeeded payment before any slot state is touched.
pub struct PaymentGate {
    verifier: Arc<dyn PaymentVerifier>,
}

impl PaymentGate {
    pub fn new(verifier: Arc<dyn PaymentVerifier>) -> Self {
        Self { verifier }
    }

    /// Pure classification: private providers require prepayment.
    pub fn requires_payment(category: ProviderCategory) -> bool {
        matches!(category, ProviderCategory::Private)
    }

    /// Confirm that the reference corresponds to a succeeded payment.
    /// Transient provider failures propagate to the caller; the gate never
    /// retries.
    pub async fn confirm(&self, reference: &str) -> Result<(), PaymentError> {
        debug!("Confirming payment reference {}", reference);

        match self.verifier.intent_status(reference).await? {
            PaymentIntentStatus::Succeeded => Ok(()),
            other => Err(PaymentError::NotSucceeded(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use async_trait::async_trait;

    struct FixedVerifier(PaymentIntentStatus);

    #[async_trait]
    impl PaymentVerifier for FixedVerifier {
        async fn intent_status(
            &self,
            _reference: &str,
        ) -> Result<PaymentIntentStatus, PaymentError> {
            Ok(self.0.clone())
        }
    }

    struct MissingVerifier;

    #[async_trait]
    impl PaymentVerifier for MissingVerifier {
        async fn intent_status(
            &self,
            _reference: &str,
        ) -> Result<PaymentIntentStatus, PaymentError> {
            Err(PaymentError::ReferenceNotFound)
        }
    }

    #[test]
    fn only_private_categories_require_payment() {
        assert!(PaymentGate::requires_payment(ProviderCategory::Private));
        assert!(!PaymentGate::requires_payment(ProviderCategory::Public));
    }

    #[tokio::test]
    async fn succeeded_payment_confirms() {
        let gate = PaymentGate::new(Arc::new(FixedVerifier(PaymentIntentStatus::Succeeded)));
        assert!(gate.confirm("pi_123").await.is_ok());
    }

    #[tokio::test]
    async fn pending_payment_is_rejected() {
        let gate = PaymentGate::new(Arc::new(FixedVerifier(PaymentIntentStatus::Pending)));
        assert_matches!(
            gate.confirm("pi_123").await,
            Err(PaymentError::NotSucceeded(PaymentIntentStatus::Pending))
        );
    }

    #[tokio::test]
    async fn unknown_reference_is_rejected() {
        let gate = PaymentGate::new(Arc::new(MissingVerifier));
        assert_matches!(
            gate.confirm("pi_missing").await,
            Err(PaymentError::ReferenceNotFound)
        );
    }
}
