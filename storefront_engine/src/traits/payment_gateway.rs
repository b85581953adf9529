use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::db_types::Paise;

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("The payment gateway did not respond in time")]
    Timeout,
    #[error("The payment gateway rejected the request: {0}")]
    Rejected(String),
    #[error("Could not communicate with the payment gateway: {0}")]
    CommunicationError(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntentRequest {
    pub amount: Paise,
    pub currency: String,
    pub receipt: String,
}

/// A gateway-issued handle for a pending charge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub amount: Paise,
    pub currency: String,
    pub receipt: String,
    /// The gateway's response, passed back to the client untouched so that it can open the gateway checkout.
    pub raw: Value,
}

/// The seam to a third-party payment provider.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    /// Asks the gateway for a new payment intent. No retries are attempted.
    async fn create_payment_intent(&self, request: PaymentIntentRequest) -> Result<PaymentIntent, GatewayError>;

    /// Checks that `signature` is the gateway's proof that `gateway_payment_id` paid for `gateway_order_id`.
    /// Implementations MUST compare in constant time.
    fn verify_signature(&self, gateway_order_id: &str, gateway_payment_id: &str, signature: &str) -> bool;
}
