use log::*;
use razorpay_tools::{NewRazorpayOrder, RazorpayApi, RazorpayApiError, RazorpayConfig};
use storefront_engine::{
    db_types::Paise,
    traits::{GatewayError, PaymentGateway, PaymentIntent, PaymentIntentRequest},
};

/// [`PaymentGateway`] backed by the Razorpay orders API. A Razorpay "order" is the payment intent.
#[derive(Clone)]
pub struct RazorpayGateway {
    api: RazorpayApi,
}

impl RazorpayGateway {
    pub fn new(config: RazorpayConfig) -> Result<Self, RazorpayApiError> {
        if config.key_id.is_empty() || config.key_secret.is_unset() {
            warn!("💳️ Razorpay credentials are not configured. Checkouts will be rejected by the gateway.");
        }
        let api = RazorpayApi::new(config)?;
        Ok(Self { api })
    }
}

impl PaymentGateway for RazorpayGateway {
    async fn create_payment_intent(&self, request: PaymentIntentRequest) -> Result<PaymentIntent, GatewayError> {
        let PaymentIntentRequest { amount, currency, receipt } = request;
        let order = NewRazorpayOrder { amount: amount.value(), currency, receipt: receipt.clone() };
        let order = self.api.create_order(order).await.map_err(to_gateway_error)?;
        Ok(PaymentIntent {
            id: order.id,
            amount: Paise::from(order.amount),
            currency: order.currency,
            receipt: order.receipt.unwrap_or(receipt),
            raw: order.raw,
        })
    }

    fn verify_signature(&self, gateway_order_id: &str, gateway_payment_id: &str, signature: &str) -> bool {
        self.api.verify_signature(gateway_order_id, gateway_payment_id, signature)
    }
}

fn to_gateway_error(e: RazorpayApiError) -> GatewayError {
    match e {
        RazorpayApiError::Timeout => GatewayError::Timeout,
        RazorpayApiError::QueryError { status, message } => {
            GatewayError::Rejected(format!("Razorpay returned {status}. {message}"))
        },
        RazorpayApiError::InvalidAmount(s) => GatewayError::Rejected(s),
        e => GatewayError::CommunicationError(e.to_string()),
    }
}
