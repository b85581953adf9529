use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /orders`. `amount` is in the currency's smallest subunit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewRazorpayOrder {
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
}

/// A Razorpay order, i.e. the payment intent a shopper completes in the Razorpay checkout widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RazorpayOrder {
    pub id: String,
    #[serde(default)]
    pub entity: String,
    pub amount: i64,
    #[serde(default)]
    pub amount_paid: i64,
    #[serde(default)]
    pub amount_due: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub attempts: i64,
    #[serde(default)]
    pub created_at: i64,
    /// The payload exactly as Razorpay returned it. The storefront hands this back to the browser.
    #[serde(skip)]
    pub raw: Value,
}

impl RazorpayOrder {
    pub fn from_value(raw: Value) -> Result<Self, serde_json::Error> {
        let mut order = serde_json::from_value::<Self>(raw.clone())?;
        order.raw = raw;
        Ok(order)
    }
}
