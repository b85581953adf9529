use serde::{Deserialize, Serialize};
use serde_json::Value;
use storefront_engine::db_types::{BuyerInfo, Cart, CartItem, Order, OrderItem};

//----------------------------------------------   Requests  ----------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddToCartRequest {
    #[serde(default)]
    pub items: Vec<CartItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCartItemRequest {
    #[serde(default)]
    pub name: String,
    /// `increment` or `decrement`
    #[serde(default)]
    pub action: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoveItemRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub user_info: Option<BuyerInfo>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

/// The confirmation the browser relays after the gateway checkout completes. The gateway's own field names are
/// accepted too, so its callback payload can be forwarded untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    #[serde(default, alias = "razorpay_order_id")]
    pub gateway_order_id: String,
    #[serde(default, alias = "razorpay_payment_id")]
    pub gateway_payment_id: String,
    #[serde(default, alias = "razorpay_signature")]
    pub signature: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFailedRequest {
    #[serde(default, alias = "razorpay_order_id")]
    pub gateway_order_id: String,
    #[serde(default)]
    pub reason: String,
}

//----------------------------------------------   Responses  ----------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartResponse {
    pub message: String,
    pub cart: Cart,
}

impl CartResponse {
    pub fn new<S: Into<String>>(message: S, cart: Cart) -> Self {
        Self { message: message.into(), cart }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    pub message: String,
    pub order: Order,
}

impl OrderResponse {
    pub fn new<S: Into<String>>(message: S, order: Order) -> Self {
        Self { message: message.into(), order }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub message: String,
    pub order: Order,
    /// The gateway's payment intent, exactly as the gateway returned it
    pub gateway_order: Value,
}
