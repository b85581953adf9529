use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
pub use sf_common::Paise;
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Conversion error: {0}")]
pub struct ConversionError(String);

//--------------------------------------      VisitorId       ---------------------------------------------------------
/// An opaque identifier for an anonymous shopper, usually issued as a browser cookie.
///
/// This is a partition key for carts and orders, *not* an authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct VisitorId(pub String);

impl VisitorId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Display for VisitorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<S: Into<String>> From<S> for VisitorId {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

//--------------------------------------       CartItem       ---------------------------------------------------------
/// The most of any one item a cart line or order line may hold.
pub const MAX_ITEM_QUANTITY: i64 = 10_000;

/// A line in a shopping cart. Within a cart, `(name, size)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct CartItem {
    pub name: String,
    pub price: Paise,
    pub quantity: i64,
    /// e.g. "500g", "1kg". Absent and empty sizes are the same thing.
    #[serde(default)]
    pub size: Option<String>,
}

impl CartItem {
    pub fn new<S: Into<String>>(name: S, price: Paise, quantity: i64) -> Self {
        Self { name: name.into(), price, quantity, size: None }
    }

    pub fn with_size<S: Into<String>>(mut self, size: S) -> Self {
        self.size = Some(size.into());
        self.normalise_size();
        self
    }

    /// Collapses blank sizes to `None`, so that `""` and a missing size merge into the same cart line.
    pub fn normalise_size(&mut self) {
        if self.size.as_deref().map(|s| s.trim().is_empty()).unwrap_or(false) {
            self.size = None;
        }
    }
}

//--------------------------------------         Cart         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: i64,
    pub visitor_id: VisitorId,
    /// Cart lines, in the order they were first added
    pub items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn find_item(&self, name: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.name == name)
    }
}

/// The stored part of a cart record, i.e. everything except its items.
#[derive(Debug, Clone, FromRow)]
pub struct CartRecord {
    pub id: i64,
    pub visitor_id: VisitorId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartRecord {
    pub fn with_items(self, items: Vec<CartItem>) -> Cart {
        Cart {
            id: self.id,
            visitor_id: self.visitor_id,
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

//--------------------------------------    QuantityAction    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantityAction {
    Increment,
    Decrement,
}

impl QuantityAction {
    pub fn delta(&self) -> i64 {
        match self {
            QuantityAction::Increment => 1,
            QuantityAction::Decrement => -1,
        }
    }
}

impl Display for QuantityAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuantityAction::Increment => write!(f, "increment"),
            QuantityAction::Decrement => write!(f, "decrement"),
        }
    }
}

impl FromStr for QuantityAction {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "increment" => Ok(Self::Increment),
            "decrement" => Ok(Self::Decrement),
            s => Err(ConversionError(format!("Invalid quantity action: {s}"))),
        }
    }
}

//--------------------------------------      BuyerInfo       ---------------------------------------------------------
/// Delivery and contact details captured at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuyerInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub postal_code: String,
}

impl BuyerInfo {
    /// The names of any fields that are blank
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("country", &self.country),
            ("postalCode", &self.postal_code),
        ]
        .into_iter()
        .filter_map(|(field, v)| v.trim().is_empty().then_some(field))
        .collect()
    }
}

//--------------------------------------      OrderItem       ---------------------------------------------------------
/// A line of an order. Snapshotted at checkout and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    pub price: Paise,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

impl OrderItem {
    pub fn new<S: Into<String>>(product_id: S, name: S, price: Paise, quantity: i64) -> Self {
        Self { product_id: product_id.into(), name: name.into(), price, quantity }
    }

    /// `price × quantity`, or `None` if that does not fit in [`Paise`].
    pub fn line_total(&self) -> Option<Paise> {
        self.price.checked_mul(self.quantity)
    }
}

/// The sum of the line totals, or `None` if any line or the sum overflows.
pub fn order_total(items: &[OrderItem]) -> Option<Paise> {
    items.iter().map(OrderItem::line_total).try_fold(Paise::default(), |total, line| total.checked_add(line?))
}

//--------------------------------------    PaymentStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Checkout has created the order and the gateway intent. No payment has been confirmed yet.
    #[default]
    Pending,
    /// The gateway signature was verified. Terminal.
    Paid,
    /// The shopper's payment attempt failed. Terminal.
    Failed,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            s => Err(ConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

//--------------------------------------        Order         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub visitor_id: VisitorId,
    #[sqlx(flatten)]
    #[serde(rename = "userInfo")]
    pub buyer_info: BuyerInfo,
    #[sqlx(skip)]
    pub items: Vec<OrderItem>,
    pub total_amount: Paise,
    pub currency: String,
    pub payment_status: PaymentStatus,
    pub gateway_order_id: String,
    pub gateway_payment_id: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       NewOrder       ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub visitor_id: VisitorId,
    pub buyer_info: BuyerInfo,
    pub items: Vec<OrderItem>,
    /// Sum of the item line totals
    pub total_amount: Paise,
    pub currency: String,
    /// The payment intent id issued by the gateway
    pub gateway_order_id: String,
}
