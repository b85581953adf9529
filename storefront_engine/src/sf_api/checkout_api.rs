use std::{collections::BTreeMap, fmt::Debug};

use chrono::Utc;
use log::*;
use regex::Regex;
use serde::Serialize;
use sf_common::INR_CURRENCY_CODE;

use crate::{
    db_types::{
        order_total,
        BuyerInfo,
        Cart,
        NewOrder,
        Order,
        OrderItem,
        Paise,
        PaymentStatus,
        VisitorId,
        MAX_ITEM_QUANTITY,
    },
    events::{EventProducers, OrderPaidEvent},
    traits::{PaymentGateway, PaymentIntent, PaymentIntentRequest, StoreDatabase},
    CheckoutApiError,
};

/// The outcome of a successful checkout: the pending order, and the gateway intent the shopper must now complete.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResult {
    pub order: Order,
    pub intent: PaymentIntent,
}

/// `CheckoutApi` drives an order from checkout to a terminal payment status.
///
/// 1. [`Self::checkout`] totals the items, obtains a payment intent from the gateway and stores a `pending` order.
/// 2. The shopper pays on the gateway's side.
/// 3. [`Self::verify_payment`] checks the gateway's signature, marks the order `paid`, clears the visitor's cart and
///    publishes an [`OrderPaidEvent`]. Alternatively, [`Self::mark_payment_failed`] records a failed attempt.
pub struct CheckoutApi<B, G> {
    db: B,
    gateway: G,
    producers: EventProducers,
    verify_cart: bool,
}

impl<B, G> Debug for CheckoutApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutApi (verify_cart: {})", self.verify_cart)
    }
}

impl<B, G> CheckoutApi<B, G> {
    /// Creates a new API instance. Checkout items are checked against the visitor's stored cart unless this is
    /// disabled with [`Self::with_cart_verification`].
    pub fn new(db: B, gateway: G, producers: EventProducers) -> Self {
        Self { db, gateway, producers, verify_cart: true }
    }

    pub fn with_cart_verification(mut self, verify_cart: bool) -> Self {
        self.verify_cart = verify_cart;
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }
}

impl<B, G> CheckoutApi<B, G>
where
    B: StoreDatabase,
    G: PaymentGateway,
{
    /// Creates a pending order for `items` and a gateway payment intent for its total.
    ///
    /// The gateway is called before anything is stored, so a gateway failure leaves no trace in the database.
    pub async fn checkout(
        &self,
        visitor_id: &VisitorId,
        buyer_info: BuyerInfo,
        items: Vec<OrderItem>,
    ) -> Result<CheckoutResult, CheckoutApiError> {
        let total_amount = validate_checkout(visitor_id, &buyer_info, &items)?;
        if self.verify_cart {
            let cart = self.db.fetch_cart(visitor_id).await?.ok_or_else(|| {
                CheckoutApiError::ValidationError("There is no cart for this visitor to check out".into())
            })?;
            check_items_match_cart(&items, &cart)?;
        }
        let request = PaymentIntentRequest {
            amount: total_amount,
            currency: INR_CURRENCY_CODE.to_string(),
            receipt: receipt_reference(),
        };
        debug!("💳️ Requesting payment intent of {total_amount} for visitor {visitor_id} ({})", request.receipt);
        let intent = self.gateway.create_payment_intent(request).await.map_err(|e| {
            warn!("💳️ Could not create payment intent for visitor {visitor_id}: {e}");
            e
        })?;
        if intent.amount != total_amount {
            warn!("💳️ Gateway intent {} is for {}, but the order total is {total_amount}", intent.id, intent.amount);
        }
        let order = NewOrder {
            visitor_id: visitor_id.clone(),
            buyer_info,
            items,
            total_amount,
            currency: INR_CURRENCY_CODE.to_string(),
            gateway_order_id: intent.id.clone(),
        };
        let order = self.db.insert_order(order).await?;
        info!("💳️ Order #{} created for visitor {visitor_id}. {total_amount} pending as {}", order.id, intent.id);
        Ok(CheckoutResult { order, intent })
    }

    /// Verifies the gateway's payment signature and, if it is valid, marks the order as paid.
    ///
    /// Verification is idempotent. Repeating it for an order that is already paid returns the order without
    /// publishing a second event. An order that has failed can never become paid.
    ///
    /// When `visitor_id` is given, that visitor's cart is deleted once the order is paid. Failing to delete the cart
    /// does not undo the payment; it is only logged.
    pub async fn verify_payment(
        &self,
        gateway_order_id: &str,
        gateway_payment_id: &str,
        signature: &str,
        visitor_id: Option<&VisitorId>,
    ) -> Result<Order, CheckoutApiError> {
        if [gateway_order_id, gateway_payment_id, signature].iter().any(|s| s.trim().is_empty()) {
            return Err(CheckoutApiError::ValidationError(
                "Gateway order id, payment id and signature are required".into(),
            ));
        }
        if !self.gateway.verify_signature(gateway_order_id, gateway_payment_id, signature) {
            warn!("💳️ Invalid payment signature for {gateway_order_id} / {gateway_payment_id}");
            return Err(CheckoutApiError::PaymentVerificationFailed);
        }
        let order = match self.db.mark_order_paid(gateway_order_id, gateway_payment_id).await? {
            Some(order) => order,
            // Either there is no such order, or it has already left the pending state
            None => return self.already_settled(gateway_order_id, gateway_payment_id).await,
        };
        info!("💳️ Payment {gateway_payment_id} verified. Order #{} is paid", order.id);
        if let Some(visitor_id) = visitor_id {
            match self.db.delete_cart(visitor_id).await {
                Ok(_) => debug!("💳️ Cart for visitor {visitor_id} cleared"),
                Err(e) => error!("💳️ Order #{} is paid, but the cart for visitor {visitor_id} was not cleared: {e}", order.id),
            }
        }
        self.call_order_paid_hook(&order).await;
        Ok(order)
    }

    async fn already_settled(&self, gateway_order_id: &str, gateway_payment_id: &str) -> Result<Order, CheckoutApiError> {
        let order = self
            .db
            .fetch_order_by_gateway_id(gateway_order_id)
            .await?
            .ok_or_else(|| CheckoutApiError::OrderNotFound(gateway_order_id.to_string()))?;
        match order.payment_status {
            PaymentStatus::Paid => {
                if order.gateway_payment_id.as_deref() != Some(gateway_payment_id) {
                    warn!(
                        "💳️ Order #{} was paid by {:?}, but is now being verified with payment {gateway_payment_id}",
                        order.id, order.gateway_payment_id
                    );
                }
                debug!("💳️ Order #{} was already paid. Nothing to do", order.id);
                Ok(order)
            },
            status => Err(CheckoutApiError::OrderNotPending { gateway_order_id: gateway_order_id.to_string(), status }),
        }
    }

    /// Records that the visitor's payment attempt for the order failed. Only the visitor that placed the order can do
    /// this, and only while the order is pending.
    pub async fn mark_payment_failed(
        &self,
        gateway_order_id: &str,
        visitor_id: &VisitorId,
        reason: &str,
    ) -> Result<Order, CheckoutApiError> {
        if gateway_order_id.trim().is_empty() || visitor_id.is_blank() {
            return Err(CheckoutApiError::ValidationError("Gateway order id and visitor id are required".into()));
        }
        let not_found = || CheckoutApiError::OrderNotFound(gateway_order_id.to_string());
        let order = self.db.fetch_order_by_gateway_id(gateway_order_id).await?.ok_or_else(not_found)?;
        if &order.visitor_id != visitor_id {
            warn!("💳️ Visitor {visitor_id} tried to fail order #{}, which belongs to someone else", order.id);
            return Err(not_found());
        }
        let reason = if reason.trim().is_empty() { "Payment failed" } else { reason.trim() };
        match self.db.mark_order_failed(gateway_order_id, reason).await? {
            Some(order) => {
                info!("💳️ Order #{} marked as failed: {reason}", order.id);
                Ok(order)
            },
            None => {
                let order = self.db.fetch_order_by_gateway_id(gateway_order_id).await?.ok_or_else(not_found)?;
                match order.payment_status {
                    PaymentStatus::Failed => Ok(order),
                    status => {
                        Err(CheckoutApiError::OrderNotPending { gateway_order_id: gateway_order_id.to_string(), status })
                    },
                }
            },
        }
    }

    async fn call_order_paid_hook(&self, order: &Order) {
        for emitter in &self.producers.order_paid_producer {
            debug!("💳️ Notifying order paid hook subscribers");
            let event = OrderPaidEvent::new(order.clone());
            emitter.publish_event(event).await;
        }
    }
}

/// A receipt reference derived from the current time, e.g. `order_rcpt_1700000000000`.
pub fn receipt_reference() -> String {
    format!("order_rcpt_{}", Utc::now().timestamp_millis())
}

/// Checks the checkout input and returns the order total.
fn validate_checkout(visitor_id: &VisitorId, buyer: &BuyerInfo, items: &[OrderItem]) -> Result<Paise, CheckoutApiError> {
    let invalid = |msg: String| Err(CheckoutApiError::ValidationError(msg));
    if visitor_id.is_blank() {
        return invalid("Visitor id is required".into());
    }
    let missing = buyer.missing_fields();
    if !missing.is_empty() {
        return invalid(format!("Buyer info is incomplete. Missing: {}", missing.join(", ")));
    }
    if !is_plausible_email(&buyer.email) {
        return invalid(format!("'{}' is not a valid email address", buyer.email));
    }
    if items.is_empty() {
        return invalid("Items are required".into());
    }
    for item in items {
        if item.name.trim().is_empty() || item.product_id.trim().is_empty() {
            return invalid("Every item needs a product id and a name".into());
        }
        if item.price.is_negative() {
            return invalid(format!("Price of '{}' cannot be negative", item.name));
        }
        if item.quantity < 1 {
            return invalid(format!("Quantity of '{}' must be at least 1", item.name));
        }
        if item.quantity > MAX_ITEM_QUANTITY {
            return invalid(format!("Quantity of '{}' cannot be more than {MAX_ITEM_QUANTITY}", item.name));
        }
    }
    let Some(total) = order_total(items) else {
        return invalid("Order total is too large".into());
    };
    if total.value() <= 0 {
        return invalid("Order total must be greater than zero".into());
    }
    Ok(total)
}

fn is_plausible_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map(|re| re.is_match(email.trim())).unwrap_or(false)
}

/// The submitted items must describe the stored cart exactly: the same quantity of every `(name, price)`.
/// Sizes are not part of an order line, so lines that differ only by size are added together.
///
/// Cart prices come from the browser too, so this keeps checkout consistent with the cart. It does not check prices
/// against a catalogue.
fn check_items_match_cart(items: &[OrderItem], cart: &Cart) -> Result<(), CheckoutApiError> {
    let mut submitted = BTreeMap::<(&str, Paise), i64>::new();
    for item in items {
        *submitted.entry((item.name.as_str(), item.price)).or_default() += item.quantity;
    }
    let mut stored = BTreeMap::<(&str, Paise), i64>::new();
    for item in &cart.items {
        *stored.entry((item.name.as_str(), item.price)).or_default() += item.quantity;
    }
    if submitted != stored {
        debug!("💳️ Checkout items {submitted:?} do not match cart #{} {stored:?}", cart.id);
        return Err(CheckoutApiError::ValidationError("Checkout items do not match the cart".into()));
    }
    Ok(())
}
