//! Paid order notifications for the shop operator.
//!
//! When the engine publishes an `OrderPaidEvent`, the hook registered here sends a plain-text email through an HTTP
//! mail relay. The relay receives a JSON body `{to, from, subject, text}` and an `Authorization: Bearer` token.
//!
//! Notification is best-effort. The order is already paid by the time the hook runs, so failures are logged and never
//! reach the visitor. If no relay is configured, the email is written to the log instead.
use std::fmt::Write;

use log::*;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use storefront_engine::{
    db_types::Order,
    events::{EventHandlers, EventHooks},
};
use thiserror::Error;

use crate::{config::NotifyConfig, errors::ServerError};

pub const NOTIFY_EVENT_BUFFER_SIZE: usize = 25;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Could not reach the mail relay. {0}")]
    RelayUnreachable(String),
    #[error("The mail relay did not respond in time")]
    Timeout,
    #[error("The mail relay refused the message. Error {status}. {message}")]
    Rejected { status: u16, message: String },
}

impl From<reqwest::Error> for NotificationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::RelayUnreachable(e.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub text: String,
}

impl EmailMessage {
    pub fn for_paid_order(order: &Order, config: &NotifyConfig) -> Self {
        let subject = format!("New paid order #{} ({})", order.id, order.total_amount);
        Self { to: config.to.clone(), from: config.from.clone(), subject, text: order_summary(order) }
    }
}

fn order_summary(order: &Order) -> String {
    let buyer = &order.buyer_info;
    let mut text = String::new();
    let _ = writeln!(text, "Order #{} has been paid.", order.id);
    let _ = writeln!(text);
    let _ = writeln!(text, "Customer: {} <{}>, {}", buyer.name, buyer.email, buyer.phone);
    let _ = writeln!(text, "Ship to:  {}, {}, {} {}", buyer.address, buyer.city, buyer.country, buyer.postal_code);
    let _ = writeln!(text);
    for item in &order.items {
        let line_total = item.line_total().map(|t| t.to_string()).unwrap_or_default();
        let _ = writeln!(text, "  {} x {} @ {} = {line_total}", item.quantity, item.name, item.price);
    }
    let _ = writeln!(text);
    let _ = writeln!(text, "Total: {} {}", order.total_amount, order.currency);
    let _ = writeln!(
        text,
        "Razorpay order: {}, payment: {}",
        order.gateway_order_id,
        order.gateway_payment_id.as_deref().unwrap_or("unknown")
    );
    let _ = write!(text, "Placed at {}", order.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    text
}

/// Sends paid order emails through the configured mail relay.
#[derive(Clone)]
pub struct OrderNotifier {
    config: NotifyConfig,
    client: Client,
}

impl OrderNotifier {
    pub fn new(config: NotifyConfig) -> Result<Self, ServerError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ServerError::ConfigurationError(format!("Could not create the mail relay client. {e}")))?;
        Ok(Self { config, client })
    }

    pub async fn notify_order_paid(&self, order: &Order) -> Result<(), NotificationError> {
        let message = EmailMessage::for_paid_order(order, &self.config);
        let Some(url) = self.config.relay_url.as_deref() else {
            info!("📬️ No mail relay configured. {}\n{}", message.subject, message.text);
            return Ok(());
        };
        trace!("📬️ Sending notification for order #{} to {url}", order.id);
        let response = self
            .client
            .post(url)
            .bearer_auth(self.config.relay_token.reveal())
            .json(&message)
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            Err(NotificationError::Rejected { status, message })
        }
    }
}

/// Registers the operator notification as an `on_order_paid` hook.
pub fn create_notification_event_handlers(config: NotifyConfig) -> Result<EventHandlers, ServerError> {
    let notifier = OrderNotifier::new(config)?;
    let mut hooks = EventHooks::default();
    hooks.on_order_paid(move |ev| {
        let notifier = notifier.clone();
        Box::pin(async move {
            let order = ev.order;
            match notifier.notify_order_paid(&order).await {
                Ok(()) => info!("📬️ Operator notified about paid order #{}", order.id),
                Err(e) => error!("📬️ Could not notify the operator about paid order #{}. {e}", order.id),
            }
        })
    });
    Ok(EventHandlers::new(NOTIFY_EVENT_BUFFER_SIZE, hooks))
}
