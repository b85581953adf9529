use std::sync::Arc;

use log::*;
use reqwest::{header::HeaderValue, Client, Method};
use serde::Serialize;
use serde_json::Value;

use crate::{
    config::RazorpayConfig,
    data_objects::{NewRazorpayOrder, RazorpayOrder},
    helpers::verify_payment_signature,
    RazorpayApiError,
};

/// A configuration-bound Razorpay client. Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone)]
pub struct RazorpayApi {
    config: RazorpayConfig,
    client: Arc<Client>,
}

impl RazorpayApi {
    pub fn new(config: RazorpayConfig) -> Result<Self, RazorpayApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RazorpayApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &RazorpayConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url)
    }

    pub async fn rest_query<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<Value, RazorpayApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {method} {url}");
        let mut req = self
            .client
            .request(method, url)
            .basic_auth(&self.config.key_id, Some(self.config.key_secret.reveal()))
            .header("Content-Type", HeaderValue::from_static("application/json"));
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<Value>().await.map_err(|e| RazorpayApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await?;
            Err(RazorpayApiError::QueryError { status, message })
        }
    }

    /// Creates a Razorpay order for `amount` (in paise) and returns it along with the raw response.
    pub async fn create_order(&self, order: NewRazorpayOrder) -> Result<RazorpayOrder, RazorpayApiError> {
        if order.amount <= 0 {
            return Err(RazorpayApiError::InvalidAmount(format!("{} is not a chargeable amount", order.amount)));
        }
        debug!("Creating Razorpay order for {} {} ({})", order.amount, order.currency, order.receipt);
        let value = self.rest_query(Method::POST, "/orders", Some(&order)).await?;
        let result = RazorpayOrder::from_value(value).map_err(|e| RazorpayApiError::JsonError(e.to_string()))?;
        info!("Created Razorpay order {} for receipt {}", result.id, order.receipt);
        Ok(result)
    }

    pub fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        verify_payment_signature(self.config.key_secret.reveal(), order_id, payment_id, signature)
    }
}
