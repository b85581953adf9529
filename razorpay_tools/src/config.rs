use std::time::Duration;

use log::*;
use sf_common::{helpers::parse_duration_secs, Secret};

pub const DEFAULT_RAZORPAY_API_URL: &str = "https://api.razorpay.com/v1";
pub const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: Secret<String>,
    pub api_url: String,
    pub timeout: Duration,
}

impl Default for RazorpayConfig {
    fn default() -> Self {
        Self {
            key_id: String::default(),
            key_secret: Secret::default(),
            api_url: DEFAULT_RAZORPAY_API_URL.to_string(),
            timeout: DEFAULT_GATEWAY_TIMEOUT,
        }
    }
}

impl RazorpayConfig {
    pub fn new(key_id: &str, key_secret: &str) -> Self {
        Self { key_id: key_id.to_string(), key_secret: Secret::new(key_secret.to_string()), ..Default::default() }
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    pub fn new_from_env_or_default() -> Self {
        let key_id = std::env::var("SF_RAZORPAY_KEY_ID").unwrap_or_else(|_| {
            warn!("🪛️ SF_RAZORPAY_KEY_ID not set. Gateway calls will be rejected by Razorpay.");
            String::default()
        });
        let key_secret = Secret::new(std::env::var("SF_RAZORPAY_KEY_SECRET").unwrap_or_else(|_| {
            warn!("🪛️ SF_RAZORPAY_KEY_SECRET not set. No payment signature will verify.");
            String::default()
        }));
        let api_url = std::env::var("SF_RAZORPAY_API_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| {
                info!("🪛️ SF_RAZORPAY_API_URL not set, using {DEFAULT_RAZORPAY_API_URL}");
                DEFAULT_RAZORPAY_API_URL.to_string()
            });
        let timeout = parse_duration_secs(std::env::var("SF_GATEWAY_TIMEOUT_SECS").ok(), DEFAULT_GATEWAY_TIMEOUT);
        Self { key_id, key_secret, api_url, timeout }
    }
}
