use std::{env, time::Duration};

use log::*;
use razorpay_tools::RazorpayConfig;
use sf_common::{
    helpers::{parse_boolean_flag, parse_duration_secs},
    Secret,
};

const DEFAULT_SF_HOST: &str = "127.0.0.1";
const DEFAULT_SF_PORT: u16 = 8360;
const DEFAULT_VISITOR_COOKIE: &str = "uuid";
const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The name of the cookie that carries the anonymous visitor id.
    pub visitor_cookie: String,
    /// The key that must be supplied in the `X-Admin-Key` header to list every order in the store. When it is not
    /// set, the admin listing is disabled.
    pub admin_api_key: Secret<String>,
    /// If true, checkout only proceeds when the submitted items match the visitor's stored cart exactly. Cart prices
    /// are sent by the browser as well, so this is a consistency check, not price enforcement.
    pub verify_cart_on_checkout: bool,
    pub razorpay: RazorpayConfig,
    pub notifications: NotifyConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SF_HOST.to_string(),
            port: DEFAULT_SF_PORT,
            database_url: String::default(),
            visitor_cookie: DEFAULT_VISITOR_COOKIE.to_string(),
            admin_api_key: Secret::default(),
            verify_cart_on_checkout: true,
            razorpay: RazorpayConfig::default(),
            notifications: NotifyConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SF_HOST").ok().unwrap_or_else(|| DEFAULT_SF_HOST.into());
        let port = env::var("SF_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!("🪛️ {s} is not a valid port for SF_PORT. {e} Using the default, {DEFAULT_SF_PORT}, instead.");
                    DEFAULT_SF_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SF_PORT);
        let database_url = env::var("SF_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ SF_DATABASE_URL is not set. Please set it to the URL for the storefront database.");
            String::default()
        });
        let visitor_cookie = env::var("SF_VISITOR_COOKIE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_VISITOR_COOKIE.into());
        let admin_api_key = env::var("SF_ADMIN_API_KEY").ok().filter(|s| !s.is_empty()).unwrap_or_else(|| {
            warn!("🪛️ SF_ADMIN_API_KEY is not set. The admin order listing will reject every request.");
            String::default()
        });
        let verify_cart_on_checkout = parse_boolean_flag(env::var("SF_VERIFY_CART_ON_CHECKOUT").ok(), true);
        if !verify_cart_on_checkout {
            warn!(
                "🚨️ SF_VERIFY_CART_ON_CHECKOUT is off. Checkout items will not be compared with the visitor's stored \
                 cart."
            );
        }
        let razorpay = RazorpayConfig::new_from_env_or_default();
        let notifications = NotifyConfig::from_env_or_default();
        Self {
            host,
            port,
            database_url,
            visitor_cookie,
            admin_api_key: Secret::new(admin_api_key),
            verify_cart_on_checkout,
            razorpay,
            notifications,
        }
    }
}

/// Settings for the mail relay that tells the shop operator about paid orders.
#[derive(Clone, Debug)]
pub struct NotifyConfig {
    /// The relay endpoint. If this is not set, notifications are written to the log instead.
    pub relay_url: Option<String>,
    pub relay_token: Secret<String>,
    pub to: String,
    pub from: String,
    pub timeout: Duration,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            relay_url: None,
            relay_token: Secret::default(),
            to: String::default(),
            from: String::default(),
            timeout: DEFAULT_NOTIFY_TIMEOUT,
        }
    }
}

impl NotifyConfig {
    pub fn from_env_or_default() -> Self {
        let relay_url = env::var("SF_NOTIFY_RELAY_URL").ok().filter(|s| !s.trim().is_empty());
        if relay_url.is_none() {
            info!("🪛️ SF_NOTIFY_RELAY_URL is not set. Paid order notifications will be logged instead of emailed.");
        }
        let relay_token = env::var("SF_NOTIFY_RELAY_TOKEN").ok().unwrap_or_default();
        let to = env::var("SF_NOTIFY_TO").ok().unwrap_or_default();
        if relay_url.is_some() && to.is_empty() {
            warn!("🪛️ SF_NOTIFY_TO is not set. The mail relay will be asked to deliver to an empty address.");
        }
        let from = env::var("SF_NOTIFY_FROM").ok().unwrap_or_default();
        let timeout = parse_duration_secs(env::var("SF_NOTIFY_TIMEOUT_SECS").ok(), DEFAULT_NOTIFY_TIMEOUT);
        Self { relay_url, relay_token: Secret::new(relay_token), to, from, timeout }
    }
}
