//! A thin client for the parts of the Razorpay REST API the storefront uses: creating orders (payment intents) and
//! checking the signatures Razorpay attaches to checkout callbacks.
mod api;
mod config;
mod error;

mod data_objects;
pub mod helpers;

pub use api::RazorpayApi;
pub use config::RazorpayConfig;
pub use data_objects::{NewRazorpayOrder, RazorpayOrder};
pub use error::RazorpayApiError;
