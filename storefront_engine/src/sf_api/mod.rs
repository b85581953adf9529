//! # Storefront engine public API
//!
//! The `sf_api` module exposes the programmatic API of the storefront. It is modular, so clients can pick the parts
//! they need:
//!
//! * [`cart_api`] reconciles incoming item lists against a visitor's cart.
//! * [`checkout_api`] creates orders and payment intents, and verifies (or fails) payments reported by the gateway.
//! * [`order_query_api`] reads orders back, per order, per visitor, or all of them.
//!
//! # API usage
//!
//! Every API instance is created by supplying a backend that implements the storage traits it needs:
//!
//! ```rust,ignore
//! use storefront_engine::{CartApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! // SqliteDatabase implements CartManagement
//! let api = CartApi::new(db);
//! let cart = api.get_cart(&visitor_id).await?;
//! ```
pub mod cart_api;
pub mod checkout_api;
pub mod errors;
pub mod order_query_api;
