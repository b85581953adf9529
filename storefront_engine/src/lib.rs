//! Storefront Engine
//!
//! The storefront engine holds the core logic for an anonymous-visitor shop: a persisted shopping cart per visitor,
//! and a checkout flow that turns the cart into an order paid through an external payment gateway.
//!
//! The library is divided into three main sections:
//! 1. Storage ([`mod@traits`]). The traits in this module define what a storage backend must provide. SQLite is the
//!    supported backend ([`SqliteDatabase`]). You should never need to touch the database directly; use the APIs.
//!    The data types stored are defined in [`mod@db_types`] and are public.
//! 2. The public API ([`mod@sf_api`]): [`CartApi`] for cart reconciliation, [`CheckoutApi`] for checkout and payment
//!    verification, and [`OrderQueryApi`] for reading orders back.
//! 3. Events ([`mod@events`]). When an order is paid, an `OrderPaidEvent` is published to any registered hooks. The
//!    server uses this to notify the shop operator.
pub mod db_types;
pub mod events;
pub mod sf_api;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use sf_api::{
    cart_api::CartApi,
    checkout_api::{CheckoutApi, CheckoutResult},
    errors::{CartApiError, CheckoutApiError, OrderQueryError},
    order_query_api::OrderQueryApi,
};
