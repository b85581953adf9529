//! # Storage and gateway contracts
//!
//! This module defines the interfaces that storage *backends* and payment gateways must provide for the storefront
//! engine.
//!
//! * [`CartManagement`] holds one cart per visitor and performs the atomic line-item upserts that cart reconciliation
//!   relies on.
//! * [`OrderManagement`] stores orders and performs their (conditional, one-way) payment status transitions.
//! * [`StoreDatabase`] is the complete backend, i.e. both of the above plus connection lifecycle.
//! * [`PaymentGateway`] is the seam to the third-party payment provider: it creates payment intents and checks
//!   callback signatures.
mod cart_management;
mod order_management;
mod payment_gateway;
mod store_database;

pub use cart_management::CartManagement;
pub use order_management::OrderManagement;
pub use payment_gateway::{GatewayError, PaymentGateway, PaymentIntent, PaymentIntentRequest};
pub use store_database::{StorageError, StoreDatabase};
