//! # Storefront server
//! This crate hosts the HTTP server for the storefront. It is responsible for:
//! * Reading the visitor id from the visitor cookie and passing cart requests to the engine's `CartApi`.
//! * Running checkout against Razorpay and verifying the payment confirmations that the browser relays back.
//! * Serving order history to visitors, and the full order list to the shop operator.
//! * Emailing the operator whenever an order is paid.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `GET /health`: A health check route that returns a 200 OK response.
//! * `POST /cart`, `GET /cart`, `PATCH /cart/item`, `DELETE /cart/item`: Cart management for the current visitor.
//! * `POST /checkout`, `POST /checkout/verify`, `POST /checkout/failed`: Checkout and payment confirmation.
//! * `GET /orders`, `GET /orders/{order_id}`: Order lookups.
//! * `GET /admin/orders`: Every order in the store. Requires the `X-Admin-Key` header.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;
