//! Adapters that connect the storefront engine to the outside world: the Razorpay payment gateway, and the mail relay
//! that tells the shop operator about paid orders.
pub mod notifications;
pub mod razorpay;
