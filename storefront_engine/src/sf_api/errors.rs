use thiserror::Error;

use crate::{
    db_types::PaymentStatus,
    traits::{GatewayError, StorageError},
};

#[derive(Debug, Clone, Error)]
pub enum CartApiError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Cart not found")]
    CartNotFound,
    #[error("Item not found in cart: {0}")]
    ItemNotFound(String),
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
}

#[derive(Debug, Clone, Error)]
pub enum CheckoutApiError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Order not found: {0}")]
    OrderNotFound(String),
    #[error("Payment verification failed")]
    PaymentVerificationFailed,
    #[error("Order {gateway_order_id} is already {status}")]
    OrderNotPending { gateway_order_id: String, status: PaymentStatus },
    #[error("Payment gateway error: {0}")]
    GatewayError(#[from] GatewayError),
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
}

#[derive(Debug, Clone, Error)]
pub enum OrderQueryError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Order not found: #{0}")]
    OrderNotFound(i64),
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
}
