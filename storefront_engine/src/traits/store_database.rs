use thiserror::Error;

use crate::traits::{CartManagement, OrderManagement};

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Stored data is inconsistent: {0}")]
    InconsistentData(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(e: sqlx::Error) -> Self {
        StorageError::DatabaseError(e.to_string())
    }
}

/// The highest level of behaviour for backends supporting the storefront.
#[allow(async_fn_in_trait)]
pub trait StoreDatabase: CartManagement + OrderManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    async fn close(&mut self) -> Result<(), StorageError>;
}
