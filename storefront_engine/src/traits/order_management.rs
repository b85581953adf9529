use crate::{
    db_types::{NewOrder, Order, VisitorId},
    traits::StorageError,
};

/// Persistence for orders.
///
/// Orders are never deleted, and their payment status only ever moves forward from `pending` to `paid` or `failed`.
/// The `mark_*` methods MUST be conditional on the order still being pending.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Stores the order and its items atomically, with a `pending` payment status.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, StorageError>;

    async fn fetch_order(&self, id: i64) -> Result<Option<Order>, StorageError>;

    async fn fetch_order_by_gateway_id(&self, gateway_order_id: &str) -> Result<Option<Order>, StorageError>;

    /// Moves a pending order to `paid` and records the gateway payment id.
    ///
    /// Returns the updated order, or `None` if no *pending* order has this gateway order id.
    async fn mark_order_paid(
        &self,
        gateway_order_id: &str,
        gateway_payment_id: &str,
    ) -> Result<Option<Order>, StorageError>;

    /// Moves a pending order to `failed`. Returns `None` if no *pending* order has this gateway order id.
    async fn mark_order_failed(&self, gateway_order_id: &str, reason: &str) -> Result<Option<Order>, StorageError>;

    /// All orders placed by the visitor, newest first.
    async fn fetch_orders_for_visitor(&self, visitor_id: &VisitorId) -> Result<Vec<Order>, StorageError>;

    /// Every order in the store, newest first.
    async fn fetch_all_orders(&self) -> Result<Vec<Order>, StorageError>;
}
