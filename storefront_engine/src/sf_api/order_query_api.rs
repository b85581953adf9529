use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Order, VisitorId},
    traits::OrderManagement,
    OrderQueryError,
};

/// Read access to orders. Nothing here changes state.
///
/// [`Self::all_orders`] exposes every buyer's details, so callers must put it behind some form of administrative
/// access control.
pub struct OrderQueryApi<B> {
    db: B,
}

impl<B> Debug for OrderQueryApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderQueryApi")
    }
}

impl<B> OrderQueryApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> OrderQueryApi<B>
where B: OrderManagement
{
    pub async fn get_order(&self, id: i64) -> Result<Order, OrderQueryError> {
        self.db.fetch_order(id).await?.ok_or(OrderQueryError::OrderNotFound(id))
    }

    /// The visitor's orders, newest first
    pub async fn orders_for_visitor(&self, visitor_id: &VisitorId) -> Result<Vec<Order>, OrderQueryError> {
        if visitor_id.is_blank() {
            return Err(OrderQueryError::ValidationError("Visitor id is required".into()));
        }
        let orders = self.db.fetch_orders_for_visitor(visitor_id).await?;
        trace!("📦️ {} orders found for visitor {visitor_id}", orders.len());
        Ok(orders)
    }

    /// Every order in the store, newest first
    pub async fn all_orders(&self) -> Result<Vec<Order>, OrderQueryError> {
        let orders = self.db.fetch_all_orders().await?;
        debug!("📦️ Fetched all {} orders", orders.len());
        Ok(orders)
    }
}
