//! `SqliteDatabase` is the concrete storage backend for the storefront.
//!
//! Unsurprisingly, it uses SQLite and implements all the storage traits defined in the [`crate::traits`] module.
use std::fmt::Debug;

use log::*;
use sqlx::{migrate, SqlitePool};

use super::db::{carts, create_database_if_missing, db_url, new_pool, orders};
use crate::{
    db_types::{Cart, CartItem, NewOrder, Order, VisitorId},
    traits::{CartManagement, OrderManagement, StorageError, StoreDatabase},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({})", self.url)
    }
}

impl StoreDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn close(&mut self) -> Result<(), StorageError> {
        self.pool.close().await;
        Ok(())
    }
}

impl CartManagement for SqliteDatabase {
    async fn fetch_cart(&self, visitor_id: &VisitorId) -> Result<Option<Cart>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let cart = carts::fetch_cart(visitor_id, &mut conn).await?;
        Ok(cart)
    }

    async fn add_or_merge_items(&self, visitor_id: &VisitorId, items: &[CartItem]) -> Result<Cart, StorageError> {
        let mut tx = self.pool.begin().await?;
        let cart_id = carts::upsert_cart(visitor_id, &mut tx).await?;
        for item in items {
            carts::merge_item(cart_id, item, &mut tx).await?;
        }
        let cart = carts::fetch_cart(visitor_id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ {} items merged into cart #{cart_id} for visitor {visitor_id}", items.len());
        cart.ok_or_else(|| StorageError::InconsistentData(format!("Cart #{cart_id} vanished inside its transaction")))
    }

    async fn adjust_item_quantity(&self, cart_id: i64, name: &str, delta: i64) -> Result<bool, StorageError> {
        let mut tx = self.pool.begin().await?;
        let updated = carts::adjust_quantity(cart_id, name, delta, &mut tx).await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn remove_items_named(&self, cart_id: i64, name: &str) -> Result<u64, StorageError> {
        let mut tx = self.pool.begin().await?;
        let removed = carts::remove_items_named(cart_id, name, &mut tx).await?;
        tx.commit().await?;
        Ok(removed)
    }

    async fn delete_cart(&self, visitor_id: &VisitorId) -> Result<bool, StorageError> {
        let mut tx = self.pool.begin().await?;
        let deleted = carts::delete_cart(visitor_id, &mut tx).await?;
        tx.commit().await?;
        if deleted {
            debug!("🗃️ Cart for visitor {visitor_id} deleted");
        }
        Ok(deleted)
    }
}

impl OrderManagement for SqliteDatabase {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, StorageError> {
        let mut tx = self.pool.begin().await?;
        let id = orders::insert_order(order, &mut tx).await?;
        let order = orders::fetch_order_by_id(id, &mut tx).await?;
        tx.commit().await?;
        order.ok_or_else(|| StorageError::InconsistentData(format!("Order #{id} vanished inside its transaction")))
    }

    async fn fetch_order(&self, id: i64) -> Result<Option<Order>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_id(id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_by_gateway_id(&self, gateway_order_id: &str) -> Result<Option<Order>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_gateway_id(gateway_order_id, &mut conn).await?;
        Ok(order)
    }

    async fn mark_order_paid(
        &self,
        gateway_order_id: &str,
        gateway_payment_id: &str,
    ) -> Result<Option<Order>, StorageError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::mark_paid(gateway_order_id, gateway_payment_id, &mut tx).await?;
        tx.commit().await?;
        if let Some(order) = &order {
            debug!("🗃️ Order #{} ({gateway_order_id}) marked as paid by {gateway_payment_id}", order.id);
        }
        Ok(order)
    }

    async fn mark_order_failed(&self, gateway_order_id: &str, reason: &str) -> Result<Option<Order>, StorageError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::mark_failed(gateway_order_id, reason, &mut tx).await?;
        tx.commit().await?;
        if let Some(order) = &order {
            debug!("🗃️ Order #{} ({gateway_order_id}) marked as failed: {reason}", order.id);
        }
        Ok(order)
    }

    async fn fetch_orders_for_visitor(&self, visitor_id: &VisitorId) -> Result<Vec<Order>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_visitor(visitor_id, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_all_orders(&self) -> Result<Vec<Order>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_all_orders(&mut conn).await?;
        Ok(orders)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, using the URL in `SF_DATABASE_URL`.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Creates the database if needed, connects to it and brings the schema up to date.
    pub async fn open_and_migrate(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        create_database_if_missing(url).await?;
        let db = Self::new_with_url(url, max_connections).await?;
        db.run_migrations().await?;
        Ok(db)
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Migrations complete");
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
