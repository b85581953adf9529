use log::*;
use sqlx::SqliteConnection;

use crate::db_types::{NewOrder, Order, OrderItem, VisitorId};

/// Inserts a new order and its items using the given connection. This is not atomic. Embed the call in a transaction
/// and pass `&mut *tx` as the connection argument.
///
/// Returns the id of the new order.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let buyer = order.buyer_info;
    let id: i64 = sqlx::query_scalar(
        r#"
            INSERT INTO orders (
                visitor_id,
                name,
                email,
                phone,
                address,
                city,
                country,
                postal_code,
                total_amount,
                currency,
                gateway_order_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id;
        "#,
    )
    .bind(order.visitor_id.as_str())
    .bind(buyer.name)
    .bind(buyer.email)
    .bind(buyer.phone)
    .bind(buyer.address)
    .bind(buyer.city)
    .bind(buyer.country)
    .bind(buyer.postal_code)
    .bind(order.total_amount)
    .bind(order.currency)
    .bind(order.gateway_order_id)
    .fetch_one(&mut *conn)
    .await?;
    for item in &order.items {
        insert_order_item(id, item, conn).await?;
    }
    debug!("🗃️ Order #{id} inserted with {} items", order.items.len());
    Ok(id)
}

async fn insert_order_item(order_id: i64, item: &OrderItem, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO order_items (order_id, product_id, name, price, quantity) VALUES ($1, $2, $3, $4, $5)")
        .bind(order_id)
        .bind(item.product_id.as_str())
        .bind(item.name.as_str())
        .bind(item.price)
        .bind(item.quantity)
        .execute(conn)
        .await?;
    Ok(())
}

async fn with_items(order: Option<Order>, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    match order {
        Some(mut order) => {
            order.items = fetch_order_items(order.id, conn).await?;
            Ok(Some(order))
        },
        None => Ok(None),
    }
}

pub async fn fetch_order_items(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT product_id, name, price, quantity FROM order_items WHERE order_id = $1 ORDER BY id")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(items)
}

pub async fn fetch_order_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(&mut *conn).await?;
    with_items(order, conn).await
}

pub async fn fetch_order_by_gateway_id(
    gateway_order_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE gateway_order_id = $1")
        .bind(gateway_order_id)
        .fetch_optional(&mut *conn)
        .await?;
    with_items(order, conn).await
}

/// Marks the order as paid, but only if it is still pending. Returns `None` if nothing was updated.
pub async fn mark_paid(
    gateway_order_id: &str,
    gateway_payment_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            UPDATE orders SET payment_status = 'paid', gateway_payment_id = $1, updated_at = CURRENT_TIMESTAMP
            WHERE gateway_order_id = $2 AND payment_status = 'pending'
            RETURNING *;
        "#,
    )
    .bind(gateway_payment_id)
    .bind(gateway_order_id)
    .fetch_optional(&mut *conn)
    .await?;
    with_items(order, conn).await
}

/// Marks the order as failed, but only if it is still pending. Returns `None` if nothing was updated.
pub async fn mark_failed(
    gateway_order_id: &str,
    reason: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            UPDATE orders SET payment_status = 'failed', failure_reason = $1, updated_at = CURRENT_TIMESTAMP
            WHERE gateway_order_id = $2 AND payment_status = 'pending'
            RETURNING *;
        "#,
    )
    .bind(reason)
    .bind(gateway_order_id)
    .fetch_optional(&mut *conn)
    .await?;
    with_items(order, conn).await
}

/// Orders for the visitor, newest first
pub async fn fetch_orders_for_visitor(
    visitor_id: &VisitorId,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let orders: Vec<Order> =
        sqlx::query_as("SELECT * FROM orders WHERE visitor_id = $1 ORDER BY created_at DESC, id DESC")
            .bind(visitor_id.as_str())
            .fetch_all(&mut *conn)
            .await?;
    load_items(orders, conn).await
}

/// Every order, newest first
pub async fn fetch_all_orders(conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders: Vec<Order> =
        sqlx::query_as("SELECT * FROM orders ORDER BY created_at DESC, id DESC").fetch_all(&mut *conn).await?;
    load_items(orders, conn).await
}

async fn load_items(mut orders: Vec<Order>, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    for order in orders.iter_mut() {
        order.items = fetch_order_items(order.id, conn).await?;
    }
    Ok(orders)
}
