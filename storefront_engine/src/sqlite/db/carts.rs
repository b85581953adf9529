use log::*;
use sqlx::SqliteConnection;

use crate::db_types::{Cart, CartItem, CartRecord, VisitorId};

/// Fetches the visitor's cart, along with its line items in insertion order.
pub async fn fetch_cart(visitor_id: &VisitorId, conn: &mut SqliteConnection) -> Result<Option<Cart>, sqlx::Error> {
    let record: Option<CartRecord> =
        sqlx::query_as("SELECT id, visitor_id, created_at, updated_at FROM carts WHERE visitor_id = $1")
            .bind(visitor_id.as_str())
            .fetch_optional(&mut *conn)
            .await?;
    match record {
        Some(record) => {
            let items = fetch_cart_items(record.id, conn).await?;
            Ok(Some(record.with_items(items)))
        },
        None => Ok(None),
    }
}

pub async fn fetch_cart_items(cart_id: i64, conn: &mut SqliteConnection) -> Result<Vec<CartItem>, sqlx::Error> {
    let items = sqlx::query_as(
        "SELECT name, price, quantity, NULLIF(size, '') AS size FROM cart_items WHERE cart_id = $1 ORDER BY id",
    )
    .bind(cart_id)
    .fetch_all(conn)
    .await?;
    Ok(items)
}

/// Returns the id of the visitor's cart, creating the cart if it does not exist. The cart's `updated_at` is bumped
/// either way.
pub async fn upsert_cart(visitor_id: &VisitorId, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let id: i64 = sqlx::query_scalar(
        r#"
            INSERT INTO carts (visitor_id) VALUES ($1)
            ON CONFLICT (visitor_id) DO UPDATE SET updated_at = CURRENT_TIMESTAMP
            RETURNING id;
        "#,
    )
    .bind(visitor_id.as_str())
    .fetch_one(conn)
    .await?;
    Ok(id)
}

/// Appends the item to the cart, or, if a line with the same `(name, size)` exists, adds to its quantity.
///
/// This is a single statement, so concurrent merges into the same line cannot lose updates. The price of an existing
/// line is kept.
pub async fn merge_item(cart_id: i64, item: &CartItem, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
            INSERT INTO cart_items (cart_id, name, price, quantity, size) VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (cart_id, name, size) DO UPDATE SET quantity = quantity + excluded.quantity;
        "#,
    )
    .bind(cart_id)
    .bind(item.name.as_str())
    .bind(item.price)
    .bind(item.quantity)
    .bind(item.size.as_deref().unwrap_or_default())
    .execute(conn)
    .await?;
    trace!("🗃️ Merged {} x {} into cart #{cart_id}", item.quantity, item.name);
    Ok(())
}

/// Adds `delta` to the quantity of the first line (by insertion order) named `name`, with a floor of 1.
/// Returns `false` if there is no such line.
pub async fn adjust_quantity(
    cart_id: i64,
    name: &str,
    delta: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
            UPDATE cart_items SET quantity = MAX(1, quantity + $1)
            WHERE id = (SELECT id FROM cart_items WHERE cart_id = $2 AND name = $3 ORDER BY id LIMIT 1);
        "#,
    )
    .bind(delta)
    .bind(cart_id)
    .bind(name)
    .execute(&mut *conn)
    .await?;
    let updated = result.rows_affected() > 0;
    if updated {
        touch_cart(cart_id, conn).await?;
    }
    Ok(updated)
}

/// Deletes every line named `name`, of any size. Returns the number of lines removed.
pub async fn remove_items_named(cart_id: i64, name: &str, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND name = $2")
        .bind(cart_id)
        .bind(name)
        .execute(&mut *conn)
        .await?;
    touch_cart(cart_id, conn).await?;
    Ok(result.rows_affected())
}

/// Deletes the visitor's cart and its lines. This is not atomic on its own; run it in a transaction.
pub async fn delete_cart(visitor_id: &VisitorId, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    sqlx::query("DELETE FROM cart_items WHERE cart_id IN (SELECT id FROM carts WHERE visitor_id = $1)")
        .bind(visitor_id.as_str())
        .execute(&mut *conn)
        .await?;
    let result = sqlx::query("DELETE FROM carts WHERE visitor_id = $1").bind(visitor_id.as_str()).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

async fn touch_cart(cart_id: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE carts SET updated_at = CURRENT_TIMESTAMP WHERE id = $1").bind(cart_id).execute(conn).await?;
    Ok(())
}
