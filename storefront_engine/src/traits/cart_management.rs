use crate::{
    db_types::{Cart, CartItem, VisitorId},
    traits::StorageError,
};

/// Persistence for shopping carts.
///
/// Implementations MUST make every mutating call safe under concurrency: two merges for the same visitor and line
/// must both be reflected in the final quantity.
#[allow(async_fn_in_trait)]
pub trait CartManagement {
    /// Fetches the cart for the visitor, with its lines in insertion order.
    async fn fetch_cart(&self, visitor_id: &VisitorId) -> Result<Option<Cart>, StorageError>;

    /// Creates the visitor's cart if necessary, then for each item either adds its quantity to the existing line with
    /// the same `(name, size)`, or appends it as a new line. This is a single atomic transaction.
    ///
    /// Returns the updated cart.
    async fn add_or_merge_items(&self, visitor_id: &VisitorId, items: &[CartItem]) -> Result<Cart, StorageError>;

    /// Adds `delta` to the quantity of the first line in the cart named `name`, never going below 1.
    /// Returns `false` if there is no such line.
    async fn adjust_item_quantity(&self, cart_id: i64, name: &str, delta: i64) -> Result<bool, StorageError>;

    /// Removes every line named `name`, regardless of size. Returns the number of lines removed.
    async fn remove_items_named(&self, cart_id: i64, name: &str) -> Result<u64, StorageError>;

    /// Deletes the visitor's cart and all its lines. Returns `false` if there was no cart.
    async fn delete_cart(&self, visitor_id: &VisitorId) -> Result<bool, StorageError>;
}
