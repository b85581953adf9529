use std::{collections::BTreeMap, fmt::Debug};

use log::*;

use crate::{
    db_types::{Cart, CartItem, QuantityAction, VisitorId, MAX_ITEM_QUANTITY},
    traits::CartManagement,
    CartApiError,
};

/// `CartApi` reconciles the item lists a visitor sends against their stored cart.
///
/// Cart lines are keyed by `(name, size)`. Adding an item whose key is already in the cart increases that line's
/// quantity; anything else is appended.
pub struct CartApi<B> {
    db: B,
}

impl<B> Debug for CartApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CartApi")
    }
}

impl<B> CartApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }
}

impl<B> CartApi<B>
where B: CartManagement
{
    /// Merges `items` into the visitor's cart, creating the cart on first use. Returns the full cart.
    pub async fn add_or_merge_items(&self, visitor_id: &VisitorId, items: Vec<CartItem>) -> Result<Cart, CartApiError> {
        require_visitor(visitor_id)?;
        if items.is_empty() {
            return Err(CartApiError::ValidationError("Items are required".into()));
        }
        let items = items
            .into_iter()
            .map(|mut item| {
                validate_item(&item)?;
                item.normalise_size();
                Ok(item)
            })
            .collect::<Result<Vec<CartItem>, CartApiError>>()?;
        let existing = self.db.fetch_cart(visitor_id).await?;
        check_merged_quantities(existing.as_ref(), &items)?;
        let cart = self.db.add_or_merge_items(visitor_id, &items).await?;
        info!("🛒️ {} items added to cart for visitor {visitor_id}. Cart now has {} lines", items.len(), cart.items.len());
        Ok(cart)
    }

    /// Increments or decrements the quantity of the first line named `name`. Decrementing never takes a line below
    /// a quantity of one; use [`Self::remove_item`] for that.
    ///
    /// Only the name is matched. If the cart holds several sizes of the item, the earliest-added one is adjusted.
    pub async fn adjust_quantity(
        &self,
        visitor_id: &VisitorId,
        name: &str,
        action: QuantityAction,
    ) -> Result<Cart, CartApiError> {
        require_visitor(visitor_id)?;
        require_name(name)?;
        let cart = self.db.fetch_cart(visitor_id).await?.ok_or(CartApiError::CartNotFound)?;
        let at_limit = cart.find_item(name).map(|i| i.quantity >= MAX_ITEM_QUANTITY).unwrap_or(false);
        if action == QuantityAction::Increment && at_limit {
            return Err(too_many(name));
        }
        let updated = self.db.adjust_item_quantity(cart.id, name, action.delta()).await?;
        if !updated {
            return Err(CartApiError::ItemNotFound(name.to_string()));
        }
        debug!("🛒️ {action} applied to '{name}' in cart #{}", cart.id);
        self.get_cart(visitor_id).await
    }

    pub async fn get_cart(&self, visitor_id: &VisitorId) -> Result<Cart, CartApiError> {
        require_visitor(visitor_id)?;
        self.db.fetch_cart(visitor_id).await?.ok_or(CartApiError::CartNotFound)
    }

    /// Removes every line named `name`, whatever its size. Removing an item that isn't in the cart is not an error.
    pub async fn remove_item(&self, visitor_id: &VisitorId, name: &str) -> Result<Cart, CartApiError> {
        require_visitor(visitor_id)?;
        require_name(name)?;
        let cart = self.db.fetch_cart(visitor_id).await?.ok_or(CartApiError::CartNotFound)?;
        let removed = self.db.remove_items_named(cart.id, name).await?;
        debug!("🛒️ Removed {removed} lines named '{name}' from cart #{}", cart.id);
        self.get_cart(visitor_id).await
    }
}

fn require_visitor(visitor_id: &VisitorId) -> Result<(), CartApiError> {
    if visitor_id.is_blank() {
        return Err(CartApiError::ValidationError("Visitor id is required".into()));
    }
    Ok(())
}

fn require_name(name: &str) -> Result<(), CartApiError> {
    if name.trim().is_empty() {
        return Err(CartApiError::ValidationError("Item name is required".into()));
    }
    Ok(())
}

fn validate_item(item: &CartItem) -> Result<(), CartApiError> {
    require_name(&item.name)?;
    if item.price.is_negative() {
        return Err(CartApiError::ValidationError(format!("Price of '{}' cannot be negative", item.name)));
    }
    if item.quantity < 1 {
        return Err(CartApiError::ValidationError(format!("Quantity of '{}' must be at least 1", item.name)));
    }
    if item.quantity > MAX_ITEM_QUANTITY {
        return Err(too_many(&item.name));
    }
    Ok(())
}

fn too_many(name: &str) -> CartApiError {
    CartApiError::ValidationError(format!("Quantity of '{name}' cannot be more than {MAX_ITEM_QUANTITY}"))
}

/// Every `(name, size)` line must stay within [`MAX_ITEM_QUANTITY`] once `items` are merged into `cart`.
fn check_merged_quantities(cart: Option<&Cart>, items: &[CartItem]) -> Result<(), CartApiError> {
    let mut merged = BTreeMap::<(&str, Option<&str>), i64>::new();
    let stored = cart.map(|c| c.items.as_slice()).unwrap_or_default();
    for item in stored.iter().chain(items) {
        let qty = merged.entry((item.name.as_str(), item.size.as_deref())).or_default();
        *qty = qty.saturating_add(item.quantity);
        if *qty > MAX_ITEM_QUANTITY {
            return Err(too_many(&item.name));
        }
    }
    Ok(())
}
