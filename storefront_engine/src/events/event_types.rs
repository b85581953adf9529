use serde::{Deserialize, Serialize};

use crate::db_types::Order;

/// Published once, when an order's payment has been verified and the order has moved to `paid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPaidEvent {
    pub order: Order,
}

impl OrderPaidEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}
