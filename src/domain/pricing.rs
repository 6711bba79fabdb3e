use serde::Serialize;
use utoipa::ToSchema;

/// Final amounts of an order, all in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Quote {
    pub subtotal: i64,
    pub delivery_fee: i64,
    pub discount: i64,
    pub total: i64,
}

impl Quote {
    /// The discount is clamped so the total never goes below zero.
    pub fn new(subtotal: i64, delivery_fee: i64, discount: i64) -> Self {
        let order_amount = order_amount(subtotal, delivery_fee);
        let discount = discount.clamp(0, order_amount);
        Self {
            subtotal,
            delivery_fee,
            discount,
            total: order_amount - discount,
        }
    }
}

/// Amount a coupon is evaluated against.
pub fn order_amount(subtotal: i64, delivery_fee: i64) -> i64 {
    subtotal.max(0) + delivery_fee.max(0)
}
