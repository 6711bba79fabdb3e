use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::{
        checkout::{AddressParts, DeliveryType, PaymentMethod},
        pricing::Quote,
    },
    models::{Order, OrderItem},
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CheckoutLine {
    pub product_id: Uuid,
    #[serde(default)]
    pub extra_ids: Vec<Uuid>,
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub customer: CustomerInfo,
    pub delivery_type: DeliveryType,
    pub address: Option<AddressParts>,
    pub delivery_zone_id: Option<Uuid>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub needs_change: bool,
    pub change_amount: Option<i64>,
    pub notes: Option<String>,
    pub coupon_code: Option<String>,
    /// Lines for guest checkout; signed-in customers may omit them to use their cart.
    pub items: Option<Vec<CheckoutLine>>,
    /// Retrying with the same key returns the order created the first time.
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub quote: Quote,
    /// Points added to the customer's balance, zero for guests.
    pub loyalty_points_earned: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderList {
    #[schema(value_type = Vec<Order>)]
    pub items: Vec<Order>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderHistory {
    #[schema(value_type = Vec<OrderWithItems>)]
    pub items: Vec<OrderWithItems>,
}
