use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::cart::{Cart, CartLine};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    #[serde(default)]
    pub extra_ids: Vec<Uuid>,
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLineView {
    /// Stable identifier of the line, used in `/api/cart/items/{key}`.
    pub key: String,
    #[serde(flatten)]
    pub line: CartLine,
    pub line_total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub item_count: i64,
    pub total: i64,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let items = cart
            .lines()
            .iter()
            .map(|line| CartLineView {
                key: line.key().to_string(),
                line: line.clone(),
                line_total: line.line_total(),
            })
            .collect();
        Self {
            items,
            item_count: cart.item_count(),
            total: cart.total(),
        }
    }
}
