use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct LoyaltyBalance {
    pub points: i64,
    pub total_orders: i32,
    pub reward_credits: i64,
}
