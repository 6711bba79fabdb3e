use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::DeliveryZone;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateZoneRequest {
    pub name: String,
    pub fee: i64,
    pub estimated_time: i32,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateZoneRequest {
    pub name: Option<String>,
    pub fee: Option<i64>,
    pub estimated_time: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ZoneList {
    #[schema(value_type = Vec<DeliveryZone>)]
    pub items: Vec<DeliveryZone>,
}
