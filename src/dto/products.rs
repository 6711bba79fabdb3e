use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{dto::reviews::ProductRating, models::ProductWithExtras};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ExtraInput {
    pub name: String,
    pub price: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub original_price: Option<i64>,
    pub image: Option<String>,
    pub category: String,
    pub is_available: Option<bool>,
    pub is_highlight: Option<bool>,
    #[serde(default)]
    pub extras: Vec<ExtraInput>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub original_price: Option<i64>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub is_available: Option<bool>,
    pub is_highlight: Option<bool>,
    /// When present, replaces every extra of the product.
    pub extras: Option<Vec<ExtraInput>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AvailabilityRequest {
    pub is_available: bool,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<ProductWithExtras>)]
    pub items: Vec<ProductWithExtras>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: ProductWithExtras,
    pub rating: ProductRating,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema, sqlx::FromRow)]
pub struct CategoryCount {
    pub category: String,
    pub products: i64,
}
