use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    order_status::OrderStatus,
    reports::{CustomerSummary, DailySales, Overview, ProductSales},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub today_revenue: i64,
    pub total_products: i64,
    pub pending_orders: i64,
    pub today_orders: i64,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CustomerQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CustomerList {
    #[schema(value_type = Vec<CustomerSummary>)]
    pub items: Vec<CustomerSummary>,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    /// Window length in days: 7, 30 or 90.
    pub days: Option<i64>,
}

impl ReportQuery {
    pub fn window_days(&self) -> i64 {
        match self.days {
            Some(days @ (7 | 30 | 90)) => days,
            _ => 30,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SalesReport {
    pub days: i64,
    pub daily: Vec<DailySales>,
    pub top_products: Vec<ProductSales>,
    pub overview: Overview,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SetupResponse {
    pub granted: bool,
}
