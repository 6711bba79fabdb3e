//! Aggregations behind the admin reports and customer views.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::order_status::OrderStatus;

/// The order columns the reports need.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct OrderFact {
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: String,
    pub customer_address: Option<String>,
    pub total_amount: i64,
    pub status: String,
    pub order_date: NaiveDate,
}

impl OrderFact {
    fn is_delivered(&self) -> bool {
        self.status == OrderStatus::Delivered.as_str()
    }
}

/// One order line of a delivered order.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ItemFact {
    pub product_name: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DailySales {
    pub date: NaiveDate,
    pub revenue: i64,
    pub orders: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ProductSales {
    pub name: String,
    pub quantity: i64,
    pub orders: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Overview {
    pub total_revenue: i64,
    pub total_orders: i64,
    pub completed_orders: i64,
    pub average_order_value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CustomerSummary {
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub address: Option<String>,
    pub total_orders: i64,
    pub total_spent: i64,
    pub delivered_orders: i64,
    pub last_order: NaiveDate,
}

/// Revenue and order count of delivered orders per day, oldest first.
pub fn daily_sales(orders: &[OrderFact]) -> Vec<DailySales> {
    let mut by_day: BTreeMap<NaiveDate, DailySales> = BTreeMap::new();
    for order in orders.iter().filter(|o| o.is_delivered()) {
        let day = by_day.entry(order.order_date).or_insert(DailySales {
            date: order.order_date,
            revenue: 0,
            orders: 0,
        });
        day.revenue += order.total_amount;
        day.orders += 1;
    }
    by_day.into_values().collect()
}

/// Best sellers by quantity; ties are broken by name.
pub fn top_products(items: &[ItemFact], limit: usize) -> Vec<ProductSales> {
    let mut by_name: HashMap<&str, ProductSales> = HashMap::new();
    for item in items {
        let entry = by_name
            .entry(item.product_name.as_str())
            .or_insert_with(|| ProductSales {
                name: item.product_name.clone(),
                quantity: 0,
                orders: 0,
            });
        entry.quantity += i64::from(item.quantity);
        entry.orders += 1;
    }
    let mut ranked: Vec<ProductSales> = by_name.into_values().collect();
    ranked.sort_by(|a, b| b.quantity.cmp(&a.quantity).then_with(|| a.name.cmp(&b.name)));
    ranked.truncate(limit);
    ranked
}

pub fn overview(orders: &[OrderFact]) -> Overview {
    let (total_revenue, completed_orders) = orders
        .iter()
        .filter(|o| o.is_delivered())
        .fold((0_i64, 0_i64), |(revenue, count), o| {
            (revenue + o.total_amount, count + 1)
        });
    let average_order_value = if completed_orders > 0 {
        total_revenue / completed_orders
    } else {
        0
    };
    Overview {
        total_revenue,
        total_orders: orders.len() as i64,
        completed_orders,
        average_order_value,
    }
}

/// Group orders by (name, phone), biggest spenders first.
pub fn customers(orders: &[OrderFact]) -> Vec<CustomerSummary> {
    let mut by_customer: HashMap<(&str, &str), CustomerSummary> = HashMap::new();
    for order in orders {
        let key = (order.customer_name.as_str(), order.customer_phone.as_str());
        let customer = by_customer.entry(key).or_insert_with(|| CustomerSummary {
            name: order.customer_name.clone(),
            email: order.customer_email.clone(),
            phone: order.customer_phone.clone(),
            address: order.customer_address.clone(),
            total_orders: 0,
            total_spent: 0,
            delivered_orders: 0,
            last_order: order.order_date,
        });
        customer.total_orders += 1;
        customer.total_spent += order.total_amount;
        if order.is_delivered() {
            customer.delivered_orders += 1;
        }
        if order.order_date > customer.last_order {
            customer.last_order = order.order_date;
        }
        if customer.email.is_none() {
            customer.email = order.customer_email.clone();
        }
        if customer.address.is_none() {
            customer.address = order.customer_address.clone();
        }
    }
    let mut list: Vec<CustomerSummary> = by_customer.into_values().collect();
    list.sort_by(|a, b| {
        b.total_spent
            .cmp(&a.total_spent)
            .then_with(|| a.name.cmp(&b.name))
    });
    list
}

/// Case-insensitive match on name, phone or email.
pub fn search_customers(list: Vec<CustomerSummary>, term: &str) -> Vec<CustomerSummary> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return list;
    }
    list.into_iter()
        .filter(|c| {
            c.name.to_lowercase().contains(&term)
                || c.phone.to_lowercase().contains(&term)
                || c.email
                    .as_deref()
                    .is_some_and(|email| email.to_lowercase().contains(&term))
        })
        .collect()
}
