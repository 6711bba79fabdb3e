use chrono::{Duration, NaiveDate, Utc};

use crate::{
    domain::{
        order_status::OrderStatus,
        reports::{self, ItemFact, OrderFact},
    },
    dto::admin::{CustomerList, CustomerQuery, DashboardStats, ReportQuery, SalesReport},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    response::{ApiResponse, Meta},
    state::AppState,
};

const TOP_PRODUCTS: usize = 10;

pub async fn dashboard(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<DashboardStats>> {
    ensure_admin(state, user).await?;
    let today = Utc::now().date_naive();
    let pending: Vec<String> = OrderStatus::PENDING
        .iter()
        .map(|status| status.as_str().to_string())
        .collect();

    let (today_revenue, today_orders, total_products, pending_orders): (i64, i64, i64, i64) =
        sqlx::query_as(
            r#"
            SELECT
                (SELECT COALESCE(SUM(total_amount), 0)::BIGINT FROM orders WHERE order_date = $1),
                (SELECT COUNT(*) FROM orders WHERE order_date = $1),
                (SELECT COUNT(*) FROM products),
                (SELECT COUNT(*) FROM orders WHERE status = ANY($2))
            "#,
        )
        .bind(today)
        .bind(pending)
        .fetch_one(&state.pool)
        .await?;

    Ok(ApiResponse::success(
        "Dashboard",
        DashboardStats {
            today_revenue,
            total_products,
            pending_orders,
            today_orders,
        },
        None,
    ))
}

pub async fn sales_report(
    state: &AppState,
    user: &AuthUser,
    query: ReportQuery,
) -> AppResult<ApiResponse<SalesReport>> {
    ensure_admin(state, user).await?;
    let days = query.window_days();
    let since = window_start(Utc::now().date_naive(), days);

    let orders = sqlx::query_as::<_, OrderFact>(
        r#"
        SELECT customer_name, customer_email, customer_phone, customer_address,
               total_amount, status, order_date
        FROM orders
        WHERE order_date >= $1
        "#,
    )
    .bind(since)
    .fetch_all(&state.pool)
    .await?;

    let items = sqlx::query_as::<_, ItemFact>(
        r#"
        SELECT oi.product_name, oi.quantity
        FROM order_items oi
        JOIN orders o ON o.id = oi.order_id
        WHERE o.status = $1 AND o.order_date >= $2
        "#,
    )
    .bind(OrderStatus::Delivered.as_str())
    .bind(since)
    .fetch_all(&state.pool)
    .await?;

    tracing::debug!(days, orders = orders.len(), items = items.len(), "sales report");

    Ok(ApiResponse::success(
        "Report",
        SalesReport {
            days,
            daily: reports::daily_sales(&orders),
            top_products: reports::top_products(&items, TOP_PRODUCTS),
            overview: reports::overview(&orders),
        },
        Some(Meta::empty()),
    ))
}

pub async fn customers(
    state: &AppState,
    user: &AuthUser,
    query: CustomerQuery,
) -> AppResult<ApiResponse<CustomerList>> {
    ensure_admin(state, user).await?;
    let orders = sqlx::query_as::<_, OrderFact>(
        r#"
        SELECT customer_name, customer_email, customer_phone, customer_address,
               total_amount, status, order_date
        FROM orders
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    let mut items = reports::customers(&orders);
    if let Some(term) = query.q.as_deref() {
        items = reports::search_customers(items, term);
    }
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Customers",
        CustomerList { items },
        Some(Meta::new(1, total, total)),
    ))
}

/// First day of a window of `days` days ending today.
fn window_start(today: NaiveDate, days: i64) -> NaiveDate {
    today - Duration::days(days.max(1) - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_includes_today() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        assert_eq!(window_start(today, 7), NaiveDate::from_ymd_opt(2025, 3, 25).unwrap());
        assert_eq!(window_start(today, 1), today);
    }
}
