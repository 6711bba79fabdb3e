use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    domain::{money::Money, order_status::OrderStatus},
    dto::{
        admin::{SetupResponse, UpdateOrderStatusRequest},
        orders::{OrderHistory, OrderList, OrderWithItems},
        products::ProductList,
    },
    entity::orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
    error::{AppError, AppResult},
    events::{OrderEvent, OrderEventKind},
    middleware::auth::{AuthUser, ensure_admin},
    models::Order,
    response::{ApiResponse, Meta},
    routes::params::{CatalogQuery, ExportQuery, OrderListQuery, SortOrder},
    services::{order_service, product_service, role_service},
    state::AppState,
};

const CSV_HEADER: [&str; 16] = [
    "id",
    "created_at",
    "status",
    "customer_name",
    "customer_phone",
    "customer_email",
    "customer_address",
    "delivery_type",
    "payment_method",
    "subtotal",
    "delivery_fee",
    "discount",
    "total",
    "coupon_code",
    "needs_change",
    "change_amount",
];

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(state, user).await?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Orders", OrderList { items: orders }, Some(meta)))
}

pub async fn get_order_admin(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_admin(state, user).await?;
    let order = match Orders::find_by_id(id).one(&state.orm).await? {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let data = order_service::with_items(&state.orm, vec![order])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Order found", data, Some(Meta::empty())))
}

/// Kitchen board: orders still in progress, oldest first, with their items.
pub async fn active_orders(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<OrderHistory>> {
    ensure_admin(state, user).await?;
    let active: Vec<&str> = OrderStatus::ACTIVE.iter().map(OrderStatus::as_str).collect();
    let orders = Orders::find()
        .filter(OrderCol::Status.is_in(active))
        .order_by_asc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let items = order_service::with_items(&state.orm, orders).await?;
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Active orders",
        OrderHistory { items },
        Some(Meta::new(1, total, total)),
    ))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(state, user).await?;

    let txn = state.orm.begin().await?;
    let existing = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let existing = match existing {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let current: OrderStatus = existing.status.parse()?;
    let next = current.transition_to(payload.status)?;

    let mut active: OrderActive = existing.into();
    active.status = Set(next.as_str().to_string());
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(order_id = %order.id, from = %current, to = %next, "order status changed");
    state
        .feed
        .publish(OrderEvent::new(OrderEventKind::StatusChanged, order.id, next));
    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_status_update",
        "orders",
        serde_json::json!({ "order_id": order.id, "from": current, "to": next }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order updated",
        order.into(),
        Some(Meta::empty()),
    ))
}

/// Every order as CSV, newest first, optionally limited to one status.
pub async fn export_orders_csv(
    state: &AppState,
    user: &AuthUser,
    query: ExportQuery,
) -> AppResult<String> {
    ensure_admin(state, user).await?;

    let mut finder = Orders::find().order_by_desc(OrderCol::CreatedAt);
    if let Some(status) = query.status {
        finder = finder.filter(OrderCol::Status.eq(status.as_str()));
    }
    let orders: Vec<Order> = finder
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    let csv = orders_to_csv(&orders).map_err(AppError::Internal)?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "orders_export",
        "orders",
        serde_json::json!({ "rows": orders.len(), "status": query.status }),
    )
    .await;

    Ok(csv)
}

pub fn orders_to_csv(orders: &[Order]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for order in orders {
        writer.write_record([
            order.id.to_string(),
            order.created_at.to_rfc3339(),
            order.status.clone(),
            order.customer_name.clone(),
            order.customer_phone.clone(),
            order.customer_email.clone().unwrap_or_default(),
            order.customer_address.clone().unwrap_or_default(),
            order.delivery_type.clone(),
            order.payment_method.clone(),
            Money(order.subtotal_amount).to_string(),
            Money(order.delivery_fee).to_string(),
            Money(order.discount_amount).to_string(),
            Money(order.total_amount).to_string(),
            order.coupon_code.clone().unwrap_or_default(),
            order.needs_change.to_string(),
            Money(order.change_amount).to_string(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("csv flush failed: {}", err))?;
    Ok(String::from_utf8(bytes)?)
}

/// Catalog as the back-office sees it, unavailable products included.
pub async fn list_products(
    state: &AppState,
    user: &AuthUser,
    query: CatalogQuery,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_admin(state, user).await?;
    product_service::list_products(state, query, true).await
}

/// Grant the admin role to the caller while no admin exists yet.
pub async fn setup_first_admin(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<SetupResponse>> {
    let txn = state.orm.begin().await?;
    txn.execute_unprepared("LOCK TABLE user_roles IN SHARE ROW EXCLUSIVE MODE")
        .await?;

    if role_service::admin_exists(&txn).await? {
        tracing::warn!(user_id = %user.user_id, "admin setup refused, an admin already exists");
        return Err(AppError::Forbidden);
    }
    role_service::grant(&txn, user.user_id, role_service::ADMIN_ROLE).await?;
    txn.commit().await?;

    tracing::info!(user_id = %user.user_id, "first admin granted");
    audit::record(
        &state.pool,
        Some(user.user_id),
        "admin_setup",
        "user_roles",
        serde_json::json!({ "user_id": user.user_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Admin access granted",
        SetupResponse { granted: true },
        Some(Meta::empty()),
    ))
}
