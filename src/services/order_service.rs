use std::collections::HashMap;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbBackend, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, Statement, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    domain::{
        cart::CartLine,
        checkout::{self, CheckoutError, DeliveryType, PICKUP_ESTIMATED_MINUTES},
        coupon::{self, CouponError},
        loyalty,
        order_status::OrderStatus,
        pricing::{self, Quote},
    },
    dto::orders::{CheckoutRequest, CheckoutResponse, OrderHistory, OrderWithItems},
    entity::{
        carts::Entity as Carts,
        coupon_uses::ActiveModel as CouponUseActive,
        coupons::{ActiveModel as CouponActive, Column as CouponCol, Entity as Coupons},
        delivery_zones::Entity as DeliveryZones,
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
    },
    error::{AppError, AppResult},
    events::{OrderEvent, OrderEventKind},
    middleware::auth::AuthUser,
    models::{Order, OrderItem},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::{cart_service, coupon_service, loyalty_service},
    state::AppState,
};

/// Where the order goes and what delivery costs.
struct Fulfillment {
    address: Option<String>,
    zone_id: Option<Uuid>,
    fee: i64,
    estimated_time: i32,
}

/// Place an order for a signed-in customer or a guest.
///
/// Lines come from the request when given, otherwise from the caller's cart,
/// and are re-priced from the catalog. The order, its items, the coupon
/// redemption, loyalty credit and cart clearing are committed together.
pub async fn checkout(
    state: &AppState,
    user: Option<&AuthUser>,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<CheckoutResponse>> {
    let idempotency_key = payload
        .idempotency_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string);

    if let Some(key) = idempotency_key.as_deref() {
        if let Some(existing) = find_by_idempotency_key(&state.orm, user, key).await? {
            tracing::info!(order_id = %existing.order.id, "checkout replayed");
            return Ok(ApiResponse::success(
                "Order already placed",
                existing,
                Some(Meta::empty()),
            ));
        }
    }

    checkout::require("name", &payload.customer.name)?;
    checkout::require("phone", &payload.customer.phone)?;
    let change_amount = checkout::change_amount(
        payload.payment_method,
        payload.needs_change,
        payload.change_amount,
    )?;

    let lines = collect_lines(state, user, &payload).await?;
    if lines.is_empty() {
        return Err(CheckoutError::EmptyCart.into());
    }
    let subtotal: i64 = lines.iter().map(CartLine::line_total).sum();

    let fulfillment = resolve_fulfillment(state, &payload).await?;
    let order_amount = pricing::order_amount(subtotal, fulfillment.fee);

    let customer_email = payload
        .customer
        .email
        .as_deref()
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .map(str::to_string)
        .or_else(|| user.map(|u| u.email.clone()));
    let notes = payload
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|notes| !notes.is_empty())
        .map(str::to_string);

    let txn = state.orm.begin().await?;

    // Same-key checkouts queue here; a retry that waited sees the first order.
    if let Some(key) = idempotency_key.as_deref() {
        txn.execute(Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT pg_advisory_xact_lock(hashtext($1))",
            [key.into()],
        ))
        .await?;
        if let Some(existing) = find_by_idempotency_key(&txn, user, key).await? {
            txn.rollback().await?;
            tracing::info!(order_id = %existing.order.id, "concurrent checkout replayed");
            return Ok(ApiResponse::success(
                "Order already placed",
                existing,
                Some(Meta::empty()),
            ));
        }
    }

    let coupon = match payload.coupon_code.as_deref().map(coupon::normalize_code) {
        Some(code) if !code.is_empty() => {
            let model = Coupons::find()
                .filter(CouponCol::Code.eq(code))
                .lock(LockType::Update)
                .one(&txn)
                .await?
                .ok_or(CouponError::NotFound)?;
            let discount = coupon_service::terms_of(&model)?.apply(order_amount, Utc::now())?;
            Some((model, discount))
        }
        _ => None,
    };

    let quote = Quote::new(
        subtotal,
        fulfillment.fee,
        coupon.as_ref().map(|(_, discount)| *discount).unwrap_or(0),
    );

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.map(|u| u.user_id)),
        customer_name: Set(payload.customer.name.trim().to_string()),
        customer_email: Set(customer_email),
        customer_phone: Set(payload.customer.phone.trim().to_string()),
        customer_address: Set(fulfillment.address),
        subtotal_amount: Set(quote.subtotal),
        delivery_fee: Set(quote.delivery_fee),
        discount_amount: Set(quote.discount),
        total_amount: Set(quote.total),
        coupon_code: Set(coupon.as_ref().map(|(model, _)| model.code.clone())),
        payment_method: Set(payload.payment_method.as_str().to_string()),
        delivery_type: Set(payload.delivery_type.as_str().to_string()),
        delivery_zone_id: Set(fulfillment.zone_id),
        estimated_time: Set(fulfillment.estimated_time),
        needs_change: Set(change_amount > 0),
        change_amount: Set(change_amount),
        notes: Set(notes),
        status: Set(OrderStatus::Received.as_str().to_string()),
        order_date: Set(Utc::now().date_naive()),
        idempotency_key: Set(idempotency_key.clone()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut items: Vec<OrderItem> = Vec::with_capacity(lines.len());
    for line in &lines {
        let extras =
            serde_json::to_value(&line.extras).map_err(|err| AppError::Internal(err.into()))?;
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(Some(line.product_id)),
            product_name: Set(line.name.clone()),
            product_price: Set(line.price),
            quantity: Set(line.quantity),
            extras: Set(extras),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items.push(OrderItem::from(item));
    }

    if let Some((model, discount)) = coupon {
        let coupon_id = model.id;
        let uses = model.current_uses;
        let mut active: CouponActive = model.into();
        active.current_uses = Set(uses + 1);
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?;

        CouponUseActive {
            id: Set(Uuid::new_v4()),
            coupon_id: Set(coupon_id),
            order_id: Set(order.id),
            user_id: Set(user.map(|u| u.user_id)),
            discount_amount: Set(discount),
            used_at: NotSet,
        }
        .insert(&txn)
        .await?;
    }

    let mut points_earned = 0;
    if let Some(user) = user {
        points_earned = loyalty::points_for_total(quote.total);
        loyalty_service::credit_order(&txn, user.user_id, points_earned).await?;
        Carts::delete_by_id(user.user_id).exec(&txn).await?;
    }

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        total = quote.total,
        delivery_type = %payload.delivery_type,
        "order placed"
    );
    state.feed.publish(OrderEvent::new(
        OrderEventKind::Created,
        order.id,
        OrderStatus::Received,
    ));
    audit::record(
        &state.pool,
        user.map(|u| u.user_id),
        "checkout",
        "orders",
        serde_json::json!({ "order_id": order.id, "coupon": order.coupon_code }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order placed",
        CheckoutResponse {
            order: order.into(),
            items,
            quote,
            loyalty_points_earned: points_earned,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_my_orders(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<OrderHistory>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = Orders::find()
        .filter(OrderCol::UserId.eq(user.user_id))
        .order_by_desc(OrderCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let items = with_items(&state.orm, orders).await?;
    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Ok", OrderHistory { items }, Some(meta)))
}

pub async fn get_my_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let order = with_items(&state.orm, vec![order])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Ok", order, None))
}

/// Items of the given orders, grouped by order id.
pub async fn load_items<C: ConnectionTrait>(
    conn: &C,
    order_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Vec<OrderItem>>> {
    let mut grouped: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    if order_ids.is_empty() {
        return Ok(grouped);
    }
    let rows = OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(order_ids.to_vec()))
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(conn)
        .await?;
    for row in rows {
        grouped
            .entry(row.order_id)
            .or_default()
            .push(OrderItem::from(row));
    }
    Ok(grouped)
}

pub async fn with_items<C: ConnectionTrait>(
    conn: &C,
    orders: Vec<OrderModel>,
) -> AppResult<Vec<OrderWithItems>> {
    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let mut items = load_items(conn, &ids).await?;
    Ok(orders
        .into_iter()
        .map(|order| OrderWithItems {
            items: items.remove(&order.id).unwrap_or_default(),
            order: Order::from(order),
        })
        .collect())
}

async fn find_by_idempotency_key<C: ConnectionTrait>(
    conn: &C,
    user: Option<&AuthUser>,
    key: &str,
) -> AppResult<Option<CheckoutResponse>> {
    let existing = Orders::find()
        .filter(OrderCol::IdempotencyKey.eq(key))
        .one(conn)
        .await?;
    let order = match existing {
        Some(o) => o,
        None => return Ok(None),
    };
    if order.user_id != user.map(|u| u.user_id) {
        return Err(AppError::Conflict(
            "idempotency key already used".to_string(),
        ));
    }

    let quote = Quote::new(order.subtotal_amount, order.delivery_fee, order.discount_amount);
    let points = match order.user_id {
        Some(_) => loyalty::points_for_total(order.total_amount),
        None => 0,
    };
    let items = load_items(conn, &[order.id])
        .await?
        .remove(&order.id)
        .unwrap_or_default();

    Ok(Some(CheckoutResponse {
        order: order.into(),
        items,
        quote,
        loyalty_points_earned: points,
    }))
}

async fn collect_lines(
    state: &AppState,
    user: Option<&AuthUser>,
    payload: &CheckoutRequest,
) -> AppResult<Vec<CartLine>> {
    let mut lines = Vec::new();
    match (&payload.items, user) {
        (Some(requested), _) => {
            for line in requested {
                if line.quantity <= 0 {
                    return Err(CheckoutError::InvalidQuantity.into());
                }
                lines.push(
                    cart_service::resolve_line(
                        &state.orm,
                        line.product_id,
                        &line.extra_ids,
                        line.quantity,
                    )
                    .await?,
                );
            }
        }
        (None, Some(user)) => {
            let cart = cart_service::load_cart(&state.orm, user.user_id).await?;
            for line in cart.lines() {
                let key = line.key();
                lines.push(
                    cart_service::resolve_line(
                        &state.orm,
                        key.product_id(),
                        key.extra_ids(),
                        line.quantity,
                    )
                    .await?,
                );
            }
        }
        (None, None) => {}
    }
    Ok(lines)
}

async fn resolve_fulfillment(state: &AppState, payload: &CheckoutRequest) -> AppResult<Fulfillment> {
    match payload.delivery_type {
        DeliveryType::Pickup => Ok(Fulfillment {
            address: None,
            zone_id: None,
            fee: 0,
            estimated_time: PICKUP_ESTIMATED_MINUTES,
        }),
        DeliveryType::Delivery => {
            let address = payload.address.as_ref().ok_or(CheckoutError::MissingAddress)?;
            address.validate()?;
            let zone_id = payload.delivery_zone_id.ok_or(CheckoutError::MissingZone)?;
            let zone = DeliveryZones::find_by_id(zone_id)
                .one(&state.orm)
                .await?
                .filter(|zone| zone.is_active)
                .ok_or_else(|| AppError::BadRequest("Delivery zone is not available".into()))?;
            Ok(Fulfillment {
                address: Some(address.format()),
                zone_id: Some(zone.id),
                fee: zone.fee,
                estimated_time: zone.estimated_time,
            })
        }
    }
}
