use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    domain::coupon::{self, CouponError, CouponTerms, DiscountType},
    dto::coupons::{
        CouponList, CouponQuote, CreateCouponRequest, UpdateCouponRequest, ValidateCouponRequest,
    },
    entity::coupons::{ActiveModel, Column, Entity as Coupons, Model as CouponModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Coupon,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn terms_of(model: &CouponModel) -> AppResult<CouponTerms> {
    Ok(CouponTerms {
        discount_type: model.discount_type.parse::<DiscountType>()?,
        discount_value: model.discount_value,
        min_order_value: model.min_order_value,
        max_uses: model.max_uses,
        current_uses: model.current_uses,
        expires_at: model.expires_at.map(|dt| dt.with_timezone(&Utc)),
        is_active: model.is_active,
    })
}

pub async fn find_by_code<C: ConnectionTrait>(conn: &C, code: &str) -> AppResult<CouponModel> {
    let code = coupon::normalize_code(code);
    Coupons::find()
        .filter(Column::Code.eq(code))
        .one(conn)
        .await?
        .ok_or_else(|| CouponError::NotFound.into())
}

/// Quote a coupon against an order amount without consuming it.
pub async fn validate_coupon(
    state: &AppState,
    payload: ValidateCouponRequest,
) -> AppResult<ApiResponse<CouponQuote>> {
    coupon::validate_order_amount(payload.order_amount)?;
    let model = find_by_code(&state.orm, &payload.code).await?;
    let terms = terms_of(&model)?;
    let discount = terms.apply(payload.order_amount, Utc::now())?;

    Ok(ApiResponse::success(
        "Coupon applied",
        CouponQuote {
            code: model.code,
            discount_type: terms.discount_type,
            discount,
        },
        None,
    ))
}

pub async fn list_coupons(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<CouponList>> {
    ensure_admin(state, user).await?;
    let items = Coupons::find()
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Coupon::from)
        .collect();
    Ok(ApiResponse::success("Coupons", CouponList { items }, Some(Meta::empty())))
}

pub async fn create_coupon(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCouponRequest,
) -> AppResult<ApiResponse<Coupon>> {
    ensure_admin(state, user).await?;
    let code = coupon::normalize_code(&payload.code);
    if code.is_empty() {
        return Err(AppError::BadRequest("code is required".into()));
    }
    coupon::validate_discount(payload.discount_type, payload.discount_value)?;
    validate_limits(payload.min_order_value, payload.max_uses)?;
    ensure_code_free(state, &code, None).await?;

    let model = ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(code),
        description: Set(payload.description),
        discount_type: Set(payload.discount_type.as_str().to_string()),
        discount_value: Set(payload.discount_value),
        min_order_value: Set(payload.min_order_value),
        max_uses: Set(payload.max_uses),
        current_uses: Set(0),
        expires_at: Set(payload.expires_at.map(Into::into)),
        is_active: Set(payload.is_active.unwrap_or(true)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "coupon_create",
        "coupons",
        serde_json::json!({ "coupon_id": model.id, "code": model.code }),
    )
    .await;

    Ok(ApiResponse::success("Coupon created", model.into(), Some(Meta::empty())))
}

pub async fn update_coupon(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCouponRequest,
) -> AppResult<ApiResponse<Coupon>> {
    ensure_admin(state, user).await?;
    let existing = match Coupons::find_by_id(id).one(&state.orm).await? {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };

    let discount_type = match payload.discount_type {
        Some(t) => t,
        None => existing.discount_type.parse::<DiscountType>()?,
    };
    let discount_value = payload.discount_value.unwrap_or(existing.discount_value);
    coupon::validate_discount(discount_type, discount_value)?;
    validate_limits(payload.min_order_value.flatten(), payload.max_uses.flatten())?;

    let mut active: ActiveModel = existing.into();
    if let Some(code) = payload.code {
        let code = coupon::normalize_code(&code);
        if code.is_empty() {
            return Err(AppError::BadRequest("code is required".into()));
        }
        ensure_code_free(state, &code, Some(id)).await?;
        active.code = Set(code);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    active.discount_type = Set(discount_type.as_str().to_string());
    active.discount_value = Set(discount_value);
    if let Some(min_order_value) = payload.min_order_value {
        active.min_order_value = Set(min_order_value);
    }
    if let Some(max_uses) = payload.max_uses {
        active.max_uses = Set(max_uses);
    }
    if let Some(expires_at) = payload.expires_at {
        active.expires_at = Set(expires_at.map(Into::into));
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Utc::now().into());
    let model = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "coupon_update",
        "coupons",
        serde_json::json!({ "coupon_id": model.id }),
    )
    .await;

    Ok(ApiResponse::success("Updated", model.into(), Some(Meta::empty())))
}

pub async fn delete_coupon(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(state, user).await?;
    let result = Coupons::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "coupon_delete",
        "coupons",
        serde_json::json!({ "coupon_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn ensure_code_free(state: &AppState, code: &str, current: Option<Uuid>) -> AppResult<()> {
    let taken = Coupons::find()
        .filter(Column::Code.eq(code))
        .one(&state.orm)
        .await?
        .filter(|coupon| Some(coupon.id) != current);
    if taken.is_some() {
        return Err(AppError::Conflict(format!("coupon {} already exists", code)));
    }
    Ok(())
}

fn validate_limits(min_order_value: Option<i64>, max_uses: Option<i32>) -> AppResult<()> {
    if min_order_value.is_some_and(|v| v < 0) {
        return Err(AppError::BadRequest(
            "min_order_value must not be negative".into(),
        ));
    }
    if max_uses.is_some_and(|v| v < 1) {
        return Err(AppError::BadRequest("max_uses must be at least 1".into()));
    }
    Ok(())
}
