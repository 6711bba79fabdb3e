use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit,
    dto::zones::{CreateZoneRequest, UpdateZoneRequest, ZoneList},
    entity::delivery_zones::{ActiveModel, Column, Entity as DeliveryZones},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::DeliveryZone,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Zones offered at checkout.
pub async fn list_active(state: &AppState) -> AppResult<ApiResponse<ZoneList>> {
    let items = DeliveryZones::find()
        .filter(Column::IsActive.eq(true))
        .order_by_asc(Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(DeliveryZone::from)
        .collect();
    Ok(ApiResponse::success("Delivery zones", ZoneList { items }, None))
}

pub async fn list_all(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<ZoneList>> {
    ensure_admin(state, user).await?;
    let items = DeliveryZones::find()
        .order_by_asc(Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(DeliveryZone::from)
        .collect();
    Ok(ApiResponse::success("Delivery zones", ZoneList { items }, Some(Meta::empty())))
}

pub async fn create_zone(
    state: &AppState,
    user: &AuthUser,
    payload: CreateZoneRequest,
) -> AppResult<ApiResponse<DeliveryZone>> {
    ensure_admin(state, user).await?;
    validate(Some(&payload.name), Some(payload.fee), Some(payload.estimated_time))?;

    let name = payload.name.trim().to_string();
    let taken = DeliveryZones::find()
        .filter(Column::Name.eq(name.clone()))
        .one(&state.orm)
        .await?;
    if taken.is_some() {
        return Err(AppError::Conflict(format!("zone {} already exists", name)));
    }

    let zone = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        fee: Set(payload.fee),
        estimated_time: Set(payload.estimated_time),
        is_active: Set(payload.is_active.unwrap_or(true)),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "zone_create",
        "delivery_zones",
        serde_json::json!({ "zone_id": zone.id }),
    )
    .await;

    Ok(ApiResponse::success("Zone created", zone.into(), Some(Meta::empty())))
}

pub async fn update_zone(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateZoneRequest,
) -> AppResult<ApiResponse<DeliveryZone>> {
    ensure_admin(state, user).await?;
    validate(payload.name.as_ref(), payload.fee, payload.estimated_time)?;

    let existing = match DeliveryZones::find_by_id(id).one(&state.orm).await? {
        Some(z) => z,
        None => return Err(AppError::NotFound),
    };

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(fee) = payload.fee {
        active.fee = Set(fee);
    }
    if let Some(estimated_time) = payload.estimated_time {
        active.estimated_time = Set(estimated_time);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    let zone = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "zone_update",
        "delivery_zones",
        serde_json::json!({ "zone_id": zone.id }),
    )
    .await;

    Ok(ApiResponse::success("Updated", zone.into(), Some(Meta::empty())))
}

fn validate(name: Option<&String>, fee: Option<i64>, estimated_time: Option<i32>) -> AppResult<()> {
    if name.is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }
    if fee.is_some_and(|f| f < 0) {
        return Err(AppError::BadRequest("fee must not be negative".into()));
    }
    if estimated_time.is_some_and(|t| t <= 0) {
        return Err(AppError::BadRequest(
            "estimated_time must be greater than 0".into(),
        ));
    }
    Ok(())
}
