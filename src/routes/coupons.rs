use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::coupons::{CouponQuote, ValidateCouponRequest},
    error::AppResult,
    response::ApiResponse,
    services::coupon_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/validate", post(validate_coupon))
}

#[utoipa::path(
    post,
    path = "/api/coupons/validate",
    request_body = ValidateCouponRequest,
    responses(
        (status = 200, description = "Discount the coupon would give", body = ApiResponse<CouponQuote>),
        (status = 400, description = "Not found, expired, exhausted or below the minimum order value")
    ),
    tag = "Coupons"
)]
pub async fn validate_coupon(
    State(state): State<AppState>,
    Json(payload): Json<ValidateCouponRequest>,
) -> AppResult<Json<ApiResponse<CouponQuote>>> {
    let resp = coupon_service::validate_coupon(&state, payload).await?;
    Ok(Json(resp))
}
