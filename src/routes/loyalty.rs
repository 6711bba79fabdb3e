use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::loyalty::LoyaltyBalance, error::AppResult, middleware::auth::AuthUser,
    response::ApiResponse, services::loyalty_service, state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_balance))
}

#[utoipa::path(
    get,
    path = "/api/loyalty",
    responses(
        (status = 200, description = "Points, order count and reward credits", body = ApiResponse<LoyaltyBalance>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Loyalty"
)]
pub async fn get_balance(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<LoyaltyBalance>>> {
    let resp = loyalty_service::get_balance(&state, &user).await?;
    Ok(Json(resp))
}
