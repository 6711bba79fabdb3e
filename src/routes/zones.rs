use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::zones::ZoneList, error::AppResult, response::ApiResponse, services::zone_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_zones))
}

#[utoipa::path(
    get,
    path = "/api/zones",
    responses(
        (status = 200, description = "Active delivery zones", body = ApiResponse<ZoneList>)
    ),
    tag = "Delivery zones"
)]
pub async fn list_zones(State(state): State<AppState>) -> AppResult<Json<ApiResponse<ZoneList>>> {
    let resp = zone_service::list_active(&state).await?;
    Ok(Json(resp))
}
