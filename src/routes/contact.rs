use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    domain::contact::whatsapp_link,
    dto::contact::{ContactLink, ContactLinkQuery},
    response::ApiResponse,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/whatsapp", get(whatsapp))
}

#[utoipa::path(
    get,
    path = "/api/contact/whatsapp",
    params(ContactLinkQuery),
    responses(
        (status = 200, description = "Messaging deep link with the text pre-filled", body = ApiResponse<ContactLink>)
    ),
    tag = "Contact"
)]
pub async fn whatsapp(
    State(state): State<AppState>,
    Query(query): Query<ContactLinkQuery>,
) -> Json<ApiResponse<ContactLink>> {
    let message = query
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(&state.config.whatsapp_message);
    let url = whatsapp_link(&state.config.whatsapp_phone, message);
    Json(ApiResponse::success("Contact link", ContactLink { url }, None))
}
