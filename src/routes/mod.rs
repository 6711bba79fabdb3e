use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod cart;
pub mod contact;
pub mod coupons;
pub mod doc;
pub mod health;
pub mod loyalty;
pub mod orders;
pub mod params;
pub mod products;
pub mod profile;
pub mod zones;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/products", products::router())
        .nest("/auth", auth::router())
        .nest("/cart", cart::router())
        .nest("/orders", orders::router())
        .nest("/coupons", coupons::router())
        .nest("/zones", zones::router())
        .nest("/loyalty", loyalty::router())
        .nest("/profile", profile::router())
        .nest("/contact", contact::router())
        .nest("/admin", admin::router())
}
