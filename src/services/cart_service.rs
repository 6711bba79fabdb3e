use std::str::FromStr;

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, EntityTrait, Set};
use uuid::Uuid;

use crate::{
    domain::cart::{Cart, CartExtra, CartLine, LineKey},
    dto::cart::{AddToCartRequest, CartView, UpdateCartItemRequest},
    entity::{
        carts::{ActiveModel as CartActive, Column as CartCol, Entity as Carts},
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    services::product_service,
    state::AppState,
};

pub async fn get_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    let cart = load_cart(&state.orm, user.user_id).await?;
    Ok(ApiResponse::success("OK", CartView::from(&cart), None))
}

pub async fn add_item(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartView>> {
    let quantity = payload.quantity.unwrap_or(1);
    if quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let line = resolve_line(&state.orm, payload.product_id, &payload.extra_ids, quantity).await?;

    let mut cart = load_cart(&state.orm, user.user_id).await?;
    let key = cart.add(line);
    save_cart(&state.orm, user.user_id, &cart).await?;
    tracing::debug!(user_id = %user.user_id, line = %key, "cart line added");

    Ok(ApiResponse::success(
        "Added to cart",
        CartView::from(&cart),
        Some(Meta::empty()),
    ))
}

pub async fn update_item(
    state: &AppState,
    user: &AuthUser,
    key: &str,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<CartView>> {
    let key = LineKey::from_str(key)?;
    let mut cart = load_cart(&state.orm, user.user_id).await?;
    if !cart.update_quantity(&key, payload.quantity) {
        return Err(AppError::NotFound);
    }
    save_cart(&state.orm, user.user_id, &cart).await?;

    Ok(ApiResponse::success(
        "Cart updated",
        CartView::from(&cart),
        Some(Meta::empty()),
    ))
}

pub async fn remove_item(
    state: &AppState,
    user: &AuthUser,
    key: &str,
) -> AppResult<ApiResponse<CartView>> {
    let key = LineKey::from_str(key)?;
    let mut cart = load_cart(&state.orm, user.user_id).await?;
    if !cart.remove(&key) {
        return Err(AppError::NotFound);
    }
    save_cart(&state.orm, user.user_id, &cart).await?;

    Ok(ApiResponse::success(
        "Removed from cart",
        CartView::from(&cart),
        Some(Meta::empty()),
    ))
}

pub async fn clear_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    Carts::delete_by_id(user.user_id).exec(&state.orm).await?;
    Ok(ApiResponse::success(
        "Cart cleared",
        CartView::from(&Cart::new()),
        Some(Meta::empty()),
    ))
}

pub async fn load_cart<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<Cart> {
    let row = Carts::find_by_id(user_id).one(conn).await?;
    Ok(row.map(|row| Cart::restore(row.items)).unwrap_or_default())
}

pub async fn save_cart<C: ConnectionTrait>(conn: &C, user_id: Uuid, cart: &Cart) -> AppResult<()> {
    if cart.is_empty() {
        Carts::delete_by_id(user_id).exec(conn).await?;
        return Ok(());
    }

    let items = cart
        .to_document()
        .map_err(|err| AppError::Internal(err.into()))?;
    let row = CartActive {
        user_id: Set(user_id),
        items: Set(items),
        updated_at: Set(Utc::now().into()),
    };
    Carts::insert(row)
        .on_conflict(
            OnConflict::column(CartCol::UserId)
                .update_columns([CartCol::Items, CartCol::UpdatedAt])
                .to_owned(),
        )
        .exec(conn)
        .await?;
    Ok(())
}

/// Price a product with the chosen extras from the current catalog.
/// The product must be available and every extra must belong to it.
pub async fn resolve_line<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    extra_ids: &[Uuid],
    quantity: i32,
) -> AppResult<CartLine> {
    let product = match Products::find_by_id(product_id).one(conn).await? {
        Some(p) => p,
        None => return Err(AppError::BadRequest("product not found".to_string())),
    };
    if !product.is_available {
        return Err(AppError::BadRequest(format!(
            "{} is not available",
            product.name
        )));
    }

    let available = product_service::load_extras(conn, &[product.id])
        .await?
        .remove(&product.id)
        .unwrap_or_default();

    let mut extras = Vec::with_capacity(extra_ids.len());
    for id in extra_ids {
        let extra = available
            .iter()
            .find(|extra| &extra.id == id)
            .ok_or_else(|| {
                AppError::BadRequest(format!("extra {} does not belong to {}", id, product.name))
            })?;
        extras.push(CartExtra {
            id: extra.id,
            name: extra.name.clone(),
            price: extra.price,
        });
    }

    Ok(CartLine {
        product_id: product.id,
        name: product.name,
        price: product.price,
        image: product.image,
        quantity,
        extras,
    })
}
