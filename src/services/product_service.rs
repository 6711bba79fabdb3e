use std::collections::HashMap;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::products::{
        AvailabilityRequest, CategoryCount, CreateProductRequest, ExtraInput, ProductDetail,
        ProductList, UpdateProductRequest,
    },
    entity::{
        product_extras::{ActiveModel as ExtraActive, Column as ExtraCol, Entity as ProductExtras},
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{ProductExtra, ProductWithExtras},
    response::{ApiResponse, Meta},
    routes::params::{CatalogQuery, ProductSortBy, SortOrder},
    services::review_service,
    state::AppState,
};

/// Storefront listing; unavailable products are only visible to the admin listing.
pub async fn list_products(
    state: &AppState,
    query: CatalogQuery,
    include_unavailable: bool,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if !include_unavailable {
        condition = condition.add(Column::IsAvailable.eq(true));
    }

    if let Some(category) = query.category.as_ref().filter(|c| !c.is_empty()) {
        condition = condition.add(Column::Category.eq(category.clone()));
    }

    if let Some(highlight) = query.highlight {
        condition = condition.add(Column::IsHighlight.eq(highlight));
    }

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }

    let sort_col = match query.sort_by.unwrap_or(ProductSortBy::CreatedAt) {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
    };

    let mut finder = Products::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let products = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let items = attach_extras(&state.orm, products).await?;
    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<Vec<CategoryCount>>> {
    let categories = sqlx::query_as::<_, CategoryCount>(
        r#"
        SELECT category, COUNT(*) AS products
        FROM products
        WHERE is_available
        GROUP BY category
        ORDER BY category
        "#,
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(ApiResponse::success("Categories", categories, Some(Meta::empty())))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ProductDetail>> {
    let product = match Products::find_by_id(id).one(&state.orm).await? {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    let product = attach_extras(&state.orm, vec![product])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    let rating = review_service::product_rating(&state.pool, id).await?;
    Ok(ApiResponse::success(
        "Product",
        ProductDetail { product, rating },
        None,
    ))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<ProductWithExtras>> {
    ensure_admin(state, user).await?;
    validate_fields(Some(&payload.name), Some(payload.price), Some(&payload.category))?;
    validate_extras(&payload.extras)?;
    ensure_name_free(&state.orm, payload.name.trim(), None).await?;

    let txn = state.orm.begin().await?;
    let product = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        description: Set(payload.description),
        price: Set(payload.price),
        original_price: Set(payload.original_price),
        image: Set(payload.image),
        category: Set(payload.category.trim().to_lowercase()),
        is_available: Set(payload.is_available.unwrap_or(true)),
        is_highlight: Set(payload.is_highlight.unwrap_or(false)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;
    let extras = replace_extras(&txn, product.id, &payload.extras).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        ProductWithExtras {
            product: product.into(),
            extras,
        },
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<ProductWithExtras>> {
    ensure_admin(state, user).await?;
    validate_fields(
        payload.name.as_ref(),
        payload.price,
        payload.category.as_ref(),
    )?;
    if let Some(extras) = payload.extras.as_ref() {
        validate_extras(extras)?;
    }

    let txn = state.orm.begin().await?;
    let existing = match Products::find_by_id(id).one(&txn).await? {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        ensure_name_free(&txn, &name, Some(id)).await?;
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(original_price) = payload.original_price {
        active.original_price = Set(Some(original_price));
    }
    if let Some(image) = payload.image {
        active.image = Set(Some(image));
    }
    if let Some(category) = payload.category {
        active.category = Set(category.trim().to_lowercase());
    }
    if let Some(is_available) = payload.is_available {
        active.is_available = Set(is_available);
    }
    if let Some(is_highlight) = payload.is_highlight {
        active.is_highlight = Set(is_highlight);
    }
    active.updated_at = Set(Utc::now().into());
    let product = active.update(&txn).await?;

    let extras = match payload.extras.as_ref() {
        Some(inputs) => replace_extras(&txn, product.id, inputs).await?,
        None => load_extras(&txn, &[product.id])
            .await?
            .remove(&product.id)
            .unwrap_or_default(),
    };
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        ProductWithExtras {
            product: product.into(),
            extras,
        },
        Some(Meta::empty()),
    ))
}

pub async fn set_availability(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: AvailabilityRequest,
) -> AppResult<ApiResponse<crate::models::Product>> {
    ensure_admin(state, user).await?;
    let existing = match Products::find_by_id(id).one(&state.orm).await? {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let mut active: ActiveModel = existing.into();
    active.is_available = Set(payload.is_available);
    active.updated_at = Set(Utc::now().into());
    let product = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_availability",
        "products",
        serde_json::json!({ "product_id": id, "is_available": payload.is_available }),
    )
    .await;

    Ok(ApiResponse::success(
        "Availability updated",
        product.into(),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(state, user).await?;
    let result = Products::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Extras of the given products, grouped by product id and ordered by name.
pub async fn load_extras<C: ConnectionTrait>(
    conn: &C,
    product_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Vec<ProductExtra>>> {
    let mut grouped: HashMap<Uuid, Vec<ProductExtra>> = HashMap::new();
    if product_ids.is_empty() {
        return Ok(grouped);
    }
    let rows = ProductExtras::find()
        .filter(ExtraCol::ProductId.is_in(product_ids.to_vec()))
        .order_by_asc(ExtraCol::Name)
        .all(conn)
        .await?;
    for row in rows {
        grouped
            .entry(row.product_id)
            .or_default()
            .push(ProductExtra::from(row));
    }
    Ok(grouped)
}

async fn attach_extras<C: ConnectionTrait>(
    conn: &C,
    products: Vec<ProductModel>,
) -> AppResult<Vec<ProductWithExtras>> {
    let ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
    let mut extras = load_extras(conn, &ids).await?;
    Ok(products
        .into_iter()
        .map(|product| ProductWithExtras {
            extras: extras.remove(&product.id).unwrap_or_default(),
            product: product.into(),
        })
        .collect())
}

async fn replace_extras<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    inputs: &[ExtraInput],
) -> AppResult<Vec<ProductExtra>> {
    ProductExtras::delete_many()
        .filter(ExtraCol::ProductId.eq(product_id))
        .exec(conn)
        .await?;

    let mut extras = Vec::with_capacity(inputs.len());
    for input in inputs {
        let extra = ExtraActive {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            name: Set(input.name.trim().to_string()),
            price: Set(input.price),
            created_at: NotSet,
        }
        .insert(conn)
        .await?;
        extras.push(ProductExtra::from(extra));
    }
    Ok(extras)
}

async fn ensure_name_free<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    current: Option<Uuid>,
) -> AppResult<()> {
    let taken = Products::find()
        .filter(Column::Name.eq(name))
        .one(conn)
        .await?
        .filter(|product| Some(product.id) != current);
    if taken.is_some() {
        return Err(AppError::Conflict(format!("product {} already exists", name)));
    }
    Ok(())
}

fn validate_fields(
    name: Option<&String>,
    price: Option<i64>,
    category: Option<&String>,
) -> AppResult<()> {
    if name.is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }
    if price.is_some_and(|p| p < 0) {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }
    if category.is_some_and(|c| c.trim().is_empty()) {
        return Err(AppError::BadRequest("category must not be empty".into()));
    }
    Ok(())
}

fn validate_extras(extras: &[ExtraInput]) -> AppResult<()> {
    for extra in extras {
        if extra.name.trim().is_empty() {
            return Err(AppError::BadRequest("extra name must not be empty".into()));
        }
        if extra.price < 0 {
            return Err(AppError::BadRequest("extra price must not be negative".into()));
        }
    }
    Ok(())
}
