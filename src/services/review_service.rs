use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::reviews::{CreateReviewRequest, ProductRating, ReviewList},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Review,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: Uuid,
    product_id: Uuid,
    user_id: Uuid,
    rating: i16,
    comment: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            user_id: row.user_id,
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub async fn list_reviews(
    state: &AppState,
    product_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<ReviewList>> {
    let (page, limit, offset) = pagination.normalize();
    let rows = sqlx::query_as::<_, ReviewRow>(
        r#"
        SELECT id, product_id, user_id, rating, comment, created_at, updated_at
        FROM product_reviews
        WHERE product_id = $1
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(product_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM product_reviews WHERE product_id = $1")
        .bind(product_id)
        .fetch_one(&state.pool)
        .await?;

    let items = rows.into_iter().map(Review::from).collect();
    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success("Reviews", ReviewList { items }, Some(meta)))
}

/// One review per customer and product; posting again replaces it.
pub async fn upsert_review(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::BadRequest(
            "rating must be between 1 and 5".to_string(),
        ));
    }

    let product_exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(&state.pool)
        .await?;
    if product_exist.is_none() {
        return Err(AppError::NotFound);
    }

    let comment = payload
        .comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let row = sqlx::query_as::<_, ReviewRow>(
        r#"
        INSERT INTO product_reviews (id, product_id, user_id, rating, comment)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (product_id, user_id)
        DO UPDATE SET rating = EXCLUDED.rating, comment = EXCLUDED.comment, updated_at = now()
        RETURNING id, product_id, user_id, rating, comment, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(product_id)
    .bind(user.user_id)
    .bind(payload.rating)
    .bind(comment)
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Review saved",
        row.into(),
        Some(Meta::empty()),
    ))
}

pub async fn product_rating(pool: &DbPool, product_id: Uuid) -> AppResult<ProductRating> {
    let rating = sqlx::query_as::<_, ProductRating>(
        r#"
        SELECT COALESCE(AVG(rating), 0)::float8 AS average_rating,
               COUNT(*) AS total_reviews
        FROM product_reviews
        WHERE product_id = $1
        "#,
    )
    .bind(product_id)
    .fetch_one(pool)
    .await?;
    Ok(rating)
}

pub async fn get_rating(
    state: &AppState,
    product_id: Uuid,
) -> AppResult<ApiResponse<ProductRating>> {
    let rating = product_rating(&state.pool, product_id).await?;
    Ok(ApiResponse::success("Rating", rating, None))
}
