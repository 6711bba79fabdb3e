use sea_orm::{ColumnTrait, ConnectionTrait, DbBackend, EntityTrait, QueryFilter, Statement};
use uuid::Uuid;

use crate::{
    domain::loyalty,
    dto::loyalty::LoyaltyBalance,
    entity::loyalty_points::{Column, Entity as LoyaltyPoints},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    state::AppState,
};

pub async fn get_balance(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<LoyaltyBalance>> {
    let row = LoyaltyPoints::find()
        .filter(Column::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?;

    let (points, total_orders) = row
        .map(|row| (row.points, row.total_orders))
        .unwrap_or((0, 0));

    Ok(ApiResponse::success(
        "Loyalty",
        LoyaltyBalance {
            points,
            total_orders,
            reward_credits: loyalty::reward_credits(points),
        },
        None,
    ))
}

/// Credit points for a placed order and count it, creating the balance on first use.
pub async fn credit_order<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    points: i64,
) -> AppResult<()> {
    conn.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        r#"
        INSERT INTO loyalty_points (id, user_id, points, total_orders)
        VALUES ($1, $2, $3, 1)
        ON CONFLICT (user_id) DO UPDATE
        SET points = loyalty_points.points + EXCLUDED.points,
            total_orders = loyalty_points.total_orders + 1,
            updated_at = now()
        "#,
        [Uuid::new_v4().into(), user_id.into(), points.into()],
    ))
    .await?;
    Ok(())
}
