use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    entity::user_roles::{ActiveModel as RoleActive, Column as RoleCol, Entity as UserRoles},
    error::AppResult,
};

pub const ADMIN_ROLE: &str = "admin";

pub async fn is_admin<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<bool> {
    let count = UserRoles::find()
        .filter(RoleCol::UserId.eq(user_id))
        .filter(RoleCol::Role.eq(ADMIN_ROLE))
        .count(conn)
        .await?;
    Ok(count > 0)
}

/// Any role row for the user; `None` when the user has no role at all.
pub async fn role_of<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<Option<String>> {
    let role = UserRoles::find()
        .filter(RoleCol::UserId.eq(user_id))
        .one(conn)
        .await?
        .map(|row| row.role);
    Ok(role)
}

pub async fn admin_exists<C: ConnectionTrait>(conn: &C) -> AppResult<bool> {
    let count = UserRoles::find()
        .filter(RoleCol::Role.eq(ADMIN_ROLE))
        .count(conn)
        .await?;
    Ok(count > 0)
}

pub async fn grant<C: ConnectionTrait>(conn: &C, user_id: Uuid, role: &str) -> AppResult<()> {
    let exists = UserRoles::find()
        .filter(RoleCol::UserId.eq(user_id))
        .filter(RoleCol::Role.eq(role))
        .count(conn)
        .await?
        > 0;
    if exists {
        return Ok(());
    }
    RoleActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        role: Set(role.to_string()),
        created_at: NotSet,
    }
    .insert(conn)
    .await?;
    Ok(())
}
