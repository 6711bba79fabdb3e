use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use sea_orm::ActiveValue::NotSet;

use crate::{
    dto::profile::UpdateProfileRequest,
    entity::profiles::{ActiveModel as ProfileActive, Entity as Profiles},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Profile,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn get_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Profile>> {
    let profile = match Profiles::find_by_id(user.user_id).one(&state.orm).await? {
        Some(profile) => profile,
        None => {
            ProfileActive {
                id: Set(user.user_id),
                full_name: Set(None),
                phone: Set(None),
                created_at: NotSet,
                updated_at: NotSet,
            }
            .insert(&state.orm)
            .await?
        }
    };
    Ok(ApiResponse::success("OK", profile.into(), Some(Meta::empty())))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<Profile>> {
    let clean = |value: Option<String>| {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let profile = match Profiles::find_by_id(user.user_id).one(&state.orm).await? {
        Some(existing) => {
            let mut active: ProfileActive = existing.into();
            if payload.full_name.is_some() {
                active.full_name = Set(clean(payload.full_name));
            }
            if payload.phone.is_some() {
                active.phone = Set(clean(payload.phone));
            }
            active.updated_at = Set(Utc::now().into());
            active.update(&state.orm).await?
        }
        None => {
            ProfileActive {
                id: Set(user.user_id),
                full_name: Set(clean(payload.full_name)),
                phone: Set(clean(payload.phone)),
                created_at: NotSet,
                updated_at: NotSet,
            }
            .insert(&state.orm)
            .await?
        }
    };

    Ok(ApiResponse::success(
        "Profile updated",
        profile.into(),
        Some(Meta::empty()),
    ))
}
