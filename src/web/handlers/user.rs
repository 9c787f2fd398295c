//! User handlers.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::db::UserRepository;
use crate::web::dto::{ApiResponse, UserProfile};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::SessionUser;

/// GET /user/profile - Profile of the signed-in user.
pub async fn profile(
    State(state): State<Arc<AppState>>,
    SessionUser(claims): SessionUser,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    let user = UserRepository::new(state.db.pool())
        .get_by_id(claims.sub)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

    Ok(Json(ApiResponse::new(UserProfile::from(&user))))
}
