//! Dashboard post listing.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::info;

use tpost_models::PersistedPost;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UserPostsResponse {
    pub posts: Vec<PersistedPost>,
}

/// GET /api/get-user-posts
///
/// Returns the authenticated user's posts, newest first. A user with
/// no posts gets an empty list, not an error.
pub async fn get_user_posts(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<UserPostsResponse>> {
    let posts = state.posts.list_posts(&user.id).await?;
    info!(user_id = %user.id, count = posts.len(), "Listed user posts");
    Ok(Json(UserPostsResponse { posts }))
}
