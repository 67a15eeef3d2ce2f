//! Blog generation handler.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use tpost_models::{GenerationRequest, PersistedPost, PostId, PostImage};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::middleware::ClientIp;
use crate::security;
use crate::state::AppState;

/// Response body for a successful generation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBlogResponse {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// POST /api/generate-blog
///
/// Admission order: authentication (extractor) → quota peek →
/// input validation → quota consumption → pipeline → persistence.
/// A caller already over either hourly limit is turned away before
/// validation; an invalid payload is rejected without consuming quota;
/// once consumed, quota is never refunded.
///
/// Returns:
/// - 200: `{title, content, imageUrl?}`
/// - 400: invalid input
/// - 401: not authenticated
/// - 429: rate limited
/// - 500: generation or persistence failure
pub async fn generate_blog(
    State(state): State<AppState>,
    user: AuthUser,
    ClientIp(client_ip): ClientIp,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> ApiResult<Json<GenerateBlogResponse>> {
    let ip_key = client_ip
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    // Anonymous deployments key the user limiter by IP instead.
    let user_key = if user.id.is_empty() {
        format!("ip:{}", ip_key)
    } else {
        user.id.clone()
    };

    if state.user_quota.is_limited(&user_key).await {
        metrics::record_rate_limit_hit("user");
        return Err(ApiError::RateLimited);
    }
    if state.ip_quota.is_limited(&ip_key).await {
        metrics::record_rate_limit_hit("ip");
        return Err(ApiError::RateLimited);
    }

    let Json(request) = payload.map_err(|e| ApiError::bad_request(format!("Invalid input: {e}")))?;

    let video_url = security::validate_video_reference(&request.video_reference)
        .map_err(ApiError::bad_request)?;

    let request = GenerationRequest {
        video_reference: video_url.clone(),
        additional_prompt: request
            .additional_prompt
            .as_deref()
            .map(security::sanitize_prompt),
        ..request
    };

    // Both counters advance exactly once per admitted request, before
    // the orchestrator runs, and stay advanced if it fails.
    if !state.user_quota.admit(&user_key).await || !state.ip_quota.admit(&ip_key).await {
        metrics::record_rate_limit_hit("admission");
        return Err(ApiError::RateLimited);
    }

    info!(
        user_id = %user.id,
        video_url = %video_url,
        generate_image = request.generate_image,
        "Generation request admitted"
    );

    let output = match state.orchestrator.run(&user.id, &request).await {
        Ok(output) => output,
        Err(e) => {
            metrics::record_stage_failure(e.stage().as_str());
            metrics::record_pipeline_run("failed");
            return Err(ApiError::Pipeline(e));
        }
    };
    metrics::record_pipeline_run("success");
    if output.image_url.is_some() {
        metrics::record_image_uploaded();
    }

    let post = PersistedPost {
        id: PostId::generate(),
        author_id: user.id.clone(),
        title: output.draft.title.clone(),
        content: output.draft.content.clone(),
        video_url,
        tone: request.tone,
        length: request.length,
        content_type: request.content_type,
        generated_image: request.generate_image,
        images: output
            .image_url
            .iter()
            .map(|url| PostImage { url: url.clone() })
            .collect(),
        created_at: Utc::now(),
    };

    state.posts.create_post(&post).await?;

    info!(user_id = %user.id, post_id = %post.id, "Post generated and persisted");

    Ok(Json(GenerateBlogResponse {
        title: output.draft.title,
        content: output.draft.content,
        image_url: output.image_url,
    }))
}
