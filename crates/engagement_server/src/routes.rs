//! Engagement HTTP routes.
//!
//! Mutations go through the counter engine, reads through the query
//! service. Every handler runs exactly one core call on its own connection.

use axum::extract::{MatchedPath, Path, Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use engagement_core::{
    CounterService, EngagementKind, PostStats, QueryService, SqliteEngagementRepository,
};
use log::info;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::ApiResult;
use crate::store::Store;

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Clone, Deserialize)]
pub struct ToggleRequest {
    pub post_id: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentRequest {
    pub post_id: String,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShareRequest {
    pub post_id: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LikedResponse {
    pub is_liked: bool,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetweetedResponse {
    pub is_retweeted: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

const SUCCESS: SuccessResponse = SuccessResponse { success: true };

// ==================
// Router
// ==================

/// Create engagement routes
pub fn engagement_routes(store: Store) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/likes/toggle", post(toggle_like_handler))
        .route("/likes/:post_id/:user_id", get(is_liked_handler))
        .route("/retweets/toggle", post(toggle_retweet_handler))
        .route("/retweets/:post_id/:user_id", get(is_retweeted_handler))
        .route("/comments", post(add_comment_handler))
        .route("/comments/:post_id", get(list_comments_handler))
        .route("/shares", post(record_share_handler))
        .route("/stats/:post_id", get(stats_handler))
        .route_layer(middleware::from_fn(log_request))
        .with_state(store)
}

/// Logs one line per routed request using the route template, so raw
/// post/user identifiers stay out of the logs.
async fn log_request(request: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let method = request.method().clone();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    info!(
        "event=http_request module=server method={} route={} status={} duration_ms={}",
        method,
        route,
        response.status().as_u16(),
        started_at.elapsed().as_millis()
    );
    response
}

// ==================
// Handlers
// ==================

async fn root_handler() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Backend is live".to_string(),
    })
}

async fn toggle_like_handler(
    State(store): State<Store>,
    Json(request): Json<ToggleRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    toggle(store, EngagementKind::Like, request).await
}

async fn toggle_retweet_handler(
    State(store): State<Store>,
    Json(request): Json<ToggleRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    toggle(store, EngagementKind::Retweet, request).await
}

async fn toggle(
    store: Store,
    kind: EngagementKind,
    request: ToggleRequest,
) -> ApiResult<Json<SuccessResponse>> {
    store
        .run(move |conn| {
            CounterService::new(conn).toggle_engagement(kind, &request.post_id, &request.user_id)
        })
        .await?;
    Ok(Json(SUCCESS))
}

async fn add_comment_handler(
    State(store): State<Store>,
    Json(request): Json<CommentRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    store
        .run(move |conn| CounterService::new(conn).add_comment(&request.post_id, &request.text))
        .await?;
    Ok(Json(SUCCESS))
}

async fn list_comments_handler(
    State(store): State<Store>,
    Path(post_id): Path<String>,
) -> ApiResult<Json<Vec<String>>> {
    let comments = store
        .run(move |conn| {
            QueryService::new(SqliteEngagementRepository::try_new(conn)?).list_comments(&post_id)
        })
        .await?;
    Ok(Json(comments))
}

async fn record_share_handler(
    State(store): State<Store>,
    Json(request): Json<ShareRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    store
        .run(move |conn| CounterService::new(conn).record_share(&request.post_id))
        .await?;
    Ok(Json(SUCCESS))
}

async fn stats_handler(
    State(store): State<Store>,
    Path(post_id): Path<String>,
) -> ApiResult<Json<PostStats>> {
    let stats = store
        .run(move |conn| {
            QueryService::new(SqliteEngagementRepository::try_new(conn)?).get_stats(&post_id)
        })
        .await?;
    Ok(Json(stats))
}

async fn is_liked_handler(
    State(store): State<Store>,
    Path((post_id, user_id)): Path<(String, String)>,
) -> ApiResult<Json<LikedResponse>> {
    let is_liked = store
        .run(move |conn| {
            QueryService::new(SqliteEngagementRepository::try_new(conn)?)
                .is_liked(&post_id, &user_id)
        })
        .await?;
    Ok(Json(LikedResponse { is_liked }))
}

async fn is_retweeted_handler(
    State(store): State<Store>,
    Path((post_id, user_id)): Path<(String, String)>,
) -> ApiResult<Json<RetweetedResponse>> {
    let is_retweeted = store
        .run(move |conn| {
            QueryService::new(SqliteEngagementRepository::try_new(conn)?)
                .is_retweeted(&post_id, &user_id)
        })
        .await?;
    Ok(Json(RetweetedResponse { is_retweeted }))
}
