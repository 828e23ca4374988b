use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, warn};

use forum_db::models::NewPost;
use forum_types::api::{CreatePostRequest, CreatedResponse, MessageResponse, UpdatePostRequest};

use crate::auth::{AuthUser, Viewer};
use crate::error::ApiError;
use crate::feed::assemble_posts;
use crate::moderation;
use crate::ownership::{ResourceKind, ensure_owner};
use crate::params::{FeedParams, resource_id};
use crate::state::{AppState, run_db};
use crate::validation::validate_body;

/// GET /posts: the plain-post feed.
pub async fn list_posts(
    State(state): State<AppState>,
    viewer: Viewer,
    query: Result<Query<FeedParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = query?;
    let feed_query = params.into_query(viewer.id())?;

    let rows = run_db(&state, move |db| db.list_posts(&feed_query)).await?;
    Ok(Json(assemble_posts(rows, viewer)))
}

/// GET /posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    viewer: Viewer,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let post_id = resource_id(path, ResourceKind::Post)?;

    let rows = run_db(&state, move |db| db.post_detail(post_id, viewer.id())).await?;
    assemble_posts(rows, viewer)
        .into_iter()
        .next()
        .map(Json)
        .ok_or(ApiError::NotFound(ResourceKind::Post.label()))
}

/// POST /posts
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    body: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    validate_body(&state, &req).await?;
    moderation::check(state.moderator.as_ref(), &[req.title.as_str(), req.description.as_str()])?;

    let id = run_db(&state, move |db| {
        db.insert_post(&NewPost {
            author_id: user_id,
            category_id: req.category_id,
            title: &req.title,
            description: &req.description,
        })
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id,
            message: "Post Created".to_string(),
        }),
    ))
}

/// PUT /posts/{id}
pub async fn update_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdatePostRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let post_id = resource_id(path, ResourceKind::Post)?;
    let Json(req) = body?;

    ensure_owner(&state, ResourceKind::Post, post_id, user_id).await?;
    validate_body(&state, &req).await?;
    moderation::check(state.moderator.as_ref(), &[req.title.as_str(), req.description.as_str()])?;

    run_db(&state, move |db| {
        db.update_post(post_id, req.category_id, &req.title, &req.description)
    })
    .await?;

    info!("Post {} updated by user {}", post_id, user_id);
    Ok(Json(MessageResponse {
        message: "Post Updated".to_string(),
    }))
}

/// DELETE /posts/{id}: removes the post along with its stored images.
pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let post_id = resource_id(path, ResourceKind::Post)?;
    ensure_owner(&state, ResourceKind::Post, post_id, user_id).await?;

    let image_paths = run_db(&state, move |db| db.delete_post(post_id)).await?;

    for path in &image_paths {
        if let Err(e) = state.storage.delete_file(path).await {
            warn!("Failed to remove image {} of deleted post {}: {}", path, post_id, e);
        }
    }

    Ok(Json(MessageResponse {
        message: "Post Deleted".to_string(),
    }))
}
