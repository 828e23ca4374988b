use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tower_http::services::ServeDir;

use crate::state::AppState;
use crate::storage::MEDIA_ROUTE;
use crate::{images, posts, questionnaires};

/// All forum routes. Cross-cutting layers (CORS, tracing) are added by the
/// server binary.
pub fn router(state: AppState) -> Router {
    let media = ServeDir::new(state.storage.root());
    let upload_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route("/posts", get(posts::list_posts).post(posts::create_post))
        .route(
            "/posts/{id}",
            get(posts::get_post).put(posts::update_post).delete(posts::delete_post),
        )
        .route(
            "/posts/{id}/images",
            post(images::upload_post_images).layer(upload_limit),
        )
        .route(
            "/questionnaires",
            get(questionnaires::list_questionnaires).post(questionnaires::create_questionnaire),
        )
        .route(
            "/questionnaires/{id}",
            get(questionnaires::get_questionnaire)
                .put(questionnaires::update_questionnaire)
                .delete(questionnaires::delete_questionnaire),
        )
        .route("/health", get(health))
        .nest_service(MEDIA_ROUTE, media)
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
