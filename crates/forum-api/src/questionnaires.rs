use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use forum_db::models::{NewPost, NewQuestionnaire};
use forum_types::api::{
    CreateQuestionnaireRequest, CreatedResponse, MessageResponse, QuestionnaireResponse,
    UpdateQuestionnaireRequest,
};

use crate::auth::{AuthUser, Viewer};
use crate::error::ApiError;
use crate::feed::questionnaire_response;
use crate::moderation;
use crate::ownership::{ResourceKind, ensure_owner};
use crate::params::{FeedParams, resource_id};
use crate::state::{AppState, run_db};
use crate::validation::validate_body;

pub async fn list_questionnaires(
    State(state): State<AppState>,
    viewer: Viewer,
    query: Result<Query<FeedParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = query?;
    let feed_query = params.into_query(viewer.id())?;

    let rows = run_db(&state, move |db| db.list_questionnaires(&feed_query)).await?;
    let questionnaires: Vec<QuestionnaireResponse> = rows
        .into_iter()
        .map(|row| questionnaire_response(row, viewer))
        .collect();
    Ok(Json(questionnaires))
}

pub async fn get_questionnaire(
    State(state): State<AppState>,
    viewer: Viewer,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = resource_id(path, ResourceKind::Questionnaire)?;

    let row = run_db(&state, move |db| db.questionnaire_detail(id, viewer.id()))
        .await?
        .ok_or(ApiError::NotFound(ResourceKind::Questionnaire.label()))?;
    Ok(Json(questionnaire_response(row, viewer)))
}

pub async fn create_questionnaire(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    body: Result<Json<CreateQuestionnaireRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    validate_body(&state, &req).await?;
    moderation::check(state.moderator.as_ref(), &[req.title.as_str(), req.description.as_str()])?;

    let id = run_db(&state, move |db| {
        db.insert_questionnaire(&NewQuestionnaire {
            post: NewPost {
                author_id: user_id,
                category_id: req.category_id,
                title: &req.title,
                description: &req.description,
            },
            link: &req.link,
            reward: req.reward.as_deref(),
        })
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id,
            message: "Questionnaire Created".to_string(),
        }),
    ))
}

pub async fn update_questionnaire(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateQuestionnaireRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = resource_id(path, ResourceKind::Questionnaire)?;
    let Json(req) = body?;

    ensure_owner(&state, ResourceKind::Questionnaire, id, user_id).await?;
    validate_body(&state, &req).await?;
    moderation::check(state.moderator.as_ref(), &[req.title.as_str(), req.description.as_str()])?;

    run_db(&state, move |db| {
        db.update_questionnaire(
            id,
            &NewQuestionnaire {
                post: NewPost {
                    author_id: user_id,
                    category_id: req.category_id,
                    title: &req.title,
                    description: &req.description,
                },
                link: &req.link,
                reward: req.reward.as_deref(),
            },
        )
    })
    .await?;

    info!("Questionnaire {} updated by user {}", id, user_id);
    Ok(Json(MessageResponse {
        message: "Questionnaire Updated".to_string(),
    }))
}

pub async fn delete_questionnaire(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = resource_id(path, ResourceKind::Questionnaire)?;
    ensure_owner(&state, ResourceKind::Questionnaire, id, user_id).await?;

    run_db(&state, move |db| db.delete_questionnaire(id)).await?;

    Ok(Json(MessageResponse {
        message: "Questionnaire Deleted".to_string(),
    }))
}
