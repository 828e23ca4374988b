use url::Url;

use forum_types::api::{CreatePostRequest, CreateQuestionnaireRequest, UpdatePostRequest, UpdateQuestionnaireRequest};

use crate::error::ApiError;
use crate::state::{AppState, run_db};

/// Field-level checks shared by post and questionnaire bodies.
fn post_fields(category_id: i64, title: &str, description: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if category_id <= 0 {
        errors.push("category_id is required".to_string());
    }
    if title.trim().is_empty() {
        errors.push("title is required".to_string());
    }
    if description.trim().is_empty() {
        errors.push("description is required".to_string());
    }
    errors
}

fn link_field(link: &str, errors: &mut Vec<String>) {
    if link.trim().is_empty() {
        errors.push("link is required".to_string());
        return;
    }
    match Url::parse(link) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
        _ => errors.push("link must be a valid URL".to_string()),
    }
}

fn into_result(errors: Vec<String>) -> Result<(), ApiError> {
    if errors.is_empty() { Ok(()) } else { Err(ApiError::Validation(errors)) }
}

/// Request bodies that can be checked before touching the store.
pub trait Validate {
    fn validate(&self) -> Result<(), ApiError>;
    fn category_id(&self) -> i64;
}

impl Validate for CreatePostRequest {
    fn validate(&self) -> Result<(), ApiError> {
        into_result(post_fields(self.category_id, &self.title, &self.description))
    }

    fn category_id(&self) -> i64 {
        self.category_id
    }
}

impl Validate for UpdatePostRequest {
    fn validate(&self) -> Result<(), ApiError> {
        into_result(post_fields(self.category_id, &self.title, &self.description))
    }

    fn category_id(&self) -> i64 {
        self.category_id
    }
}

impl Validate for CreateQuestionnaireRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = post_fields(self.category_id, &self.title, &self.description);
        link_field(&self.link, &mut errors);
        into_result(errors)
    }

    fn category_id(&self) -> i64 {
        self.category_id
    }
}

impl Validate for UpdateQuestionnaireRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = post_fields(self.category_id, &self.title, &self.description);
        link_field(&self.link, &mut errors);
        into_result(errors)
    }

    fn category_id(&self) -> i64 {
        self.category_id
    }
}

/// Run the field checks, then confirm the category exists.
pub async fn validate_body<B: Validate>(state: &AppState, body: &B) -> Result<(), ApiError> {
    body.validate()?;

    let category_id = body.category_id();
    if !run_db(state, move |db| db.category_exists(category_id)).await? {
        return Err(ApiError::Validation(vec!["category_id does not exist".to_string()]));
    }
    Ok(())
}
