use serde::{Deserialize, Serialize};

// -- JWT Claims --

/// Claims carried by the bearer tokens this service accepts. Tokens are issued
/// elsewhere; `sub` is the numeric user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    #[serde(default)]
    pub role: String,
    pub exp: usize,
}

// -- Posts --

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub category_id: i64,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub category_id: i64,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthorResponse {
    pub id: i64,
    pub name: String,
    pub role: String,
    pub institute: String,
    pub major: String,
    pub batch: i64,
    pub profile_image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostImageResponse {
    pub id: i64,
    pub url: String,
}

/// A post as it appears in feeds and on its detail page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostResponse {
    pub id: i64,
    pub is_like: bool,
    pub is_author: bool,
    pub author: AuthorResponse,
    pub category_id: i64,
    pub title: String,
    pub description: String,
    pub created_at: String,
    pub comment_count: i64,
    pub like_count: i64,
    pub images: Vec<PostImageResponse>,
}

// -- Questionnaires --

#[derive(Debug, Deserialize)]
pub struct CreateQuestionnaireRequest {
    pub category_id: i64,
    pub title: String,
    pub description: String,
    pub link: String,
    #[serde(default)]
    pub reward: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuestionnaireRequest {
    pub category_id: i64,
    pub title: String,
    pub description: String,
    pub link: String,
    #[serde(default)]
    pub reward: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionnaireResponse {
    pub id: i64,
    pub is_like: bool,
    pub is_author: bool,
    pub author: AuthorResponse,
    pub category_id: i64,
    pub title: String,
    pub description: String,
    pub link: String,
    pub reward: Option<String>,
    pub created_at: String,
    pub comment_count: i64,
    pub like_count: i64,
}

// -- Generic replies --

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: i64,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// -- Image upload --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedImage {
    pub filename: String,
    pub id: i64,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedImage {
    pub filename: String,
    pub error: String,
}

/// Per-file outcome of a multi-image upload. Successful files stay recorded
/// even when siblings fail.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadImagesResponse {
    pub message: String,
    pub uploaded: Vec<UploadedImage>,
    pub failed: Vec<FailedImage>,
}
