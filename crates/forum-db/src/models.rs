/// Database row types. These map directly to the wide join rows the stores
/// return and are distinct from the forum-types wire models.

#[derive(Debug, Clone, PartialEq)]
pub struct AuthorRow {
    pub id: i64,
    pub name: String,
    pub role: String,
    pub avatar: Option<String>,
    pub institute: Option<String>,
    pub major: Option<String>,
    pub batch: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageRow {
    pub id: i64,
    pub path: String,
}

/// One row of a post feed: the post scalars plus at most one image. A post
/// with several images spans several rows.
#[derive(Debug, Clone, PartialEq)]
pub struct PostRow {
    pub id: i64,
    pub is_like: bool,
    pub author: AuthorRow,
    pub category_id: i64,
    pub title: String,
    pub description: String,
    pub created_at: String,
    pub comment_count: i64,
    pub like_count: i64,
    pub image: Option<ImageRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestionnaireRow {
    pub id: i64,
    pub is_like: bool,
    pub author: AuthorRow,
    pub category_id: i64,
    pub title: String,
    pub description: String,
    pub link: String,
    pub reward: Option<String>,
    pub created_at: String,
    pub comment_count: i64,
    pub like_count: i64,
}

pub struct NewPost<'a> {
    pub author_id: i64,
    pub category_id: i64,
    pub title: &'a str,
    pub description: &'a str,
}

pub struct NewQuestionnaire<'a> {
    pub post: NewPost<'a>,
    pub link: &'a str,
    pub reward: Option<&'a str>,
}
