use tracing::warn;

use crate::error::ApiError;
use crate::state::{AppState, run_db};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Post,
    Questionnaire,
}

impl ResourceKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Post => "Post",
            Self::Questionnaire => "Questionnaire",
        }
    }
}

/// Allow the mutation only if resource `id` exists and `user_id` wrote it.
/// Not-found takes precedence: ownership cannot be judged without a resource.
pub async fn ensure_owner(state: &AppState, kind: ResourceKind, id: i64, user_id: i64) -> Result<(), ApiError> {
    let author_id = run_db(state, move |db| match kind {
        ResourceKind::Post => db.post_author(id),
        ResourceKind::Questionnaire => db.questionnaire_author(id),
    })
    .await?;

    check_owner(kind, author_id, user_id).inspect_err(|e| {
        if matches!(e, ApiError::Forbidden) {
            warn!("User {} denied access to {} {}", user_id, kind.label(), id);
        }
    })
}

pub fn check_owner(kind: ResourceKind, author_id: Option<i64>, user_id: i64) -> Result<(), ApiError> {
    match author_id {
        None => Err(ApiError::NotFound(kind.label())),
        Some(author_id) if author_id != user_id => Err(ApiError::Forbidden),
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_way_outcome() {
        assert!(matches!(
            check_owner(ResourceKind::Post, None, 1),
            Err(ApiError::NotFound("Post"))
        ));
        assert!(matches!(
            check_owner(ResourceKind::Questionnaire, Some(2), 1),
            Err(ApiError::Forbidden)
        ));
        assert!(check_owner(ResourceKind::Post, Some(1), 1).is_ok());
    }
}
