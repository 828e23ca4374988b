use axum::extract::{Path, rejection::PathRejection};
use serde::Deserialize;
use thiserror::Error;

use forum_db::feed::{DEFAULT_LIMIT, MAX_LIMIT};
use forum_db::{FeedFilter, FeedQuery, SortBy};

use crate::error::ApiError;
use crate::ownership::ResourceKind;

/// Raw feed query string. Everything arrives as text so each malformed
/// parameter can be reported on its own.
#[derive(Debug, Default, Deserialize)]
pub struct FeedParams {
    pub sort_by: Option<String>,
    pub search_title: Option<String>,
    pub category_id: Option<String>,
    pub me: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamError {
    #[error("Invalid Sort By")]
    SortBy,
    #[error("Invalid Filter By Category ID")]
    CategoryId,
    #[error("Invalid Filter By Me")]
    Me,
    #[error("Invalid Limit")]
    Limit,
    #[error("Invalid Offset")]
    Offset,
    #[error("Authentication Required")]
    IdentityRequired,
}

impl From<ParamError> for ApiError {
    fn from(err: ParamError) -> Self {
        match err {
            ParamError::IdentityRequired => ApiError::Unauthorized,
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl FeedParams {
    /// Turn the raw parameters into a feed query for `viewer_id`.
    pub fn into_query(self, viewer_id: Option<i64>) -> Result<FeedQuery, ParamError> {
        let sort = match self.sort_by.as_deref() {
            None => SortBy::default(),
            Some(s) => s.parse().map_err(|_| ParamError::SortBy)?,
        };

        let category_id = match self.category_id.as_deref() {
            None => 0,
            Some(s) => s.parse::<i64>().map_err(|_| ParamError::CategoryId)?,
        };

        let me = match self.me.as_deref() {
            None => false,
            Some(s) => parse_bool(s).ok_or(ParamError::Me)?,
        };

        let author_id = if me {
            Some(viewer_id.ok_or(ParamError::IdentityRequired)?)
        } else {
            None
        };

        let limit = match self.limit.as_deref() {
            None => DEFAULT_LIMIT,
            Some(s) => s.parse::<u32>().map_err(|_| ParamError::Limit)?.min(MAX_LIMIT),
        };

        let offset = match self.offset.as_deref() {
            None => 0,
            Some(s) => s.parse::<u32>().map_err(|_| ParamError::Offset)?,
        };

        Ok(FeedQuery {
            limit,
            offset,
            viewer_id,
            sort,
            filter: FeedFilter {
                search_title: self.search_title.filter(|s| !s.is_empty()),
                category_id: (category_id != 0).then_some(category_id),
                author_id,
            },
        })
    }
}

/// The boolean spellings query strings commonly use.
fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Numeric resource id from the path, rejected with a message naming the
/// resource kind.
pub fn resource_id(path: Result<Path<i64>, PathRejection>, kind: ResourceKind) -> Result<i64, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::BadRequest(format!("Invalid {} ID", kind.label())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> FeedParams {
        let mut p = FeedParams::default();
        for (k, v) in pairs {
            let v = Some(v.to_string());
            match *k {
                "sort_by" => p.sort_by = v,
                "search_title" => p.search_title = v,
                "category_id" => p.category_id = v,
                "me" => p.me = v,
                "limit" => p.limit = v,
                "offset" => p.offset = v,
                _ => unreachable!(),
            }
        }
        p
    }

    #[test]
    fn defaults() {
        let q = FeedParams::default().into_query(None).unwrap();
        assert_eq!(q, FeedQuery::default());
        assert_eq!(q.sort, SortBy::Newest);
        assert_eq!(q.limit, 20);
    }

    #[test]
    fn maps_every_sort_value() {
        for (raw, sort) in [
            ("newest", SortBy::Newest),
            ("oldest", SortBy::Oldest),
            ("most_liked", SortBy::MostLiked),
            ("most_commented", SortBy::MostCommented),
        ] {
            let q = params(&[("sort_by", raw)]).into_query(None).unwrap();
            assert_eq!(q.sort, sort);
        }
        assert_eq!(params(&[("sort_by", "popular")]).into_query(None), Err(ParamError::SortBy));
    }

    #[test]
    fn category_zero_does_not_filter() {
        let q = params(&[("category_id", "0")]).into_query(None).unwrap();
        assert_eq!(q.filter.category_id, None);

        let q = params(&[("category_id", "3")]).into_query(None).unwrap();
        assert_eq!(q.filter.category_id, Some(3));

        assert_eq!(params(&[("category_id", "three")]).into_query(None), Err(ParamError::CategoryId));
    }

    #[test]
    fn me_requires_identity() {
        assert_eq!(params(&[("me", "true")]).into_query(None), Err(ParamError::IdentityRequired));

        let q = params(&[("me", "T")]).into_query(Some(5)).unwrap();
        assert_eq!(q.filter.author_id, Some(5));
        assert_eq!(q.viewer_id, Some(5));

        let q = params(&[("me", "0")]).into_query(None).unwrap();
        assert_eq!(q.filter.author_id, None);

        assert_eq!(params(&[("me", "yes")]).into_query(Some(5)), Err(ParamError::Me));
    }

    #[test]
    fn empty_search_matches_everything() {
        let q = params(&[("search_title", "")]).into_query(None).unwrap();
        assert_eq!(q.filter.search_title, None);
    }

    #[test]
    fn pagination_bounds() {
        let q = params(&[("limit", "500"), ("offset", "40")]).into_query(None).unwrap();
        assert_eq!(q.limit, MAX_LIMIT);
        assert_eq!(q.offset, 40);

        assert_eq!(params(&[("limit", "-1")]).into_query(None), Err(ParamError::Limit));
        assert_eq!(params(&[("offset", "x")]).into_query(None), Err(ParamError::Offset));
    }

    #[test]
    fn identity_error_maps_to_unauthorized() {
        assert!(matches!(ApiError::from(ParamError::IdentityRequired), ApiError::Unauthorized));
        assert!(matches!(ApiError::from(ParamError::Me), ApiError::BadRequest(m) if m == "Invalid Filter By Me"));
    }
}
