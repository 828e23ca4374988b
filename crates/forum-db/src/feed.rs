//! Feed query construction.
//!
//! A feed is built from a per-resource *source* SELECT (one row per post with
//! author, profile and counts) that gets wrapped in a filtered, ordered and
//! paginated page. Filter values are always bound as parameters; the only
//! text spliced into the SQL is the fixed ORDER BY fragment picked by
//! [`SortBy`] and the table alias chosen by the caller.

use std::fmt;
use std::str::FromStr;

use rusqlite::types::Value;

pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    Newest,
    Oldest,
    MostLiked,
    MostCommented,
}

impl SortBy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::MostLiked => "most_liked",
            Self::MostCommented => "most_commented",
        }
    }

    /// ORDER BY fragment over `alias`. Ties break on id in the same
    /// direction as the primary key so pages stay stable.
    pub fn order_by(self, alias: &str) -> String {
        match self {
            Self::Newest => format!("{alias}.created_at DESC, {alias}.id DESC"),
            Self::Oldest => format!("{alias}.created_at ASC, {alias}.id ASC"),
            Self::MostLiked => format!("{alias}.like_count DESC, {alias}.id DESC"),
            Self::MostCommented => format!("{alias}.comment_count DESC, {alias}.id DESC"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSort(pub String);

impl fmt::Display for UnknownSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown sort order '{}'", self.0)
    }
}

impl std::error::Error for UnknownSort {}

impl FromStr for SortBy {
    type Err = UnknownSort;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            "most_liked" => Ok(Self::MostLiked),
            "most_commented" => Ok(Self::MostCommented),
            other => Err(UnknownSort(other.to_string())),
        }
    }
}

/// Predicate over feed items. `None` fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedFilter {
    pub search_title: Option<String>,
    pub category_id: Option<i64>,
    pub author_id: Option<i64>,
}

impl FeedFilter {
    /// Build the WHERE conditions over `alias`, pushing bound values onto
    /// `params` in placeholder order. Returns `None` when nothing filters.
    pub fn where_clause(&self, alias: &str, params: &mut Vec<Value>) -> Option<String> {
        let mut conditions = Vec::new();

        if let Some(search) = self.search_title.as_deref().filter(|s| !s.is_empty()) {
            conditions.push(format!("{alias}.title LIKE ? ESCAPE '\\'"));
            params.push(Value::Text(format!("%{}%", escape_like(search))));
        }

        if let Some(category_id) = self.category_id {
            conditions.push(format!("{alias}.category_id = ?"));
            params.push(Value::Integer(category_id));
        }

        if let Some(author_id) = self.author_id {
            conditions.push(format!("{alias}.author_id = ?"));
            params.push(Value::Integer(author_id));
        }

        if conditions.is_empty() {
            None
        } else {
            Some(conditions.join(" AND "))
        }
    }
}

/// Escape LIKE wildcards so the search text matches as a plain substring.
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedQuery {
    pub limit: u32,
    pub offset: u32,
    pub viewer_id: Option<i64>,
    pub sort: SortBy,
    pub filter: FeedFilter,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
            viewer_id: None,
            sort: SortBy::default(),
            filter: FeedFilter::default(),
        }
    }
}

/// SQL text plus its positional parameters.
#[derive(Debug)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Viewer-relative like flag over `alias`. Binds one parameter; a NULL viewer
/// never matches, so anonymous viewers get `false`.
pub(crate) const IS_LIKE_COLUMN: &str =
    "EXISTS (SELECT 1 FROM post_likes l WHERE l.post_id = p.id AND l.user_id = ?) AS is_like";

pub(crate) fn viewer_param(viewer_id: Option<i64>) -> Value {
    viewer_id.map(Value::Integer).unwrap_or(Value::Null)
}

impl FeedQuery {
    /// Wrap `source` into one page of feed items, aliased `p`, with the
    /// viewer's like flag appended as `is_like`.
    pub fn page(&self, source: &str) -> Statement {
        let mut params = vec![viewer_param(self.viewer_id)];

        let mut sql = format!("SELECT p.*, {IS_LIKE_COLUMN} FROM ({source}) p");
        if let Some(conditions) = self.filter.where_clause("p", &mut params) {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions);
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(&self.sort.order_by("p"));
        sql.push_str(" LIMIT ? OFFSET ?");

        params.push(Value::Integer(i64::from(self.limit)));
        params.push(Value::Integer(i64::from(self.offset)));

        Statement { sql, params }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_parses_known_values_only() {
        assert_eq!("newest".parse::<SortBy>(), Ok(SortBy::Newest));
        assert_eq!("oldest".parse::<SortBy>(), Ok(SortBy::Oldest));
        assert_eq!("most_liked".parse::<SortBy>(), Ok(SortBy::MostLiked));
        assert_eq!("most_commented".parse::<SortBy>(), Ok(SortBy::MostCommented));
        assert!("NEWEST".parse::<SortBy>().is_err());
        assert!("created_at DESC".parse::<SortBy>().is_err());
    }

    #[test]
    fn empty_filter_has_no_where_clause() {
        let mut params = Vec::new();
        assert_eq!(FeedFilter::default().where_clause("p", &mut params), None);

        let blank = FeedFilter {
            search_title: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(blank.where_clause("p", &mut params), None);
        assert!(params.is_empty());
    }

    #[test]
    fn filter_values_are_bound_not_spliced() {
        let filter = FeedFilter {
            search_title: Some("x' OR 1=1 --".into()),
            category_id: Some(3),
            author_id: Some(9),
        };
        let mut params = Vec::new();
        let clause = filter.where_clause("p", &mut params).unwrap();

        assert!(!clause.contains("OR 1=1"));
        assert_eq!(clause, "p.title LIKE ? ESCAPE '\\' AND p.category_id = ? AND p.author_id = ?");
        assert_eq!(
            params,
            vec![
                Value::Text("%x' OR 1=1 --%".into()),
                Value::Integer(3),
                Value::Integer(9),
            ]
        );
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("100%_done\\"), "100\\%\\_done\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn page_params_follow_placeholder_order() {
        let query = FeedQuery {
            limit: 5,
            offset: 10,
            viewer_id: Some(2),
            sort: SortBy::MostLiked,
            filter: FeedFilter {
                category_id: Some(4),
                ..Default::default()
            },
        };
        let stmt = query.page("SELECT * FROM posts");

        assert_eq!(stmt.sql.matches('?').count(), stmt.params.len());
        assert!(stmt.sql.ends_with("ORDER BY p.like_count DESC, p.id DESC LIMIT ? OFFSET ?"));
        assert_eq!(
            stmt.params,
            vec![Value::Integer(2), Value::Integer(4), Value::Integer(5), Value::Integer(10)]
        );
    }

    #[test]
    fn anonymous_viewer_binds_null() {
        let stmt = FeedQuery::default().page("SELECT * FROM posts");
        assert_eq!(stmt.params[0], Value::Null);
    }
}
