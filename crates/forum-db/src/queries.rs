use anyhow::Result;
use rusqlite::{Connection, Row};

use crate::Database;
use crate::models::{AuthorRow, ImageRow};

/// Author and profile columns shared by every feed source. Post columns come
/// from the `b` alias, so sources select `FROM posts b`.
pub(crate) const AUTHOR_COLUMNS: &str = "
    u.name AS author_name,
    u.role AS author_role,
    u.avatar AS author_avatar,
    ud.institute AS author_institute,
    ud.major AS author_major,
    ud.batch AS author_batch";

pub(crate) const COUNT_COLUMNS: &str = "
    (SELECT COUNT(*) FROM comments c WHERE c.post_id = b.id) AS comment_count,
    (SELECT COUNT(DISTINCT pl.user_id) FROM post_likes pl WHERE pl.post_id = b.id) AS like_count";

impl Database {
    // -- Categories --

    pub fn category_exists(&self, category_id: i64) -> Result<bool> {
        self.with_tx(|tx| {
            let exists = tx.query_row(
                "SELECT EXISTS (SELECT 1 FROM categories WHERE id = ?1)",
                [category_id],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
    }
}

pub(crate) fn author_from_row(row: &Row<'_>) -> rusqlite::Result<AuthorRow> {
    Ok(AuthorRow {
        id: row.get("author_id")?,
        name: row.get("author_name")?,
        role: row.get("author_role")?,
        avatar: row.get("author_avatar")?,
        institute: row.get("author_institute")?,
        major: row.get("author_major")?,
        batch: row.get("author_batch")?,
    })
}

pub(crate) fn image_from_row(row: &Row<'_>) -> rusqlite::Result<Option<ImageRow>> {
    let id: Option<i64> = row.get("image_id")?;
    let path: Option<String> = row.get("image_path")?;
    Ok(id.zip(path).map(|(id, path)| ImageRow { id, path }))
}

pub(crate) fn query_author_id(conn: &Connection, sql: &str, id: i64) -> Result<Option<i64>> {
    conn.query_row(sql, [id], |row| row.get(0)).optional()
}

/// Timestamp in the storage format, `YYYY-MM-DD HH:MM:SS` UTC.
pub(crate) fn now_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::Database;

    /// Users 1..=3 with a profile for user 1 only.
    pub fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.with_tx(|tx| {
            tx.execute_batch(
                "
                INSERT INTO users (id, name, email, role, avatar) VALUES
                    (1, 'alice', 'alice@example.com', 'student', 'media/avatar/alice.png'),
                    (2, 'bob', 'bob@example.com', 'student', NULL),
                    (3, 'carol', 'carol@example.com', 'lecturer', NULL);
                INSERT INTO user_details (user_id, institute, major, batch) VALUES
                    (1, 'State University', 'Informatics', 2021);
                ",
            )?;
            Ok(())
        })
        .unwrap();
        db
    }

    pub fn like(db: &Database, post_id: i64, user_id: i64) {
        db.with_tx(|tx| {
            tx.execute(
                "INSERT INTO post_likes (post_id, user_id) VALUES (?1, ?2)",
                [post_id, user_id],
            )?;
            Ok(())
        })
        .unwrap();
    }

    pub fn comment(db: &Database, post_id: i64, user_id: i64) {
        db.with_tx(|tx| {
            tx.execute(
                "INSERT INTO comments (post_id, author_id, comment) VALUES (?1, ?2, 'nice')",
                [post_id, user_id],
            )?;
            Ok(())
        })
        .unwrap();
    }

    pub fn set_created_at(db: &Database, post_id: i64, created_at: &str) {
        db.with_tx(|tx| {
            tx.execute(
                "UPDATE posts SET created_at = ?1 WHERE id = ?2",
                rusqlite::params![created_at, post_id],
            )?;
            Ok(())
        })
        .unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures;

    #[test]
    fn seeded_categories_exist() {
        let db = fixtures::seeded();
        assert!(db.category_exists(1).unwrap());
        assert!(!db.category_exists(999).unwrap());
    }
}
