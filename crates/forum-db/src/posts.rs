use anyhow::Result;
use rusqlite::{Row, params, params_from_iter};
use tracing::info;

use crate::Database;
use crate::feed::{FeedQuery, IS_LIKE_COLUMN, viewer_param};
use crate::models::{NewPost, PostRow};
use crate::queries::{
    AUTHOR_COLUMNS, COUNT_COLUMNS, author_from_row, image_from_row, now_timestamp, query_author_id,
};

/// One row per plain post (posts that carry a questionnaire are excluded).
fn post_source() -> String {
    format!(
        "SELECT
            b.id, b.author_id, b.category_id, b.title, b.description, b.created_at,
            {AUTHOR_COLUMNS},
            {COUNT_COLUMNS}
         FROM posts b
         INNER JOIN users u ON u.id = b.author_id
         LEFT JOIN user_details ud ON ud.user_id = u.id
         LEFT JOIN questionnaires q ON q.post_id = b.id
         WHERE q.id IS NULL"
    )
}

impl Database {
    pub fn insert_post(&self, post: &NewPost<'_>) -> Result<i64> {
        let id = self.with_tx(|tx| {
            tx.execute(
                "INSERT INTO posts (author_id, category_id, title, description, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![post.author_id, post.category_id, post.title, post.description, now_timestamp()],
            )?;
            Ok(tx.last_insert_rowid())
        })?;

        info!("Post {} created by user {}", id, post.author_id);
        Ok(id)
    }

    pub fn insert_post_image(&self, post_id: i64, path: &str) -> Result<i64> {
        self.with_tx(|tx| {
            tx.execute(
                "INSERT INTO post_images (post_id, path) VALUES (?1, ?2)",
                params![post_id, path],
            )?;
            Ok(tx.last_insert_rowid())
        })
    }

    /// Page of the post feed. Pagination applies to posts before the image
    /// join, so a page holds `limit` posts spread over one row per image.
    pub fn list_posts(&self, query: &FeedQuery) -> Result<Vec<PostRow>> {
        let page = query.page(&post_source());
        let sql = format!(
            "SELECT f.*, pi.id AS image_id, pi.path AS image_path
             FROM ({}) f
             LEFT JOIN post_images pi ON pi.post_id = f.id
             ORDER BY {}, pi.id",
            page.sql,
            query.sort.order_by("f"),
        );

        self.with_tx(|tx| {
            let mut stmt = tx.prepare(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(page.params.iter()), post_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Every row for one post: one per image, or a single row with no image.
    /// An empty result means the post does not exist.
    pub fn post_detail(&self, post_id: i64, viewer_id: Option<i64>) -> Result<Vec<PostRow>> {
        let sql = format!(
            "SELECT p.*, {IS_LIKE_COLUMN}, pi.id AS image_id, pi.path AS image_path
             FROM ({}) p
             LEFT JOIN post_images pi ON pi.post_id = p.id
             WHERE p.id = ?
             ORDER BY pi.id",
            post_source(),
        );

        self.with_tx(|tx| {
            let mut stmt = tx.prepare(&sql)?;
            let rows = stmt
                .query_map(
                    params_from_iter([viewer_param(viewer_id), post_id.into()]),
                    post_from_row,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Author of a plain post, `None` when no such post exists.
    pub fn post_author(&self, post_id: i64) -> Result<Option<i64>> {
        self.with_tx(|tx| {
            query_author_id(
                tx,
                "SELECT b.author_id FROM posts b
                 LEFT JOIN questionnaires q ON q.post_id = b.id
                 WHERE b.id = ?1 AND q.id IS NULL",
                post_id,
            )
        })
    }

    pub fn update_post(&self, post_id: i64, category_id: i64, title: &str, description: &str) -> Result<()> {
        self.with_tx(|tx| {
            tx.execute(
                "UPDATE posts SET category_id = ?1, title = ?2, description = ?3 WHERE id = ?4",
                params![category_id, title, description, post_id],
            )?;
            Ok(())
        })
    }

    /// Delete a post and its image rows. Returns the stored paths of the
    /// removed images so the caller can clean up the files.
    pub fn delete_post(&self, post_id: i64) -> Result<Vec<String>> {
        let paths = self.with_tx(|tx| {
            let paths = {
                let mut stmt = tx.prepare("SELECT path FROM post_images WHERE post_id = ?1 ORDER BY id")?;
                stmt.query_map([post_id], |row| row.get(0))?
                    .collect::<std::result::Result<Vec<String>, _>>()?
            };
            tx.execute("DELETE FROM post_images WHERE post_id = ?1", [post_id])?;
            tx.execute("DELETE FROM posts WHERE id = ?1", [post_id])?;
            Ok(paths)
        })?;

        info!("Post {} deleted with {} image(s)", post_id, paths.len());
        Ok(paths)
    }
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get("id")?,
        is_like: row.get("is_like")?,
        author: author_from_row(row)?,
        category_id: row.get("category_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        comment_count: row.get("comment_count")?,
        like_count: row.get("like_count")?,
        image: image_from_row(row)?,
    })
}
