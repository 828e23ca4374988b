use anyhow::Result;
use rusqlite::{Row, params, params_from_iter};
use tracing::info;

use crate::Database;
use crate::feed::{FeedQuery, IS_LIKE_COLUMN, viewer_param};
use crate::models::{NewQuestionnaire, QuestionnaireRow};
use crate::queries::{
    AUTHOR_COLUMNS, COUNT_COLUMNS, OptionalExt, author_from_row, now_timestamp, query_author_id,
};

/// One row per questionnaire. The id exposed is the post id; the
/// questionnaire row only adds link and reward.
fn questionnaire_source() -> String {
    format!(
        "SELECT
            b.id, b.author_id, b.category_id, b.title, b.description, b.created_at,
            q.link, q.reward,
            {AUTHOR_COLUMNS},
            {COUNT_COLUMNS}
         FROM posts b
         INNER JOIN questionnaires q ON q.post_id = b.id
         INNER JOIN users u ON u.id = b.author_id
         LEFT JOIN user_details ud ON ud.user_id = u.id"
    )
}

impl Database {
    /// Insert the post and its questionnaire record in one unit of work.
    pub fn insert_questionnaire(&self, new: &NewQuestionnaire<'_>) -> Result<i64> {
        let post = &new.post;
        let id = self.with_tx(|tx| {
            tx.execute(
                "INSERT INTO posts (author_id, category_id, title, description, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![post.author_id, post.category_id, post.title, post.description, now_timestamp()],
            )?;
            let post_id = tx.last_insert_rowid();
            tx.execute(
                "INSERT INTO questionnaires (post_id, link, reward) VALUES (?1, ?2, ?3)",
                params![post_id, new.link, new.reward],
            )?;
            Ok(post_id)
        })?;

        info!("Questionnaire {} created by user {}", id, post.author_id);
        Ok(id)
    }

    pub fn list_questionnaires(&self, query: &FeedQuery) -> Result<Vec<QuestionnaireRow>> {
        let page = query.page(&questionnaire_source());

        self.with_tx(|tx| {
            let mut stmt = tx.prepare(&page.sql)?;
            let rows = stmt
                .query_map(params_from_iter(page.params.iter()), questionnaire_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn questionnaire_detail(&self, id: i64, viewer_id: Option<i64>) -> Result<Option<QuestionnaireRow>> {
        let sql = format!(
            "SELECT p.*, {IS_LIKE_COLUMN} FROM ({}) p WHERE p.id = ?",
            questionnaire_source(),
        );

        self.with_tx(|tx| {
            tx.query_row(
                &sql,
                params_from_iter([viewer_param(viewer_id), id.into()]),
                questionnaire_from_row,
            )
            .optional()
        })
    }

    /// Author of a questionnaire, `None` when no such questionnaire exists.
    pub fn questionnaire_author(&self, id: i64) -> Result<Option<i64>> {
        self.with_tx(|tx| {
            query_author_id(
                tx,
                "SELECT b.author_id FROM posts b
                 INNER JOIN questionnaires q ON q.post_id = b.id
                 WHERE b.id = ?1",
                id,
            )
        })
    }

    pub fn update_questionnaire(&self, id: i64, update: &NewQuestionnaire<'_>) -> Result<()> {
        let post = &update.post;
        self.with_tx(|tx| {
            tx.execute(
                "UPDATE posts SET category_id = ?1, title = ?2, description = ?3 WHERE id = ?4",
                params![post.category_id, post.title, post.description, id],
            )?;
            tx.execute(
                "UPDATE questionnaires SET link = ?1, reward = ?2 WHERE post_id = ?3",
                params![update.link, update.reward, id],
            )?;
            Ok(())
        })
    }

    pub fn delete_questionnaire(&self, id: i64) -> Result<()> {
        self.with_tx(|tx| {
            tx.execute("DELETE FROM questionnaires WHERE post_id = ?1", [id])?;
            tx.execute("DELETE FROM posts WHERE id = ?1", [id])?;
            Ok(())
        })?;

        info!("Questionnaire {} deleted", id);
        Ok(())
    }
}

fn questionnaire_from_row(row: &Row<'_>) -> rusqlite::Result<QuestionnaireRow> {
    Ok(QuestionnaireRow {
        id: row.get("id")?,
        is_like: row.get("is_like")?,
        author: author_from_row(row)?,
        category_id: row.get("category_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        link: row.get("link")?,
        reward: row.get("reward")?,
        created_at: row.get("created_at")?,
        comment_count: row.get("comment_count")?,
        like_count: row.get("like_count")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{FeedFilter, SortBy};
    use crate::models::NewPost;
    use crate::queries::fixtures;

    fn new_questionnaire<'a>(author_id: i64, title: &'a str, reward: Option<&'a str>) -> NewQuestionnaire<'a> {
        NewQuestionnaire {
            post: NewPost {
                author_id,
                category_id: 2,
                title,
                description: "Please fill in",
            },
            link: "https://forms.example.com/survey",
            reward,
        }
    }

    #[test]
    fn questionnaires_and_posts_are_disjoint() {
        let db = fixtures::seeded();
        let post_id = db
            .insert_post(&NewPost { author_id: 1, category_id: 1, title: "Plain", description: "x" })
            .unwrap();
        let q_id = db.insert_questionnaire(&new_questionnaire(2, "Survey", Some("Coffee voucher"))).unwrap();

        let posts = db.list_posts(&FeedQuery::default()).unwrap();
        assert_eq!(posts.iter().map(|p| p.id).collect::<Vec<_>>(), vec![post_id]);

        let questionnaires = db.list_questionnaires(&FeedQuery::default()).unwrap();
        assert_eq!(questionnaires.len(), 1);
        assert_eq!(questionnaires[0].id, q_id);
        assert_eq!(questionnaires[0].reward.as_deref(), Some("Coffee voucher"));

        assert_eq!(db.post_author(q_id).unwrap(), None);
        assert!(db.post_detail(q_id, None).unwrap().is_empty());
        assert_eq!(db.questionnaire_author(post_id).unwrap(), None);
        assert!(db.questionnaire_detail(post_id, None).unwrap().is_none());
    }

    #[test]
    fn lists_with_filters_and_likes() {
        let db = fixtures::seeded();
        let a = db.insert_questionnaire(&new_questionnaire(1, "Sleep habits", None)).unwrap();
        let b = db.insert_questionnaire(&new_questionnaire(2, "Study habits", None)).unwrap();
        fixtures::like(&db, a, 3);
        fixtures::like(&db, a, 2);

        let liked = db
            .list_questionnaires(&FeedQuery { sort: SortBy::MostLiked, viewer_id: Some(3), ..Default::default() })
            .unwrap();
        assert_eq!(liked.iter().map(|q| q.id).collect::<Vec<_>>(), vec![a, b]);
        assert!(liked[0].is_like);
        assert_eq!(liked[0].like_count, 2);
        assert!(!liked[1].is_like);

        let mine = db
            .list_questionnaires(&FeedQuery {
                filter: FeedFilter { author_id: Some(2), search_title: Some("habits".into()), ..Default::default() },
                ..Default::default()
            })
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, b);
    }

    #[test]
    fn update_and_delete() {
        let db = fixtures::seeded();
        let id = db.insert_questionnaire(&new_questionnaire(1, "Old", None)).unwrap();
        assert_eq!(db.questionnaire_author(id).unwrap(), Some(1));

        let mut update = new_questionnaire(1, "New", Some("Snacks"));
        update.link = "https://forms.example.com/v2";
        db.update_questionnaire(id, &update).unwrap();

        let row = db.questionnaire_detail(id, None).unwrap().unwrap();
        assert_eq!(row.title, "New");
        assert_eq!(row.link, "https://forms.example.com/v2");
        assert_eq!(row.reward.as_deref(), Some("Snacks"));
        assert_eq!(row.author.name, "alice");

        db.delete_questionnaire(id).unwrap();
        assert!(db.questionnaire_detail(id, None).unwrap().is_none());
        assert_eq!(db.questionnaire_author(id).unwrap(), None);
    }
}
