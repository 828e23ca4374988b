//! Folding of flat join rows into feed entries.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::hash::Hash;

use forum_db::models::{AuthorRow, PostRow, QuestionnaireRow};
use forum_types::api::{AuthorResponse, PostImageResponse, PostResponse, QuestionnaireResponse};

use crate::auth::Viewer;
use crate::storage::public_url;

/// Group `rows` by `key`, keeping groups in the order their key first
/// appears. `take_item` pulls the per-row child out of every row; `head`
/// builds the group's scalar part from the first row only.
pub fn group_in_order<R, K, H, I>(
    rows: impl IntoIterator<Item = R>,
    mut key: impl FnMut(&R) -> K,
    mut take_item: impl FnMut(&mut R) -> Option<I>,
    mut head: impl FnMut(R) -> H,
) -> Vec<(H, Vec<I>)>
where
    K: Eq + Hash,
{
    let mut groups: Vec<(H, Vec<I>)> = Vec::new();
    let mut index: HashMap<K, usize> = HashMap::new();

    for mut row in rows {
        let item = take_item(&mut row);
        let slot = match index.entry(key(&row)) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => {
                groups.push((head(row), Vec::new()));
                *e.insert(groups.len() - 1)
            }
        };
        if let Some(item) = item {
            groups[slot].1.push(item);
        }
    }

    groups
}

pub fn author_response(author: AuthorRow) -> AuthorResponse {
    AuthorResponse {
        id: author.id,
        name: author.name,
        role: author.role,
        institute: author.institute.unwrap_or_default(),
        major: author.major.unwrap_or_default(),
        batch: author.batch.unwrap_or_default(),
        profile_image: author.avatar.unwrap_or_default(),
    }
}

/// One entry per post, in first-seen order, each carrying all its images.
pub fn assemble_posts(rows: Vec<PostRow>, viewer: Viewer) -> Vec<PostResponse> {
    group_in_order(
        rows,
        |row| row.id,
        |row| {
            row.image.take().map(|image| PostImageResponse {
                id: image.id,
                url: public_url(&image.path),
            })
        },
        |row| PostResponse {
            id: row.id,
            is_like: row.is_like,
            is_author: viewer.is(row.author.id),
            author: author_response(row.author),
            category_id: row.category_id,
            title: row.title,
            description: row.description,
            created_at: row.created_at,
            comment_count: row.comment_count,
            like_count: row.like_count,
            images: Vec::new(),
        },
    )
    .into_iter()
    .map(|(post, images)| PostResponse { images, ..post })
    .collect()
}

pub fn questionnaire_response(row: QuestionnaireRow, viewer: Viewer) -> QuestionnaireResponse {
    QuestionnaireResponse {
        id: row.id,
        is_like: row.is_like,
        is_author: viewer.is(row.author.id),
        author: author_response(row.author),
        category_id: row.category_id,
        title: row.title,
        description: row.description,
        link: row.link,
        reward: row.reward,
        created_at: row.created_at,
        comment_count: row.comment_count,
        like_count: row.like_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forum_db::models::ImageRow;

    fn author(id: i64) -> AuthorRow {
        AuthorRow {
            id,
            name: format!("user{id}"),
            role: "student".into(),
            avatar: None,
            institute: None,
            major: None,
            batch: None,
        }
    }

    fn row(id: i64, image: Option<(i64, &str)>) -> PostRow {
        PostRow {
            id,
            is_like: false,
            author: author(1),
            category_id: 1,
            title: format!("post {id}"),
            description: String::new(),
            created_at: "2024-01-01 00:00:00".into(),
            comment_count: 0,
            like_count: 0,
            image: image.map(|(id, path)| ImageRow { id, path: path.into() }),
        }
    }

    #[test]
    fn groups_images_under_first_seen_posts() {
        let rows = vec![row(1, Some((10, "post/a.png"))), row(1, Some((11, "post/b.png"))), row(2, None)];
        let posts = assemble_posts(rows, Viewer(None));

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, 1);
        assert_eq!(
            posts[0].images,
            vec![
                PostImageResponse { id: 10, url: "/media/post/a.png".into() },
                PostImageResponse { id: 11, url: "/media/post/b.png".into() },
            ]
        );
        assert_eq!(posts[1].id, 2);
        assert!(posts[1].images.is_empty());
    }

    #[test]
    fn first_occurrence_wins_for_scalars() {
        let mut second = row(1, Some((2, "post/b.png")));
        second.title = "changed".into();
        let posts = assemble_posts(vec![row(1, Some((1, "post/a.png"))), second], Viewer(None));

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "post 1");
        assert_eq!(posts[0].images.len(), 2);
    }

    #[test]
    fn keeps_order_for_interleaved_keys() {
        let grouped = group_in_order(
            vec![(3, Some('a')), (1, None), (3, Some('b')), (2, Some('c'))],
            |r| r.0,
            |r| r.1.take(),
            |r| r.0,
        );
        assert_eq!(grouped, vec![(3, vec!['a', 'b']), (1, vec![]), (2, vec!['c'])]);
    }

    #[test]
    fn empty_rows_give_empty_feed() {
        assert!(assemble_posts(Vec::new(), Viewer(Some(1))).is_empty());
    }

    #[test]
    fn missing_profile_fields_default() {
        let posts = assemble_posts(vec![row(1, None)], Viewer(Some(1)));
        let author = &posts[0].author;
        assert_eq!(author.institute, "");
        assert_eq!(author.major, "");
        assert_eq!(author.batch, 0);
        assert_eq!(author.profile_image, "");
        assert!(posts[0].is_author);

        let anonymous = assemble_posts(vec![row(1, None)], Viewer(None));
        assert!(!anonymous[0].is_author);
    }
}
