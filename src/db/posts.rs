use rusqlite::types::ToSql;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use super::models::{NewPost, Polarity, Post, PostFilter, PostId, UserId};
use super::{Store, StoreError, StoreResult};

pub const MAX_CATEGORIES_PER_POST: usize = 4;

// ?1 is always the viewer id (NULL for anonymous), so `mine` only matches
// the viewer's own vote.
const POST_SELECT: &str = "
    SELECT p.id, p.title, p.content, p.author_id, u.username, p.created_at, p.updated_at,
           COALESCE(v.likes, 0), COALESCE(v.dislikes, 0), mine.is_like
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN (
        SELECT post_id,
               SUM(CASE WHEN is_like THEN 1 ELSE 0 END) AS likes,
               SUM(CASE WHEN is_like THEN 0 ELSE 1 END) AS dislikes
        FROM likes
        WHERE post_id IS NOT NULL
        GROUP BY post_id
    ) v ON v.post_id = p.id
    LEFT JOIN likes mine ON mine.post_id = p.id AND mine.user_id = ?1";

const POST_ORDER: &str = "ORDER BY p.created_at DESC, p.id DESC";

impl Store {
    /// Insert a post and its category links atomically.
    pub fn create_post(&self, post: &NewPost) -> StoreResult<PostId> {
        if post.category_ids.is_empty() || post.category_ids.len() > MAX_CATEGORIES_PER_POST {
            return Err(StoreError::Invalid(format!(
                "A post needs between 1 and {} categories",
                MAX_CATEGORIES_PER_POST
            )));
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT INTO posts (title, content, author_id) VALUES (?1, ?2, ?3)",
            params![post.title, post.content, post.author_id],
        )?;
        let post_id = tx.last_insert_rowid();

        {
            let mut link = tx.prepare(
                "INSERT OR IGNORE INTO post_categories (post_id, category_id) VALUES (?1, ?2)",
            )?;
            for category_id in &post.category_ids {
                link.execute(params![post_id, category_id])?;
            }
        }

        tx.commit()?;
        tracing::debug!(post_id, author_id = post.author_id, "post created");
        Ok(post_id)
    }

    /// List posts newest first. `Created` and `Liked` need a viewer.
    pub fn list_posts(
        &self,
        viewer: Option<UserId>,
        filter: &PostFilter,
    ) -> StoreResult<Vec<Post>> {
        if filter.requires_viewer() && viewer.is_none() {
            return Err(StoreError::AuthRequired);
        }

        let conn = self.conn()?;
        let mut args: Vec<&dyn ToSql> = vec![&viewer];
        let condition = match filter {
            PostFilter::All => "",
            PostFilter::Category(name) => {
                args.push(name);
                "WHERE EXISTS (
                    SELECT 1 FROM post_categories pc
                    JOIN categories c ON c.id = pc.category_id
                    WHERE pc.post_id = p.id AND c.name = ?2)"
            }
            PostFilter::Created => "WHERE p.author_id = ?1",
            PostFilter::Liked => "WHERE mine.is_like = 1",
        };

        let sql = format!("{POST_SELECT} {condition} {POST_ORDER}");
        query_posts(&conn, &sql, &args)
    }

    /// A single post as `viewer` sees it.
    pub fn get_post(&self, viewer: Option<UserId>, id: PostId) -> StoreResult<Option<Post>> {
        let conn = self.conn()?;
        let sql = format!("{POST_SELECT} WHERE p.id = ?2");
        let mut posts = query_posts(&conn, &sql, params![viewer, id])?;
        Ok(posts.pop())
    }

    pub fn post_exists(&self, id: PostId) -> StoreResult<bool> {
        let conn = self.conn()?;
        let exists = conn
            .query_row("SELECT 1 FROM posts WHERE id = ?1", params![id], |_| Ok(()))
            .optional()?
            .is_some();
        Ok(exists)
    }
}

fn query_posts(conn: &Connection, sql: &str, args: &[&dyn ToSql]) -> StoreResult<Vec<Post>> {
    let mut stmt = conn.prepare(sql)?;
    let mut posts = stmt
        .query_map(args, |row| {
            let vote: Option<bool> = row.get(9)?;
            Ok(Post {
                id: row.get(0)?,
                title: row.get(1)?,
                content: row.get(2)?,
                author_id: row.get(3)?,
                author_name: row.get(4)?,
                created: row.get(5)?,
                updated: row.get(6)?,
                likes: row.get(7)?,
                dislikes: row.get(8)?,
                categories: Vec::new(),
                user_vote: vote.map(Polarity::from_is_like),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    for post in &mut posts {
        post.categories = categories_for_post(conn, post.id)?;
    }
    Ok(posts)
}

fn categories_for_post(conn: &Connection, post_id: PostId) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare_cached(
        "SELECT c.name FROM categories c
         JOIN post_categories pc ON pc.category_id = c.id
         WHERE pc.post_id = ?1
         ORDER BY c.name",
    )?;
    let names = stmt
        .query_map(params![post_id], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::VoteTarget;
    use crate::db::test_store;

    fn new_post(store: &Store, author_id: UserId, title: &str, categories: &[&str]) -> PostId {
        let names: Vec<String> = categories.iter().map(|s| s.to_string()).collect();
        let category_ids = store
            .categories_by_name(&names)
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        store
            .create_post(&NewPost {
                title: title.into(),
                content: "Some sufficiently long content".into(),
                author_id,
                category_ids,
            })
            .unwrap()
    }

    #[test]
    fn create_post_links_categories() {
        let store = test_store();
        let alice = store.create_user("alice", "a@x.com", "h").unwrap();
        let id = new_post(&store, alice.id, "Hello there", &["Music", "Books"]);

        let post = store.get_post(None, id).unwrap().unwrap();
        assert_eq!(post.title, "Hello there");
        assert_eq!(post.author_name, "alice");
        assert_eq!(post.categories, vec!["Books", "Music"]);
        assert_eq!((post.likes, post.dislikes), (0, 0));
        assert_eq!(post.user_vote, None);
    }

    #[test]
    fn create_post_rejects_bad_category_counts() {
        let store = test_store();
        let alice = store.create_user("alice", "a@x.com", "h").unwrap();
        for ids in [vec![], vec![1, 2, 3, 4, 5]] {
            let err = store
                .create_post(&NewPost {
                    title: "Hello there".into(),
                    content: "Some content here".into(),
                    author_id: alice.id,
                    category_ids: ids,
                })
                .unwrap_err();
            assert!(matches!(err, StoreError::Invalid(_)));
        }
        assert!(store.list_posts(None, &PostFilter::All).unwrap().is_empty());
    }

    #[test]
    fn failed_category_link_leaves_no_post() {
        let store = test_store();
        let alice = store.create_user("alice", "a@x.com", "h").unwrap();
        let result = store.create_post(&NewPost {
            title: "Hello there".into(),
            content: "Some content here".into(),
            author_id: alice.id,
            category_ids: vec![9999],
        });
        assert!(result.is_err());
        assert!(store.list_posts(None, &PostFilter::All).unwrap().is_empty());
    }

    #[test]
    fn list_posts_is_newest_first() {
        let store = test_store();
        let alice = store.create_user("alice", "a@x.com", "h").unwrap();
        let first = new_post(&store, alice.id, "First post", &["General"]);
        let second = new_post(&store, alice.id, "Second post", &["General"]);

        let ids: Vec<PostId> = store
            .list_posts(None, &PostFilter::All)
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[test]
    fn category_filter() {
        let store = test_store();
        let alice = store.create_user("alice", "a@x.com", "h").unwrap();
        let music = new_post(&store, alice.id, "Music post", &["Music", "Travel"]);
        new_post(&store, alice.id, "Books post", &["Books"]);

        let posts = store
            .list_posts(None, &PostFilter::Category("Music".into()))
            .unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, music);

        let none = store
            .list_posts(None, &PostFilter::Category("Nonexistent".into()))
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn viewer_filters_require_identity() {
        let store = test_store();
        for filter in [PostFilter::Created, PostFilter::Liked] {
            let err = store.list_posts(None, &filter).unwrap_err();
            assert!(matches!(err, StoreError::AuthRequired));
        }
    }

    #[test]
    fn created_filter_returns_only_own_posts() {
        let store = test_store();
        let alice = store.create_user("alice", "a@x.com", "h").unwrap();
        let bob = store.create_user("bob", "b@x.com", "h").unwrap();
        let mine = new_post(&store, alice.id, "Alice post", &["General"]);
        new_post(&store, bob.id, "Bob's post", &["General"]);

        let posts = store.list_posts(Some(alice.id), &PostFilter::Created).unwrap();
        assert_eq!(posts.iter().map(|p| p.id).collect::<Vec<_>>(), vec![mine]);
    }

    #[test]
    fn liked_filter_and_vote_enrichment() {
        let store = test_store();
        let alice = store.create_user("alice", "a@x.com", "h").unwrap();
        let bob = store.create_user("bob", "b@x.com", "h").unwrap();
        let liked = new_post(&store, bob.id, "Liked post", &["General"]);
        let disliked = new_post(&store, bob.id, "Disliked post", &["General"]);

        store
            .toggle_like(alice.id, VoteTarget::Post(liked), Polarity::Like)
            .unwrap();
        store
            .toggle_like(bob.id, VoteTarget::Post(liked), Polarity::Like)
            .unwrap();
        store
            .toggle_like(alice.id, VoteTarget::Post(disliked), Polarity::Dislike)
            .unwrap();

        let posts = store.list_posts(Some(alice.id), &PostFilter::Liked).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, liked);
        assert_eq!(posts[0].likes, 2);
        assert_eq!(posts[0].user_vote, Some(Polarity::Like));

        let all = store.list_posts(Some(alice.id), &PostFilter::All).unwrap();
        let other = all.iter().find(|p| p.id == disliked).unwrap();
        assert_eq!((other.likes, other.dislikes), (0, 1));
        assert_eq!(other.user_vote, Some(Polarity::Dislike));

        let anonymous = store.get_post(None, liked).unwrap().unwrap();
        assert_eq!(anonymous.likes, 2);
        assert_eq!(anonymous.user_vote, None);
    }

    #[test]
    fn get_post_missing_is_none() {
        let store = test_store();
        assert!(store.get_post(None, 123).unwrap().is_none());
        assert!(!store.post_exists(123).unwrap());
    }
}
