use rusqlite::params;

use super::models::{Comment, CommentId, Polarity, PostId, UserId};
use super::{Store, StoreError, StoreResult};

impl Store {
    /// Add a comment to an existing post.
    pub fn create_comment(
        &self,
        post_id: PostId,
        author_id: UserId,
        content: &str,
    ) -> StoreResult<CommentId> {
        if !self.post_exists(post_id)? {
            return Err(StoreError::NotFound("Post not found".into()));
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO comments (post_id, content, author_id) VALUES (?1, ?2, ?3)",
            params![post_id, content, author_id],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Comments on a post, oldest first, with vote totals and the viewer's vote.
    pub fn list_comments(
        &self,
        post_id: PostId,
        viewer: Option<UserId>,
    ) -> StoreResult<Vec<Comment>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT c.id, c.post_id, c.content, c.author_id, u.username, c.created_at,
                    COALESCE(v.likes, 0), COALESCE(v.dislikes, 0), mine.is_like
             FROM comments c
             JOIN users u ON u.id = c.author_id
             LEFT JOIN (
                 SELECT comment_id,
                        SUM(CASE WHEN is_like THEN 1 ELSE 0 END) AS likes,
                        SUM(CASE WHEN is_like THEN 0 ELSE 1 END) AS dislikes
                 FROM likes
                 WHERE comment_id IS NOT NULL
                 GROUP BY comment_id
             ) v ON v.comment_id = c.id
             LEFT JOIN likes mine ON mine.comment_id = c.id AND mine.user_id = ?2
             WHERE c.post_id = ?1
             ORDER BY c.created_at ASC, c.id ASC",
        )?;

        let comments = stmt
            .query_map(params![post_id, viewer], |row| {
                let vote: Option<bool> = row.get(8)?;
                Ok(Comment {
                    id: row.get(0)?,
                    post_id: row.get(1)?,
                    content: row.get(2)?,
                    author_id: row.get(3)?,
                    author_name: row.get(4)?,
                    created: row.get(5)?,
                    likes: row.get(6)?,
                    dislikes: row.get(7)?,
                    user_vote: vote.map(Polarity::from_is_like),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(comments)
    }
}
