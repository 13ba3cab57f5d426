use chrono::NaiveDateTime;
use serde::Serialize;

pub type UserId = i64;
pub type PostId = i64;
pub type CommentId = i64;
pub type CategoryId = i64;

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub user_id: UserId,
    pub expires_at: NaiveDateTime,
}

impl Session {
    pub fn is_expired_at(&self, now: NaiveDateTime) -> bool {
        now > self.expires_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Direction of a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Like,
    Dislike,
}

impl Polarity {
    pub fn from_is_like(is_like: bool) -> Self {
        if is_like {
            Polarity::Like
        } else {
            Polarity::Dislike
        }
    }

    pub fn is_like(self) -> bool {
        self == Polarity::Like
    }
}

/// What a vote is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTarget {
    Post(PostId),
    Comment(CommentId),
}

impl VoteTarget {
    pub fn id(self) -> i64 {
        match self {
            VoteTarget::Post(id) | VoteTarget::Comment(id) => id,
        }
    }

    /// Column in `likes` holding this target's id.
    pub(crate) fn column(self) -> &'static str {
        match self {
            VoteTarget::Post(_) => "post_id",
            VoteTarget::Comment(_) => "comment_id",
        }
    }

    pub(crate) fn table(self) -> &'static str {
        match self {
            VoteTarget::Post(_) => "posts",
            VoteTarget::Comment(_) => "comments",
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            VoteTarget::Post(_) => "Post",
            VoteTarget::Comment(_) => "Comment",
        }
    }
}

/// Net effect of a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteOutcome {
    Created,
    Retracted,
    Flipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct VoteSummary {
    pub likes: i64,
    pub dislikes: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_vote: Option<Polarity>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub author_id: UserId,
    pub author_name: String,
    pub created: String,
    pub updated: String,
    pub likes: i64,
    pub dislikes: i64,
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_vote: Option<Polarity>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub content: String,
    pub author_id: UserId,
    pub author_name: String,
    pub created: String,
    pub likes: i64,
    pub dislikes: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_vote: Option<Polarity>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author_id: UserId,
    pub category_ids: Vec<CategoryId>,
}

/// Which posts a listing returns. `Created` and `Liked` are relative to the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Category(String),
    Created,
    Liked,
}

impl PostFilter {
    /// Builds a filter from the `filter`/`value` query pair. Unknown filter
    /// names list everything.
    pub fn from_query(filter: Option<&str>, value: Option<&str>) -> Self {
        match filter.map(str::trim) {
            Some("category") => PostFilter::Category(value.unwrap_or_default().trim().to_string()),
            Some("created") => PostFilter::Created,
            Some("liked") => PostFilter::Liked,
            _ => PostFilter::All,
        }
    }

    pub fn requires_viewer(&self) -> bool {
        matches!(self, PostFilter::Created | PostFilter::Liked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_serialization_omits_password_hash() {
        let user = User {
            id: 1,
            username: "alice".into(),
            email: "a@x.com".into(),
            password_hash: "$2b$secret".into(),
            created: "2025-01-15 12:00:00".into(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "alice");
    }

    #[test]
    fn filter_from_query() {
        assert_eq!(PostFilter::from_query(None, None), PostFilter::All);
        assert_eq!(
            PostFilter::from_query(Some("category"), Some("Music")),
            PostFilter::Category("Music".into())
        );
        assert_eq!(PostFilter::from_query(Some("created"), None), PostFilter::Created);
        assert_eq!(PostFilter::from_query(Some("liked"), Some("x")), PostFilter::Liked);
        assert_eq!(PostFilter::from_query(Some("bogus"), None), PostFilter::All);
        assert!(PostFilter::Liked.requires_viewer());
        assert!(!PostFilter::Category("Music".into()).requires_viewer());
    }

    #[test]
    fn polarity_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Polarity::Dislike).unwrap(), "dislike");
        assert_eq!(Polarity::from_is_like(true), Polarity::Like);
        assert!(!Polarity::Dislike.is_like());
    }

    #[test]
    fn vote_summary_omits_missing_vote() {
        let json = serde_json::to_value(VoteSummary::default()).unwrap();
        assert!(json.get("user_vote").is_none());
        assert_eq!(json["likes"], 0);
    }

    #[test]
    fn session_expiry_is_strict() {
        let expires_at = crate::db::parse_db_time("2025-01-15 12:00:00").unwrap();
        let session = Session {
            token: "t".into(),
            user_id: 1,
            expires_at,
        };
        assert!(!session.is_expired_at(expires_at));
        assert!(session.is_expired_at(expires_at + chrono::Duration::seconds(1)));
    }
}
