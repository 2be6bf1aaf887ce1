// Graph records owned by the social graph store. These never cross the HTTP
// boundary directly; handlers respond with the projections in `views`.

use chrono::{DateTime, Utc};
use std::collections::HashSet;

pub type UserId = i64;
pub type PostId = i64;
pub type CommentId = i64;

/// Account record. `followers` and `following` are maintained as a pair:
/// `a.following` contains `b` exactly when `b.followers` contains `a`, and
/// both sides are updated inside a single write-lock critical section.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Argon2 password verifier (salted, one-way). Never serialized.
    pub password_hash: String,
    pub followers: HashSet<UserId>,
    pub following: HashSet<UserId>,
}

#[derive(Debug, Clone)]
pub struct Post {
    pub id: PostId,
    pub author_id: UserId,
    pub image_url: String,
    pub caption: String,
    pub likes: HashSet<UserId>,
    /// Append-only, ordered by creation.
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Comment {
    pub id: CommentId,
    pub author_id: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}
