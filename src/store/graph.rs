// Social graph store - exclusive owner of user/post/comment records.
//
// The whole graph lives behind one `tokio::sync::RwLock`: every mutation
// takes the write lock, so compound updates (the follower/following pair,
// the id sequences) are serialized and readers never observe a torn write.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};
use crate::models::{Comment, CommentId, Post, PostId, User, UserId};

/// Shared handle passed to handlers and services.
pub type SharedGraph = Arc<RwLock<SocialGraph>>;

#[derive(Debug, Default)]
pub struct SocialGraph {
    users: HashMap<UserId, User>,
    username_index: HashMap<String, UserId>,
    posts: HashMap<PostId, Post>,
    next_user_id: UserId,
    next_post_id: PostId,
    next_comment_id: CommentId,
}

impl SocialGraph {
    pub fn new() -> Self {
        Self {
            next_user_id: 1,
            next_post_id: 1,
            next_comment_id: 1,
            ..Default::default()
        }
    }

    pub fn shared() -> SharedGraph {
        Arc::new(RwLock::new(Self::new()))
    }

    // --- users ---

    /// Create a user with a fresh id. The password verifier is derived by the
    /// credential layer; the graph only stores it.
    pub fn create_user(&mut self, username: &str, password_hash: String) -> AppResult<UserId> {
        if self.username_index.contains_key(username) {
            return Err(AppError::Conflict("username already exists".to_string()));
        }
        let id = self.next_user_id;
        self.next_user_id += 1;
        self.users.insert(
            id,
            User {
                id,
                username: username.to_string(),
                password_hash,
                followers: Default::default(),
                following: Default::default(),
            },
        );
        self.username_index.insert(username.to_string(), id);
        tracing::debug!(user_id = id, username, "user created");
        Ok(id)
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn user_by_username(&self, username: &str) -> Option<&User> {
        self.username_index
            .get(username)
            .and_then(|id| self.users.get(id))
    }

    // --- follow graph ---

    /// Add `target` to `follower.following` and `follower` to
    /// `target.followers`. Idempotent under set semantics.
    pub fn follow(&mut self, follower_id: UserId, target_id: UserId) -> AppResult<()> {
        if follower_id == target_id {
            return Err(AppError::SelfFollow);
        }
        if !self.users.contains_key(&target_id) {
            return Err(AppError::NotFound("user not found".to_string()));
        }
        let follower = self
            .users
            .get_mut(&follower_id)
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;
        follower.following.insert(target_id);
        // Pair invariant: both sides updated before the write lock drops.
        if let Some(target) = self.users.get_mut(&target_id) {
            target.followers.insert(follower_id);
        }
        Ok(())
    }

    /// Remove the pair in both directions. A no-op if not currently
    /// following, but still 404s on an unknown target user.
    pub fn unfollow(&mut self, follower_id: UserId, target_id: UserId) -> AppResult<()> {
        if !self.users.contains_key(&target_id) {
            return Err(AppError::NotFound("user not found".to_string()));
        }
        if let Some(follower) = self.users.get_mut(&follower_id) {
            follower.following.remove(&target_id);
        }
        if let Some(target) = self.users.get_mut(&target_id) {
            target.followers.remove(&follower_id);
        }
        Ok(())
    }

    // --- posts ---

    pub fn create_post(
        &mut self,
        author_id: UserId,
        image_url: &str,
        caption: &str,
    ) -> AppResult<Post> {
        if image_url.is_empty() {
            return Err(AppError::Validation("imageUrl required".to_string()));
        }
        let id = self.next_post_id;
        self.next_post_id += 1;
        let post = Post {
            id,
            author_id,
            image_url: image_url.to_string(),
            caption: caption.to_string(),
            likes: Default::default(),
            comments: Vec::new(),
            created_at: Utc::now(),
        };
        self.posts.insert(id, post.clone());
        tracing::debug!(post_id = id, author_id, "post created");
        Ok(post)
    }

    pub fn post(&self, id: PostId) -> Option<&Post> {
        self.posts.get(&id)
    }

    pub fn like(&mut self, post_id: PostId, user_id: UserId) -> AppResult<()> {
        let post = self
            .posts
            .get_mut(&post_id)
            .ok_or_else(|| AppError::NotFound("post not found".to_string()))?;
        post.likes.insert(user_id);
        Ok(())
    }

    pub fn unlike(&mut self, post_id: PostId, user_id: UserId) -> AppResult<()> {
        let post = self
            .posts
            .get_mut(&post_id)
            .ok_or_else(|| AppError::NotFound("post not found".to_string()))?;
        post.likes.remove(&user_id);
        Ok(())
    }

    /// Append a comment with a globally monotonic id, in call order.
    pub fn add_comment(
        &mut self,
        post_id: PostId,
        author_id: UserId,
        text: &str,
    ) -> AppResult<Comment> {
        if !self.posts.contains_key(&post_id) {
            return Err(AppError::NotFound("post not found".to_string()));
        }
        if text.is_empty() {
            return Err(AppError::Validation("text required".to_string()));
        }
        let id = self.next_comment_id;
        self.next_comment_id += 1;
        let comment = Comment {
            id,
            author_id,
            text: text.to_string(),
            created_at: Utc::now(),
        };
        if let Some(post) = self.posts.get_mut(&post_id) {
            post.comments.push(comment.clone());
        }
        Ok(comment)
    }

    // --- listings ---

    /// Posts authored by `author_id`, newest first, ties broken by ascending
    /// id so repeated listings are deterministic.
    pub fn posts_by_author(&self, author_id: UserId) -> Vec<&Post> {
        let mut list: Vec<&Post> = self
            .posts
            .values()
            .filter(|p| p.author_id == author_id)
            .collect();
        sort_newest_first(&mut list);
        list
    }

    /// Posts by the viewer or any account the viewer follows, newest first.
    /// The viewer-follows-viewer case cannot duplicate a post because the
    /// source of truth is the single post map.
    pub fn feed(&self, viewer_id: UserId) -> Vec<&Post> {
        let following = self
            .users
            .get(&viewer_id)
            .map(|u| &u.following)
            .cloned()
            .unwrap_or_default();
        let mut list: Vec<&Post> = self
            .posts
            .values()
            .filter(|p| p.author_id == viewer_id || following.contains(&p.author_id))
            .collect();
        sort_newest_first(&mut list);
        list
    }
}

fn sort_newest_first(posts: &mut [&Post]) {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
}
