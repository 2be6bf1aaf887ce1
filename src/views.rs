// View projections - viewer-relative response shapes computed from raw graph
// state. Pure functions: nothing here mutates the store, and the same state
// plus the same viewer always yields the same output.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Comment, Post, User, UserId};
use crate::store::SocialGraph;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub username: String,
    pub followers_count: usize,
    pub following_count: usize,
    pub is_following: bool,
}

/// Minimal author/commenter reference embedded in post and comment views.
#[derive(Debug, Clone, Serialize)]
pub struct UserRef {
    pub id: UserId,
    pub username: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: i64,
    pub image_url: String,
    pub caption: String,
    pub created_at: DateTime<Utc>,
    /// Absent if the author record is missing. Users are never deleted, so
    /// this is defensive rather than expected.
    pub author: Option<UserRef>,
    pub likes_count: usize,
    pub liked_by_me: bool,
    pub comments_count: usize,
    pub is_following_author: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub user: Option<UserRef>,
}

/// Post plus its full comment sequence, for the post-detail response.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetailView {
    #[serde(flatten)]
    pub post: PostView,
    pub comments: Vec<CommentView>,
}

pub fn user_view(graph: &SocialGraph, user: &User, viewer: Option<UserId>) -> UserView {
    UserView {
        id: user.id,
        username: user.username.clone(),
        followers_count: user.followers.len(),
        following_count: user.following.len(),
        is_following: viewer_follows(graph, viewer, user.id),
    }
}

pub fn post_view(graph: &SocialGraph, post: &Post, viewer: Option<UserId>) -> PostView {
    PostView {
        id: post.id,
        image_url: post.image_url.clone(),
        caption: post.caption.clone(),
        created_at: post.created_at,
        author: user_ref(graph, post.author_id),
        likes_count: post.likes.len(),
        liked_by_me: viewer.map(|id| post.likes.contains(&id)).unwrap_or(false),
        comments_count: post.comments.len(),
        is_following_author: viewer_follows(graph, viewer, post.author_id),
    }
}

pub fn comment_view(graph: &SocialGraph, comment: &Comment) -> CommentView {
    CommentView {
        id: comment.id,
        text: comment.text.clone(),
        created_at: comment.created_at,
        user: user_ref(graph, comment.author_id),
    }
}

pub fn post_detail_view(graph: &SocialGraph, post: &Post, viewer: Option<UserId>) -> PostDetailView {
    PostDetailView {
        post: post_view(graph, post, viewer),
        comments: post.comments.iter().map(|c| comment_view(graph, c)).collect(),
    }
}

fn user_ref(graph: &SocialGraph, id: UserId) -> Option<UserRef> {
    graph.user(id).map(|u| UserRef {
        id: u.id,
        username: u.username.clone(),
    })
}

/// `false` for anonymous viewers, and for viewer ids with no live record.
fn viewer_follows(graph: &SocialGraph, viewer: Option<UserId>, target: UserId) -> bool {
    viewer
        .and_then(|id| graph.user(id))
        .map(|u| u.following.contains(&target))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> (SocialGraph, UserId, UserId) {
        let mut graph = SocialGraph::new();
        let a = graph.create_user("alice", "hash".to_string()).unwrap();
        let b = graph.create_user("bob", "hash".to_string()).unwrap();
        graph.follow(a, b).unwrap();
        (graph, a, b)
    }

    #[test]
    fn user_view_is_viewer_relative() {
        let (graph, a, b) = seeded();
        let bob = graph.user(b).unwrap();

        assert!(user_view(&graph, bob, Some(a)).is_following);
        assert!(!user_view(&graph, bob, None).is_following);
        assert!(!user_view(&graph, bob, Some(b)).is_following);

        let view = user_view(&graph, bob, Some(a));
        assert_eq!(view.followers_count, 1);
        assert_eq!(view.following_count, 0);
    }

    #[test]
    fn anonymous_post_view_defaults_all_viewer_fields_to_false() {
        let (mut graph, _, b) = seeded();
        let post = graph.create_post(b, "http://x/1.jpg", "hi").unwrap();

        let view = post_view(&graph, &post, None);
        assert!(!view.liked_by_me);
        assert!(!view.is_following_author);
        assert_eq!(view.author.as_ref().unwrap().username, "bob");
    }

    #[test]
    fn post_view_reflects_likes_and_follow_state() {
        let (mut graph, a, b) = seeded();
        let post = graph.create_post(b, "http://x/1.jpg", "").unwrap();
        graph.like(post.id, a).unwrap();

        let post = graph.post(post.id).unwrap();
        let view = post_view(&graph, post, Some(a));
        assert_eq!(view.likes_count, 1);
        assert!(view.liked_by_me);
        assert!(view.is_following_author);

        let other = post_view(&graph, post, Some(b));
        assert!(!other.liked_by_me);
        assert!(!other.is_following_author);
    }

    #[test]
    fn dead_viewer_id_projects_as_anonymous() {
        let (graph, _, b) = seeded();
        let bob = graph.user(b).unwrap();
        assert!(!user_view(&graph, bob, Some(999)).is_following);
    }

    #[test]
    fn projection_is_pure() {
        let (mut graph, a, b) = seeded();
        let post = graph.create_post(b, "http://x/1.jpg", "").unwrap();
        graph.add_comment(post.id, a, "hello").unwrap();

        let post = graph.post(post.id).unwrap();
        let first = serde_json::to_value(post_detail_view(&graph, post, Some(a))).unwrap();
        let second = serde_json::to_value(post_detail_view(&graph, post, Some(a))).unwrap();
        assert_eq!(first, second);
        assert_eq!(first["commentsCount"], 1);
        assert_eq!(first["comments"][0]["user"]["username"], "alice");
    }
}
