// HTTP surface - request DTOs, handlers, and router assembly. Handlers
// resolve identity through the extractors in `viewer`, mutate the graph under
// its write lock, and respond with projections computed from the same lock
// scope so a response never mixes two states.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    app_state::AppState,
    error::{AppError, AppResult},
    models::{PostId, UserId},
    viewer::{viewer_context_middleware, MaybeViewer, Viewer},
    views,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/me", get(me))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/follow", post(follow_user))
        .route("/users/{id}/unfollow", post(unfollow_user))
        .route("/users/{id}/posts", get(list_user_posts))
        .route("/posts", post(create_post))
        .route("/posts/{id}", get(get_post))
        .route("/posts/{id}/like", post(like_post))
        .route("/posts/{id}/unlike", post(unlike_post))
        .route("/posts/{id}/comments", post(add_comment))
        .route("/feed", get(feed))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            viewer_context_middleware,
        ))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct CredentialsBody {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePostBody {
    #[serde(default)]
    image_url: String,
    #[serde(default)]
    caption: String,
}

#[derive(Debug, Deserialize)]
struct CommentBody {
    #[serde(default)]
    text: String,
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

// --- auth ---

async fn signup(
    State(state): State<AppState>,
    Json(body): Json<CredentialsBody>,
) -> AppResult<Json<Value>> {
    let user_id = state
        .credentials
        .register(&body.username, &body.password)
        .await?;
    let token = state.tokens.issue(user_id, &body.username)?;

    let graph = state.graph.read().await;
    let user = graph
        .user(user_id)
        .ok_or_else(|| AppError::Internal("user missing after signup".to_string()))?;
    Ok(Json(json!({
        "token": token,
        "user": views::user_view(&graph, user, None),
    })))
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<CredentialsBody>,
) -> AppResult<Json<Value>> {
    if body.username.is_empty() || body.password.is_empty() {
        return Err(AppError::Validation(
            "username and password required".to_string(),
        ));
    }
    let user_id = state
        .credentials
        .verify(&body.username, &body.password)
        .await?;
    let token = state.tokens.issue(user_id, &body.username)?;

    let graph = state.graph.read().await;
    let user = graph
        .user(user_id)
        .ok_or_else(|| AppError::Internal("user missing after login".to_string()))?;
    Ok(Json(json!({
        "token": token,
        "user": views::user_view(&graph, user, None),
    })))
}

// --- users ---

async fn me(State(state): State<AppState>, viewer: Viewer) -> AppResult<Json<Value>> {
    let graph = state.graph.read().await;
    let user = graph
        .user(viewer.user_id)
        .ok_or_else(|| AppError::Unauthenticated("Invalid token".to_string()))?;
    Ok(Json(json!({
        "user": views::user_view(&graph, user, Some(viewer.user_id)),
    })))
}

async fn get_user(
    State(state): State<AppState>,
    MaybeViewer(viewer): MaybeViewer,
    Path(id): Path<UserId>,
) -> AppResult<Json<Value>> {
    let graph = state.graph.read().await;
    let user = graph
        .user(id)
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;
    Ok(Json(json!({
        "user": views::user_view(&graph, user, viewer),
    })))
}

async fn follow_user(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<UserId>,
) -> AppResult<Json<Value>> {
    let mut graph = state.graph.write().await;
    graph.follow(viewer.user_id, id)?;
    let target = graph
        .user(id)
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;
    Ok(Json(json!({
        "user": views::user_view(&graph, target, Some(viewer.user_id)),
    })))
}

async fn unfollow_user(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<UserId>,
) -> AppResult<Json<Value>> {
    let mut graph = state.graph.write().await;
    graph.unfollow(viewer.user_id, id)?;
    let target = graph
        .user(id)
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;
    Ok(Json(json!({
        "user": views::user_view(&graph, target, Some(viewer.user_id)),
    })))
}

async fn list_user_posts(
    State(state): State<AppState>,
    MaybeViewer(viewer): MaybeViewer,
    Path(id): Path<UserId>,
) -> AppResult<Json<Value>> {
    let graph = state.graph.read().await;
    if graph.user(id).is_none() {
        return Err(AppError::NotFound("user not found".to_string()));
    }
    let posts: Vec<_> = graph
        .posts_by_author(id)
        .into_iter()
        .map(|p| views::post_view(&graph, p, viewer))
        .collect();
    Ok(Json(json!({ "posts": posts })))
}

// --- posts ---

async fn create_post(
    State(state): State<AppState>,
    viewer: Viewer,
    Json(body): Json<CreatePostBody>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let mut graph = state.graph.write().await;
    let post = graph.create_post(viewer.user_id, &body.image_url, &body.caption)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "post": views::post_view(&graph, &post, Some(viewer.user_id)),
        })),
    ))
}

async fn get_post(
    State(state): State<AppState>,
    MaybeViewer(viewer): MaybeViewer,
    Path(id): Path<PostId>,
) -> AppResult<Json<Value>> {
    let graph = state.graph.read().await;
    let post = graph
        .post(id)
        .ok_or_else(|| AppError::NotFound("post not found".to_string()))?;
    Ok(Json(json!({
        "post": views::post_detail_view(&graph, post, viewer),
    })))
}

async fn like_post(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<PostId>,
) -> AppResult<Json<Value>> {
    let mut graph = state.graph.write().await;
    graph.like(id, viewer.user_id)?;
    let post = graph
        .post(id)
        .ok_or_else(|| AppError::NotFound("post not found".to_string()))?;
    Ok(Json(json!({
        "post": views::post_view(&graph, post, Some(viewer.user_id)),
    })))
}

async fn unlike_post(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<PostId>,
) -> AppResult<Json<Value>> {
    let mut graph = state.graph.write().await;
    graph.unlike(id, viewer.user_id)?;
    let post = graph
        .post(id)
        .ok_or_else(|| AppError::NotFound("post not found".to_string()))?;
    Ok(Json(json!({
        "post": views::post_view(&graph, post, Some(viewer.user_id)),
    })))
}

async fn add_comment(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<PostId>,
    Json(body): Json<CommentBody>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let mut graph = state.graph.write().await;
    let comment = graph.add_comment(id, viewer.user_id, &body.text)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "comment": views::comment_view(&graph, &comment),
        })),
    ))
}

// --- feed ---

async fn feed(State(state): State<AppState>, viewer: Viewer) -> AppResult<Json<Value>> {
    let graph = state.graph.read().await;
    let posts: Vec<_> = graph
        .feed(viewer.user_id)
        .into_iter()
        .map(|p| views::post_view(&graph, p, Some(viewer.user_id)))
        .collect();
    Ok(Json(json!({ "posts": posts })))
}
