// Request authorization layer - resolves the bearer credential once per
// request and injects a viewer context into request extensions. Handlers
// declare what they need through the `Viewer` / `MaybeViewer` extractors
// instead of re-parsing headers.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::error::{AppError, AppResult};
use crate::models::UserId;

/// Outcome of token resolution for one request.
#[derive(Debug, Clone)]
pub enum AuthState {
    /// No bearer credential supplied.
    Anonymous,
    /// Signature and expiry checked out; the subject may still be stale.
    Verified { user_id: UserId, username: String },
    /// A credential was supplied but failed verification.
    Invalid,
}

#[derive(Debug, Clone)]
pub struct ViewerContext {
    pub request_id: String,
    pub auth: AuthState,
}

/// Runs for every request: parse the Authorization header, verify the token,
/// and stash the result for the extractors below.
pub async fn viewer_context_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth = match bearer_token(request.headers()) {
        None => AuthState::Anonymous,
        Some(token) => match state.tokens.verify(token) {
            Ok(claims) => AuthState::Verified {
                user_id: claims.user_id,
                username: claims.username,
            },
            Err(_) => AuthState::Invalid,
        },
    };

    let context = ViewerContext {
        request_id: format!("req-{}", Uuid::new_v4()),
        auth,
    };
    request.extensions_mut().insert(Arc::new(context));

    next.run(request).await
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn context(parts: &Parts) -> AppResult<&Arc<ViewerContext>> {
    parts
        .extensions
        .get::<Arc<ViewerContext>>()
        .ok_or_else(|| AppError::Internal("viewer context missing from request".to_string()))
}

/// Authenticated identity for endpoints that require it. Rejects missing
/// tokens, failed verification, and tokens whose subject no longer resolves
/// to a live user.
#[derive(Debug, Clone)]
pub struct Viewer {
    pub user_id: UserId,
    pub username: String,
}

impl FromRequestParts<AppState> for Viewer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let context = context(parts)?.clone();
        match &context.auth {
            AuthState::Anonymous => {
                Err(AppError::Unauthenticated("Missing token".to_string()))
            }
            AuthState::Invalid => Err(AppError::InvalidToken("Invalid token".to_string())),
            AuthState::Verified { user_id, username } => {
                let graph = state.graph.read().await;
                if graph.user(*user_id).is_none() {
                    return Err(AppError::InvalidToken("Invalid token".to_string()));
                }
                Ok(Viewer {
                    user_id: *user_id,
                    username: username.clone(),
                })
            }
        }
    }
}

/// Optional identity for endpoints that personalize but don't require auth.
/// A failed verification downgrades to anonymous rather than rejecting, and
/// the subject is not checked for liveness; projections already treat a dead
/// viewer id as anonymous.
#[derive(Debug, Clone)]
pub struct MaybeViewer(pub Option<UserId>);

impl<S> FromRequestParts<S> for MaybeViewer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let context = context(parts)?;
        Ok(match &context.auth {
            AuthState::Verified { user_id, .. } => MaybeViewer(Some(*user_id)),
            AuthState::Anonymous | AuthState::Invalid => MaybeViewer(None),
        })
    }
}
