// Photogram - minimal photo-sharing social network server.
//
// An in-memory social graph (users, follows, posts, likes, comments) behind
// a single-writer lock, JWT bearer authentication, and viewer-relative
// response projections over an axum HTTP surface.

// HTTP surface - handlers and router
pub mod api;

// Authentication - credential store and token service
pub mod auth;

// Request authorization - viewer context middleware and extractors
pub mod viewer;

// Social graph store - exclusive owner of graph records
pub mod store;

// View projections - viewer-relative response shapes
pub mod views;

// Common utilities
pub mod app_state;
pub mod config;
pub mod error;
pub mod models;

// Re-exports for convenience
pub use error::{AppError, AppResult};
