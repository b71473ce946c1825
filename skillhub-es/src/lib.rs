//! skillhub-es library - Skill Event Submission service
//!
//! Accepts skill achievement events over HTTP, validates them, resolves
//! the reporting user, and records them with bounded automatic retry.

use std::sync::Arc;

use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

use services::{DbIdentityResolver, EventSubmitter, SqliteProjectErrors, SqliteSkillRecorder};

pub mod api;
pub mod services;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// Shared secret for API authentication (0 disables checking)
    pub shared_secret: i64,
    pub submitter: Arc<EventSubmitter>,
}

impl AppState {
    /// Create application state with database-backed collaborators
    pub fn new(db: SqlitePool, shared_secret: i64) -> Self {
        let submitter = Arc::new(EventSubmitter::new(
            Arc::new(SqliteSkillRecorder::new(db.clone())),
            Arc::new(DbIdentityResolver::new(db.clone())),
            Arc::new(SqliteProjectErrors::new(db.clone())),
        ));

        Self {
            db,
            shared_secret,
            submitter,
        }
    }
}

/// Build application router
///
/// The reporting endpoint requires authentication; health does not.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::post;

    // Protected routes (require authentication)
    let protected = Router::new()
        .route(
            "/api/projects/:project_id/skills/:skill_id",
            post(api::report_skill),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    // Public routes (no authentication)
    let public = api::health_routes();

    // Combine routers
    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
