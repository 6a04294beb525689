use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, FromRef},
    routing::{get, post},
    Router,
};

use crate::features::auth::AccessGate;
use crate::features::concerns::handlers;
use crate::features::concerns::services::{IntakeService, ResolutionService};
use crate::shared::constants::CONCERN_BODY_LIMIT;

/// Shared state for the concern routes
#[derive(Clone, FromRef)]
pub struct ConcernsState {
    pub intake: Arc<IntakeService>,
    pub resolution: Arc<ResolutionService>,
    pub gate: Arc<AccessGate>,
}

/// Create routes for the concerns feature
///
/// Reporting is public. The review routes check the caller themselves through
/// [`crate::features::auth::RequireConcernManager`], so the router only needs
/// the optional identity middleware in front of it.
pub fn routes(state: ConcernsState) -> Router {
    Router::new()
        .route("/api/concerns", get(handlers::list_concerns))
        .route("/api/concerns/report", post(handlers::report_concern))
        .route(
            "/api/concerns/{id}",
            get(handlers::get_concern)
                .post(handlers::resolve_concern)
                .put(handlers::resolve_concern),
        )
        .layer(DefaultBodyLimit::max(CONCERN_BODY_LIMIT))
        .with_state(state)
}
