use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Public routes -- no session required. The course catalog pairs the
    // public listing with the coordinator-only upsert on one path.
    let public_routes = Router::new()
        .route("/request", post(handlers::submit))
        .route(
            "/courses",
            get(handlers::list_courses).post(handlers::upsert_course),
        );

    // Anonymous-only routes -- a valid session is rejected by the guard
    let anonymous_routes = Router::new()
        .route("/login", post(handlers::login))
        .route("/register", post(handlers::register))
        .route("/resetPassword", post(handlers::initiate_reset))
        .route("/resetPassword/:id/:token", post(handlers::complete_reset));

    // Tutor routes
    let tutor_routes = Router::new()
        .route("/help", post(handlers::help))
        .route("/complete", post(handlers::complete))
        .route("/comment", post(handlers::comment))
        .route("/queue", get(handlers::list_queue))
        .route("/requests", get(handlers::list_recent))
        .route("/helping", get(handlers::currently_helping))
        .route("/isAuthenticated", get(handlers::is_authenticated));

    // Coordinator routes
    let coordinator_routes = Router::new()
        .route("/setActive", post(handlers::set_active))
        .route("/setInactive", post(handlers::set_inactive))
        .route("/setCoordinator", post(handlers::set_coordinator))
        .route("/unsetCoordinator", post(handlers::unset_coordinator))
        .route("/isCoordinator", get(handlers::is_coordinator))
        .route("/tutors", get(handlers::list_tutors));

    Router::new()
        .merge(public_routes)
        .merge(anonymous_routes)
        .merge(tutor_routes)
        .merge(coordinator_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
