//! Web API router construction.

use std::time::Duration;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::web::{admin, courses, sections, semesters, status};

/// Creates the API router.
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(status::health))
        .route("/semesters", get(semesters::get_semesters))
        .route("/{semester_id}/sections", get(sections::get_sections))
        .route(
            "/{semester_id}/sections/search",
            get(sections::search_sections),
        )
        .route("/{semester_id}/courses", get(courses::get_courses))
        .route(
            "/{semester_id}/courses/subjects",
            get(courses::list_course_subject_prefixes),
        )
        .route(
            "/admin/semesters/{semester_id}/import",
            post(admin::import_semester),
        )
        .with_state(app_state)
        .layer((
            TraceLayer::new_for_http(),
            // The original service allowed all origins; the data is public.
            CorsLayer::permissive(),
            // Imports scrape two upstream pages synchronously; keep headroom.
            TimeoutLayer::new(Duration::from_secs(300)),
        ))
}
