//! Course grouping handlers.

use axum::extract::{Path, Query, State};
use axum::response::Json;
use serde::Deserialize;

use crate::data;
use crate::models::Course;
use crate::state::AppState;
use crate::web::error::{ApiError, ApiErrorCode, db_error};

fn default_limit() -> i64 {
    10
}

#[derive(Debug, Deserialize)]
pub struct CourseQuery {
    /// Populate `sections` for each course.
    #[serde(default)]
    include_sections: bool,
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

/// `GET /{semester_id}/courses`: distinct courses derived from sections.
pub(super) async fn get_courses(
    Path(semester_id): Path<String>,
    Query(query): Query<CourseQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Course>>, ApiError> {
    if !(1..=50).contains(&query.limit) {
        return Err(ApiError::new(
            ApiErrorCode::InvalidParameter,
            "limit must be between 1 and 50",
        ));
    }

    let mut courses =
        data::courses::fetch_courses(&state.db_pool, &semester_id, query.limit, query.offset)
            .await
            .map_err(|e| db_error("Course listing", e))?;

    if query.include_sections {
        data::courses::populate_course_sections(&state.db_pool, &mut courses)
            .await
            .map_err(|e| db_error("Course section population", e))?;
    }

    Ok(Json(courses))
}

/// `GET /{semester_id}/courses/subjects`: unique subject prefixes, e.g.
/// BIOL, CSCI, MATH.
pub(super) async fn list_course_subject_prefixes(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, ApiError> {
    let prefixes = data::sections::fetch_subject_prefixes(&state.db_pool)
        .await
        .map_err(|e| db_error("Subject prefix listing", e))?;
    Ok(Json(prefixes))
}
