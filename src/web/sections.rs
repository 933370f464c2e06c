//! Section fetch and search handlers.

use std::sync::LazyLock;

use axum::extract::{Path, State};
use axum::response::Json;
use axum_extra::extract::Query;
use serde::Deserialize;

use crate::data;
use crate::data::sections::SectionFilters;
use crate::models::CourseSection;
use crate::state::AppState;
use crate::web::error::{ApiError, ApiErrorCode, db_error};

/// All CRNs are 5-digit numeric strings.
static CRN_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^[0-9]{5}$").unwrap());

fn default_limit() -> i64 {
    10
}

#[derive(Debug, Deserialize)]
pub struct FetchParams {
    /// Direct CRNs of the sections to fetch (repeatable).
    #[serde(default)]
    crns: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    course_subject_prefix: Option<String>,
    course_number: Option<String>,
    course_title: Option<String>,
    has_seats: Option<bool>,
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

/// `GET /{semester_id}/sections?crns=...`: direct fetch by CRN.
///
/// CRNs not found are silently excluded from the response.
pub(super) async fn get_sections(
    Path(semester_id): Path<String>,
    Query(params): Query<FetchParams>,
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseSection>>, ApiError> {
    if params.crns.is_empty() {
        return Err(ApiError::new(
            ApiErrorCode::InvalidParameter,
            "at least one crn is required",
        ));
    }
    if let Some(bad) = params.crns.iter().find(|crn| !CRN_RE.is_match(crn)) {
        return Err(ApiError::new(
            ApiErrorCode::InvalidParameter,
            format!("invalid CRN {bad:?}: expected a 5-digit number"),
        ));
    }

    let sections = data::sections::fetch_sections(&state.db_pool, &semester_id, &params.crns)
        .await
        .map_err(|e| db_error("Section fetch", e))?;
    Ok(Json(sections))
}

/// `GET /{semester_id}/sections/search`: paginated filter search.
pub(super) async fn search_sections(
    Path(semester_id): Path<String>,
    Query(query): Query<SearchQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseSection>>, ApiError> {
    if !(1..=50).contains(&query.limit) {
        return Err(ApiError::new(
            ApiErrorCode::InvalidParameter,
            "limit must be between 1 and 50",
        ));
    }
    if query.offset < 0 {
        return Err(ApiError::new(
            ApiErrorCode::InvalidParameter,
            "offset must not be negative",
        ));
    }

    let filters = SectionFilters {
        course_subject_prefix: query.course_subject_prefix,
        course_number: query.course_number,
        course_title: query.course_title,
        has_seats: query.has_seats,
    };
    let sections = data::sections::search_sections(
        &state.db_pool,
        &semester_id,
        &filters,
        query.limit,
        query.offset,
    )
    .await
    .map_err(|e| db_error("Section search", e))?;
    Ok(Json(sections))
}
