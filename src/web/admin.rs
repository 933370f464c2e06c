//! Admin import trigger.

use axum::extract::{Path, Query, State};
use axum::response::Json;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::importer::{self, ImportError};
use crate::state::AppState;
use crate::web::error::{ApiError, ApiErrorCode, db_error};

#[derive(Debug, Deserialize)]
pub struct AdminParams {
    api_key: Option<String>,
}

/// `POST /admin/semesters/{semester_id}/import?api_key=...`
///
/// Runs the full import pipeline for one semester and responds with the
/// count of imported sections. All-or-nothing: a fetch or login failure
/// leaves the previous import untouched.
pub(super) async fn import_semester(
    Path(semester_id): Path<String>,
    Query(params): Query<AdminParams>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    if params.api_key.as_deref() != Some(state.config.api_key.as_str()) {
        warn!(semester_id, "import rejected: bad or missing api key");
        return Err(ApiError::new(ApiErrorCode::Unauthorized, "invalid api key"));
    }

    info!(semester_id, "starting semester import");
    let count = importer::import_semester(&state.config, &state.db_pool, &semester_id)
        .await
        .map_err(|e| match e {
            ImportError::Scrape(e) => {
                warn!(semester_id, error = %e, "import failed upstream");
                ApiError::new(ApiErrorCode::UpstreamFailed, e.to_string())
            }
            ImportError::LoginRejected => ApiError::new(
                ApiErrorCode::UpstreamFailed,
                "SIS rejected the configured credentials",
            ),
            ImportError::Db(e) => db_error("Section replacement", e),
        })?;

    Ok(Json(json!({ "semester_id": semester_id, "sections": count })))
}
