//! Semester listing handler.

use axum::extract::State;
use axum::response::Json;

use crate::data;
use crate::models::Semester;
use crate::state::AppState;
use crate::web::error::{ApiError, db_error};

/// `GET /semesters`: semesters with schedules loaded into the API.
pub(super) async fn get_semesters(
    State(state): State<AppState>,
) -> Result<Json<Vec<Semester>>, ApiError> {
    let semesters = data::semesters::list(&state.db_pool)
        .await
        .map_err(|e| db_error("Semester listing", e))?;
    Ok(Json(semesters))
}
