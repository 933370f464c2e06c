//! Database operations for the `semesters` reference table.
//!
//! Semesters are administrative reference data; the scrape pipeline reads
//! them but never writes them.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::Semester;

/// All semesters that have been registered, oldest first.
pub async fn list(pool: &PgPool) -> Result<Vec<Semester>> {
    sqlx::query_as::<_, Semester>(
        "SELECT id, title, start_date, end_date FROM semesters ORDER BY id",
    )
    .fetch_all(pool)
    .await
    .context("failed to list semesters")
}
