//! The semester import pipeline.
//!
//! One import is a linear, synchronous sequence: fetch the schedule listing
//! to build the period-type lookup, log in to SIS, scrape the section search
//! results, and replace the semester's stored sections in one transaction.
//! Any upstream failure aborts the run with the previous import intact.
//!
//! Concurrent imports for *different* semesters are safe (all writes are
//! qualified by semester id); overlapping imports for the same semester are
//! the scheduler's responsibility to avoid.

use sqlx::PgPool;
use tracing::info;

use crate::config::Config;
use crate::data;
use crate::sis::errors::ScrapeError;
use crate::sis::{Sis, schedule};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error(transparent)]
    Scrape(#[from] ScrapeError),
    #[error("SIS rejected the configured credentials")]
    LoginRejected,
    #[error(transparent)]
    Db(#[from] anyhow::Error),
}

/// Import one semester end to end. Returns the number of sections stored.
pub async fn import_semester(
    config: &Config,
    pool: &PgPool,
    semester_id: &str,
) -> Result<usize, ImportError> {
    // The schedule listing is public; no session needed.
    let http = reqwest::Client::new();
    let period_types =
        schedule::fetch_period_types(&http, &config.schedule_base_url, semester_id).await?;

    let sis = Sis::new(
        &config.sis_login_url,
        &config.sis_base_url,
        &config.sis_rin,
        &config.sis_pin,
    );
    if !sis.login().await? {
        return Err(ImportError::LoginRejected);
    }
    info!(semester_id, "logged in to SIS");

    let sections = sis
        .fetch_course_sections(semester_id, None, &period_types)
        .await?;
    let count = data::sections::replace_sections(pool, semester_id, &sections).await?;

    info!(semester_id, sections = count, "semester import complete");
    Ok(count)
}
