//! Database operations for course sections and their meeting periods.

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::Deserialize;
use sqlx::PgPool;

use crate::models::{CourseSection, CourseSectionPeriod, PeriodRecord, SectionRecord};

/// Optional filters for stored-section search. `None` fields apply no filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SectionFilters {
    /// Exact match on subject prefix, e.g. `BIOL`.
    pub course_subject_prefix: Option<String>,
    /// Exact match on course number.
    pub course_number: Option<String>,
    /// Case-insensitive substring match on title.
    pub course_title: Option<String>,
    /// `Some(true)` = only sections with open seats, `Some(false)` = only
    /// full sections.
    pub has_seats: Option<bool>,
}

/// Transactionally replace a semester's stored sections with a fresh scrape.
///
/// Delete-then-insert, no diffing: after commit the semester reflects exactly
/// this import; on failure the previous import stays intact. Returns the
/// number of sections written.
pub async fn replace_sections(
    pool: &PgPool,
    semester_id: &str,
    sections: &[CourseSection],
) -> Result<usize> {
    let mut tx = pool.begin().await?;

    // Periods reference sections; delete order matters without relying on
    // the cascade.
    sqlx::query("DELETE FROM course_section_periods WHERE semester_id = $1")
        .bind(semester_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM course_sections WHERE semester_id = $1")
        .bind(semester_id)
        .execute(&mut *tx)
        .await?;

    let section_records: Vec<SectionRecord> =
        sections.iter().map(CourseSection::to_record).collect();
    let period_records: Vec<PeriodRecord> = sections
        .iter()
        .flat_map(|s| s.periods.iter().map(CourseSectionPeriod::to_record))
        .collect();

    if !section_records.is_empty() {
        sqlx::query(
            r#"
            INSERT INTO course_sections (
                semester_id, course_subject_prefix, course_number, course_title,
                section_id, crn, instruction_method, credits,
                max_enrollments, enrollments, waitlist_max, waitlists, textbooks_url
            )
            SELECT * FROM UNNEST(
                $1::text[], $2::text[], $3::text[], $4::text[],
                $5::text[], $6::text[], $7::text[], $8::text[],
                $9::int[], $10::int[], $11::int[], $12::int[], $13::text[]
            )
            "#,
        )
        .bind(section_records.iter().map(|r| r.semester_id.clone()).collect::<Vec<_>>())
        .bind(section_records.iter().map(|r| r.course_subject_prefix.clone()).collect::<Vec<_>>())
        .bind(section_records.iter().map(|r| r.course_number.clone()).collect::<Vec<_>>())
        .bind(section_records.iter().map(|r| r.course_title.clone()).collect::<Vec<_>>())
        .bind(section_records.iter().map(|r| r.section_id.clone()).collect::<Vec<_>>())
        .bind(section_records.iter().map(|r| r.crn.clone()).collect::<Vec<_>>())
        .bind(section_records.iter().map(|r| r.instruction_method.clone()).collect::<Vec<_>>())
        .bind(section_records.iter().map(|r| r.credits.clone()).collect::<Vec<_>>())
        .bind(section_records.iter().map(|r| r.max_enrollments).collect::<Vec<_>>())
        .bind(section_records.iter().map(|r| r.enrollments).collect::<Vec<_>>())
        .bind(section_records.iter().map(|r| r.waitlist_max).collect::<Vec<_>>())
        .bind(section_records.iter().map(|r| r.waitlists).collect::<Vec<_>>())
        .bind(section_records.iter().map(|r| r.textbooks_url.clone()).collect::<Vec<_>>())
        .execute(&mut *tx)
        .await
        .context("failed to insert course sections")?;
    }

    if !period_records.is_empty() {
        sqlx::query(
            r#"
            INSERT INTO course_section_periods (
                semester_id, crn, class_type, start_time, end_time,
                instructors, days, location
            )
            SELECT * FROM UNNEST(
                $1::text[], $2::text[], $3::text[], $4::text[],
                $5::text[], $6::text[], $7::text[], $8::text[]
            )
            "#,
        )
        .bind(period_records.iter().map(|r| r.semester_id.clone()).collect::<Vec<_>>())
        .bind(period_records.iter().map(|r| r.crn.clone()).collect::<Vec<_>>())
        .bind(period_records.iter().map(|r| r.class_type.clone()).collect::<Vec<_>>())
        .bind(period_records.iter().map(|r| r.start_time.clone()).collect::<Vec<_>>())
        .bind(period_records.iter().map(|r| r.end_time.clone()).collect::<Vec<_>>())
        .bind(period_records.iter().map(|r| r.instructors.clone()).collect::<Vec<_>>())
        .bind(period_records.iter().map(|r| r.days.clone()).collect::<Vec<_>>())
        .bind(period_records.iter().map(|r| r.location.clone()).collect::<Vec<_>>())
        .execute(&mut *tx)
        .await
        .context("failed to insert course section periods")?;
    }

    tx.commit().await?;
    Ok(section_records.len())
}

/// Fetch sections by CRN. Unknown CRNs are simply absent from the result.
pub async fn fetch_sections(
    pool: &PgPool,
    semester_id: &str,
    crns: &[String],
) -> Result<Vec<CourseSection>> {
    let records = sqlx::query_as::<_, SectionRecord>(
        r#"
        SELECT semester_id, course_subject_prefix, course_number, course_title,
               section_id, crn, instruction_method, credits,
               max_enrollments, enrollments, waitlist_max, waitlists, textbooks_url
        FROM course_sections
        WHERE semester_id = $1 AND crn = ANY($2)
        ORDER BY crn
        "#,
    )
    .bind(semester_id)
    .bind(crns)
    .fetch_all(pool)
    .await
    .context("failed to fetch course sections")?;

    attach_periods(pool, semester_id, records).await
}

/// Search stored sections with optional filters, paginated.
pub async fn search_sections(
    pool: &PgPool,
    semester_id: &str,
    filters: &SectionFilters,
    limit: i64,
    offset: i64,
) -> Result<Vec<CourseSection>> {
    let mut conditions = vec!["semester_id = $1".to_owned()];
    let mut bind_idx = 1;

    if filters.course_subject_prefix.is_some() {
        bind_idx += 1;
        conditions.push(format!("course_subject_prefix = ${bind_idx}"));
    }
    if filters.course_number.is_some() {
        bind_idx += 1;
        conditions.push(format!("course_number = ${bind_idx}"));
    }
    if filters.course_title.is_some() {
        bind_idx += 1;
        conditions.push(format!("course_title ILIKE '%' || ${bind_idx} || '%'"));
    }
    match filters.has_seats {
        Some(true) => conditions.push("enrollments < max_enrollments".to_owned()),
        Some(false) => conditions.push("enrollments >= max_enrollments".to_owned()),
        None => {}
    }

    let query_str = format!(
        r#"
        SELECT semester_id, course_subject_prefix, course_number, course_title,
               section_id, crn, instruction_method, credits,
               max_enrollments, enrollments, waitlist_max, waitlists, textbooks_url
        FROM course_sections
        WHERE {}
        ORDER BY course_subject_prefix, course_number, section_id
        LIMIT {limit} OFFSET {offset}
        "#,
        conditions.join(" AND ")
    );

    let mut query = sqlx::query_as::<_, SectionRecord>(&query_str).bind(semester_id);
    if let Some(ref subject) = filters.course_subject_prefix {
        query = query.bind(subject);
    }
    if let Some(ref number) = filters.course_number {
        query = query.bind(number);
    }
    if let Some(ref title) = filters.course_title {
        query = query.bind(title);
    }

    let records = query
        .fetch_all(pool)
        .await
        .context("failed to search course sections")?;

    attach_periods(pool, semester_id, records).await
}

/// The unique subject prefixes present across all stored sections.
pub async fn fetch_subject_prefixes(pool: &PgPool) -> Result<Vec<String>> {
    let rows = sqlx::query_as::<_, (String,)>(
        "SELECT DISTINCT course_subject_prefix FROM course_sections ORDER BY course_subject_prefix",
    )
    .fetch_all(pool)
    .await
    .context("failed to fetch subject prefixes")?;

    Ok(rows.into_iter().map(|(prefix,)| prefix).collect())
}

/// Load the periods for a batch of section records and rebuild the entities.
async fn attach_periods(
    pool: &PgPool,
    semester_id: &str,
    records: Vec<SectionRecord>,
) -> Result<Vec<CourseSection>> {
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let crns: Vec<String> = records.iter().map(|r| r.crn.clone()).collect();
    let period_records = sqlx::query_as::<_, PeriodRecord>(
        r#"
        SELECT semester_id, crn, class_type, start_time, end_time,
               instructors, days, location
        FROM course_section_periods
        WHERE semester_id = $1 AND crn = ANY($2)
        ORDER BY id
        "#,
    )
    .bind(semester_id)
    .bind(&crns)
    .fetch_all(pool)
    .await
    .context("failed to fetch course section periods")?;

    let mut periods_by_crn: HashMap<String, Vec<CourseSectionPeriod>> = HashMap::new();
    for record in period_records {
        periods_by_crn
            .entry(record.crn.clone())
            .or_default()
            .push(CourseSectionPeriod::from_record(record));
    }

    Ok(records
        .into_iter()
        .map(|record| {
            let periods = periods_by_crn.remove(&record.crn).unwrap_or_default();
            CourseSection::from_record(record, periods)
        })
        .collect())
}
