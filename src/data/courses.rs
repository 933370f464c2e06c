//! Course groupings derived from stored sections at query time.
//!
//! Courses are not stored separately; a course is the distinct
//! `(subject_prefix, number, title)` tuple over a semester's sections.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::Course;

/// Paginated list of distinct courses for a semester, without sections.
pub async fn fetch_courses(
    pool: &PgPool,
    semester_id: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<Course>> {
    let rows = sqlx::query_as::<_, (String, String, String, String)>(&format!(
        r#"
        SELECT DISTINCT semester_id, course_subject_prefix, course_number, course_title
        FROM course_sections
        WHERE semester_id = $1
        ORDER BY course_subject_prefix, course_number, course_title
        LIMIT {limit} OFFSET {offset}
        "#,
    ))
    .bind(semester_id)
    .fetch_all(pool)
    .await
    .context("failed to fetch courses")?;

    Ok(rows
        .into_iter()
        .map(
            |(semester_id, course_subject_prefix, course_number, course_title)| Course {
                semester_id,
                course_subject_prefix,
                course_number,
                course_title,
                sections: None,
            },
        )
        .collect())
}

/// Populate each course's `sections` in place.
pub async fn populate_course_sections(pool: &PgPool, courses: &mut [Course]) -> Result<()> {
    for course in courses.iter_mut() {
        let filters = crate::data::sections::SectionFilters {
            course_subject_prefix: Some(course.course_subject_prefix.clone()),
            course_number: Some(course.course_number.clone()),
            ..Default::default()
        };
        let sections = crate::data::sections::search_sections(
            pool,
            &course.semester_id,
            &filters,
            i64::from(i32::MAX),
            0,
        )
        .await?;
        course.sections = Some(sections);
    }
    Ok(())
}
