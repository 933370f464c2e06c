//! Canonical entities and their flat storage records.
//!
//! The scrapers produce [`CourseSection`]/[`CourseSectionPeriod`] values;
//! the database stores them flattened (list fields joined into delimited
//! text). Conversion in both directions lives here so the round-trip
//! `normalize(denormalize(x)) == x` holds in exactly one place.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Classification of a recurring weekly meeting block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassType {
    Lecture,
    Studio,
    Recitation,
    Seminar,
    Lab,
    Test,
}

impl ClassType {
    /// Parse the three-letter code used by the legacy schedule listing.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "SEM" => Some(Self::Seminar),
            "TES" => Some(Self::Test),
            "LEC" => Some(Self::Lecture),
            "REC" => Some(Self::Recitation),
            "LAB" => Some(Self::Lab),
            "STU" => Some(Self::Studio),
            _ => None,
        }
    }

    /// The lowercase name stored in the database and served over the API.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lecture => "lecture",
            Self::Studio => "studio",
            Self::Recitation => "recitation",
            Self::Seminar => "seminar",
            Self::Lab => "lab",
            Self::Test => "test",
        }
    }

    /// Inverse of [`ClassType::as_str`]; unknown names map to `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "lecture" => Some(Self::Lecture),
            "studio" => Some(Self::Studio),
            "recitation" => Some(Self::Recitation),
            "seminar" => Some(Self::Seminar),
            "lab" => Some(Self::Lab),
            "test" => Some(Self::Test),
            _ => None,
        }
    }
}

/// An academic term, e.g. `202101` for Spring 2021.
///
/// Reference data created by administrative import; the scrape pipeline never
/// mutates it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Semester {
    pub id: String,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// One recurring weekly meeting time-block belonging to a section.
///
/// `start_time`/`end_time` are zero-padded 24-hour `HH:MM` strings and are
/// both `None` or both `Some`; a period is never half-specified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseSectionPeriod {
    pub semester_id: String,
    pub crn: String,
    pub class_type: Option<ClassType>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    /// Instructor last names, in source order. May be empty.
    pub instructors: Vec<String>,
    /// Days of week the period meets (0 = Sunday).
    pub days: Vec<u8>,
    /// `None` means unassigned or online.
    pub location: Option<String>,
}

/// One scheduled offering of a course, identified by CRN within a semester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseSection {
    pub semester_id: String,
    pub course_subject_prefix: String,
    pub course_number: String,
    pub course_title: String,
    pub section_id: String,
    pub crn: String,
    pub instruction_method: Option<String>,
    /// Allowed credit values; a range like `"1-3"` expands to `[1, 2, 3]`.
    pub credits: Vec<i32>,
    pub max_enrollments: i32,
    pub enrollments: i32,
    pub waitlist_max: i32,
    pub waitlists: i32,
    pub textbooks_url: Option<String>,
    pub periods: Vec<CourseSectionPeriod>,
}

/// A conceptual course grouping, derived from sections at query time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub semester_id: String,
    pub course_subject_prefix: String,
    pub course_number: String,
    pub course_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<CourseSection>>,
}

/// Flat storage row for a section (periods stored separately).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SectionRecord {
    pub semester_id: String,
    pub course_subject_prefix: String,
    pub course_number: String,
    pub course_title: String,
    pub section_id: String,
    pub crn: String,
    pub instruction_method: Option<String>,
    pub credits: String,
    pub max_enrollments: i32,
    pub enrollments: i32,
    pub waitlist_max: i32,
    pub waitlists: i32,
    pub textbooks_url: Option<String>,
}

/// Flat storage row for a period.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PeriodRecord {
    pub semester_id: String,
    pub crn: String,
    pub class_type: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub instructors: String,
    pub days: String,
    pub location: Option<String>,
}

/// Split a delimited storage string into list items.
///
/// An empty string parses back to an empty list, never `[""]`, as required by
/// the round-trip invariant.
fn split_nonempty(value: &str, delimiter: char) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    value.split(delimiter).map(str::to_owned).collect()
}

impl CourseSectionPeriod {
    /// Flatten to a storage record (instructors joined `/`, days joined `,`).
    pub fn to_record(&self) -> PeriodRecord {
        PeriodRecord {
            semester_id: self.semester_id.clone(),
            crn: self.crn.clone(),
            class_type: self.class_type.map(|t| t.as_str().to_owned()),
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
            instructors: self.instructors.join("/"),
            days: self
                .days
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join(","),
            location: self.location.clone(),
        }
    }

    /// Rebuild the entity from its storage record.
    pub fn from_record(record: PeriodRecord) -> Self {
        Self {
            semester_id: record.semester_id,
            crn: record.crn,
            class_type: record.class_type.as_deref().and_then(ClassType::from_name),
            start_time: record.start_time,
            end_time: record.end_time,
            instructors: split_nonempty(&record.instructors, '/'),
            days: split_nonempty(&record.days, ',')
                .iter()
                .filter_map(|d| d.parse().ok())
                .collect(),
            location: record.location,
        }
    }
}

impl CourseSection {
    /// Flatten to a storage record. Periods are flattened separately.
    pub fn to_record(&self) -> SectionRecord {
        SectionRecord {
            semester_id: self.semester_id.clone(),
            course_subject_prefix: self.course_subject_prefix.clone(),
            course_number: self.course_number.clone(),
            course_title: self.course_title.clone(),
            section_id: self.section_id.clone(),
            crn: self.crn.clone(),
            instruction_method: self.instruction_method.clone(),
            credits: self
                .credits
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(","),
            max_enrollments: self.max_enrollments,
            enrollments: self.enrollments,
            waitlist_max: self.waitlist_max,
            waitlists: self.waitlists,
            textbooks_url: self.textbooks_url.clone(),
        }
    }

    /// Rebuild the entity from its storage record and already-rebuilt periods.
    pub fn from_record(record: SectionRecord, periods: Vec<CourseSectionPeriod>) -> Self {
        Self {
            semester_id: record.semester_id,
            course_subject_prefix: record.course_subject_prefix,
            course_number: record.course_number,
            course_title: record.course_title,
            section_id: record.section_id,
            crn: record.crn,
            instruction_method: record.instruction_method,
            credits: split_nonempty(&record.credits, ',')
                .iter()
                .filter_map(|c| c.parse().ok())
                .collect(),
            max_enrollments: record.max_enrollments,
            enrollments: record.enrollments,
            waitlist_max: record.waitlist_max,
            waitlists: record.waitlists,
            textbooks_url: record.textbooks_url,
            periods,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_period() -> CourseSectionPeriod {
        CourseSectionPeriod {
            semester_id: "202101".into(),
            crn: "42608".into(),
            class_type: Some(ClassType::Lecture),
            start_time: Some("14:00".into()),
            end_time: Some("15:50".into()),
            instructors: vec!["Hanna".into(), "Shablovsky".into()],
            days: vec![1, 4],
            location: None,
        }
    }

    #[test]
    fn test_period_round_trip() {
        let period = sample_period();
        let record = period.to_record();
        assert_eq!(record.instructors, "Hanna/Shablovsky");
        assert_eq!(record.days, "1,4");
        assert_eq!(CourseSectionPeriod::from_record(record), period);
    }

    #[test]
    fn test_period_round_trip_empty_lists() {
        let period = CourseSectionPeriod {
            instructors: vec![],
            days: vec![],
            class_type: None,
            start_time: None,
            end_time: None,
            ..sample_period()
        };
        let record = period.to_record();
        assert_eq!(record.instructors, "");
        assert_eq!(record.days, "");

        let rebuilt = CourseSectionPeriod::from_record(record);
        assert!(rebuilt.instructors.is_empty(), "must not parse back [\"\"]");
        assert!(rebuilt.days.is_empty());
        assert_eq!(rebuilt, period);
    }

    #[test]
    fn test_section_round_trip() {
        let section = CourseSection {
            semester_id: "202101".into(),
            course_subject_prefix: "BIOL".into(),
            course_number: "1010".into(),
            course_title: "INTRODUCTION TO BIOLOGY".into(),
            section_id: "01".into(),
            crn: "42608".into(),
            instruction_method: None,
            credits: vec![1, 2, 3],
            max_enrollments: 150,
            enrollments: 148,
            waitlist_max: 10,
            waitlists: 2,
            textbooks_url: None,
            periods: vec![sample_period()],
        };
        let record = section.to_record();
        assert_eq!(record.credits, "1,2,3");
        let rebuilt = CourseSection::from_record(record, vec![sample_period()]);
        assert_eq!(rebuilt, section);
    }

    #[test]
    fn test_class_type_codes() {
        assert_eq!(ClassType::from_code("TES"), Some(ClassType::Test));
        assert_eq!(ClassType::from_code("STU"), Some(ClassType::Studio));
        assert_eq!(ClassType::from_code("XYZ"), None);
        for t in [
            ClassType::Lecture,
            ClassType::Studio,
            ClassType::Recitation,
            ClassType::Seminar,
            ClassType::Lab,
            ClassType::Test,
        ] {
            assert_eq!(ClassType::from_name(t.as_str()), Some(t));
        }
    }
}
