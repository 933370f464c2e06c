//! SIS client: authenticated session, subject list, and the course-section
//! search scraper.
//!
//! SIS is a Banner SSB instance behind a CAS login. The search results page
//! is one large table where a row either starts a new section (CRN cell
//! filled) or adds another meeting period to the previous one (CRN cell
//! empty or repeated).

pub mod errors;
pub mod parse;
pub mod schedule;

use html_scraper::{Html, Selector};
use indexmap::IndexMap;
use tracing::{debug, info};

use crate::models::{ClassType, CourseSection, CourseSectionPeriod};
use crate::sis::errors::ScrapeError;
use crate::sis::parse::{decode_days, expand_credits, extract_cell, parse_time_range};
use crate::sis::schedule::PeriodTypeMap;

/// Substring present in the self-service landing page after a successful
/// CAS login. Login is a boolean, not a status code: CAS answers 200 either
/// way.
const LOGIN_SUCCESS_MARKER: &str = "Rensselaer Self-Service Information System";

/// Column positions in the search results table.
///
/// SIS omits `<td>` elements for some empty cells and papers over the gap
/// with `colspan` on the previous cell; [`collect_row_values`] re-expands
/// those so these indices always line up.
#[derive(Debug, Clone, Copy)]
enum Column {
    Crn = 1,
    Subject = 2,
    Crse = 3,
    Section = 4,
    Credits = 6,
    Title = 7,
    Days = 8,
    Time = 9,
    Cap = 10,
    Actual = 11,
    WlCap = 12,
    WlActual = 13,
    Instructor = 19,
    Location = 21,
    Attribute = 22,
}

/// Fixed width of the expanded field vector (highest column index + 1).
const FIELD_WIDTH: usize = 23;

/// Client for SIS with a persistent authenticated session.
///
/// Construct one per import run; the cookie store carries the CAS session
/// between the login and the search requests.
pub struct Sis {
    http: reqwest::Client,
    rin: String,
    pin: String,
    login_url: String,
    start_search_url: String,
    course_search_url: String,
}

impl Sis {
    pub fn new(login_url: &str, base_url: &str, rin: &str, pin: &str) -> Self {
        Self {
            http: reqwest::Client::builder()
                .cookie_store(true)
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .expect("Failed to build reqwest client"),
            rin: rin.to_owned(),
            pin: pin.to_owned(),
            login_url: login_url.to_owned(),
            start_search_url: format!("{base_url}/bwckgens.p_proc_term_date"),
            course_search_url: format!("{base_url}/bwskfcls.P_GetCrse_Advanced"),
        }
    }

    /// Attempt to log in with the configured credential pair.
    ///
    /// `Ok(false)` almost always means the credentials were rejected; the
    /// caller must check and abort explicitly. Transport failures are errors.
    pub async fn login(&self) -> Result<bool, ScrapeError> {
        // The login form requires a CSRF token from a hidden input; a direct
        // POST is rejected.
        let login_page = self
            .http
            .get(&self.login_url)
            .send()
            .await
            .map_err(|e| ScrapeError::request(&self.login_url, e))?
            .text()
            .await
            .map_err(|e| ScrapeError::request(&self.login_url, e))?;

        let csrf_token = {
            let doc = Html::parse_document(&login_page);
            let input_sel = Selector::parse(r#"input[name="execution"]"#).unwrap();
            doc.select(&input_sel)
                .next()
                .and_then(|input| input.attr("value"))
                .ok_or_else(|| {
                    ScrapeError::UnexpectedShape("login page has no CSRF execution token".into())
                })?
                .to_owned()
        };

        let response = self
            .http
            .post(&self.login_url)
            .form(&[
                ("username", self.rin.as_str()),
                ("password", self.pin.as_str()),
                ("_eventId", "submit"),
                ("execution", csrf_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ScrapeError::request(&self.login_url, e))?
            .text()
            .await
            .map_err(|e| ScrapeError::request(&self.login_url, e))?;

        Ok(response.contains(LOGIN_SUCCESS_MARKER))
    }

    /// Fetch the unique subject prefixes offered in a semester, e.g.
    /// `["ADMN", "ARCH", ...]`.
    pub async fn fetch_subjects(&self, semester_id: &str) -> Result<Vec<String>, ScrapeError> {
        let body = self
            .http
            .post(&self.start_search_url)
            .form(&[("p_calling_proc", "P_CrseSearch"), ("p_term", semester_id)])
            .send()
            .await
            .map_err(|e| ScrapeError::request(&self.start_search_url, e))?
            .text()
            .await
            .map_err(|e| ScrapeError::request(&self.start_search_url, e))?;

        let doc = Html::parse_document(&body);
        let option_sel = Selector::parse("select#subj_id option").unwrap();
        let subjects: Vec<String> = doc
            .select(&option_sel)
            .filter_map(|option| option.attr("value"))
            .map(str::to_owned)
            .collect();

        debug!(semester_id, count = subjects.len(), "fetched subject list");
        Ok(subjects)
    }

    /// Run the advanced section search and reconstruct sections with their
    /// periods, enriched with class types from the schedule listing.
    ///
    /// When `subjects` is `None` the full subject list for the semester is
    /// fetched first. Requires a prior successful [`Sis::login`].
    pub async fn fetch_course_sections(
        &self,
        semester_id: &str,
        subjects: Option<Vec<String>>,
        period_types: &PeriodTypeMap,
    ) -> Result<Vec<CourseSection>, ScrapeError> {
        let subjects = match subjects {
            Some(subjects) => subjects,
            None => self.fetch_subjects(semester_id).await?,
        };

        let body = self
            .http
            .get(&self.course_search_url)
            .query(&search_params(semester_id, &subjects))
            .send()
            .await
            .map_err(|e| ScrapeError::request(&self.course_search_url, e))?
            .text()
            .await
            .map_err(|e| ScrapeError::request(&self.course_search_url, e))?;

        let sections = parse_sections_document(
            &Html::parse_document(&body),
            semester_id,
            period_types,
        )?;
        info!(
            semester_id,
            subjects = subjects.len(),
            sections = sections.len(),
            "scraped course sections"
        );
        Ok(sections)
    }
}

/// The fixed parameter set the advanced search form mandates.
///
/// Every key must be present or the search errors out, even though most of
/// them carry no filter; `"dummy"` is distinct from the empty string upstream.
fn search_params(semester_id: &str, subjects: &[String]) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("term_in", semester_id.to_owned()),
        ("path", "1".to_owned()),
        ("SUB_BTN", "Section Search".to_owned()),
        ("sel_ptrm", "dummy".to_owned()),
        ("sel_ptrm", "%".to_owned()),
        ("sel_subj", "dummy".to_owned()),
    ];
    for subject in subjects {
        params.push(("sel_subj", subject.clone()));
    }

    const DUMMY_KEYS: &[&str] = &[
        "rsts", "crn", "sel_day", "sel_schd", "sel_insm", "sel_camp", "sel_levl", "sel_sess",
        "sel_instr", "sel_attr",
    ];
    const EMPTY_KEYS: &[&str] = &["sel_crse", "sel_title", "sel_from_cred", "sel_to_cred"];
    const ZERO_KEYS: &[&str] = &["begin_hh", "begin_mi", "end_hh", "end_mi"];
    const MERIDIEM_KEYS: &[&str] = &["begin_ap", "end_ap"];

    for (value, keys) in [
        ("dummy", DUMMY_KEYS),
        ("", EMPTY_KEYS),
        ("0", ZERO_KEYS),
        ("a", MERIDIEM_KEYS),
    ] {
        for key in keys {
            params.push((key, value.to_owned()));
        }
    }
    params
}

/// Parse a search results document into sections in encounter order.
///
/// Exposed separately from the network fetch so the table walk is testable
/// against fixture documents.
pub fn parse_sections_document(
    doc: &Html,
    semester_id: &str,
    period_types: &PeriodTypeMap,
) -> Result<Vec<CourseSection>, ScrapeError> {
    let table_sel = Selector::parse("table").unwrap();
    let caption_sel = Selector::parse("caption").unwrap();
    let tr_sel = Selector::parse("tr").unwrap();
    let td_sel = Selector::parse("td").unwrap();

    let Some(table) = doc.select(&table_sel).find(|table| {
        table
            .select(&caption_sel)
            .any(|caption| caption.text().collect::<String>().contains("Sections Found"))
    }) else {
        return Err(ScrapeError::UnexpectedShape(
            "no 'Sections Found' table in search results".into(),
        ));
    };

    let mut sections: IndexMap<String, CourseSection> = IndexMap::new();
    let mut last_crn: Option<String> = None;

    // First two rows are table headings.
    for row in table.select(&tr_sel).skip(2) {
        let cells: Vec<_> = row.select(&td_sel).collect();
        if cells.is_empty() {
            continue;
        }
        let values = collect_row_values(&cells)?;

        let crn_value = values[Column::Crn as usize].clone();
        if let Some(crn) = crn_value
            && last_crn.as_ref() != Some(&crn)
        {
            let section = create_course_section(semester_id, &values)?;
            sections.insert(crn.clone(), section);
            last_crn = Some(crn);
        }

        let crn = last_crn.as_ref().ok_or_else(|| {
            ScrapeError::UnexpectedShape("period row before any section row".into())
        })?;
        let period = create_period(semester_id, crn, &values, period_types)?;
        sections
            .get_mut(crn)
            .ok_or_else(|| ScrapeError::UnexpectedShape(format!("no section for CRN {crn}")))?
            .periods
            .push(period);
    }

    Ok(sections.into_values().collect())
}

/// Reduce a row to the fixed-width field vector.
///
/// A cell with a `colspan` attribute is followed by an explicit empty
/// placeholder so later column indices stay aligned.
fn collect_row_values(
    cells: &[html_scraper::ElementRef<'_>],
) -> Result<Vec<Option<String>>, ScrapeError> {
    let mut values = Vec::with_capacity(FIELD_WIDTH);
    for cell in cells {
        values.push(extract_cell(*cell));
        if cell.attr("colspan").is_some() {
            values.push(None);
        }
    }
    if values.len() < FIELD_WIDTH {
        return Err(ScrapeError::UnexpectedShape(format!(
            "section row has {} fields, expected at least {FIELD_WIDTH}",
            values.len()
        )));
    }
    Ok(values)
}

fn required<'a>(
    values: &'a [Option<String>],
    column: Column,
) -> Result<&'a str, ScrapeError> {
    values[column as usize]
        .as_deref()
        .ok_or(ScrapeError::MalformedField {
            field: "section row",
            value: format!("missing {column:?}"),
        })
}

fn required_int(values: &[Option<String>], column: Column) -> Result<i32, ScrapeError> {
    let raw = required(values, column)?;
    raw.parse().map_err(|_| ScrapeError::MalformedField {
        field: "enrollment count",
        value: raw.to_owned(),
    })
}

fn create_course_section(
    semester_id: &str,
    values: &[Option<String>],
) -> Result<CourseSection, ScrapeError> {
    Ok(CourseSection {
        semester_id: semester_id.to_owned(),
        course_subject_prefix: required(values, Column::Subject)?.to_owned(),
        course_number: required(values, Column::Crse)?.to_owned(),
        course_title: required(values, Column::Title)?.to_owned(),
        section_id: required(values, Column::Section)?.to_owned(),
        crn: required(values, Column::Crn)?.to_owned(),
        instruction_method: values[Column::Attribute as usize].clone(),
        credits: expand_credits(required(values, Column::Credits)?)?,
        max_enrollments: required_int(values, Column::Cap)?,
        enrollments: required_int(values, Column::Actual)?,
        waitlist_max: required_int(values, Column::WlCap)?,
        waitlists: required_int(values, Column::WlActual)?,
        textbooks_url: None,
        periods: Vec::new(),
    })
}

fn create_period(
    semester_id: &str,
    crn: &str,
    values: &[Option<String>],
    period_types: &PeriodTypeMap,
) -> Result<CourseSectionPeriod, ScrapeError> {
    let (start_time, end_time) =
        parse_time_range(values[Column::Time as usize].as_deref());

    let days = match &values[Column::Days as usize] {
        Some(raw) => decode_days(raw)?,
        None => Vec::new(),
    };

    let instructors: Vec<String> = match &values[Column::Instructor as usize] {
        Some(raw) => raw.replace(" (P)", "").split(", ").map(str::to_owned).collect(),
        None => Vec::new(),
    };

    // Multi-day periods are assumed type-invariant across days: only the
    // first meeting day is consulted.
    let class_type = days
        .first()
        .and_then(|day| {
            period_types
                .get(&(crn.to_owned(), *day, start_time.clone()))
                .copied()
        })
        .unwrap_or(ClassType::Lecture);

    Ok(CourseSectionPeriod {
        semester_id: semester_id.to_owned(),
        crn: crn.to_owned(),
        class_type: Some(class_type),
        start_time,
        end_time,
        instructors,
        days,
        location: values[Column::Location as usize].clone(),
    })
}
