//! Scraper for the legacy per-semester schedule listing.
//!
//! The only reason to touch this page is that it carries class-period types
//! (lecture/lab/...) where the SIS search results do not. Its rows are joined
//! against scraped periods by `(crn, first meeting day, start time)`.

use std::collections::HashMap;

use html_scraper::{Html, Selector};
use tracing::{debug, info};

use crate::models::ClassType;
use crate::sis::errors::ScrapeError;
use crate::sis::parse::{decode_days, extract_cell, resolve_time_pair};

/// Join key for a single meeting day of a period.
///
/// The start time stays `Option` so rows whose times degrade to unknown still
/// produce a key that matches the scraper's side of the join.
pub type PeriodTypeKey = (String, u8, Option<String>);

/// `(crn, day, start_time)` → class type, for one semester.
pub type PeriodTypeMap = HashMap<PeriodTypeKey, ClassType>;

/// Cell positions in the schedule listing table.
mod column {
    pub const CRN_COURSE_SEC: usize = 0;
    pub const TITLE: usize = 1;
    pub const TYPE: usize = 2;
    pub const DAYS: usize = 6;
    pub const START_TIME: usize = 7;
    pub const END_TIME: usize = 8;
}

/// Download and parse the schedule listing for a semester.
///
/// A missing page (e.g. a semester the registrar never published) surfaces as
/// a transport error; there is no cached fallback.
pub async fn fetch_period_types(
    http: &reqwest::Client,
    base_url: &str,
    semester_id: &str,
) -> Result<PeriodTypeMap, ScrapeError> {
    let url = format!("{base_url}{semester_id}.htm");
    debug!(url = %url, "downloading schedule listing");

    let body = http
        .get(&url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| ScrapeError::request(&url, e))?
        .text()
        .await
        .map_err(|e| ScrapeError::request(&url, e))?;

    let types = parse_period_types(&Html::parse_document(&body))?;
    info!(
        semester_id,
        entries = types.len(),
        "parsed schedule listing period types"
    );
    Ok(types)
}

/// Walk the listing's data rows and build the period-type lookup.
///
/// Row kinds, decided by the first cell:
/// - non-empty: starts a new CRN (`"44854 ARCH-4100-01"`, first token);
/// - empty with a non-empty second cell: a `NOTE:` filler row, skipped;
/// - empty otherwise: continues the previous CRN.
///
/// A row contributes one entry per meeting day, and only when it declares a
/// recognized class-type code.
pub fn parse_period_types(doc: &Html) -> Result<PeriodTypeMap, ScrapeError> {
    let row_sel = Selector::parse(r#"tr[align="LEFT"]"#).unwrap();
    let td_sel = Selector::parse("td").unwrap();

    let mut types = PeriodTypeMap::new();
    let mut last_crn: Option<String> = None;

    for row in doc.select(&row_sel) {
        let cells: Vec<_> = row.select(&td_sel).collect();
        let Some(first) = cells.first() else {
            continue;
        };

        let header = extract_cell(*first);
        let crn = match &header {
            Some(header) => Some(parse_crn_header(header)?),
            None => last_crn.clone(),
        };
        let Some(crn) = crn else {
            // Still above the first section row.
            continue;
        };
        if header.is_none() && cells.get(column::TITLE).and_then(|c| extract_cell(*c)).is_some() {
            // NOTE: rows carry text in the title cell but no schedule data.
            continue;
        }

        let (start_time, _end_time) = resolve_time_pair(
            cells
                .get(column::START_TIME)
                .and_then(|c| extract_cell(*c))
                .as_deref(),
            cells
                .get(column::END_TIME)
                .and_then(|c| extract_cell(*c))
                .as_deref(),
        );
        let days_raw = cells.get(column::DAYS).and_then(|c| extract_cell(*c));
        let days = decode_days(days_raw.as_deref().unwrap_or_default())?;

        if let Some(class_type) = cells
            .get(column::TYPE)
            .and_then(|c| extract_cell(*c))
            .and_then(|code| ClassType::from_code(&code))
        {
            for day in &days {
                types.insert((crn.clone(), *day, start_time.clone()), class_type);
            }
        }

        last_crn = Some(crn);
    }

    Ok(types)
}

/// Extract the CRN from a `"44854 ARCH-4100-01"` header cell.
///
/// The header must split into exactly four tokens (crn, subject, number,
/// section); anything else is a hard structural failure.
fn parse_crn_header(header: &str) -> Result<String, ScrapeError> {
    let tokens: Vec<&str> = header.split(['-', ' ']).collect();
    match tokens.as_slice() {
        [crn, _subject, _number, _section] => Ok((*crn).to_owned()),
        _ => Err(ScrapeError::MalformedSectionHeader(header.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> String {
        let tds: String = cells.iter().map(|c| format!("<td>{c}</td>")).collect();
        format!(r#"<tr align="LEFT">{tds}</tr>"#)
    }

    fn listing(rows: &[String]) -> Html {
        Html::parse_document(&format!(
            "<html><body><table>{}</table></body></html>",
            rows.concat()
        ))
    }

    #[test]
    fn test_parse_period_types_regression() {
        // Mirrors the known upstream shape: TES on Wednesday evening where
        // only the end time is PM-labeled.
        let doc = listing(&[
            row(&["40432 CSCI-1200-01", "DATA STRUCTURES", "LEC", "", "4.0", "", "MR", "10:10", "12:00PM", "Smith"]),
            row(&["", "", "TES", "", "", "", "W", "9:05", "9:55PM", "Smith"]),
        ]);
        let types = parse_period_types(&doc).unwrap();

        assert_eq!(
            types.get(&("40432".into(), 3, Some("21:05".into()))),
            Some(&ClassType::Test)
        );
        assert_eq!(
            types.get(&("40432".into(), 1, Some("10:10".into()))),
            Some(&ClassType::Lecture)
        );
        assert_eq!(
            types.get(&("40432".into(), 4, Some("10:10".into()))),
            Some(&ClassType::Lecture)
        );
        assert_eq!(types.len(), 3);
    }

    #[test]
    fn test_note_rows_are_skipped() {
        let doc = listing(&[
            row(&["44040 BIOL-1010-01", "INTRO BIOLOGY", "LEC", "", "4", "", "R", "12:20", "1:10PM", "Hanna"]),
            row(&["", "NOTE:", "", "", "", "", "", "", "", ""]),
            row(&["", "", "LAB", "", "", "", "F", "2:30", "4:20PM", "Hanna"]),
        ]);
        let types = parse_period_types(&doc).unwrap();

        // The NOTE row contributed nothing, and the lab row after it still
        // joined to the header's CRN.
        assert_eq!(
            types.get(&("44040".into(), 4, Some("12:20".into()))),
            Some(&ClassType::Lecture)
        );
        assert_eq!(
            types.get(&("44040".into(), 5, Some("14:30".into()))),
            Some(&ClassType::Lab)
        );
        assert_eq!(types.len(), 2);
    }

    #[test]
    fn test_rows_without_type_code_contribute_nothing() {
        let doc = listing(&[row(&[
            "41340 MATH-1010-01", "CALCULUS 1", "", "", "4", "", "MTh", "", "", "",
        ])]);
        // "h" is not a day letter. The row has no type code, but days are
        // still decoded and must fail loudly.
        assert!(parse_period_types(&doc).is_err());

        let doc = listing(&[row(&[
            "41340 MATH-1010-01", "CALCULUS 1", "", "", "4", "", "MR", "12:20", "1:10PM", "",
        ])]);
        assert!(parse_period_types(&doc).unwrap().is_empty());
    }

    #[test]
    fn test_unparseable_times_key_on_none() {
        let doc = listing(&[row(&[
            "41536 PHYS-1100-01", "PHYSICS 1", "TES", "", "4", "", "M", "** 9:05", "ACT **", "",
        ])]);
        let types = parse_period_types(&doc).unwrap();
        assert_eq!(
            types.get(&("41536".into(), 1, None)),
            Some(&ClassType::Test)
        );
    }

    #[tokio::test]
    #[ignore = "hits the live registrar site"]
    async fn live_fetch_period_types() {
        let http = reqwest::Client::new();
        let types = fetch_period_types(&http, "https://sis.rpi.edu/reg/zs", "202101")
            .await
            .unwrap();
        assert!(!types.is_empty());
    }

    #[test]
    fn test_malformed_header_fails() {
        let doc = listing(&[row(&[
            "44854 ARCH-4100", "STUDIO", "STU", "", "4", "", "F", "10:00", "11:50AM", "",
        ])]);
        assert!(matches!(
            parse_period_types(&doc),
            Err(ScrapeError::MalformedSectionHeader(_))
        ));
    }
}
