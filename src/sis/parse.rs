//! Shared cell, day, time, and credit parsing for both upstream page layouts.
//!
//! Two time formats exist upstream. The SIS search page carries an explicit
//! meridiem on each time (`"10:10 am-12:00 pm"`); the legacy schedule listing
//! labels only the end time (`"4:00"` / `"5:50PM"`) and the start meridiem
//! must be inferred. Malformed times degrade to `(None, None)` in both cases
//! rather than failing the scrape.

use html_scraper::ElementRef;

use crate::sis::errors::ScrapeError;

/// Collapse every whitespace run (including newlines) to a single space and
/// trim the ends.
pub fn sanitize(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract the sanitized text of a table cell, or `None` when the cell is
/// empty or marked `TBA` ("to be announced" is treated as absence).
///
/// Cells with zero text nodes are fine and yield `None`.
pub fn extract_cell(cell: ElementRef<'_>) -> Option<String> {
    let text: String = cell.text().collect();
    if text.contains("TBA") {
        return None;
    }
    let cleaned = sanitize(&text);
    if cleaned.is_empty() { None } else { Some(cleaned) }
}

/// Map a day letter to its day-of-week code (0 = Sunday).
fn day_code(letter: char) -> Option<u8> {
    match letter {
        'M' => Some(1),
        'T' => Some(2),
        'W' => Some(3),
        'R' => Some(4),
        'F' => Some(5),
        'S' => Some(6),
        _ => None,
    }
}

/// Decode a string of concatenated day letters (`"MWF"` → `[1, 3, 5]`).
///
/// Whitespace padding is ignored; any other unrecognized letter is a hard
/// failure.
pub fn decode_days(raw: &str) -> Result<Vec<u8>, ScrapeError> {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| day_code(c).ok_or(ScrapeError::UnknownDayLetter(c)))
        .collect()
}

/// Split `"hh:mm"` into hour/minute integers. `None` on any parse failure.
fn split_hour_minute(raw: &str) -> Option<(u32, u32)> {
    let (hours, minutes) = raw.split_once(':')?;
    Some((
        hours.trim().parse().ok()?,
        minutes.trim().parse().ok()?,
    ))
}

fn fmt_time(hours: u32, minutes: u32) -> String {
    format!("{hours:02}:{minutes:02}")
}

/// Convert a single SIS time like `"10:10 am"` or `"02:03 pm"` to 24-hour
/// `HH:MM`. `None` when the numeric parts fail to parse.
fn to_24_hour_time(raw: &str) -> Option<String> {
    let stripped = raw.replace("am", "").replace("pm", "");
    let (mut hours, minutes) = split_hour_minute(&stripped)?;

    if hours == 12 && raw.contains("am") {
        hours = 0;
    } else if raw.contains("pm") && hours != 12 {
        hours += 12;
    }
    Some(fmt_time(hours, minutes))
}

/// Parse a SIS time range cell (`"10:10 am-12:00 pm"`).
///
/// A missing cell or any malformed half degrades to `(None, None)`; the
/// period simply has no scheduled time.
pub fn parse_time_range(raw: Option<&str>) -> (Option<String>, Option<String>) {
    let Some(raw) = raw else {
        return (None, None);
    };
    let Some((start_raw, end_raw)) = raw.split_once('-') else {
        return (None, None);
    };
    match (to_24_hour_time(start_raw), to_24_hour_time(end_raw)) {
        (Some(start), Some(end)) => (Some(start), Some(end)),
        _ => (None, None),
    }
}

/// Resolve the schedule listing's inconsistent time pair, e.g.
/// `("4:00", "5:50PM")` → `("16:00", "17:50")`.
///
/// Only the end time carries a meridiem: when it says `PM`, the end hour is
/// bumped past noon, and the start hour follows iff `start + 12 <= end`.
/// This misfires for some periods straddling noon; kept as-is because the
/// stored keys must match what the upstream data actually joins on.
pub fn resolve_time_pair(
    start_raw: Option<&str>,
    end_raw: Option<&str>,
) -> (Option<String>, Option<String>) {
    let (Some(start_raw), Some(end_raw)) = (start_raw, end_raw) else {
        return (None, None);
    };
    let Some((mut start_hours, start_minutes)) = split_hour_minute(start_raw) else {
        return (None, None);
    };
    let end_stripped = end_raw.replace("AM", "").replace("PM", "");
    let Some((mut end_hours, end_minutes)) = split_hour_minute(&end_stripped) else {
        return (None, None);
    };

    if end_raw.contains("PM") {
        if end_hours < 12 {
            end_hours += 12;
        }
        if start_hours + 12 <= end_hours {
            start_hours += 12;
        }
    }

    (
        Some(fmt_time(start_hours, start_minutes)),
        Some(fmt_time(end_hours, end_minutes)),
    )
}

/// Expand a credits cell to the list of allowed credit values.
///
/// `"1-3"` expands to `[1, 2, 3]`; a single value like `"3"` or `"3.0"`
/// yields `[3]` (floats are tolerated, then truncated).
pub fn expand_credits(raw: &str) -> Result<Vec<i32>, ScrapeError> {
    let parse = |part: &str| -> Result<i32, ScrapeError> {
        part.trim()
            .parse::<f64>()
            .map(|v| v as i32)
            .map_err(|_| ScrapeError::MalformedField {
                field: "credits",
                value: raw.to_owned(),
            })
    };

    if let Some((low, high)) = raw.split_once('-') {
        Ok((parse(low)?..=parse(high)?).collect())
    } else {
        Ok(vec![parse(raw)?])
    }
}
