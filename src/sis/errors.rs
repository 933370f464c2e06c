//! Error types for the SIS and schedule-listing scrapers.

/// Failures raised while fetching or parsing upstream pages.
///
/// Transport and structural errors are hard failures; lenient degradation
/// (malformed times, missing type codes) happens inside the parsers and never
/// surfaces here.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("request to {url} failed")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unrecognized day letter {0:?}")]
    UnknownDayLetter(char),
    #[error("malformed CRN course-section header {0:?}")]
    MalformedSectionHeader(String),
    #[error("malformed {field} value {value:?}")]
    MalformedField {
        field: &'static str,
        value: String,
    },
    #[error("unexpected page structure: {0}")]
    UnexpectedShape(String),
}

impl ScrapeError {
    /// Wrap a transport error with the URL it occurred against.
    pub fn request(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::RequestFailed {
            url: url.into(),
            source,
        }
    }
}
