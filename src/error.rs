use reqwest::StatusCode;

/// Boxed error carried out of a body stream.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures that end a streaming request before the backend could finish.
///
/// In-band `error` events are not represented here; they arrive as
/// [`StreamEvent::Error`](crate::stream::StreamEvent::Error) and end up in
/// [`FinalResult::error`](crate::stream::FinalResult::error).
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("request to /{endpoint} failed")]
    Request {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("/{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("network stream error")]
    Transport(#[source] BoxError),

    #[error("{0}")]
    Rejected(String),
}

/// Trip form validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("missing required field: {0}")]
    Missing(&'static str),

    #[error("select at least one travel preference")]
    NoPreferences,

    #[error("number of travelers must be between 1 and 20 (got {0})")]
    Travelers(u32),

    #[error("end date {end} is before start date {start}")]
    DateOrder {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
}

/// Admin REST API failures.
#[cfg(feature = "admin")]
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("admin request {path} failed")]
    Request {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("admin API error (HTTP {status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("admin API returned HTTP {status}")]
    Status { status: StatusCode },

    #[error("unexpected admin response: {0}")]
    Shape(String),

    #[error("{0}")]
    Invalid(&'static str),
}
