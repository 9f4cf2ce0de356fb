#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
    #[error("could not reach lookup service at {url}: {reason}")]
    Connection { url: String, reason: String },
    #[error("lookup service timed out after {secs}s")]
    Timeout { secs: u64 },
    #[error("lookup service returned status {status}")]
    Status { status: u16, body: String },
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl LookupError {
    /// True when the service could not be reached at all, as opposed to the
    /// service answering with an error or an unreadable payload.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Timeout { .. })
    }
}

pub type LookupResult<T> = std::result::Result<T, LookupError>;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no detail session is open")]
    Closed,
    #[error("page size {0} is not one of the allowed sizes")]
    InvalidPageSize(usize),
    #[error("year {year} is outside the accepted range {min}..={max}")]
    InvalidYear { year: i32, min: i32, max: i32 },
    #[error("no person with document number {0} in the current results")]
    UnknownPerson(String),
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;
