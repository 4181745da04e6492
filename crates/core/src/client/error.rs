use thiserror::Error;

/// How the caller should present a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Rejected before any request was made.
    InvalidInput,
    /// The backend does not know the ticker; the user can try another one.
    NotFound,
    /// Network, HTTP or decoding failure; the user may resubmit.
    Transient,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("ticker must be non-empty")]
    EmptyTicker,

    #[error("ticker not found: {ticker}")]
    NotFound { ticker: String },

    #[error("backend request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("backend HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("backend response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("backend reported failure: {0}")]
    Backend(String),

    #[error("cannot build backend URL: {0}")]
    Url(String),
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::EmptyTicker => FetchErrorKind::InvalidInput,
            FetchError::NotFound { .. } => FetchErrorKind::NotFound,
            FetchError::Request(_)
            | FetchError::Status { .. }
            | FetchError::Decode(_)
            | FetchError::Backend(_)
            | FetchError::Url(_) => FetchErrorKind::Transient,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == FetchErrorKind::NotFound
    }
}
