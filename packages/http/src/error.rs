//! Errors raised while talking to the network.

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The exchange did not complete: connection refused, timeout, broken body.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failure reported by a non-reqwest executor.
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    pub fn other(message: impl Into<String>) -> Self {
        Error::Other {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
