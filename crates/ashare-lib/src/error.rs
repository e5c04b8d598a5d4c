use thiserror::Error;

/// Convenient result alias for the A-share library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when a stock code is not a six-digit numeric string after
    /// normalization.
    #[error("invalid stock code: {code}")]
    InvalidStockCode { code: String },

    /// Raised when a code's prefix does not map to a known exchange.
    #[error("unknown exchange for stock code {code}")]
    UnknownExchange { code: String },

    /// Raised when a board selection string is not recognized.
    #[error("unknown board selection: {name}")]
    UnknownBoard { name: String },

    /// Raised when an upstream endpoint answered but carried no rows.
    #[error("upstream returned no data for {endpoint}")]
    EmptyPayload { endpoint: &'static str },

    /// Raised when an upstream payload did not match the expected shape.
    #[error("unexpected payload from {endpoint}: {message}")]
    UnexpectedPayload {
        endpoint: &'static str,
        message: String,
    },

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Wrapper for JSON decoding errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
