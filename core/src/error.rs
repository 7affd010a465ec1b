use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("Invalid amount {raw:?} on payment '{payment_code}'")]
    InvalidAmount { payment_code: String, raw: String },

    #[error("Invalid timestamp {raw:?} on payment '{payment_code}'")]
    InvalidTimestamp { payment_code: String, raw: String },

    #[error("Invalid date {raw:?}: expected YYYY-MM-DD")]
    InvalidDate { raw: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("API error {status} from {endpoint}: {message}")]
    Api {
        endpoint: String,
        status: i64,
        message: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type DashResult<T> = Result<T, DashError>;
