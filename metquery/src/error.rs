use thiserror::Error;

/// Failures reported by the metquery service or found in its responses.
///
/// Returned wrapped in `anyhow::Error`; use `downcast_ref::<MetqueryError>()`
/// to classify.
#[derive(Error, Debug)]
pub enum MetqueryError {
    #[error("unknown metquery dataset {0:?}")]
    UnknownDataset(String),
    #[error("metquery returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("metquery rate limit reached: {body}")]
    RateLimited { body: String },
    #[error("cannot parse json from metquery response: {body}")]
    Parse { body: String },
    #[error("metquery response has no {field:?} field")]
    MissingField { field: String },
    #[error("metquery response field {field:?} has a non-numeric value at index {index}")]
    NonNumeric { field: String, index: usize },
    #[error("expected 12 monthly values, got {len}")]
    Shape { len: usize },
}
