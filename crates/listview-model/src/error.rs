use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("record has no `{field}` member")]
    MissingId { field: &'static str },
    #[error("record id must be a string or an integer, got {value}")]
    InvalidId { value: String },
}
