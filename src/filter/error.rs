use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum FilterError {
    #[error("Unknown filter field: {0}")]
    UnknownField(String),

    #[error("Field '{0}' cannot be used in a filter")]
    NotFilterable(String),

    #[error("Malformed filter key: {0}")]
    MalformedKey(String),

    #[error("Unsupported operator '{op}' for field '{field}'")]
    UnsupportedOperator { field: String, op: String },

    #[error("Invalid value for '{field}': expected {expected}, got '{value}'")]
    InvalidValue {
        field: String,
        value: String,
        expected: &'static str,
    },
}
