use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("No filter editor attached to column {0}")]
    ColumnNotAttached(usize),

    #[error("A filter editor is already attached to column {0}")]
    ColumnAlreadyAttached(usize),

    #[error("Column {column} is out of range (table has {count} columns)")]
    ColumnOutOfRange { column: usize, count: usize },

    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] confique::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FilterError>;
