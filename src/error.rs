use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkiffError {
    // Catalog errors
    #[error("table not found: {name}")]
    TableNotFound { name: String },

    #[error("table already exists: {name}")]
    TableAlreadyExists { name: String },

    #[error("index already exists: {name}")]
    IndexAlreadyExists { name: String },

    // Index configuration errors
    #[error("missing option for {kind} index: {option}")]
    MissingIndexOption { kind: String, option: String },

    #[error("invalid option for {kind} index: {option} = {value} ({reason})")]
    InvalidIndexOption {
        kind: String,
        option: String,
        value: i64,
        reason: String,
    },

    // Validation errors
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    // Execution errors
    #[error("execution error: {0}")]
    Execution(String),

    // Config errors
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SkiffError>;
