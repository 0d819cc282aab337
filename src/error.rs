use thiserror::Error;

#[derive(Error, Debug)]
pub enum CamaraError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Roster endpoint returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Malformed roster payload: {0}")]
    Payload(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Non-numeric value in column {column} at row {row}")]
    NonNumeric { column: String, row: usize },

    #[error("Insufficient class variation in {partition} partition: both classes are required")]
    InsufficientClassVariation { partition: String },

    #[error("Model error: {0}")]
    Model(#[from] smartcore::error::Failed),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CamaraError>;
