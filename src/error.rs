use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Feed fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Failed to replace {path}: {source}")]
    Persist {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Site {site}: none of the columns {candidates} are present")]
    MissingColumn { site: String, candidates: String },

    #[error("Unknown site: {0}")]
    UnknownSite(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("{failed} of {total} sites failed")]
    SitesFailed { failed: usize, total: usize },
}
