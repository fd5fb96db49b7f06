//! Error types for RAEngine

use thiserror::Error;

/// Result type alias using RAEngine Error
pub type Result<T> = std::result::Result<T, Error>;

/// RAEngine error types
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Missing required configuration: {key}")]
    MissingConfig { key: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidConfig { key: String, message: String },

    // === Record Errors ===
    #[error("Vulnerability {vuln_id} has no affected hosts")]
    UnaffectedVulnerability { vuln_id: String },

    #[error("Vulnerability {vuln_id} references unknown host {ip}")]
    UnknownHost { vuln_id: String, ip: String },

    #[error("Invalid CVSS value {value:?} for vulnerability {vuln_id}")]
    InvalidCvss { vuln_id: String, value: String },

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    // === Generic ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Check if this error should abort the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Configuration(_)
                | Error::MissingConfig { .. }
                | Error::InvalidConfig { .. }
                | Error::UnaffectedVulnerability { .. }
                | Error::UnknownHost { .. }
                | Error::InvalidCvss { .. }
        )
    }

    /// Get an error code for logging
    pub fn code(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "CONFIG_ERROR",
            Error::MissingConfig { .. } => "MISSING_CONFIG",
            Error::InvalidConfig { .. } => "INVALID_CONFIG",
            Error::UnaffectedVulnerability { .. } => "UNAFFECTED_VULN",
            Error::UnknownHost { .. } => "UNKNOWN_HOST",
            Error::InvalidCvss { .. } => "INVALID_CVSS",
            Error::Io(_) => "IO_ERROR",
            Error::FileNotFound { .. } => "FILE_NOT_FOUND",
            Error::Json(_) => "JSON_ERROR",
            Error::Csv(_) => "CSV_ERROR",
            Error::Parse(_) => "PARSE_ERROR",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
