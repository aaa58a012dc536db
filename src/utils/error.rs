use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Failed to clone scraper from {repo_url}: {message}")]
    CloneError { repo_url: String, message: String },

    #[error("Script not found: {}", path.display())]
    ScriptNotFound { path: PathBuf },

    #[error("Failed to start '{program}': {source}")]
    SpawnError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Script failed with code {}: {stderr}", code.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    ScriptFailed { code: Option<i32>, stderr: String },

    #[error("Script execution timed out after {seconds} seconds")]
    TimeoutError { seconds: u64 },

    #[error("Storage sink rejected request ({status}): {body}")]
    SinkError { status: u16, body: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Dependency,
    Execution,
    Storage,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl RelayError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RelayError::ConfigError { .. }
            | RelayError::InvalidConfigValueError { .. }
            | RelayError::MissingConfigError { .. }
            | RelayError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            RelayError::CloneError { .. } | RelayError::ScriptNotFound { .. } => {
                ErrorCategory::Dependency
            }
            RelayError::SpawnError { .. }
            | RelayError::ScriptFailed { .. }
            | RelayError::TimeoutError { .. } => ErrorCategory::Execution,
            RelayError::HttpError(_) | RelayError::SinkError { .. } | RelayError::IoError(_) => {
                ErrorCategory::Storage
            }
            RelayError::SerializationError(_)
            | RelayError::ValidationError { .. } => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 網路或逾時問題，重試通常可解決
            RelayError::HttpError(_)
            | RelayError::TimeoutError { .. }
            | RelayError::CloneError { .. } => ErrorSeverity::Medium,
            RelayError::SinkError { status, .. } if *status >= 500 || *status == 429 => {
                ErrorSeverity::Medium
            }
            RelayError::IoError(_) | RelayError::SpawnError { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            RelayError::ConfigError { .. }
            | RelayError::InvalidConfigValueError { .. }
            | RelayError::MissingConfigError { .. }
            | RelayError::ConfigValidationError { .. } => {
                "Check the config file and command line arguments".to_string()
            }
            RelayError::CloneError { repo_url, .. } => format!(
                "Check network access and that git can reach {}, or clone it manually",
                repo_url
            ),
            RelayError::ScriptNotFound { .. } => {
                "Use a command that exists in the scraper's scripts directory (e.g. racecards)"
                    .to_string()
            }
            RelayError::SpawnError { program, .. } => {
                format!("Make sure '{}' is installed and on PATH", program)
            }
            RelayError::ScriptFailed { .. } => {
                "Inspect the scraper's stderr above; the date argument may be invalid".to_string()
            }
            RelayError::TimeoutError { .. } => {
                "Increase scraper.timeout_seconds or retry later".to_string()
            }
            RelayError::HttpError(_) | RelayError::SinkError { .. } => {
                "Check storage base_url, token and store ids, then retry".to_string()
            }
            RelayError::IoError(_) => "Check file permissions and free disk space".to_string(),
            RelayError::SerializationError(_)
            | RelayError::ValidationError { .. } => {
                "The scraper output could not be processed; inspect the output file".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Dependency => format!("Scraper dependency problem: {}", self),
            ErrorCategory::Execution => format!("Scraper run failed: {}", self),
            ErrorCategory::Storage => format!("Could not store results: {}", self),
            ErrorCategory::Data => format!("Could not process scraper output: {}", self),
        }
    }

    /// CLI 結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
