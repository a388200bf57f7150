use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Service error (HTTP {status}): {message}")]
    Service { status: u16, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("Malformed worksheet: {message}")]
    MalformedSheet { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfig { field: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("cannot read credential file '{path}': {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("credential file '{path}' is not a valid service account key: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid private key: {reason}")]
    InvalidKey { reason: String },

    #[error("token request rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },
}

#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("spreadsheet '{title}' not found")]
    SpreadsheetNotFound { title: String },

    #[error("spreadsheet {spreadsheet} is not accessible (HTTP {status}): {message}")]
    SpreadsheetInaccessible {
        spreadsheet: String,
        status: u16,
        message: String,
    },

    #[error("worksheet '{worksheet}' not found in spreadsheet '{spreadsheet}'")]
    WorksheetNotFound {
        spreadsheet: String,
        worksheet: String,
    },

    #[error("worksheet '{worksheet}' of spreadsheet '{spreadsheet}' cannot be read (HTTP {status}): {message}")]
    WorksheetUnreadable {
        spreadsheet: String,
        worksheet: String,
        status: u16,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Credential,
    Resolution,
    Transport,
    Serialization,
    Data,
    Configuration,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// 可重試 (網路或服務暫時性錯誤)
    Medium,
    High,
    Critical,
}

impl FetchError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FetchError::Credential(_) => ErrorCategory::Credential,
            FetchError::Resolution(_) => ErrorCategory::Resolution,
            FetchError::Transport(_) | FetchError::Service { .. } => ErrorCategory::Transport,
            FetchError::Serialization(_) => ErrorCategory::Serialization,
            FetchError::MalformedSheet { .. } => ErrorCategory::Data,
            FetchError::Config { .. }
            | FetchError::InvalidConfigValue { .. }
            | FetchError::MissingConfig { .. } => ErrorCategory::Configuration,
            FetchError::Io(_) => ErrorCategory::Io,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Transport => ErrorSeverity::Medium,
            ErrorCategory::Resolution | ErrorCategory::Serialization | ErrorCategory::Data => {
                ErrorSeverity::High
            }
            ErrorCategory::Credential | ErrorCategory::Configuration | ErrorCategory::Io => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            FetchError::Credential(e) => format!("Authentication failed: {}", e),
            FetchError::Resolution(e) => format!("Could not locate the data: {}", e),
            FetchError::Transport(e) => {
                if e.is_timeout() {
                    "The spreadsheet service did not answer in time".to_string()
                } else {
                    format!("Could not reach the spreadsheet service: {}", e)
                }
            }
            FetchError::Service { status, message } => {
                format!("The spreadsheet service failed (HTTP {}): {}", status, message)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            FetchError::Credential(CredentialError::Unreadable { .. }) => {
                "Check that --credentials points to an existing service account key file"
            }
            FetchError::Credential(CredentialError::Malformed { .. })
            | FetchError::Credential(CredentialError::InvalidKey { .. }) => {
                "Download a fresh JSON key for the service account"
            }
            FetchError::Credential(CredentialError::Rejected { .. }) => {
                "Make sure the service account and its key are still enabled"
            }
            FetchError::Resolution(ResolutionError::WorksheetNotFound { .. }) => {
                "Check the worksheet (tab) name, it is case sensitive"
            }
            FetchError::Resolution(ResolutionError::WorksheetUnreadable { .. }) => {
                "Make sure the worksheet is a grid sheet and not a chart or data source"
            }
            FetchError::Resolution(_) => {
                "Check the spreadsheet name and share it with the service account email"
            }
            FetchError::Transport(_) | FetchError::Service { .. } => {
                "Check the network connection and try again later"
            }
            FetchError::MalformedSheet { .. } => "Make every header in the first row unique",
            FetchError::Config { .. }
            | FetchError::InvalidConfigValue { .. }
            | FetchError::MissingConfig { .. } => "Run with --help to see the available options",
            FetchError::Serialization(_) | FetchError::Io(_) => {
                "Run again with --verbose for more details"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
