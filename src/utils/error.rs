use thiserror::Error;

#[derive(Error, Debug)]
pub enum SplitError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration field '{field}' is invalid: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Unknown store '{store}'")]
    UnknownStore { store: String },

    #[error("Invalid allocation for '{buyer}': {reason}")]
    AllocationError { buyer: String, reason: String },

    #[error("Cannot assign '{item}': {reason}")]
    AssignmentError { item: String, reason: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Configuration,
    Input,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// 命令列結束碼
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,   // 輸入錯誤
            ErrorSeverity::High => 1,     // 設定或處理錯誤
            ErrorSeverity::Critical => 3, // 系統錯誤
        }
    }
}

impl SplitError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SplitError::ZipError(_) | SplitError::CsvError(_) | SplitError::IoError(_) => {
                ErrorCategory::Io
            }
            SplitError::ConfigError { .. }
            | SplitError::ConfigValidationError { .. }
            | SplitError::InvalidConfigValueError { .. }
            | SplitError::MissingConfigError { .. }
            | SplitError::UnknownStore { .. } => ErrorCategory::Configuration,
            SplitError::AllocationError { .. } | SplitError::AssignmentError { .. } => {
                ErrorCategory::Input
            }
            SplitError::SerializationError(_) | SplitError::ProcessingError { .. } => {
                ErrorCategory::Processing
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Processing => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SplitError::IoError(_) => "Check that the receipt file exists and the output directory is writable",
            SplitError::ZipError(_) | SplitError::CsvError(_) => "Check free disk space and output permissions",
            SplitError::UnknownStore { .. } => "Use one of the supported stores: asda, tesco",
            SplitError::AllocationError { .. } => "Allocated units must be zero or positive numbers",
            SplitError::AssignmentError { .. } => {
                "Refer to items by their 1-based index or exact name, and buyers by a configured name or '*'"
            }
            SplitError::ConfigError { .. }
            | SplitError::ConfigValidationError { .. }
            | SplitError::InvalidConfigValueError { .. }
            | SplitError::MissingConfigError { .. } => "Review the configuration file or command-line flags",
            SplitError::SerializationError(_) | SplitError::ProcessingError { .. } => {
                "Re-run with --verbose and inspect the log output"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SplitError::IoError(e) => format!("Could not read or write a file: {}", e),
            SplitError::UnknownStore { store } => format!("'{}' is not a supported store", store),
            SplitError::AssignmentError { item, reason } => {
                format!("Assignment for '{}' could not be applied: {}", item, reason)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SplitError>;
