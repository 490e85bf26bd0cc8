use thiserror::Error;

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Failed to start '{program}': {source}")]
    LaunchFailure {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to wait for '{program}': {source}")]
    WaitFailure {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration parse error in {field}: {message}")]
    ConfigParseError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Process,
    System,
}

impl LaunchError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LaunchError::ConfigParseError { .. }
            | LaunchError::InvalidConfigValueError { .. }
            | LaunchError::MissingConfigError { .. } => ErrorCategory::Configuration,
            LaunchError::LaunchFailure { .. } | LaunchError::WaitFailure { .. } => {
                ErrorCategory::Process
            }
            LaunchError::IoError(_) | LaunchError::SerializationError(_) => ErrorCategory::System,
        }
    }

    /// 啟動器本身的退出碼，沿用 shell 對 127/126 的慣例
    pub fn exit_code(&self) -> i32 {
        match self {
            LaunchError::LaunchFailure { source, .. } => match source.kind() {
                std::io::ErrorKind::NotFound => 127,
                std::io::ErrorKind::PermissionDenied => 126,
                _ => 1,
            },
            LaunchError::ConfigParseError { .. }
            | LaunchError::InvalidConfigValueError { .. }
            | LaunchError::MissingConfigError { .. } => 2,
            _ => 1,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            LaunchError::LaunchFailure { program, source } => {
                format!("Could not launch '{}': {}", program, source)
            }
            LaunchError::WaitFailure { program, .. } => {
                format!("Lost track of '{}' while it was running", program)
            }
            LaunchError::InvalidConfigValueError {
                field,
                value,
                reason,
            } => {
                format!("Configuration value '{}' for {} is not valid: {}", value, field, reason)
            }
            LaunchError::MissingConfigError { field } => {
                format!("Configuration is missing {}", field)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            LaunchError::LaunchFailure { source, .. } => match source.kind() {
                std::io::ErrorKind::NotFound => {
                    "Install the runner (pip install streamlit) or set runner.program in launcher.toml".to_string()
                }
                std::io::ErrorKind::PermissionDenied => {
                    "Check that the runner binary is executable".to_string()
                }
                _ => "Check the runner installation and try again".to_string(),
            },
            LaunchError::InvalidConfigValueError { field, .. } if field == "PORT" => {
                "Set PORT to an integer between 1 and 65535, or unset it to use 8501".to_string()
            }
            LaunchError::ConfigParseError { .. }
            | LaunchError::InvalidConfigValueError { .. }
            | LaunchError::MissingConfigError { .. } => {
                "Fix the configuration file and try again".to_string()
            }
            _ => "Retry; if the problem persists, run with --verbose".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LaunchError>;
