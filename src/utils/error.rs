use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimelinessError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {message}")]
    TomlError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("undefined attribute '{attribute}'")]
    MissingAttribute { attribute: String },

    #[error("attribute '{attribute}' has no {temporal_type} value")]
    BlankOperand {
        attribute: String,
        temporal_type: String,
    },

    #[error("could not parse '{value}' as {temporal_type}")]
    UnparsableOperand {
        value: String,
        temporal_type: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Evaluation,
    Io,
}

impl TimelinessError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TimelinessError::IoError(_) | TimelinessError::SerializationError(_) => {
                ErrorCategory::Io
            }
            TimelinessError::TomlError { .. }
            | TimelinessError::ConfigError { .. }
            | TimelinessError::InvalidConfigValueError { .. }
            | TimelinessError::MissingConfigError { .. } => ErrorCategory::Configuration,
            TimelinessError::MissingAttribute { .. }
            | TimelinessError::BlankOperand { .. }
            | TimelinessError::UnparsableOperand { .. } => ErrorCategory::Evaluation,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Validation rules are invalid: {}", self),
            ErrorCategory::Evaluation => format!("A restriction could not be evaluated: {}", self),
            ErrorCategory::Io => format!("Could not read input: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            TimelinessError::IoError(_) => "Check that the file exists and is readable",
            TimelinessError::SerializationError(_) => "Records must be a JSON array of objects",
            TimelinessError::TomlError { .. } => "Check the rules file for TOML syntax errors",
            TimelinessError::MissingConfigError { .. } => "Add the missing key to the rules file",
            TimelinessError::ConfigError { .. } | TimelinessError::InvalidConfigValueError { .. } => {
                "Fix the offending validation option"
            }
            TimelinessError::MissingAttribute { .. } => {
                "Make sure the referenced attribute exists on every record"
            }
            TimelinessError::BlankOperand { .. } | TimelinessError::UnparsableOperand { .. } => {
                "Restriction values must be valid dates or times"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, TimelinessError>;
