use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScaffoldError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("'{tool}' is not installed or not on PATH")]
    ToolMissing { tool: String },

    #[error("Command '{program}' exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: i32,
        stderr: String,
    },

    #[error("Prompt failed: {message}")]
    PromptError { message: String },

    #[error("Project state error: {message}")]
    ProjectStateError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Config,
    ExternalTool,
    Prompt,
    ProjectState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ScaffoldError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ScaffoldError::IoError(_) => ErrorCategory::Io,
            ScaffoldError::JsonError(_)
            | ScaffoldError::YamlError(_)
            | ScaffoldError::TomlError(_)
            | ScaffoldError::ConfigError { .. }
            | ScaffoldError::InvalidConfigValueError { .. }
            | ScaffoldError::MissingConfigError { .. } => ErrorCategory::Config,
            ScaffoldError::ToolMissing { .. } | ScaffoldError::CommandFailed { .. } => {
                ErrorCategory::ExternalTool
            }
            ScaffoldError::PromptError { .. } => ErrorCategory::Prompt,
            ScaffoldError::ProjectStateError { .. } => ErrorCategory::ProjectState,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ScaffoldError::ToolMissing { .. } => ErrorSeverity::Medium,
            ScaffoldError::CommandFailed { .. } => ErrorSeverity::High,
            ScaffoldError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ScaffoldError::ToolMissing { tool } => {
                format!("'{}' was not found on this machine.", tool)
            }
            ScaffoldError::CommandFailed { program, .. } => {
                format!("An external command failed: {}", program)
            }
            ScaffoldError::InvalidConfigValueError { field, reason, .. } => {
                format!("The value given for '{}' is invalid: {}", field, reason)
            }
            ScaffoldError::MissingConfigError { field } => {
                format!("A required answer is missing: '{}'", field)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ScaffoldError::ToolMissing { tool } => format!(
                "Install '{}' and make sure it is on PATH, then re-run the command.",
                tool
            ),
            ScaffoldError::CommandFailed {
                program, stderr, ..
            } => format!(
                "Inspect the output of '{}' below and fix the underlying issue:\n{}",
                program, stderr
            ),
            ScaffoldError::MissingConfigError { field } => format!(
                "Provide '{}' via the answers file, a flag, or the interactive prompt.",
                field
            ),
            ScaffoldError::InvalidConfigValueError { field, .. } => {
                format!("Correct the value of '{}' and try again.", field)
            }
            _ => "Re-run with --verbose for more detail.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScaffoldError>;
