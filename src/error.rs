use thiserror::Error;

#[derive(Error, Debug)]
pub enum M3uExtractError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input file not found: {path}")]
    InputNotFound { path: String },

    #[error("Failed to read input at line {line}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Operation was cancelled by user")]
    Cancelled,
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for M3uExtractError {
    fn user_message(&self) -> String {
        match self {
            M3uExtractError::InputNotFound { path } => {
                format!("Input file does not exist: {}", path)
            }
            M3uExtractError::Read { line, source } => {
                format!("Failed to read line {}: {}", line, source)
            }
            M3uExtractError::Write { path, source } => {
                format!("Failed to write to {}: {}", path, source)
            }
            M3uExtractError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            M3uExtractError::Cancelled => "Operation was cancelled by user".to_string(),
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            M3uExtractError::InputNotFound { .. } => Some(
                "Check the path passed with --file. The file must contain one URL per line."
                    .to_string(),
            ),
            M3uExtractError::Read { .. } => Some(
                "The input file must be UTF-8 text. Lines before the failure were processed."
                    .to_string(),
            ),
            M3uExtractError::Write { .. } => Some(
                "Ensure you have write permission for the output directory (--output).".to_string(),
            ),
            M3uExtractError::Config { .. } => Some(
                "Check your configuration file syntax, or regenerate one with --generate-config."
                    .to_string(),
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for M3uExtractError {
    fn from(error: toml::de::Error) -> Self {
        M3uExtractError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, M3uExtractError>;
