use thiserror::Error;

#[derive(Error, Debug)]
pub enum CpkError {
    #[error("Invalid target profile '{name}': {reason}")]
    InvalidTarget { name: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl CpkError {
    pub fn invalid_target(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidTarget {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CpkError>;
