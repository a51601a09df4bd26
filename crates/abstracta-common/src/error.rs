use thiserror::Error;

#[derive(Debug, Error)]
pub enum AbstractaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data file not found: {0}")]
    MissingDataFile(String),

    #[error("Refusing to overwrite existing file: {0}")]
    AlreadyExists(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, AbstractaError>;
