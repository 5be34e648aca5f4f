use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid engine config: {0}")]
    Json(String),

    #[error("Config value `{field}` must be greater than zero")]
    Zero { field: &'static str },
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e.to_string())
    }
}

/// Failure to bring up a lazily loaded backend (parser or Tailwind compiler).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("{backend} did not load within {timeout:?}")]
    Timeout {
        backend: &'static str,
        timeout: Duration,
    },

    #[error("{backend} failed to load: {message}")]
    Failed {
        backend: &'static str,
        message: String,
    },

    #[error("{backend} is cooling down after a failed load ({remaining:?} left): {cause}")]
    CoolingDown {
        backend: &'static str,
        remaining: Duration,
        cause: Box<LoadError>,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TailwindError {
    #[error("Tailwind candidate set has {count} classes, above the configured limit of {limit} (tailwind.maxCandidates)")]
    TooManyCandidates { count: usize, limit: usize },

    #[error("Compiled Tailwind CSS is {size} bytes, above the configured limit of {limit} bytes (tailwind.maxCssBytes)")]
    CssTooLarge { size: usize, limit: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Tailwind(#[from] TailwindError),
}

pub type EngineResult<T> = Result<T, EngineError>;
