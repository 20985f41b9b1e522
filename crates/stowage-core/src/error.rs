//! Configuration errors.
//!
//! Every variant is raised while an adapter is being constructed and is fatal:
//! nothing in the workspace retries a configuration failure.

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not defined")]
    Missing(String),

    #[error("{name} must be \"true\" or \"false\", got {value:?}")]
    InvalidBool { name: String, value: String },

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },

    #[error("Failed to read environment: {0}")]
    Environment(#[from] envy::Error),
}
