use qrt::RuntimeError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecretError {
    #[error("secret {key:?} is not set")]
    NotFound { key: String },

    #[error("environment variable {key:?} does not hold valid unicode")]
    NotUnicode { key: String },

    #[error("invalid secrets configuration: {0}")]
    Config(String),
}

impl From<SecretError> for RuntimeError {
    fn from(e: SecretError) -> RuntimeError {
        match e {
            SecretError::NotFound { key } => RuntimeError::NotFound(format!("secret {:?}", key)),
            SecretError::NotUnicode { key } => RuntimeError::TypeError {
                expected: "unicode string".to_string(),
                actual: "non-unicode bytes".to_string(),
                operation: format!("secrets.get {:?}", key),
            },
            e @ SecretError::Config(_) => RuntimeError::Generic(e.to_string()),
        }
    }
}
