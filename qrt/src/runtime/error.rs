use thiserror::Error;

/// Errors raised at the host runtime boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("{0}")]
    Generic(String),

    #[error("type error in {operation}: expected {expected}, got {actual}")]
    TypeError {
        expected: String,
        actual: String,
        operation: String,
    },

    #[error("missing required argument {name:?}")]
    MissingArgument { name: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unused arguments: {}", .names.join(", "))]
    UnusedArguments { names: Vec<String> },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("package not found: {0}")]
    ModuleNotFound(String),

    #[error("symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("duplicate registration of {package}.{name}")]
    DuplicateRegistration { package: String, name: String },

    #[error("invalid builtin declaration: {0}")]
    SignatureParse(String),

    #[error("{0} is not callable")]
    NotCallable(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unused_arguments_lists_every_name() {
        let err = RuntimeError::UnusedArguments {
            names: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.to_string(), "unused arguments: a, b");
    }

    #[test]
    fn missing_argument_quotes_the_name() {
        let err = RuntimeError::MissingArgument {
            name: "key".to_string(),
        };
        assert_eq!(err.to_string(), "missing required argument \"key\"");
    }
}
