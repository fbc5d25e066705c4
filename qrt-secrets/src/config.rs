//! Package configuration.
//!
//! ```toml
//! # How secrets.get reports unset or empty variables: "nil" (default) or "error"
//! missing = "error"
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::SecretError;

/// What `secrets.get` returns for a variable that is unset or empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicy {
    /// Return `nil` without an error. Unset and empty are indistinguishable.
    #[default]
    Nil,
    /// Fail with [`SecretError::NotFound`].
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecretsConfig {
    pub missing: MissingPolicy,
}

impl SecretsConfig {
    pub fn strict() -> Self {
        SecretsConfig {
            missing: MissingPolicy::Error,
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, SecretError> {
        toml::from_str(content).map_err(|e| SecretError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, SecretError> {
        let content = fs::read_to_string(path).map_err(|e| {
            SecretError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn empty_document_uses_defaults() {
        let config = SecretsConfig::from_toml_str("").unwrap();
        assert_eq!(config, SecretsConfig::default());
        assert_eq!(config.missing, MissingPolicy::Nil);
    }

    #[test]
    fn parses_error_policy() {
        let config = SecretsConfig::from_toml_str("missing = \"error\"").unwrap();
        assert_eq!(config, SecretsConfig::strict());
    }

    #[test]
    fn rejects_unknown_policy_and_fields() {
        assert!(matches!(
            SecretsConfig::from_toml_str("missing = \"panic\""),
            Err(SecretError::Config(_))
        ));
        assert!(matches!(
            SecretsConfig::from_toml_str("cache = true"),
            Err(SecretError::Config(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# strict lookups").unwrap();
        writeln!(file, "missing = \"error\"").unwrap();
        let config = SecretsConfig::load(file.path()).unwrap();
        assert_eq!(config.missing, MissingPolicy::Error);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SecretsConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("absent.toml"), "{}", err);
    }
}
