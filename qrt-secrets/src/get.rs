//! `secrets.get(key: string) => string`

use std::env::VarError;

use qrt::{Arguments, RuntimeResult, Value};
use tracing::debug;

use crate::config::MissingPolicy;
use crate::env::{ReadEnv, SystemEnv};
use crate::error::SecretError;

/// Name of the single argument `secrets.get` takes.
pub const KEY_ARGUMENT: &str = "key";

/// Reads secrets out of the process environment.
///
/// Holds no state besides the environment handle and the missing-value
/// policy: nothing is cached, every call reads the environment again.
#[derive(Debug, Clone, Default)]
pub struct EnvSecretAccessor<E = SystemEnv> {
    env: E,
    policy: MissingPolicy,
}

impl<E: ReadEnv> EnvSecretAccessor<E> {
    pub fn new(env: E, policy: MissingPolicy) -> Self {
        EnvSecretAccessor { env, policy }
    }

    /// Looks `key` up. Returns the value verbatim when it is set and
    /// non-empty.
    ///
    /// A name the platform cannot hold (empty, or containing `=` or NUL) is
    /// never set, so it falls under the missing-value policy like any other
    /// unset variable.
    pub fn lookup(&self, key: &str) -> Result<Option<String>, SecretError> {
        match self.env.var(key) {
            Ok(value) if !value.is_empty() => {
                debug!(key, "secret resolved");
                Ok(Some(value))
            }
            Ok(_) | Err(VarError::NotPresent) => {
                debug!(key, policy = ?self.policy, "secret unset or empty");
                match self.policy {
                    MissingPolicy::Nil => Ok(None),
                    MissingPolicy::Error => Err(SecretError::NotFound {
                        key: key.to_string(),
                    }),
                }
            }
            Err(VarError::NotUnicode(_)) => Err(SecretError::NotUnicode {
                key: key.to_string(),
            }),
        }
    }

    /// Builtin entry point: extracts `key` and wraps the result as a value.
    pub fn call(&self, args: &mut Arguments) -> RuntimeResult<Value> {
        let key = args.get_required_string(KEY_ARGUMENT)?;
        Ok(self.lookup(&key)?.map(Value::String).unwrap_or(Value::Nil))
    }
}
