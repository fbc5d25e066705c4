//! Registration of the `contrib/qxip/secrets` package.

use qrt::{BuiltinFunction, PackageRegistry, RuntimeResult, Value};
use tracing::info;

use crate::config::SecretsConfig;
use crate::env::{ReadEnv, SystemEnv};
use crate::get::EnvSecretAccessor;

pub const PACKAGE_PATH: &str = "contrib/qxip/secrets";
pub const GET_KIND: &str = "get";

/// Builtin type declarations for the package.
pub const DECLARATIONS: &str = include_str!("secrets.qrt");

/// Registers the package backed by the process environment.
pub fn register(registry: &PackageRegistry, config: &SecretsConfig) -> RuntimeResult<()> {
    register_with_env(registry, config, SystemEnv)
}

/// Registers the package backed by `env`.
pub fn register_with_env<E>(
    registry: &PackageRegistry,
    config: &SecretsConfig,
    env: E,
) -> RuntimeResult<()>
where
    E: ReadEnv + Send + Sync + 'static,
{
    registry.declare_builtins(PACKAGE_PATH, DECLARATIONS)?;
    let signature = registry.lookup_builtin_type(PACKAGE_PATH, GET_KIND)?;

    let accessor = EnvSecretAccessor::new(env, config.missing);
    let get = BuiltinFunction::new(GET_KIND, signature, move |args| accessor.call(args));
    registry.register_package_value(PACKAGE_PATH, GET_KIND, Value::Function(get))?;

    info!(package = PACKAGE_PATH, missing = ?config.missing, "registered secrets package");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::InMemoryEnv;
    use std::sync::Arc;
    use pretty_assertions::assert_eq;
    use qrt::{Arguments, RuntimeError};

    #[test]
    fn declares_get_signature() {
        let registry = PackageRegistry::new();
        register(&registry, &SecretsConfig::default()).unwrap();
        let sig = registry.lookup_builtin_type(PACKAGE_PATH, GET_KIND).unwrap();
        assert_eq!(sig.to_string(), "(key: string) => string");
        assert_eq!(
            registry.package_exports(PACKAGE_PATH).unwrap(),
            vec![GET_KIND.to_string()]
        );
    }

    #[test]
    fn registering_twice_fails() {
        let registry = PackageRegistry::new();
        register(&registry, &SecretsConfig::default()).unwrap();
        assert_eq!(
            register(&registry, &SecretsConfig::default()),
            Err(RuntimeError::DuplicateRegistration {
                package: PACKAGE_PATH.to_string(),
                name: GET_KIND.to_string()
            })
        );
    }

    #[test]
    fn dispatch_reaches_injected_environment() {
        let env = Arc::new(InMemoryEnv::with_vars([("DB_PASSWORD", "hunter2")]));
        let registry = PackageRegistry::new();
        register_with_env(&registry, &SecretsConfig::default(), env.clone()).unwrap();

        let value = registry
            .call(
                PACKAGE_PATH,
                GET_KIND,
                Arguments::from_pairs([("key", "DB_PASSWORD")]),
            )
            .unwrap();
        assert_eq!(value, Value::String("hunter2".to_string()));
        assert_eq!(env.reads(), 1);
    }

    #[test]
    fn extra_arguments_are_rejected_before_lookup() {
        let env = Arc::new(InMemoryEnv::new());
        let registry = PackageRegistry::new();
        register_with_env(&registry, &SecretsConfig::strict(), env.clone()).unwrap();

        let err = registry
            .call(
                PACKAGE_PATH,
                GET_KIND,
                Arguments::from_pairs([("key", "A"), ("default", "fallback")]),
            )
            .unwrap_err();
        assert_eq!(
            err,
            RuntimeError::UnusedArguments {
                names: vec!["default".to_string()]
            }
        );
        assert_eq!(env.reads(), 0);
    }

    #[test]
    fn mistyped_key_is_rejected_before_lookup() {
        let env = Arc::new(InMemoryEnv::new());
        let registry = PackageRegistry::new();
        register_with_env(&registry, &SecretsConfig::default(), env.clone()).unwrap();

        let err = registry
            .call(
                PACKAGE_PATH,
                GET_KIND,
                Arguments::from_pairs([("key", Value::Boolean(true))]),
            )
            .unwrap_err();
        assert_eq!(
            err,
            RuntimeError::TypeError {
                expected: "string".to_string(),
                actual: "bool".to_string(),
                operation: "argument key".to_string(),
            }
        );
        assert_eq!(env.reads(), 0);
    }
}
