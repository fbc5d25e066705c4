// Package Registry - dispatch table for builtin packages
// Packages declare builtin types, then register values under (package path, name)

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::runtime::arguments::Arguments;
use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::signature::{parse_declarations, FunctionSignature};
use crate::runtime::values::Value;

/// A registered package: its declared builtin types and the values bound to them.
#[derive(Debug, Default)]
struct Package {
    builtin_types: IndexMap<String, FunctionSignature>,
    values: IndexMap<String, Value>,
}

/// Registry that maps package paths (e.g. `contrib/qxip/secrets`) to their
/// exported values. Owned by the host and shared across callers.
#[derive(Debug, Default)]
pub struct PackageRegistry {
    packages: RwLock<HashMap<String, Package>>,
}

impl PackageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `source` and records its builtin types under `path`.
    ///
    /// A `package` clause, when present, must match the last segment of
    /// `path`. Redeclaring a builtin with the same signature is a no-op. A
    /// source with any conflicting declaration records nothing.
    pub fn declare_builtins(&self, path: &str, source: &str) -> RuntimeResult<()> {
        let decls = parse_declarations(source)?;
        if let Some(package) = &decls.package {
            let last_segment = path.rsplit('/').next().unwrap_or(path);
            if package != last_segment {
                return Err(RuntimeError::SignatureParse(format!(
                    "package clause {} does not match package path {}",
                    package, path
                )));
            }
        }

        let mut packages = self.write()?;
        if let Some(package) = packages.get(path) {
            for decl in &decls.builtins {
                match package.builtin_types.get(&decl.name) {
                    Some(existing) if *existing != decl.signature => {
                        warn!(package = path, name = %decl.name, "conflicting builtin declaration");
                        return Err(RuntimeError::DuplicateRegistration {
                            package: path.to_string(),
                            name: decl.name.clone(),
                        });
                    }
                    _ => {}
                }
            }
        }

        let package = packages.entry(path.to_string()).or_default();
        for decl in decls.builtins {
            if package.builtin_types.contains_key(&decl.name) {
                continue;
            }
            debug!(package = path, name = %decl.name, signature = %decl.signature, "declared builtin");
            package.builtin_types.insert(decl.name, decl.signature);
        }
        Ok(())
    }

    /// Returns the declared type of builtin `name` in package `path`.
    pub fn lookup_builtin_type(&self, path: &str, name: &str) -> RuntimeResult<FunctionSignature> {
        let packages = self.read()?;
        let package = packages
            .get(path)
            .ok_or_else(|| RuntimeError::ModuleNotFound(path.to_string()))?;
        package
            .builtin_types
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::SymbolNotFound(format!("{}.{}", path, name)))
    }

    /// Binds `value` to `name` in package `path`. Each name registers once.
    ///
    /// A function registered under a declared builtin must carry the declared
    /// signature.
    pub fn register_package_value(&self, path: &str, name: &str, value: Value) -> RuntimeResult<()> {
        let mut packages = self.write()?;
        let package = packages.entry(path.to_string()).or_default();

        if package.values.contains_key(name) {
            warn!(package = path, name, "duplicate package value registration");
            return Err(RuntimeError::DuplicateRegistration {
                package: path.to_string(),
                name: name.to_string(),
            });
        }

        if let (Some(declared), Value::Function(func)) = (package.builtin_types.get(name), &value) {
            if *declared != func.signature {
                return Err(RuntimeError::TypeError {
                    expected: declared.to_string(),
                    actual: func.signature.to_string(),
                    operation: format!("register {}.{}", path, name),
                });
            }
        }

        debug!(package = path, name, kind = value.type_name(), "registered package value");
        package.values.insert(name.to_string(), value);
        Ok(())
    }

    pub fn lookup(&self, path: &str, name: &str) -> RuntimeResult<Option<Value>> {
        let packages = self.read()?;
        Ok(packages
            .get(path)
            .and_then(|p| p.values.get(name))
            .cloned())
    }

    /// Dispatches a call to the builtin registered as `path.name`.
    pub fn call(&self, path: &str, name: &str, args: Arguments) -> RuntimeResult<Value> {
        // Clone the function out so the lock is not held while it runs.
        let function = match self.lookup(path, name)? {
            Some(Value::Function(f)) => f,
            Some(_) => return Err(RuntimeError::NotCallable(format!("{}.{}", path, name))),
            None if !self.contains_package(path)? => {
                return Err(RuntimeError::ModuleNotFound(path.to_string()))
            }
            None => return Err(RuntimeError::SymbolNotFound(format!("{}.{}", path, name))),
        };
        function.call(args)
    }

    pub fn contains_package(&self, path: &str) -> RuntimeResult<bool> {
        Ok(self.read()?.contains_key(path))
    }

    /// Registered package paths, sorted.
    pub fn package_paths(&self) -> RuntimeResult<Vec<String>> {
        let mut paths: Vec<String> = self.read()?.keys().cloned().collect();
        paths.sort();
        Ok(paths)
    }

    /// Names exported by package `path` in registration order.
    pub fn package_exports(&self, path: &str) -> RuntimeResult<Vec<String>> {
        let packages = self.read()?;
        let package = packages
            .get(path)
            .ok_or_else(|| RuntimeError::ModuleNotFound(path.to_string()))?;
        Ok(package.values.keys().cloned().collect())
    }

    fn read(&self) -> RuntimeResult<RwLockReadGuard<'_, HashMap<String, Package>>> {
        self.packages
            .read()
            .map_err(|e| RuntimeError::InternalError(format!("RwLock poisoned: {}", e)))
    }

    fn write(&self) -> RuntimeResult<RwLockWriteGuard<'_, HashMap<String, Package>>> {
        self.packages
            .write()
            .map_err(|e| RuntimeError::InternalError(format!("RwLock poisoned: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_clause_must_match_path() {
        let registry = PackageRegistry::new();
        let err = registry
            .declare_builtins("contrib/acme/strings", "package other\nbuiltin f : () => int")
            .unwrap_err();
        assert!(matches!(err, RuntimeError::SignatureParse(_)));
        assert!(!registry.contains_package("contrib/acme/strings").unwrap());
    }

    #[test]
    fn redeclaring_same_signature_is_idempotent() {
        let registry = PackageRegistry::new();
        let source = "builtin f : (x: int) => int";
        registry.declare_builtins("math", source).unwrap();
        registry.declare_builtins("math", source).unwrap();
        let err = registry
            .declare_builtins("math", "builtin f : (x: float) => float")
            .unwrap_err();
        assert_eq!(
            err,
            RuntimeError::DuplicateRegistration {
                package: "math".to_string(),
                name: "f".to_string()
            }
        );
    }

    #[test]
    fn conflicting_source_declares_nothing() {
        let registry = PackageRegistry::new();
        registry
            .declare_builtins("math", "builtin f : (x: int) => int")
            .unwrap();
        let err = registry
            .declare_builtins("math", "builtin g : () => int\nbuiltin f : (x: float) => float")
            .unwrap_err();
        assert!(matches!(err, RuntimeError::DuplicateRegistration { .. }));
        assert_eq!(
            registry.lookup_builtin_type("math", "g"),
            Err(RuntimeError::SymbolNotFound("math.g".to_string()))
        );
        assert_eq!(
            registry.lookup_builtin_type("math", "f").unwrap().to_string(),
            "(x: int) => int"
        );
    }

    #[test]
    fn package_clause_is_a_single_name() {
        let registry = PackageRegistry::new();
        let err = registry
            .declare_builtins("contrib/qxip/secrets", "package qxip/secrets\nbuiltin get : () => string")
            .unwrap_err();
        assert!(matches!(err, RuntimeError::SignatureParse(_)));
        registry
            .declare_builtins("contrib/qxip/secrets", "package secrets\nbuiltin get : () => string")
            .unwrap();
    }
}
