//! Process environment access.
//!
//! | Type | Backing | `Send + Sync` |
//! |------|---------|---------------|
//! | [`SystemEnv`] | `std::env` | Yes (zero-sized) |
//! | [`InMemoryEnv`]* | `RwLock<HashMap>` | Yes |
//!
//! *Available with `#[cfg(test)]` or the `"test-support"` feature.

use std::env;
use std::sync::Arc;

pub trait ReadEnv {
    fn var(&self, key: &str) -> Result<String, env::VarError>;
}

impl<E: ReadEnv + ?Sized> ReadEnv for Arc<E> {
    #[inline]
    fn var(&self, key: &str) -> Result<String, env::VarError> {
        (**self).var(key)
    }
}

impl<E: ReadEnv + ?Sized> ReadEnv for &E {
    #[inline]
    fn var(&self, key: &str) -> Result<String, env::VarError> {
        (**self).var(key)
    }
}

/// The live process environment.
///
/// Values come back byte-for-byte, empty ones included; deciding what an
/// empty value means is left to the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl ReadEnv for SystemEnv {
    #[inline]
    fn var(&self, key: &str) -> Result<String, env::VarError> {
        env::var(key)
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use in_memory::InMemoryEnv;

#[cfg(any(test, feature = "test-support"))]
mod in_memory {
    use std::collections::HashMap;
    use std::env::VarError;
    use std::ffi::OsString;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::RwLock;

    use super::ReadEnv;

    /// Environment double that also counts reads.
    #[derive(Debug, Default)]
    pub struct InMemoryEnv {
        vars: RwLock<HashMap<String, Result<String, OsString>>>,
        reads: AtomicUsize,
    }

    impl InMemoryEnv {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_vars<I, K, V>(vars: I) -> Self
        where
            I: IntoIterator<Item = (K, V)>,
            K: Into<String>,
            V: Into<String>,
        {
            let env = Self::new();
            for (k, v) in vars {
                env.set(k, v);
            }
            env
        }

        pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
            self.vars
                .write()
                .unwrap_or_else(|e| e.into_inner())
                .insert(key.into(), Ok(value.into()));
        }

        /// Stores a value that is not valid Unicode.
        pub fn set_raw(&self, key: impl Into<String>, value: OsString) {
            self.vars
                .write()
                .unwrap_or_else(|e| e.into_inner())
                .insert(key.into(), Err(value));
        }

        pub fn remove(&self, key: &str) {
            self.vars
                .write()
                .unwrap_or_else(|e| e.into_inner())
                .remove(key);
        }

        /// Number of lookups served so far.
        pub fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    impl ReadEnv for InMemoryEnv {
        fn var(&self, key: &str) -> Result<String, VarError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            match self
                .vars
                .read()
                .unwrap_or_else(|e| e.into_inner())
                .get(key)
            {
                Some(Ok(value)) => Ok(value.clone()),
                Some(Err(raw)) => Err(VarError::NotUnicode(raw.clone())),
                None => Err(VarError::NotPresent),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_env_reads_live_values_verbatim() {
        const KEY: &str = "QRT_SECRETS_SYSTEM_ENV_TEST";

        env::set_var(KEY, "  value=with spaces \n");
        assert_eq!(SystemEnv.var(KEY), Ok("  value=with spaces \n".to_string()));

        env::set_var(KEY, "");
        assert_eq!(SystemEnv.var(KEY), Ok(String::new()));

        env::remove_var(KEY);
        assert_eq!(SystemEnv.var(KEY), Err(env::VarError::NotPresent));
    }

    #[test]
    fn test_in_memory_env_counts_reads() {
        let env = InMemoryEnv::with_vars([("A", "1")]);
        assert_eq!(env.var("A"), Ok("1".to_string()));
        assert_eq!(env.var("B"), Err(std::env::VarError::NotPresent));
        env.remove("A");
        assert_eq!(env.var("A"), Err(std::env::VarError::NotPresent));
        assert_eq!(env.reads(), 3);
    }

    #[test]
    fn test_shared_env_reads_through_arc() {
        let env = Arc::new(InMemoryEnv::new());
        env.set("SHARED", "yes");
        let handle: Arc<InMemoryEnv> = Arc::clone(&env);
        assert_eq!(handle.var("SHARED"), Ok("yes".to_string()));
        assert_eq!(env.reads(), 1);
    }
}
