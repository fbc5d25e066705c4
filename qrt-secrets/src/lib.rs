//! `contrib/qxip/secrets` - environment-backed secret lookup for QRT scripts.
//!
//! Exposes a single builtin, `secrets.get(key: string) => string`, that reads
//! a process environment variable. The host wires it in explicitly during
//! startup:
//!
//! ```no_run
//! use qrt::{Arguments, PackageRegistry};
//! use qrt_secrets::{package, SecretsConfig};
//!
//! let registry = PackageRegistry::new();
//! package::register(&registry, &SecretsConfig::default()).unwrap();
//! let token = registry
//!     .call(package::PACKAGE_PATH, package::GET_KIND, Arguments::from_pairs([("key", "API_TOKEN")]))
//!     .unwrap();
//! ```
//!
//! Variables that are unset or empty resolve to `nil` unless the package is
//! configured with [`MissingPolicy::Error`].

pub mod config;
pub mod env;
pub mod error;
pub mod get;
pub mod package;

pub use config::{MissingPolicy, SecretsConfig};
pub use env::{ReadEnv, SystemEnv};
pub use error::SecretError;
pub use get::EnvSecretAccessor;
