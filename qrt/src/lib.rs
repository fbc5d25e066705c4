//! QRT - host runtime boundary for builtin packages
//!
//! This crate models the surfaces a builtin function package touches when it
//! plugs into the query runtime:
//! - the [`Value`] sum type passed across the interpreter boundary
//! - the [`Arguments`] object builtins extract their parameters from
//! - builtin type signatures and their declaration format
//! - the [`PackageRegistry`] dispatch table
//!
//! It is not an interpreter. Packages register themselves through an explicit
//! call made during the host's startup sequence.

pub mod runtime;

pub use runtime::{
    Arguments, BuiltinFunction, FunctionSignature, MonoType, PackageRegistry, Parameter,
    RuntimeError, RuntimeResult, Value,
};
