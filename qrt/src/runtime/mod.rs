// Runtime boundary modules: values, errors, argument binding, signatures, registry

pub mod arguments;
pub mod error;
pub mod registry;
pub mod signature;
pub mod values;

pub use arguments::Arguments;
pub use error::{RuntimeError, RuntimeResult};
pub use registry::PackageRegistry;
pub use signature::{
    parse_declarations, BuiltinDeclaration, BuiltinDeclarations, FunctionSignature, MonoType,
    Parameter,
};
pub use values::{BuiltinFn, BuiltinFunction, Value};
