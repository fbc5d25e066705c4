//! Builtin type signatures.
//!
//! Packages declare the types of their builtins in a small source format that
//! the registry parses at registration time:
//!
//! ```text
//! package secrets
//!
//! builtin get : (key: string) => string
//! ```
//!
//! Optional parameters carry a `?` prefix, arrays are written `[T]` and
//! single upper-case letters (optionally followed by digits) are type
//! variables.

use crate::runtime::arguments::Arguments;
use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::values::Value;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

#[derive(Parser)]
#[grammar = "runtime/declarations.pest"]
struct DeclarationParser;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MonoType {
    String,
    Int,
    UInt,
    Float,
    Bool,
    Array(Box<MonoType>),
    Var(String),
}

impl MonoType {
    /// Whether a runtime value inhabits this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (MonoType::Var(_), _) => true,
            (MonoType::String, Value::String(_)) => true,
            (MonoType::Int, Value::Integer(_)) => true,
            (MonoType::UInt, Value::Integer(i)) => *i >= 0,
            (MonoType::Float, Value::Float(_)) => true,
            (MonoType::Bool, Value::Boolean(_)) => true,
            (MonoType::Array(elem), Value::Vector(items)) => items.iter().all(|v| elem.accepts(v)),
            _ => false,
        }
    }
}

impl fmt::Display for MonoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonoType::String => write!(f, "string"),
            MonoType::Int => write!(f, "int"),
            MonoType::UInt => write!(f, "uint"),
            MonoType::Float => write!(f, "float"),
            MonoType::Bool => write!(f, "bool"),
            MonoType::Array(elem) => write!(f, "[{}]", elem),
            MonoType::Var(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub ty: MonoType,
    pub required: bool,
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.required {
            write!(f, "?")?;
        }
        write!(f, "{}: {}", self.name, self.ty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub parameters: Vec<Parameter>,
    pub returns: MonoType,
}

impl FunctionSignature {
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn required_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(|p| p.required)
    }

    /// Checks call arguments against the declared parameters.
    ///
    /// Undeclared arguments are reported first, then missing required
    /// parameters and values outside their declared type, in declaration
    /// order.
    pub fn check_arguments(&self, args: &Arguments) -> RuntimeResult<()> {
        let mut undeclared: Vec<String> = args
            .names()
            .filter(|name| self.parameter(name).is_none())
            .map(str::to_string)
            .collect();
        if !undeclared.is_empty() {
            undeclared.sort();
            return Err(RuntimeError::UnusedArguments { names: undeclared });
        }

        for param in &self.parameters {
            match args.peek(&param.name) {
                None if param.required => {
                    return Err(RuntimeError::MissingArgument {
                        name: param.name.clone(),
                    })
                }
                None => {}
                Some(value) if !param.ty.accepts(value) => {
                    return Err(RuntimeError::TypeError {
                        expected: param.ty.to_string(),
                        actual: value.type_name().to_string(),
                        operation: format!("argument {}", param.name),
                    })
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ") => {}", self.returns)
    }
}

impl FromStr for FunctionSignature {
    type Err = RuntimeError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let root = parse_rule(Rule::signature_only, source)?;
        let signature = root
            .into_inner()
            .find(|p| p.as_rule() == Rule::signature)
            .ok_or_else(|| missing("signature"))?;
        build_signature(signature)
    }
}

/// A single `builtin name : signature` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinDeclaration {
    pub name: String,
    pub signature: FunctionSignature,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuiltinDeclarations {
    pub package: Option<String>,
    pub builtins: Vec<BuiltinDeclaration>,
}

/// Parses a declaration source. Builtin names must be unique within it.
pub fn parse_declarations(source: &str) -> RuntimeResult<BuiltinDeclarations> {
    let root = parse_rule(Rule::declarations, source)?;
    let mut out = BuiltinDeclarations::default();
    let mut seen = HashSet::new();

    for pair in root.into_inner() {
        match pair.as_rule() {
            Rule::package_clause => {
                let name = pair
                    .into_inner()
                    .next()
                    .ok_or_else(|| missing("package name"))?;
                out.package = Some(name.as_str().to_string());
            }
            Rule::builtin => {
                let decl = build_builtin(pair)?;
                if !seen.insert(decl.name.clone()) {
                    return Err(RuntimeError::SignatureParse(format!(
                        "builtin {} declared twice",
                        decl.name
                    )));
                }
                out.builtins.push(decl);
            }
            Rule::EOI => {}
            other => {
                return Err(RuntimeError::InternalError(format!(
                    "unexpected rule {:?} in declarations",
                    other
                )))
            }
        }
    }
    Ok(out)
}

fn parse_rule(rule: Rule, source: &str) -> RuntimeResult<Pair<'_, Rule>> {
    DeclarationParser::parse(rule, source)
        .map_err(|e| RuntimeError::SignatureParse(e.to_string()))?
        .next()
        .ok_or_else(|| missing("input"))
}

fn build_builtin(pair: Pair<Rule>) -> RuntimeResult<BuiltinDeclaration> {
    let mut inner = pair.into_inner();
    let name = inner.next().ok_or_else(|| missing("builtin name"))?;
    let signature = inner.next().ok_or_else(|| missing("builtin signature"))?;
    Ok(BuiltinDeclaration {
        name: name.as_str().to_string(),
        signature: build_signature(signature)?,
    })
}

fn build_signature(pair: Pair<Rule>) -> RuntimeResult<FunctionSignature> {
    let mut inner = pair.into_inner();
    let params_pair = inner.next().ok_or_else(|| missing("parameter list"))?;
    let returns_pair = inner.next().ok_or_else(|| missing("return type"))?;

    let mut parameters = Vec::new();
    for param in params_pair.into_inner() {
        let parameter = build_parameter(param)?;
        if parameters.iter().any(|p: &Parameter| p.name == parameter.name) {
            return Err(RuntimeError::SignatureParse(format!(
                "parameter {} declared twice",
                parameter.name
            )));
        }
        parameters.push(parameter);
    }

    Ok(FunctionSignature {
        parameters,
        returns: build_type(returns_pair)?,
    })
}

fn build_parameter(pair: Pair<Rule>) -> RuntimeResult<Parameter> {
    let mut required = true;
    let mut name = None;
    let mut ty = None;
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::optional_marker => required = false,
            Rule::ident => name = Some(part.as_str().to_string()),
            Rule::mono_type => ty = Some(build_type(part)?),
            other => {
                return Err(RuntimeError::InternalError(format!(
                    "unexpected rule {:?} in parameter",
                    other
                )))
            }
        }
    }
    Ok(Parameter {
        name: name.ok_or_else(|| missing("parameter name"))?,
        ty: ty.ok_or_else(|| missing("parameter type"))?,
        required,
    })
}

fn build_type(pair: Pair<Rule>) -> RuntimeResult<MonoType> {
    let inner = pair.into_inner().next().ok_or_else(|| missing("type"))?;
    match inner.as_rule() {
        Rule::array_type => {
            let elem = inner
                .into_inner()
                .next()
                .ok_or_else(|| missing("array element type"))?;
            Ok(MonoType::Array(Box::new(build_type(elem)?)))
        }
        Rule::basic_type => match inner.as_str() {
            "string" => Ok(MonoType::String),
            "int" => Ok(MonoType::Int),
            "uint" => Ok(MonoType::UInt),
            "float" => Ok(MonoType::Float),
            "bool" => Ok(MonoType::Bool),
            other => Err(RuntimeError::SignatureParse(format!(
                "unknown type {}",
                other
            ))),
        },
        Rule::type_var => Ok(MonoType::Var(inner.as_str().to_string())),
        other => Err(RuntimeError::InternalError(format!(
            "unexpected rule {:?} in type",
            other
        ))),
    }
}

fn missing(what: &str) -> RuntimeError {
    RuntimeError::InternalError(format!("declaration parser produced no {}", what))
}
