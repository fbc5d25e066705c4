// qrt-secrets - resolve secrets.get from the command line
// Registers the contrib/qxip/secrets package into a fresh registry and dispatches through it

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use qrt::{Arguments, PackageRegistry, Value};
use qrt_secrets::get::KEY_ARGUMENT;
use qrt_secrets::package::{self, GET_KIND, PACKAGE_PATH};
use qrt_secrets::{MissingPolicy, SecretsConfig};

#[derive(Debug, Parser)]
#[command(name = "qrt-secrets")]
#[command(about = "Resolve contrib/qxip/secrets lookups against the process environment")]
#[command(version)]
struct Args {
    /// Package configuration file (TOML)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Fail when the variable is unset or empty
    #[arg(long, global = true)]
    strict: bool,

    /// Print the result as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Call secrets.get with the given key
    Get {
        /// Environment variable name
        key: String,
    },
    /// Call secrets.get with a JSON object of named arguments
    Call {
        /// e.g. '{"key": "API_TOKEN"}'
        #[arg(value_name = "JSON")]
        arguments: String,
    },
    /// Print the registered signature of secrets.get
    Signature,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Runs one command and returns what it prints.
fn run(args: Args) -> Result<String> {
    let mut config = match &args.config {
        Some(path) => SecretsConfig::load(path)?,
        None => SecretsConfig::default(),
    };
    if args.strict {
        config.missing = MissingPolicy::Error;
    }

    let registry = PackageRegistry::new();
    package::register(&registry, &config).context("registering secrets package")?;

    let call_args = match args.command {
        Command::Get { key } => Arguments::from_pairs([(KEY_ARGUMENT, key)]),
        Command::Call { arguments } => {
            let parsed: serde_json::Value =
                serde_json::from_str(&arguments).context("parsing call arguments")?;
            Arguments::from_record(Value::from(parsed))?
        }
        Command::Signature => {
            let sig = registry.lookup_builtin_type(PACKAGE_PATH, GET_KIND)?;
            return Ok(format!("{}.{} : {}", PACKAGE_PATH, GET_KIND, sig));
        }
    };

    let value = registry.call(PACKAGE_PATH, GET_KIND, call_args)?;
    render_value(&value, args.json)
}

/// Plain output prints strings raw and nil as nothing.
fn render_value(value: &Value, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string(&value.to_json())?);
    }
    Ok(match value {
        Value::Nil => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}
