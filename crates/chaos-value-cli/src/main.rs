//! `chaos-json` CLI: normalize and inspect JSON through the chaos-value model.
//!
//! ## Usage
//!
//! ```sh
//! # Re-encode with sorted keys and integer/float disambiguation (stdin → stdout)
//! echo '{"b":2.0,"a":[1.5]}' | chaos-json normalize
//! # {"a":[1.5],"b":2}
//!
//! # Pretty-print from file to file
//! chaos-json normalize --pretty -i data.json -o data.pretty.json
//!
//! # One line per node: `<path>: <kind>`
//! echo '{"raw":"b64.AQI=","n":-1}' | chaos-json inspect
//!
//! # Re-key the top-level object
//! echo '{"userId":1}' | chaos-json keys --case snake
//!
//! # Build an object from key/value arguments
//! chaos-json object name apple age 20
//!
//! # Show codec registration and processing logs
//! chaos-json -v normalize -i data.json
//! ```

use anyhow::{Context, Result};
use chaos_value::{codec, CodecRegistry, Object, Value};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "chaos-json",
    version,
    about = "Normalize and inspect JSON through the chaos-value model"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode JSON into a Value and re-encode it with the codec rules
    Normalize {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Indent the output
        #[arg(long)]
        pretty: bool,
    },
    /// Print the path and kind of every node
    Inspect {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Re-key the top-level object
    Keys {
        /// Target key case
        #[arg(long, value_enum)]
        case: KeyCase,
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Build an object from KEY VALUE pairs; values are parsed as JSON when possible
    Object {
        #[arg(required = true, value_name = "KEY VALUE")]
        pairs: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KeyCase {
    Snake,
    Camel,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let registry = CodecRegistry::with_defaults();

    match cli.command {
        Commands::Normalize {
            input,
            output,
            pretty,
        } => {
            let value = read_value(input.as_deref())?;
            let encoded = if pretty {
                codec::to_string_pretty(&registry, &value)
            } else {
                codec::to_string(&registry, &value)
            }
            .context("Failed to encode value")?;
            tracing::debug!(kind = %value.kind(), bytes = encoded.len(), "normalized");
            write_output(output.as_deref(), &encoded)?;
        }
        Commands::Inspect { input } => {
            let value = read_value(input.as_deref())?;
            let mut lines = Vec::new();
            inspect("$", &value, &mut lines);
            println!("{}", lines.join("\n"));
        }
        Commands::Keys {
            case,
            input,
            output,
        } => {
            let value = read_value(input.as_deref())?;
            let obj = match value {
                Value::Object(obj) => obj,
                other => anyhow::bail!("Input must be a JSON object, found {}", other.kind()),
            };
            let rekeyed = match case {
                KeyCase::Snake => obj.to_snake_keys(),
                KeyCase::Camel => obj.to_lower_camel_keys(),
            };
            let encoded =
                codec::to_string(&registry, &rekeyed).context("Failed to encode object")?;
            write_output(output.as_deref(), &encoded)?;
        }
        Commands::Object { pairs } => {
            let items = pairs.iter().enumerate().map(|(i, arg)| {
                if i % 2 == 0 {
                    Value::string(arg.as_str())
                } else {
                    parse_arg(arg)
                }
            });
            let obj = Object::from_key_vals(items).context("Failed to build object")?;
            let encoded = codec::to_string(&registry, &obj).context("Failed to encode object")?;
            println!("{}", encoded);
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// A value argument: JSON when it parses, otherwise a plain string.
fn parse_arg(arg: &str) -> Value {
    serde_json::from_str::<serde_json::Value>(arg)
        .ok()
        .and_then(|node| Value::from_json_node(&node).ok())
        .unwrap_or_else(|| Value::string(arg))
}

/// Appends `<path>: <kind>` for `value` and every node below it.
fn inspect(path: &str, value: &Value, lines: &mut Vec<String>) {
    lines.push(format!("{}: {}", path, value.kind()));
    match value {
        Value::Object(obj) => {
            for (key, child) in obj {
                inspect(&format!("{path}.{key}"), child, lines);
            }
        }
        Value::Array(vals) => {
            for (i, child) in vals.iter().enumerate() {
                inspect(&format!("{path}[{i}]"), child, lines);
            }
        }
        _ => {}
    }
}

fn read_value(path: Option<&str>) -> Result<Value> {
    let text = read_input(path)?;
    let node: serde_json::Value = serde_json::from_str(&text).context("Input is not valid JSON")?;
    Value::from_json_node(&node).context("Failed to decode value")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
