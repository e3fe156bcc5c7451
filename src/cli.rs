//! CLI argument parsing for debuglog

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for resolved configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "debuglog")]
#[command(version)]
#[command(about = "Resolve call logging markers for types and methods", long_about = None)]
pub struct Cli {
    /// Marker file (TOML with [types.*] and [methods."Type::method"] tables)
    #[arg(value_name = "MARKERS")]
    pub markers: PathBuf,

    /// Call site to resolve as Type::method (repeatable; default: every marker)
    #[arg(short = 'c', long = "call", value_name = "TYPE::METHOD")]
    pub calls: Vec<String>,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

/// Split `Type::method` at its last `::`
///
/// A bare name is treated as a type with an empty method name.
pub fn split_call(call: &str) -> (&str, &str) {
    match call.rsplit_once("::") {
        Some((type_name, method)) => (type_name, method),
        None => (call, ""),
    }
}
