use anyhow::Result;
use clap::Parser;
use debuglog::cli::{split_call, Cli, OutputFormat};
use debuglog::marker::{method_key, MarkerRegistry};
use debuglog::CallConfig;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// One resolved call site
#[derive(Debug, Serialize)]
struct Resolved {
    call: String,
    marked: bool,
    threshold: u64,
    unit: &'static str,
    show_stack: bool,
}

impl Resolved {
    fn new(call: String, marked: bool, config: CallConfig) -> Self {
        Self {
            call,
            marked,
            threshold: config.threshold,
            unit: config.unit.label(),
            show_stack: config.show_stack,
        }
    }
}

/// Resolve the requested call sites, or every marker when none were requested
fn resolve_calls(registry: &MarkerRegistry, calls: &[String]) -> Vec<Resolved> {
    if calls.is_empty() {
        let types = registry
            .types
            .iter()
            .map(|(name, marker)| Resolved::new(format!("{}::*", name), true, marker.config()));
        let methods = registry.methods.keys().map(|key| {
            let (type_name, method) = split_call(key);
            Resolved::new(key.clone(), true, registry.config_for(type_name, method))
        });
        return types.chain(methods).collect();
    }

    calls
        .iter()
        .map(|call| {
            let (type_name, method) = split_call(call);
            Resolved::new(
                method_key(type_name, method),
                registry.is_marked(type_name, method),
                registry.config_for(type_name, method),
            )
        })
        .collect()
}

fn print_text(resolved: &[Resolved]) {
    if resolved.is_empty() {
        println!("No markers defined.");
        return;
    }

    println!("{:<40} {:>7} {:>12} {:>6} {:>10}", "Call", "Marked", "Threshold", "Unit", "Stack");
    println!("{}", "─".repeat(79));
    for entry in resolved {
        println!(
            "{:<40} {:>7} {:>12} {:>6} {:>10}",
            entry.call,
            if entry.marked { "yes" } else { "no" },
            entry.threshold,
            entry.unit,
            if entry.show_stack { "yes" } else { "no" },
        );
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let registry = MarkerRegistry::from_file(&args.markers)?;
    let resolved = resolve_calls(&registry, &args.calls);
    tracing::debug!(count = resolved.len(), "resolved call sites");

    match args.format {
        OutputFormat::Text => print_text(&resolved),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&resolved)?),
    }

    Ok(())
}
