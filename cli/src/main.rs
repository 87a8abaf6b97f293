use std::fmt::Display;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use bitschema_core::{DataType, SchemaError, ValidatedSchema, ValidationMode};
use bitschema_db::{RegistryConfig, RegistryError, definition_files, load_definition};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Output format for `inspect`.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Table,
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "bitschema")]
#[command(about = "Validate and inspect bit-field schema definitions")]
struct Cli {
    /// Log loader and validation activity to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate schema definition files and/or directories.
    Validate(ValidateArgs),
    /// Print the field layout of one schema definition.
    Inspect(InspectArgs),
    /// Open the registry described by a configuration file.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Definition files (.yaml, .yml, .json) and/or directories containing them.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Report only the first failure of each schema.
    #[arg(long)]
    fail_fast: bool,
}

#[derive(Debug, Args)]
struct InspectArgs {
    /// Definition file to inspect.
    input: PathBuf,
    /// Only show this view.
    #[arg(long)]
    view: Option<String>,
    /// Output format.
    #[arg(long, default_value = "table")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Path to the registry configuration YAML.
    #[arg(long)]
    config: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Validate(args) => run_validate(args),
        Command::Inspect(args) => run_inspect(args),
        Command::Check(args) => run_check(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn collect_definition_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, String> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let files = definition_files(input)
                .map_err(|err| format!("Failed to read '{}': {err}", input.display()))?;
            paths.extend(files);
        } else if input.is_file() {
            paths.push(input.clone());
        } else {
            return Err(format!("Definition path '{}' does not exist", input.display()));
        }
    }
    Ok(paths)
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let mode = if args.fail_fast {
        ValidationMode::FailFast
    } else {
        ValidationMode::CollectAll
    };
    let paths = collect_definition_paths(&args.inputs)?;
    if paths.is_empty() {
        return Err("No schema definition files found".to_string());
    }

    let mut failed = 0usize;
    for path in &paths {
        debug!(path = %path.display(), "Validating definition");
        match load_definition(path, mode) {
            Ok(schema) => println!(
                "ok: {} ({}: {} view(s), {} record(s), {} field(s))",
                path.display(),
                schema.name(),
                schema.view_count(),
                schema.record_count(),
                schema.field_count()
            ),
            Err(err) => {
                failed += 1;
                print_failure(path.display(), &err, usize::MAX);
            }
        }
    }

    if failed > 0 {
        return Err(format!(
            "{failed} of {} schema definition(s) failed validation",
            paths.len()
        ));
    }
    println!("Validated {} schema definition(s).", paths.len());
    Ok(())
}

fn print_failure(label: impl Display, err: &RegistryError, limit: usize) {
    let errors: &[SchemaError] = err.schema_errors();
    if errors.is_empty() {
        eprintln!("failed: {label}: {err}");
        return;
    }

    eprintln!("failed: {label} ({} error(s))", errors.len());
    for error in errors.iter().take(limit) {
        eprintln!("  - {error}");
    }
    if errors.len() > limit {
        eprintln!("  ... {} more", errors.len() - limit);
    }
}

// ---------------------------------------------------------------------------
// inspect
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct FieldLayout {
    path: String,
    data_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    element_bits: Option<u32>,
    offset: u64,
    bit_length: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fragments: Vec<[u64; 2]>,
}

fn field_layouts(schema: &ValidatedSchema, view: Option<&str>) -> Vec<FieldLayout> {
    schema
        .views()
        .filter(|v| view.is_none_or(|name| v.name() == name))
        .flat_map(|v| v.records())
        .flat_map(|r| r.fields())
        .map(|field| {
            let data_type = field.data_type();
            FieldLayout {
                path: field.path(),
                data_type: data_type.to_string(),
                element_bits: match data_type {
                    DataType::IntegerArray { element_bits } => Some(element_bits),
                    _ => None,
                },
                offset: field.absolute_bit_offset(),
                bit_length: field.bit_length(),
                fragments: field
                    .fragments()
                    .iter()
                    .map(|f| [u64::from(f.offset()), f.end()])
                    .collect(),
            }
        })
        .collect()
}

fn run_inspect(args: InspectArgs) -> Result<(), String> {
    let schema = load_definition(&args.input, ValidationMode::CollectAll).map_err(|err| {
        print_failure(args.input.display(), &err, usize::MAX);
        format!("Cannot inspect '{}'", args.input.display())
    })?;

    if let Some(view) = &args.view {
        if schema.view(view).is_none() {
            return Err(format!("Schema '{}' has no view '{view}'", schema.name()));
        }
    }

    let layouts = field_layouts(&schema, args.view.as_deref());
    match args.format {
        CliOutputFormat::Json => {
            let json = serde_json::to_string_pretty(&layouts)
                .map_err(|e| format!("Failed to serialize layout: {e}"))?;
            println!("{json}");
        }
        CliOutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(&layouts)
                .map_err(|e| format!("Failed to serialize layout: {e}"))?;
            print!("{yaml}");
        }
        CliOutputFormat::Table => print!("{}", format_table(&schema, &layouts)),
    }
    Ok(())
}

fn format_table(schema: &ValidatedSchema, layouts: &[FieldLayout]) -> String {
    let path_width = layouts
        .iter()
        .map(|l| l.path.len())
        .max()
        .unwrap_or(0)
        .max("PATH".len());

    let mut out = format!("{} - {}\n", schema.name(), schema.description());
    out.push_str(&format!(
        "{:<path_width$}  {:<14}  {:>8}  {:>6}  FRAGMENTS\n",
        "PATH", "TYPE", "OFFSET", "BITS"
    ));
    for layout in layouts {
        let data_type = match layout.element_bits {
            Some(bits) => format!("{}({bits})", layout.data_type),
            None => layout.data_type.clone(),
        };
        let fragments: Vec<String> = layout
            .fragments
            .iter()
            .map(|[start, end]| format!("[{start}..{end})"))
            .collect();
        out.push_str(&format!(
            "{:<path_width$}  {:<14}  {:>8}  {:>6}  {}\n",
            layout.path,
            data_type,
            layout.offset,
            layout.bit_length,
            fragments.join(" ")
        ));
    }
    out
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

fn run_check(args: CheckArgs) -> Result<(), String> {
    let config = RegistryConfig::load(&args.config)
        .map_err(|e| format!("Failed to load config '{}': {e}", args.config.display()))?;
    let base_dir = args
        .config
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let registry = config.open_registry(base_dir).map_err(|err| {
        if let RegistryError::SourcesFailed { failures } = &err {
            let limit = config.validation.max_reported_errors;
            for failure in failures {
                match failure.error.path() {
                    Some(path) => print_failure(path.display(), &failure.error, limit),
                    None => print_failure(&failure.source, &failure.error, limit),
                }
            }
        }
        format!(
            "Failed to open registry from '{}': {err}",
            args.config.display()
        )
    })?;

    for name in registry.names() {
        if let Some(schema) = registry.get(name) {
            println!(
                "{name}: {} view(s), {} field(s)",
                schema.view_count(),
                schema.field_count()
            );
        }
    }
    println!("Loaded {} schema(s).", registry.len());
    Ok(())
}
