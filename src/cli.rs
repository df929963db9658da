//! Command-line interface for docweave.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::{self, Config};
use crate::pipeline::Pipeline;
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Directories never descended into.
const SKIPPED_DIRS: &[&str] = &["bin", "obj", "node_modules", "packages"];

/// Suffixes of tool-generated C# files.
const GENERATED_SUFFIXES: &[&str] = &[".g.cs", ".g.i.cs", ".designer.cs", ".generated.cs"];

/// Structural analysis and XML documentation for C# sources.
///
/// docweave parses C# files, recovers the documentation they already carry,
/// and writes `/// <summary>` blocks for types and methods that lack one.
#[derive(Parser)]
#[command(name = "docweave")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Show debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write documentation into C# files
    Apply(ApplyArgs),
    /// Print the extracted structural model as JSON
    Model(ModelArgs),
    /// Create a docweave config file from a template
    Init(InitArgs),
}

/// Output format of the apply command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

/// Arguments for the apply command.
#[derive(Args)]
pub struct ApplyArgs {
    /// File or directory to process
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Compute the new text without writing any file
    #[arg(long)]
    pub dry_run: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: OutputFormat,
}

/// Arguments for the model command.
#[derive(Args)]
pub struct ModelArgs {
    /// File or directory to analyze
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the init command.
#[derive(Args)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "docweave.yaml")]
    pub output: PathBuf,

    /// Template to use
    #[arg(short, long, default_value = "default")]
    pub template: String,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,

    /// List available templates
    #[arg(short, long)]
    pub list: bool,
}

/// Available config templates.
struct Template {
    name: &'static str,
    description: &'static str,
    content: &'static str,
}

/// All available templates.
static TEMPLATES: &[Template] = &[
    Template {
        name: "default",
        description: "Offline, rule-based summaries",
        content: include_str!("templates/default.yaml"),
    },
    Template {
        name: "remote",
        description: "Summaries from an HTTP summarization service",
        content: include_str!("templates/remote.yaml"),
    },
];

/// Set up logging on stderr; stdout is reserved for reports.
pub fn init_logging(verbose: bool, quiet: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    let _ = builder.target(env_logger::Target::Stderr).try_init();
}

/// Collect the C# files under `root`.
///
/// Hidden directories and build output (`bin`, `obj`, ...) are skipped, as
/// are generated files unless the config includes them. Results are sorted.
pub fn collect_files(root: &Path, config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    let excluded = config.exclusion_set()?;
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            !name.starts_with('.') && !SKIPPED_DIRS.contains(&name.as_ref())
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("cs") {
            continue;
        }
        if !config.include_generated && is_generated(path) {
            log::debug!("skipping generated file {}", path.display());
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        if excluded.is_match(relative) || excluded.is_match(path) {
            log::debug!("skipping excluded file {}", path.display());
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

fn is_generated(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    GENERATED_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Shared setup of `apply` and `model`: load config, resolve the input path.
struct Prepared {
    config: Config,
    config_label: String,
    path: PathBuf,
    files: Vec<PathBuf>,
}

fn prepare(path: &Path, config_path: Option<&Path>) -> Result<Prepared, i32> {
    let abs_path = match path.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            log::error!("cannot access path {:?}: {}", path, e);
            return Err(EXIT_ERROR);
        }
    };

    let config_dir = if abs_path.is_dir() {
        abs_path.clone()
    } else {
        abs_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    };
    let discovered = match config_path {
        Some(p) => Some(p.to_path_buf()),
        None => config::discover(&config_dir).or_else(|| config::discover(Path::new("."))),
    };

    let config = match Config::load(discovered.as_deref(), &config_dir) {
        Ok(c) => c,
        Err(e) => {
            log::error!("invalid config: {}", e);
            return Err(EXIT_ERROR);
        }
    };
    let config_label = discovered
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(defaults)".to_string());

    let files = if abs_path.is_dir() {
        match collect_files(&abs_path, &config) {
            Ok(f) => f,
            Err(e) => {
                log::error!("failed to list files: {}", e);
                return Err(EXIT_ERROR);
            }
        }
    } else {
        vec![abs_path.clone()]
    };

    Ok(Prepared {
        config,
        config_label,
        path: abs_path,
        files,
    })
}

/// Run the apply command.
pub fn run_apply(args: &ApplyArgs) -> anyhow::Result<i32> {
    let prepared = match prepare(&args.path, args.config.as_deref()) {
        Ok(p) => p,
        Err(code) => return Ok(code),
    };

    if prepared.files.is_empty() {
        log::warn!("no C# files found under {}", prepared.path.display());
        return Ok(EXIT_SUCCESS);
    }
    log::info!(
        "processing {} files{}",
        prepared.files.len(),
        if args.dry_run { " (dry run)" } else { "" }
    );

    let pipeline = match Pipeline::new(prepared.config) {
        Ok(p) => p.dry_run(args.dry_run),
        Err(e) => {
            log::error!("cannot create summary generator: {}", e);
            return Ok(EXIT_ERROR);
        }
    };
    let batch = pipeline.analyze_and_document(&prepared.files);

    match args.format {
        OutputFormat::Json => report::write_json(&prepared.path, &prepared.config_label, &batch)?,
        OutputFormat::Pretty => {
            report::write_pretty(&prepared.path, &prepared.config_label, &batch)
        }
    }

    if batch.has_failures() {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the model command.
pub fn run_model(args: &ModelArgs) -> anyhow::Result<i32> {
    let prepared = match prepare(&args.path, args.config.as_deref()) {
        Ok(p) => p,
        Err(code) => return Ok(code),
    };

    // The model needs no generator, so the generator settings are not used.
    let pipeline = Pipeline::with_generator(
        prepared.config,
        Box::new(crate::generate::TemplateGenerator::new()),
    );
    let batch = pipeline.analyze(&prepared.files);
    report::write_model_json(&prepared.path, &batch)?;

    if batch.has_failures() {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.list {
        return list_templates();
    }

    let template = match TEMPLATES.iter().find(|t| t.name == args.template) {
        Some(t) => t,
        None => {
            log::error!("unknown template {:?}", args.template);
            eprintln!("Run 'docweave init --list' to see available templates");
            return Ok(EXIT_ERROR);
        }
    };

    if args.output.exists() && !args.force {
        log::error!("file already exists: {}", args.output.display());
        eprintln!("Use --force to overwrite it or --output to choose another path");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                log::error!("failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, template.content) {
        log::error!("failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {} from template '{}'", args.output.display(), template.name);
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to customize for your project", args.output.display());
    println!("  2. Preview: docweave apply . --dry-run --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}

/// List available templates.
fn list_templates() -> anyhow::Result<i32> {
    println!("Available templates:");
    println!();

    for template in TEMPLATES {
        let name = if template.name == "default" {
            format!("{} (default)", template.name)
        } else {
            template.name.to_string()
        };
        println!("  {:<20} {}", name, template.description);
    }

    println!();
    println!("Usage:");
    println!("  docweave init --template <name>");

    Ok(EXIT_SUCCESS)
}
