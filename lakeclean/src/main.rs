//! lakeclean CLI - document and drop rows with missing values
//!
//! # Commands
//!
//! ```bash
//! lakeclean run                         # Clean every lake_change.gpkg under the input root
//! lakeclean run --limit 1               # Test run on the first file only
//! lakeclean discover                    # List the files a run would process
//! lakeclean inspect lake_change.gpkg    # Missing-value summary for one file (JSON)
//! lakeclean config                      # Show the effective configuration
//! ```
//!
//! Configuration comes from `--config <file.toml>`, `LAKECLEAN_*` environment
//! variables (a `.env` file is loaded when present) and the flags below.

use clap::{Args, Parser, Subcommand};
use lakeclean::logging::init_logging;
use lakeclean::{discover_files, inspect_file, run, CleanConfig};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "lakeclean")]
#[command(about = "Document and drop rows with missing values from lake change GeoPackages", long_about = None)]
struct Cli {
    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConfigArgs {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory searched recursively for input files
    #[arg(long)]
    input_root: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean every discovered file
    Run {
        #[command(flatten)]
        config: ConfigArgs,

        /// Root of the CSV audit tree
        #[arg(long)]
        audit_root: Option<PathBuf>,

        /// Root of the cleaned GeoPackage tree
        #[arg(long)]
        clean_root: Option<PathBuf>,

        /// Only process the first N discovered files
        #[arg(long)]
        limit: Option<usize>,
    },

    /// List input files without processing them
    Discover {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Print a missing-value summary of one GeoPackage as JSON
    Inspect {
        /// GeoPackage file
        input: PathBuf,
    },

    /// Print the effective configuration as TOML
    Config {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            config,
            audit_root,
            clean_root,
            limit,
        } => cmd_run(&config, audit_root, clean_root, limit),

        Commands::Discover { config } => cmd_discover(&config),

        Commands::Inspect { input } => cmd_inspect(&input),

        Commands::Config { config } => cmd_config(&config),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(args: &ConfigArgs) -> Result<CleanConfig, Box<dyn std::error::Error>> {
    let mut config = CleanConfig::load(args.config.as_deref())?;
    if let Some(ref root) = args.input_root {
        config.input_root = root.clone();
    }
    Ok(config)
}

fn cmd_run(
    args: &ConfigArgs,
    audit_root: Option<PathBuf>,
    clean_root: Option<PathBuf>,
    limit: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(args)?;
    if let Some(root) = audit_root {
        config.audit_root = root;
    }
    if let Some(root) = clean_root {
        config.clean_root = root;
    }
    if limit.is_some() {
        config.limit = limit;
    }

    eprintln!("📂 Input root: {}", config.input_root.display());
    eprintln!("   Audit root: {}", config.audit_root.display());
    eprintln!("   Clean root: {}", config.clean_root.display());

    let summary = run(&config)?;

    eprintln!(
        "\n📊 Files: {} processed of {} found",
        summary.processed(),
        summary.discovered
    );
    eprintln!("   Rows: {} read, {} dropped", summary.total_rows(), summary.dropped_rows());
    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_discover(args: &ConfigArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(args)?;
    let files = discover_files(&config.input_root, &config.target_file_name)?;

    eprintln!(
        "🔎 {} {} file(s) under {}",
        files.len(),
        config.target_file_name,
        config.input_root.display()
    );
    for file in files {
        println!("{}", file.display());
    }
    Ok(())
}

fn cmd_inspect(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Inspecting: {}", input.display());
    let report = inspect_file(input)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_config(args: &ConfigArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(args)?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}
