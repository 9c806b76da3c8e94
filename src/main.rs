//! Archipelago CLI
//!
//! Command-line interface for merging keyed intervals:
//! - Merge a CSV of events into windows
//! - Inspect per-event island annotations
//! - Generate a default config file

use anyhow::Context;
use archipelago::config::{generate_default_config, Config};
use archipelago::io::{BoundFormat, EventReader, OutputFormat, WindowWriter};
use archipelago::merge::{self, IntervalEngine};
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "archipelago")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Merge keyed time intervals into consolidated windows")]
#[command(long_about = "Archipelago solves gaps-and-islands over keyed intervals.\nEvents of the same key are folded together until one starts after every earlier event has ended.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, csv, json)
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge events into windows
    Merge {
        #[command(flatten)]
        input: InputArgs,

        /// Merge all keys on the calling thread
        #[arg(long)]
        sequential: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show running max end, new-island flag and group id per event
    Annotate {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
pub struct InputArgs {
    /// Path to CSV file
    path: PathBuf,

    /// Key column (header name or 0-based index)
    #[arg(long)]
    key_col: Option<String>,

    /// Start column (header name or 0-based index)
    #[arg(long)]
    start_col: Option<String>,

    /// End column (header name or 0-based index)
    #[arg(long)]
    end_col: Option<String>,

    /// Timestamp format for bounds (strftime format)
    #[arg(long)]
    timestamp_format: Option<String>,

    /// The CSV has no header row (default columns become 0, 1, 2)
    #[arg(long)]
    no_header: bool,

    /// Abort on the first unreadable row
    #[arg(long)]
    strict: bool,

    /// Bound rendering (raw, date, datetime)
    #[arg(long)]
    bounds: Option<BoundFormat>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(format) = cli.format {
        config.output.format = format;
    }

    archipelago::logging::init(&config.logging);

    match cli.command {
        Commands::Merge {
            input,
            sequential,
            output,
        } => {
            let (reader, writer) = apply_input_args(&mut config, &input);
            let events = read_events(&reader, &input.path)?;

            let mut engine_config = merge::EngineConfig::from(&config.engine);
            if sequential {
                engine_config.parallel = false;
            }

            let result = IntervalEngine::new(engine_config).run(events)?;

            match output {
                Some(path) => {
                    let file = std::fs::File::create(&path)
                        .with_context(|| format!("Failed to create {:?}", path))?;
                    let mut out = std::io::BufWriter::new(file);
                    writer.write_windows(&mut out, &result.windows)?;
                    out.flush()?;
                    eprintln!("Wrote {} windows to {:?}", result.windows.len(), path);
                }
                None => {
                    writer.write_windows(std::io::stdout().lock(), &result.windows)?;
                }
            }
        }

        Commands::Annotate { input } => {
            let (reader, writer) = apply_input_args(&mut config, &input);
            let events = read_events(&reader, &input.path)?;

            merge::validate(&events)?;

            let mut partitions: Vec<_> = merge::partition(events).into_iter().collect();
            partitions.sort_by(|a, b| a.0.cmp(&b.0));

            let annotated: Vec<_> = partitions
                .into_iter()
                .flat_map(|(_, events)| merge::annotate(events))
                .collect();

            writer.write_annotations(std::io::stdout().lock(), &annotated)?;
        }

        Commands::Config { output } => {
            let config = generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

/// Fold command-line input options over the loaded config
fn apply_input_args(config: &mut Config, args: &InputArgs) -> (EventReader, WindowWriter) {
    let input = &mut config.input;
    if let Some(col) = &args.key_col {
        input.key_column = col.clone();
    }
    if let Some(col) = &args.start_col {
        input.start_column = col.clone();
    }
    if let Some(col) = &args.end_col {
        input.end_column = col.clone();
    }
    if let Some(format) = &args.timestamp_format {
        input.timestamp_format = Some(format.clone());
    }
    if args.no_header {
        input.has_header = false;
    }
    if args.strict {
        input.strict = true;
    }
    if let Some(bounds) = args.bounds {
        config.output.bound_format = bounds;
    }

    (
        EventReader::from_config(&config.input),
        WindowWriter::new(config.output.format, config.output.bound_format),
    )
}

fn read_events(
    reader: &EventReader,
    path: &Path,
) -> anyhow::Result<Vec<archipelago::Event<String, i64>>> {
    let report = reader
        .read_path(path)
        .with_context(|| format!("Failed to read events from {:?}", path))?;

    tracing::info!(
        "Read {} events from {:?} ({} rows failed)",
        report.events.len(),
        path,
        report.rows_failed
    );

    if !report.errors.is_empty() {
        eprintln!("Skipped rows (first 10):");
        for error in report.errors.iter().take(10) {
            eprintln!("  {}", error);
        }
    }

    Ok(report.events)
}
