//! osv-logistics - offshore vessel logistics batch runner
//!
//! Reads one directory of CSV exports, runs the reconciliation pipeline and
//! writes the enriched dataset as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Enrich a batch with the built-in reference tables
//! osv-logistics --input-dir data/2024-06
//!
//! # Custom reference tables, summary only, JSON logs
//! osv-logistics --input-dir data/2024-06 --config logistics_config.toml \
//!     --summary-only --log-json
//!
//! # Print the effective configuration as TOML
//! osv-logistics --print-config
//! ```
//!
//! Expected files (each optional): `voyage_events.csv`, `vessel_manifests.csv`,
//! `cost_allocation.csv`, `voyage_list.csv`, `bulk_actions.csv`.
//!
//! # Environment Variables
//!
//! - `OSV_LOGISTICS_CONFIG`: config file path when `--config` is not given
//! - `RUST_LOG`: logging level (default: info)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info};

use osv_logistics::ingest::csv::load_batch_dir;
use osv_logistics::{Pipeline, PipelineConfig};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "osv-logistics")]
#[command(about = "Offshore vessel logistics reconciliation and classification")]
#[command(version)]
struct CliArgs {
    /// Directory holding the batch CSV exports
    #[arg(long, value_name = "DIR", required_unless_present = "print_config")]
    input_dir: Option<PathBuf>,

    /// Pipeline configuration (TOML). Falls back to ./logistics_config.toml,
    /// then built-in defaults.
    #[arg(long, value_name = "FILE", env = "OSV_LOGISTICS_CONFIG")]
    config: Option<PathBuf>,

    /// Write JSON here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Emit only the batch summary
    #[arg(long)]
    summary_only: bool,

    /// Structured JSON log lines on stderr
    #[arg(long)]
    log_json: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

// ============================================================================
// Setup
// ============================================================================

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(p) => PipelineConfig::load_from_file(p)
            .with_context(|| format!("Failed to load config from {}", p.display())),
        None => Ok(PipelineConfig::load()),
    }
}

fn write_json<T: serde::Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value)
                .context("Failed to serialize output")?;
            writer.flush().context("Failed to flush output")?;
            info!(path = %path.display(), "Output written");
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            serde_json::to_writer_pretty(&mut lock, value)
                .context("Failed to serialize output")?;
            writeln!(lock).context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_json);

    let config = load_config(args.config.as_deref())?;

    if args.print_config {
        print!("{}", config.to_toml().context("Failed to render config")?);
        return Ok(());
    }

    let Some(input_dir) = args.input_dir.as_deref() else {
        bail!("--input-dir is required");
    };
    info!(
        input = %input_dir.display(),
        batch = %config.batch.name,
        "Starting osv-logistics"
    );

    let batch = load_batch_dir(input_dir)
        .with_context(|| format!("Failed to read batch from {}", input_dir.display()))?;
    let pipeline = Pipeline::new(config).context("Invalid pipeline configuration")?;

    let dataset = match pipeline.run(&batch) {
        Ok(d) => d,
        Err(e) => {
            error!(kind = ?e.kind(), "{}", e);
            return Err(e).context("Batch failed");
        }
    };

    if args.summary_only {
        write_json(&dataset.summary, args.output.as_deref())
    } else {
        write_json(&dataset, args.output.as_deref())
    }
}
