//! # Asset Optimizer - Main Entry Point
//!
//! CLI che applica la policy di ottimizzazione a file locali e riporta
//! quanto si potrebbe risparmiare.
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI e carica la configurazione (file JSON opzionale)
//! 2. Configura il logging su stderr (INFO, DEBUG con `--verbose`, o `RUST_LOG`)
//! 3. Trova gli asset e li ottimizza con `workers` task concorrenti
//! 4. Riporta i risultati (testo o JSON) e, con `--write-dir`, salva gli SVG riscritti
//!    mantenendo la struttura delle directory di input
//!
//! ## Esempio di utilizzo:
//! ```bash
//! asset-optimizer ./public/img --workers 8 --json
//! ```

use anyhow::Result;
use clap::Parser;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use web_asset_optimizer::file_manager::{AssetFile, FileManager};
use web_asset_optimizer::gain::reduction_percent;
use web_asset_optimizer::json_output::{JsonConfig, JsonMessage};
use web_asset_optimizer::progress::{OptimizationStats, ProgressManager};
use web_asset_optimizer::tool_resolver::KNOWN_TOOLS;
use web_asset_optimizer::{AssetEntry, Config, ExternalToolCodec, ImageOptimizer, Outcome, SkipReason};

#[derive(Parser)]
#[command(name = "asset-optimizer")]
#[command(about = "Check whether web images would benefit from lossless/lossy re-compression")]
struct Args {
    /// Files or directories containing JPEG, PNG and SVG assets
    #[arg(required_unless_present_any = ["tools", "save_config"])]
    paths: Vec<PathBuf>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Quality ceiling for the lossy JPEG pass (1-100)
    #[arg(short, long)]
    quality: Option<u8>,

    /// optipng optimization level (0-7)
    #[arg(long)]
    png_level: Option<u8>,

    /// Number of assets optimized concurrently
    #[arg(short, long)]
    workers: Option<usize>,

    /// Timeout for a single tool run, in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Extra directory searched for optimization tools
    #[arg(long)]
    tools_dir: Option<PathBuf>,

    /// Write optimized SVG files to this directory, mirroring the input layout
    #[arg(long)]
    write_dir: Option<PathBuf>,

    /// Save the effective configuration to this JSON file and exit
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Output progress and results as JSON lines
    #[arg(long)]
    json: bool,

    /// Print which optimization tools are available and exit
    #[arg(long)]
    tools: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply_to(&self, config: &mut Config) {
        if let Some(quality) = self.quality {
            config.jpeg_max_quality = quality;
        }
        if let Some(level) = self.png_level {
            config.png_optimization_level = level;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(timeout) = self.timeout {
            config.tool_timeout_secs = timeout;
        }
        if let Some(ref tools_dir) = self.tools_dir {
            config.tools_dir = Some(tools_dir.clone());
        }
        if self.json {
            config.json_output = true;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match args.config {
        Some(ref path) => Config::from_file(path).await?,
        None => Config::default(),
    };
    args.apply_to(&mut config);
    config.validate()?;

    if let Some(ref path) = args.save_config {
        config.save_to_file(path).await?;
        info!("Configuration saved to {}", path.display());
        return Ok(());
    }

    let codec = ExternalToolCodec::new(config.clone());
    if args.tools {
        print!("{}", codec.resolver().tools_report());
        return Ok(());
    }
    for (tool, purpose) in KNOWN_TOOLS {
        if !codec.resolver().is_tool_available(tool) {
            warn!("{} not found, {} will be skipped (see --tools)", tool, purpose);
        }
    }

    for path in &args.paths {
        if !path.exists() {
            return Err(anyhow::anyhow!("Path does not exist: {}", path.display()));
        }
    }

    let files = FileManager::find_asset_files(&args.paths);
    info!("Found {} assets to check", files.len());

    let progress = if config.json_output {
        JsonMessage::start(files.len(), JsonConfig::from(&config)).emit();
        ProgressManager::hidden()
    } else {
        ProgressManager::new(files.len() as u64)
    };

    let optimizer = ImageOptimizer::new(Arc::new(codec));
    let start_time = Instant::now();
    let mut stats = OptimizationStats::new();

    let mut results = stream::iter(files)
        .map(|file| {
            let optimizer = optimizer.clone();
            async move {
                let result = match FileManager::load_entry(&file.path).await {
                    Ok(mut entry) => {
                        let outcome = optimizer.optimize(&mut entry).await;
                        Ok((entry, outcome))
                    }
                    Err(e) => Err(e),
                };
                (file, result)
            }
        })
        .buffer_unordered(config.workers);

    while let Some((file, result)) = results.next().await {
        let path = &file.path;
        match result {
            Ok((entry, outcome)) => {
                stats.record(entry.uncompressed_size, entry.optimization.optimized(), &outcome);
                if let Err(e) = save_svg(args.write_dir.as_deref(), &file, &entry).await {
                    warn!("Could not write optimized SVG for {}: {}", path.display(), e);
                }

                if config.json_output {
                    JsonMessage::file_complete(&entry, &outcome).emit();
                }
                progress.update(&describe(path, &entry, &outcome));
            }
            Err(e) => {
                stats.add_error();
                if config.json_output {
                    JsonMessage::error(Some(path.clone()), e.to_string()).emit();
                } else {
                    warn!("Failed to read {}: {}", path.display(), e);
                }
                progress.update(&format!("❌ {}", path.display()));
            }
        }
    }

    let summary = stats.format_summary();
    progress.finish(&summary);
    if config.json_output {
        JsonMessage::complete(&stats, start_time.elapsed().as_secs_f64()).emit();
    } else {
        info!("{}", summary);
    }

    Ok(())
}

async fn save_svg(write_dir: Option<&Path>, file: &AssetFile, entry: &AssetEntry) -> Result<()> {
    if let (Some(dir), Some(body)) = (write_dir, entry.optimization.body_after_optimization.as_deref()) {
        let written = FileManager::write_svg(dir, file, body).await?;
        info!("Wrote optimized SVG to {}", written.display());
    }
    Ok(())
}

fn describe(path: &Path, entry: &AssetEntry, outcome: &Outcome) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    match entry.optimization.optimized() {
        Some(best) => format!(
            "✅ {}: {} -> {} ({:.1}% saved)",
            name,
            FileManager::format_size(entry.uncompressed_size),
            FileManager::format_size(best),
            reduction_percent(entry.uncompressed_size, best)
        ),
        None => match (outcome, outcome.skip_reason()) {
            (Outcome::Unsupported { content_type }, _) => format!("⏭️ {}: {} not optimizable", name, content_type),
            (_, Some(reason @ SkipReason::ToolFailed)) => format!("❌ {}: {}", name, reason),
            (_, Some(reason)) => format!("⏭️ {}: {}", name, reason),
            (_, None) => format!("⏭️ {}", name),
        },
    }
}
