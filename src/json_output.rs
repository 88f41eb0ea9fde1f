//! # JSON Output Module
//!
//! Output strutturato in JSON (una riga per messaggio) per uso programmatico.
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio batch con numero di asset e configurazione
//! - `file_complete`: Record di ottimizzazione e outcome di un asset
//! - `complete`: Statistiche finali
//! - `error`: Asset non leggibile o errore generale

use serde::Serialize;
use std::path::PathBuf;

use crate::asset::{AssetEntry, OptimizationRecord};
use crate::optimizer::Outcome;
use crate::progress::OptimizationStats;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    Start {
        total_files: usize,
        config: JsonConfig,
    },

    FileComplete {
        url: String,
        content_type: String,
        uncompressed_size: u64,
        optimization: OptimizationRecord,
        outcome: Outcome,
    },

    Complete {
        files_processed: usize,
        files_optimized: usize,
        files_skipped: usize,
        errors: usize,
        total_bytes_saved: u64,
        reduction_percent: f64,
        duration_seconds: f64,
    },

    Error {
        path: Option<PathBuf>,
        message: String,
    },
}

/// Configurazione riportata nel messaggio `start`
#[derive(Debug, Serialize)]
pub struct JsonConfig {
    pub jpeg_max_quality: u8,
    pub png_optimization_level: u8,
    pub workers: usize,
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn start(total_files: usize, config: JsonConfig) -> Self {
        Self::Start { total_files, config }
    }

    pub fn file_complete(entry: &AssetEntry, outcome: &Outcome) -> Self {
        Self::FileComplete {
            url: entry.url.clone(),
            content_type: entry.content_type.clone(),
            uncompressed_size: entry.uncompressed_size,
            optimization: entry.optimization.clone(),
            outcome: outcome.clone(),
        }
    }

    pub fn complete(stats: &OptimizationStats, duration_seconds: f64) -> Self {
        Self::Complete {
            files_processed: stats.files_processed,
            files_optimized: stats.files_optimized,
            files_skipped: stats.files_skipped,
            errors: stats.errors,
            total_bytes_saved: stats.total_bytes_saved,
            reduction_percent: stats.overall_reduction_percent(),
            duration_seconds,
        }
    }

    pub fn error(path: Option<PathBuf>, message: String) -> Self {
        Self::Error { path, message }
    }
}

impl From<&crate::Config> for JsonConfig {
    fn from(config: &crate::Config) -> Self {
        Self {
            jpeg_max_quality: config.jpeg_max_quality,
            png_optimization_level: config.png_optimization_level,
            workers: config.workers,
        }
    }
}
