//! # Progress Tracking and Statistics Module
//!
//! Progress bar (`indicatif`) e statistiche aggregate per la CLI.
//!
//! ## Statistiche tracciate:
//! - **files_processed**: Totale asset elaborati
//! - **files_optimized**: Asset con almeno un passaggio accettato
//! - **files_skipped**: Asset senza guadagno sufficiente o non supportati
//! - **errors**: Asset non leggibili o con un tool fallito e nessun candidato misurato
//! - **total_bytes_saved**: Byte risparmiabili (originale - miglior risultato)

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::file_manager::FileManager;
use crate::gain::reduction_percent;
use crate::optimizer::{Outcome, SkipReason};

/// Manages progress reporting for a batch of assets
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Progress manager that draws nothing, for JSON output
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

/// Statistics tracker for optimization results
#[derive(Debug, Default)]
pub struct OptimizationStats {
    pub files_processed: usize,
    pub files_optimized: usize,
    pub files_skipped: usize,
    pub total_bytes_saved: u64,
    pub total_original_size: u64,
    pub errors: usize,
}

impl OptimizationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_optimized(&mut self, original_size: u64, new_size: u64) {
        self.files_processed += 1;
        self.files_optimized += 1;
        self.total_original_size += original_size;
        self.total_bytes_saved += original_size.saturating_sub(new_size);
    }

    pub fn add_skipped(&mut self, original_size: u64) {
        self.files_processed += 1;
        self.files_skipped += 1;
        self.total_original_size += original_size;
    }

    pub fn add_error(&mut self) {
        self.files_processed += 1;
        self.errors += 1;
    }

    /// Record an optimizer outcome for an asset of `original_size` bytes
    pub fn record(&mut self, original_size: u64, optimized: Option<u64>, outcome: &Outcome) {
        if let Some(best) = optimized {
            self.add_optimized(original_size, best);
            return;
        }

        match outcome.skip_reason() {
            Some(SkipReason::ToolFailed) => self.add_error(),
            _ => self.add_skipped(original_size),
        }
    }

    pub fn overall_reduction_percent(&self) -> f64 {
        reduction_percent(
            self.total_original_size,
            self.total_original_size.saturating_sub(self.total_bytes_saved),
        )
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Processed: {} files | Optimizable: {} | Skipped: {} | Errors: {} | Potential savings: {} ({:.2}%)",
            self.files_processed,
            self.files_optimized,
            self.files_skipped,
            self.errors,
            FileManager::format_size(self.total_bytes_saved),
            self.overall_reduction_percent()
        )
    }
}
