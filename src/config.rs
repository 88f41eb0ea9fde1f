//! # Configuration Management Module
//!
//! Questo modulo gestisce la configurazione dell'optimizer e del codec esterno.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con i parametri dei tool di compressione
//! - Fornisce validazione dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//!
//! ## Parametri di configurazione:
//! - `jpeg_max_quality`: Qualità massima per il passaggio lossy JPEG (1-100, default: 85)
//! - `png_optimization_level`: Livello optipng (0-7, default: 1)
//! - `tool_timeout_secs`: Tempo massimo per ogni tool esterno (default: 60)
//! - `workers`: Asset ottimizzati in parallelo dalla CLI (default: 4)
//! - `json_output`: Output JSON per uso programmatico (default: false)
//! - `tools_dir`: Directory aggiuntiva in cui cercare i tool (default: None)
//!
//! Le soglie di guadagno non sono configurabili: vivono in `gain`.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for asset optimization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Quality ceiling for the lossy JPEG pass (1-100)
    pub jpeg_max_quality: u8,
    /// optipng optimization level (0-7)
    pub png_optimization_level: u8,
    /// Timeout for a single external tool run, in seconds
    pub tool_timeout_secs: u64,
    /// Number of assets optimized concurrently by the CLI
    pub workers: usize,
    /// Output progress and results as JSON lines
    pub json_output: bool,
    /// Extra directory searched for optimization tools
    pub tools_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jpeg_max_quality: 85,
            png_optimization_level: 1,
            tool_timeout_secs: 60,
            workers: 4,
            json_output: false,
            tools_dir: None,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.jpeg_max_quality == 0 || self.jpeg_max_quality > 100 {
            return Err(anyhow::anyhow!("JPEG quality must be between 1 and 100"));
        }

        if self.png_optimization_level > 7 {
            return Err(anyhow::anyhow!("PNG optimization level must be between 0 and 7"));
        }

        if self.tool_timeout_secs == 0 {
            return Err(anyhow::anyhow!("Tool timeout must be greater than 0"));
        }

        if self.workers == 0 {
            return Err(anyhow::anyhow!("Number of workers must be greater than 0"));
        }

        if let Some(ref tools_dir) = self.tools_dir {
            if !tools_dir.is_dir() {
                return Err(anyhow::anyhow!("Tools directory does not exist: {}", tools_dir.display()));
            }
        }

        Ok(())
    }

    /// Load configuration from file, falling back to defaults when it doesn't exist
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
