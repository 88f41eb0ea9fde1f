//! # Web Asset Optimizer Library
//!
//! Decide se un asset web (JPEG/PNG/SVG) merita di essere ricompresso e
//! registra le dimensioni prima/dopo dei passaggi lossless e lossy.
//!
//! ## Architettura dei moduli:
//! - `asset`: `AssetEntry` e `OptimizationRecord`
//! - `media`: Classificazione JPEG/PNG/SVG
//! - `gain`: Soglia di guadagno (2 KB oppure 20% oltre 100 byte)
//! - `optimizer`: Orchestratore dei passaggi e `Outcome` diagnostico
//! - `codec`: Codec boundary e implementazione con tool esterni
//! - `tool_resolver`: Ricerca dei tool esterni
//! - `config`: Configurazione e validazione
//! - `error`: Errori del codec boundary
//! - `file_manager`, `progress`, `json_output`: Supporto alla CLI
//!
//! ## Utilizzo:
//! ```rust,no_run
//! use web_asset_optimizer::{AssetEntry, Config, ImageOptimizer};
//!
//! # async fn run(body: Vec<u8>) {
//! let optimizer = ImageOptimizer::with_external_tools(Config::default());
//! let mut entry = AssetEntry::new("https://example.com/hero.jpg", "image/jpeg", body);
//! optimizer.optimize(&mut entry).await;
//! # }
//! ```

pub mod asset;
pub mod codec;
pub mod config;
pub mod error;
pub mod file_manager;
pub mod gain;
pub mod json_output;
pub mod media;
pub mod optimizer;
pub mod progress;
pub mod tool_resolver;

pub use asset::{AssetEntry, OptimizationRecord, OptimizationStatus};
pub use codec::{Codec, ExternalToolCodec};
pub use config::Config;
pub use error::OptimizeError;
pub use gain::gain_is_enough;
pub use media::{can_be_optimized, CompressionMode, ImageFormat, MediaKind};
pub use optimizer::{select_optimized, ImageOptimizer, Outcome, SkipReason, StageReport, StageResult};
