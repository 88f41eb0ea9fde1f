//! # Error Types Module
//!
//! Questo modulo definisce i tipi di errore del codec boundary.
//!
//! ## Responsabilità:
//! - Definisce `OptimizeError` per categorizzare i fallimenti di compressione
//! - Fornisce messaggi descrittivi per il logging dei fallimenti silenziati
//! - Integra con `thiserror` per la conversione automatica da `std::io::Error`
//!
//! ## Categorie di errori:
//! - `Io`: Errori di I/O sui file temporanei
//! - `ToolFailed`: Tool esterno terminato con exit status non zero
//! - `MissingDependency`: Tool esterno non trovato (jpegtran, optipng, ...)
//! - `NoEngine`: Nessun engine per la combinazione formato/modalità
//! - `Timeout`: Tool esterno oltre il tempo massimo configurato
//! - `InvalidSvg`: Output SVG non UTF-8
//!
//! Nessuno di questi errori esce da `ImageOptimizer::optimize`: vengono
//! registrati nell'`Outcome` e nel log.

use crate::media::{CompressionMode, ImageFormat};

/// Errors raised at the codec boundary
#[derive(thiserror::Error, Debug)]
pub enum OptimizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{tool} exited with {status}")]
    ToolFailed { tool: String, status: String },

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("No optimization engine found for {format} {mode}")]
    NoEngine {
        format: ImageFormat,
        mode: CompressionMode,
    },

    #[error("{tool} timed out after {secs}s")]
    Timeout { tool: String, secs: u64 },

    #[error("Optimized SVG is not valid UTF-8")]
    InvalidSvg,
}
