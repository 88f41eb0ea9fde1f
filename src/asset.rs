//! # Asset Record Module
//!
//! Definisce l'`AssetEntry` fornito dal chiamante e l'`OptimizationRecord`
//! che l'optimizer aggiorna.
//!
//! ## Invarianti:
//! - `optimized` (payload di `Accepted`) è sempre <= `uncompressed_size`
//! - `lossless`/`lossy` sono valorizzati solo se il guadagno supera la soglia
//! - un fallimento del codec non modifica mai il record
//! - `Rejected` non sovrascrive mai `Accepted`

use serde::{Deserialize, Serialize};

use crate::media::SVG_CONTENT_TYPE;

/// A fetched web asset, as handed over by the weight-checking pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetEntry {
    /// Used for diagnostics only
    pub url: String,
    pub content_type: String,
    pub is_image: bool,
    pub is_svg: bool,
    /// Raw bytes of the asset, `None` if it was never fetched
    #[serde(skip)]
    pub body: Option<Vec<u8>>,
    pub uncompressed_size: u64,
    #[serde(default)]
    pub optimization: OptimizationRecord,
}

impl AssetEntry {
    /// Build an entry from a fetched body, deriving the image flags from the content type
    pub fn new(url: impl Into<String>, content_type: impl Into<String>, body: Vec<u8>) -> Self {
        let content_type = content_type.into();
        let is_image = content_type.starts_with("image/");
        let is_svg = content_type == SVG_CONTENT_TYPE;

        Self {
            url: url.into(),
            content_type,
            is_image,
            is_svg,
            uncompressed_size: body.len() as u64,
            body: Some(body),
            optimization: OptimizationRecord::default(),
        }
    }

    /// Build an entry for an asset whose body is not available
    pub fn unfetched(url: impl Into<String>, content_type: impl Into<String>) -> Self {
        let mut entry = Self::new(url, content_type, Vec::new());
        entry.body = None;
        entry
    }
}

/// Tagged optimization state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "size", rename_all = "snake_case")]
pub enum OptimizationStatus {
    #[default]
    NotAttempted,
    /// A candidate was produced but no pass cleared the gain threshold
    Rejected,
    /// Best accepted size
    Accepted(u64),
}

/// Optimization results attached to an asset
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OptimizationRecord {
    pub lossless: Option<u64>,
    pub lossy: Option<u64>,
    pub status: OptimizationStatus,
    /// Rewritten SVG text, present only after an accepted SVG pass
    pub body_after_optimization: Option<String>,
}

impl OptimizationRecord {
    /// Best accepted size so far
    pub fn optimized(&self) -> Option<u64> {
        match self.status {
            OptimizationStatus::Accepted(size) => Some(size),
            _ => None,
        }
    }

    /// Legacy view of the status: `Some(false)` means "the asset is not optimized
    /// yet and a smaller version exists"; `None` means nothing is known.
    pub fn is_optimized(&self) -> Option<bool> {
        match self.status {
            OptimizationStatus::Accepted(_) => Some(false),
            _ => None,
        }
    }

    pub(crate) fn accept(&mut self, best: u64) {
        self.status = OptimizationStatus::Accepted(best);
    }

    pub(crate) fn reject(&mut self) {
        if self.status == OptimizationStatus::NotAttempted {
            self.status = OptimizationStatus::Rejected;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_flags() {
        let svg = AssetEntry::new("a.svg", "image/svg+xml", b"<svg/>".to_vec());
        assert!(svg.is_image);
        assert!(svg.is_svg);
        assert_eq!(svg.uncompressed_size, 6);

        let html = AssetEntry::new("index.html", "text/html", b"<html>".to_vec());
        assert!(!html.is_image);
        assert!(!html.is_svg);
    }

    #[test]
    fn test_unfetched_has_no_body() {
        let entry = AssetEntry::unfetched("a.png", "image/png");
        assert!(entry.body.is_none());
        assert_eq!(entry.uncompressed_size, 0);
        assert_eq!(entry.optimization, OptimizationRecord::default());
    }

    #[test]
    fn test_reject_never_overrides_accept() {
        let mut record = OptimizationRecord::default();
        record.reject();
        assert_eq!(record.status, OptimizationStatus::Rejected);

        record.accept(700);
        record.reject();
        assert_eq!(record.optimized(), Some(700));
        assert_eq!(record.is_optimized(), Some(false));
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&OptimizationStatus::Accepted(42)).unwrap();
        assert_eq!(json, r#"{"state":"accepted","size":42}"#);
        let json = serde_json::to_string(&OptimizationStatus::NotAttempted).unwrap();
        assert_eq!(json, r#"{"state":"not_attempted"}"#);
    }
}
