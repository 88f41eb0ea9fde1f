//! # Media Classification Module
//!
//! Classifica un asset in JPEG, PNG, SVG oppure non supportato.
//!
//! ## Regole (ordine fisso, vince il primo match):
//! 1. **JPEG**: `is_image` e content type esattamente `image/jpeg`
//! 2. **PNG**: `is_image` e content type esattamente `image/png`
//! 3. **SVG**: `is_image` e flag `is_svg`, indipendente dal content type
//!
//! Tutto il resto è `Unsupported` e passa senza chiamate al codec.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::asset::AssetEntry;

pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";
pub const PNG_CONTENT_TYPE: &str = "image/png";
pub const SVG_CONTENT_TYPE: &str = "image/svg+xml";

/// Formats understood by the codec boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Svg,
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        };
        f.write_str(name)
    }
}

/// Compression mode requested from the codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionMode {
    Lossless,
    Lossy,
}

impl fmt::Display for CompressionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionMode::Lossless => f.write_str("lossless"),
            CompressionMode::Lossy => f.write_str("lossy"),
        }
    }
}

/// Result of classifying an asset entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Jpeg,
    Png,
    Svg,
    Unsupported,
}

impl MediaKind {
    /// Classify an entry. JPEG is checked before PNG, PNG before SVG.
    pub fn classify(entry: &AssetEntry) -> Self {
        if !entry.is_image {
            return MediaKind::Unsupported;
        }

        if entry.content_type == JPEG_CONTENT_TYPE {
            MediaKind::Jpeg
        } else if entry.content_type == PNG_CONTENT_TYPE {
            MediaKind::Png
        } else if entry.is_svg {
            MediaKind::Svg
        } else {
            MediaKind::Unsupported
        }
    }

    /// Codec format for this kind, `None` when unsupported
    pub fn format(self) -> Option<ImageFormat> {
        match self {
            MediaKind::Jpeg => Some(ImageFormat::Jpeg),
            MediaKind::Png => Some(ImageFormat::Png),
            MediaKind::Svg => Some(ImageFormat::Svg),
            MediaKind::Unsupported => None,
        }
    }

    pub fn is_supported(self) -> bool {
        self != MediaKind::Unsupported
    }
}

/// Whether the optimizer would attempt anything for this entry
pub fn can_be_optimized(entry: &AssetEntry) -> bool {
    MediaKind::classify(entry).is_supported()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(content_type: &str, is_image: bool, is_svg: bool) -> AssetEntry {
        let mut entry = AssetEntry::new("https://example.com/a", content_type, b"x".to_vec());
        entry.is_image = is_image;
        entry.is_svg = is_svg;
        entry
    }

    #[test]
    fn test_classify_basic_types() {
        assert_eq!(MediaKind::classify(&entry("image/jpeg", true, false)), MediaKind::Jpeg);
        assert_eq!(MediaKind::classify(&entry("image/png", true, false)), MediaKind::Png);
        assert_eq!(MediaKind::classify(&entry("image/svg+xml", true, true)), MediaKind::Svg);
    }

    #[test]
    fn test_jpeg_wins_over_svg_flag() {
        assert_eq!(MediaKind::classify(&entry("image/jpeg", true, true)), MediaKind::Jpeg);
    }

    #[test]
    fn test_svg_flag_ignores_content_type() {
        assert_eq!(MediaKind::classify(&entry("text/plain", true, true)), MediaKind::Svg);
    }

    #[test]
    fn test_not_an_image() {
        assert_eq!(MediaKind::classify(&entry("image/jpeg", false, false)), MediaKind::Unsupported);
        assert_eq!(MediaKind::classify(&entry("text/html", false, false)), MediaKind::Unsupported);
        assert_eq!(MediaKind::classify(&entry("image/gif", true, false)), MediaKind::Unsupported);
        assert!(!can_be_optimized(&entry("image/webp", true, false)));
    }

    #[test]
    fn test_content_type_is_matched_exactly() {
        assert_eq!(
            MediaKind::classify(&entry("image/jpeg; charset=binary", true, false)),
            MediaKind::Unsupported
        );
    }
}
