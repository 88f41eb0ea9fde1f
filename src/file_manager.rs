//! # File Management Module
//!
//! Questo modulo trasforma file locali in `AssetEntry` per la CLI.
//!
//! ## Responsabilità:
//! - Discovery ricorsiva di immagini in directory (`walkdir`)
//! - Rilevamento del content type dai magic bytes (`image::guess_format`)
//! - Scrittura degli SVG riscritti in una directory di output, con la stessa
//!   struttura delle directory di input e senza mai sovrascrivere file esistenti
//! - Formattazione human-readable delle dimensioni
//!
//! ## Formati riconosciuti:
//! - **Raster**: JPG, JPEG, PNG (content type dai magic bytes, non dall'estensione)
//! - **Vettoriali**: SVG (dall'estensione)

use anyhow::Result;
use image::ImageFormat as RasterFormat;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use walkdir::WalkDir;

use crate::asset::AssetEntry;
use crate::media::{JPEG_CONTENT_TYPE, PNG_CONTENT_TYPE, SVG_CONTENT_TYPE};

/// An asset found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFile {
    pub path: PathBuf,
    /// Directory the file was discovered from; its layout is mirrored on output
    pub base_dir: PathBuf,
}

/// Manages file discovery and entry loading
pub struct FileManager;

impl FileManager {
    /// Find all supported asset files under the given paths.
    ///
    /// Files passed explicitly are always kept, directories are walked.
    pub fn find_asset_files(paths: &[PathBuf]) -> Vec<AssetFile> {
        let mut files = Vec::new();

        for root in paths {
            if root.is_file() {
                let base_dir = root.parent().unwrap_or(Path::new("")).to_path_buf();
                files.push(AssetFile {
                    path: root.clone(),
                    base_dir,
                });
                continue;
            }

            for entry in WalkDir::new(root)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                let path = entry.path();
                if Self::is_supported_format(path) {
                    files.push(AssetFile {
                        path: path.to_path_buf(),
                        base_dir: root.clone(),
                    });
                }
            }
        }

        files
    }

    /// Check if a file extension is one the optimizer handles
    pub fn is_supported_format(path: &Path) -> bool {
        if let Some(ext) = path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            matches!(ext_lower.as_str(), "jpg" | "jpeg" | "png" | "svg")
        } else {
            false
        }
    }

    fn is_svg(path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("svg"))
            .unwrap_or(false)
    }

    /// Content type of a file's bytes
    pub fn detect_content_type(path: &Path, bytes: &[u8]) -> &'static str {
        if Self::is_svg(path) {
            return SVG_CONTENT_TYPE;
        }

        match image::guess_format(bytes) {
            Ok(RasterFormat::Jpeg) => JPEG_CONTENT_TYPE,
            Ok(RasterFormat::Png) => PNG_CONTENT_TYPE,
            Ok(RasterFormat::WebP) => "image/webp",
            Ok(RasterFormat::Gif) => "image/gif",
            _ => "application/octet-stream",
        }
    }

    /// Read a file into an asset entry
    pub async fn load_entry(path: &Path) -> Result<AssetEntry> {
        let bytes = fs::read(path).await?;
        let content_type = Self::detect_content_type(path, &bytes);
        let url = format!("file://{}", path.display());

        Ok(AssetEntry::new(url, content_type, bytes))
    }

    /// Where `file` lands under `output_dir`, mirroring its place below the
    /// directory it was found in
    pub fn output_path(output_dir: &Path, file: &AssetFile) -> Result<PathBuf> {
        let relative = match file.path.strip_prefix(&file.base_dir) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
            _ => file
                .path
                .file_name()
                .map(PathBuf::from)
                .ok_or_else(|| anyhow::anyhow!("Invalid file name: {}", file.path.display()))?,
        };
        Ok(output_dir.join(relative))
    }

    /// Write an optimized SVG body under `output_dir`.
    ///
    /// Never replaces an existing file, the original included.
    pub async fn write_svg(output_dir: &Path, file: &AssetFile, body: &str) -> Result<PathBuf> {
        let output_path = Self::output_path(output_dir, file)?;
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut out = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&output_path)
            .await
        {
            Ok(out) => out,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(anyhow::anyhow!(
                    "Refusing to overwrite existing file: {}",
                    output_path.display()
                ));
            }
            Err(e) => return Err(e.into()),
        };
        out.write_all(body.as_bytes()).await?;
        out.flush().await?;
        Ok(output_path)
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

}
