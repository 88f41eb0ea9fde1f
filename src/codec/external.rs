//! # External Tool Codec
//!
//! Implementa il codec boundary lanciando tool esterni specializzati.
//!
//! ## Engine per formato/modalità
//!
//! | Formato | Modalità | Tool      | Argomenti                        |
//! |---------|----------|-----------|----------------------------------|
//! | JPEG    | lossless | jpegtran  | `-copy none -optimize`           |
//! | JPEG    | lossy    | jpegoptim | `--max=<quality> --strip-all`    |
//! | PNG     | lossless | optipng   | `-o<level>`                      |
//! | SVG     | lossless | svgo      | `-i <in> -o <out>`               |
//!
//! Ogni altra combinazione fallisce con `OptimizeError::NoEngine`.
//!
//! ## Esecuzione
//!
//! - Il body viene scritto in una directory temporanea privata (`tempfile`)
//! - Il tool viene lanciato con `tokio::process::Command`, con timeout
//! - L'output viene letto dal file di output o da stdout (jpegoptim)
//! - Output vuoto o assente = nessun candidato (`Ok(None)`)

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, warn};

use super::Codec;
use crate::config::Config;
use crate::error::OptimizeError;
use crate::media::{CompressionMode, ImageFormat};
use crate::tool_resolver::ToolPathResolver;

/// Converts any iterable of string-like items into owned arguments
fn to_string_vec<T, I>(items: I) -> Vec<String>
where
    T: ToString,
    I: IntoIterator<Item = T>,
{
    items.into_iter().map(|item| item.to_string()).collect()
}

/// A concrete external engine for one format/mode pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Jpegtran,
    Jpegoptim { max_quality: u8 },
    Optipng { level: u8 },
    Svgo,
}

impl Engine {
    /// Pick the engine for a format/mode combination
    pub fn select(format: ImageFormat, mode: CompressionMode, config: &Config) -> Result<Self, OptimizeError> {
        match (format, mode) {
            (ImageFormat::Jpeg, CompressionMode::Lossless) => Ok(Engine::Jpegtran),
            (ImageFormat::Jpeg, CompressionMode::Lossy) => Ok(Engine::Jpegoptim {
                max_quality: config.jpeg_max_quality,
            }),
            (ImageFormat::Png, CompressionMode::Lossless) => Ok(Engine::Optipng {
                level: config.png_optimization_level,
            }),
            (ImageFormat::Svg, CompressionMode::Lossless) => Ok(Engine::Svgo),
            (format, mode) => Err(OptimizeError::NoEngine { format, mode }),
        }
    }

    pub fn tool_name(&self) -> &'static str {
        match self {
            Engine::Jpegtran => "jpegtran",
            Engine::Jpegoptim { .. } => "jpegoptim",
            Engine::Optipng { .. } => "optipng",
            Engine::Svgo => "svgo",
        }
    }

    /// jpegoptim writes the result to stdout, the others to an output file
    fn writes_stdout(&self) -> bool {
        matches!(self, Engine::Jpegoptim { .. })
    }

    fn args(&self, input: &str, output: &str) -> Vec<String> {
        match self {
            Engine::Jpegtran => to_string_vec(["-copy", "none", "-optimize", "-outfile", output, input]),
            Engine::Jpegoptim { max_quality } => to_string_vec([
                &format!("--max={}", max_quality),
                "--strip-all",
                "--quiet",
                "--stdout",
                input,
            ]),
            Engine::Optipng { level } => {
                to_string_vec([&format!("-o{}", level), "-quiet", "-out", output, input])
            }
            Engine::Svgo => to_string_vec(["--quiet", "-i", input, "-o", output]),
        }
    }
}

/// Codec backed by command-line optimization tools
#[derive(Debug, Clone)]
pub struct ExternalToolCodec {
    config: Config,
    resolver: ToolPathResolver,
}

impl ExternalToolCodec {
    pub fn new(config: Config) -> Self {
        let resolver = ToolPathResolver::new(config.tools_dir.clone());
        Self { config, resolver }
    }

    pub fn with_resolver(config: Config, resolver: ToolPathResolver) -> Self {
        Self { config, resolver }
    }

    pub fn resolver(&self) -> &ToolPathResolver {
        &self.resolver
    }

    async fn run_engine(&self, engine: Engine, body: &[u8], format: ImageFormat) -> Result<Option<Vec<u8>>, OptimizeError> {
        let tool = engine.tool_name();
        let tool_path = self
            .resolver
            .resolve_tool(tool)
            .ok_or_else(|| OptimizeError::MissingDependency(tool.to_string()))?;

        let work_dir = tempfile::tempdir()?;
        let input = work_dir.path().join(format!("input.{}", format));
        let output = work_dir.path().join(format!("output.{}", format));
        tokio::fs::write(&input, body).await?;

        let args = engine.args(&path_arg(&input), &path_arg(&output));
        debug!("Running {} {:?}", tool, args);

        let start_time = Instant::now();
        let secs = self.config.tool_timeout_secs;
        let run = Command::new(&tool_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let result = tokio::time::timeout(Duration::from_secs(secs), run)
            .await
            .map_err(|_| OptimizeError::Timeout {
                tool: tool.to_string(),
                secs,
            })??;
        let elapsed = start_time.elapsed();

        if !result.status.success() {
            warn!(
                "{} failed after {:?}: {}",
                tool,
                elapsed,
                String::from_utf8_lossy(&result.stderr).trim()
            );
            return Err(OptimizeError::ToolFailed {
                tool: tool.to_string(),
                status: result.status.to_string(),
            });
        }

        debug!("Optimization for {} took {:?}", format, elapsed);

        let candidate = if engine.writes_stdout() {
            result.stdout
        } else if output.exists() {
            tokio::fs::read(&output).await?
        } else {
            Vec::new()
        };

        if candidate.is_empty() {
            return Ok(None);
        }
        Ok(Some(candidate))
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[async_trait]
impl Codec for ExternalToolCodec {
    async fn compress(
        &self,
        body: &[u8],
        format: ImageFormat,
        mode: CompressionMode,
    ) -> Result<Option<Vec<u8>>, OptimizeError> {
        debug!("Starting {} {} optimization", format, mode);
        let engine = Engine::select(format, mode, &self.config)?;
        self.run_engine(engine, body, format).await
    }
}
