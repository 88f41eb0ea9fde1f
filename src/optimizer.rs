//! # Optimizer Module
//!
//! Orchestratore della policy di ottimizzazione di un singolo asset.
//!
//! ## Flusso:
//! 1. Nessun body → `Outcome::NoBody`, entry invariato
//! 2. Classificazione (`MediaKind`) → `Unsupported` passa senza chiamate al codec
//! 3. Un passaggio per chiamata al codec, sempre sul body **originale**
//! 4. `gain_is_enough` contro `uncompressed_size` decide se accettare
//! 5. Aggiornamento dell'`OptimizationRecord`
//!
//! ## Sequenze per formato:
//! - **JPEG**: lossless poi lossy (`Init → LosslessDone → LossyDone`)
//! - **PNG**: solo lossless
//! - **SVG**: solo lossless, con il testo riscritto in `body_after_optimization`
//!
//! Nessun errore esce da `optimize`: i fallimenti del codec finiscono
//! nell'`Outcome` restituito e nel log, senza toccare il record.
//!
//! ## Esempio:
//! ```rust,no_run
//! use std::sync::Arc;
//! use web_asset_optimizer::{AssetEntry, Config, ExternalToolCodec, ImageOptimizer};
//!
//! # async fn run(body: Vec<u8>) {
//! let optimizer = ImageOptimizer::new(Arc::new(ExternalToolCodec::new(Config::default())));
//! let mut entry = AssetEntry::new("https://example.com/logo.png", "image/png", body);
//! let outcome = optimizer.optimize(&mut entry).await;
//! if outcome.is_improved() {
//!     println!("{:?}", entry.optimization.optimized());
//! }
//! # }
//! ```

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::asset::{AssetEntry, OptimizationRecord};
use crate::codec::{Codec, ExternalToolCodec};
use crate::config::Config;
use crate::error::OptimizeError;
use crate::gain::{gain_is_enough, reduction_percent};
use crate::media::{CompressionMode, ImageFormat, MediaKind};

/// What happened to a single compression pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum StageResult {
    Accepted { size: u64 },
    InsufficientGain { size: u64 },
    NoCandidate,
    CodecFailed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub mode: CompressionMode,
    #[serde(flatten)]
    pub result: StageResult,
}

/// Why an entry ended up the way it did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// The asset was never fetched
    NoBody,
    Unsupported { content_type: String },
    Completed { kind: MediaKind, stages: Vec<StageReport> },
}

impl Outcome {
    /// True when at least one pass was accepted
    pub fn is_improved(&self) -> bool {
        self.stages()
            .iter()
            .any(|stage| matches!(stage.result, StageResult::Accepted { .. }))
    }

    pub fn stages(&self) -> &[StageReport] {
        match self {
            Outcome::Completed { stages, .. } => stages,
            _ => &[],
        }
    }

    /// Why nothing was accepted, or `None` when a pass was.
    ///
    /// A rejected candidate takes precedence over a failed pass: the asset
    /// was measured and is already small enough.
    pub fn skip_reason(&self) -> Option<SkipReason> {
        let stages = match self {
            Outcome::NoBody => return Some(SkipReason::NotFetched),
            Outcome::Unsupported { .. } => return Some(SkipReason::Unsupported),
            Outcome::Completed { stages, .. } => stages,
        };
        if self.is_improved() {
            return None;
        }

        let any = |pred: fn(&StageResult) -> bool| stages.iter().any(|stage| pred(&stage.result));
        if any(|r| matches!(r, StageResult::InsufficientGain { .. })) {
            Some(SkipReason::GainTooSmall)
        } else if any(|r| matches!(r, StageResult::CodecFailed { .. })) {
            Some(SkipReason::ToolFailed)
        } else {
            Some(SkipReason::NoResult)
        }
    }
}

/// Short classification of an entry left as it was
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotFetched,
    Unsupported,
    /// A candidate was produced but did not clear the gain threshold
    GainTooSmall,
    ToolFailed,
    NoResult,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SkipReason::NotFetched => "not fetched",
            SkipReason::Unsupported => "not optimizable",
            SkipReason::GainTooSmall => "already optimized",
            SkipReason::ToolFailed => "optimization tool failed",
            SkipReason::NoResult => "no result from optimization tools",
        };
        write!(f, "{}", label)
    }
}

/// Choose `optimized` after an accepted lossy pass.
///
/// Lossy replaces the lossless size only when it is strictly smaller;
/// lossless wins ties.
pub fn select_optimized(lossless_accepted: Option<u64>, lossy: u64) -> u64 {
    match lossless_accepted {
        Some(lossless) if lossy >= lossless => lossless,
        _ => lossy,
    }
}

/// JPEG pipeline steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JpegStage {
    Init,
    LosslessDone { lossless_accepted: Option<u64> },
    LossyDone,
}

/// Accepted candidate bytes, kept only for the duration of one pass
struct Attempt {
    result: StageResult,
    candidate: Option<Vec<u8>>,
}

/// Gain-aware optimization policy over a [`Codec`]
#[derive(Clone)]
pub struct ImageOptimizer {
    codec: Arc<dyn Codec>,
}

impl ImageOptimizer {
    pub fn new(codec: Arc<dyn Codec>) -> Self {
        Self { codec }
    }

    /// Optimizer backed by the command-line tools described in `config`
    pub fn with_external_tools(config: Config) -> Self {
        Self::new(Arc::new(ExternalToolCodec::new(config)))
    }

    /// Try to optimize an asset, updating `entry.optimization` in place.
    ///
    /// Never fails: codec errors are logged and reported in the returned
    /// [`Outcome`], leaving the record as it was before the failing pass.
    pub async fn optimize(&self, entry: &mut AssetEntry) -> Outcome {
        let Some(body) = entry.body.as_deref() else {
            return Outcome::NoBody;
        };

        let kind = MediaKind::classify(entry);
        let original_size = entry.uncompressed_size;
        debug!("Let's try to optimize {}", entry.url);
        debug!("Current file size is {}", original_size);

        let stages = match kind {
            MediaKind::Jpeg => {
                debug!("File is a JPEG");
                self.optimize_jpeg(&entry.url, body, original_size, &mut entry.optimization)
                    .await
            }
            MediaKind::Png => {
                debug!("File is a PNG");
                let attempt = self
                    .attempt(&entry.url, body, ImageFormat::Png, CompressionMode::Lossless, original_size)
                    .await;
                apply_lossless(&mut entry.optimization, &attempt.result);
                vec![report(CompressionMode::Lossless, attempt.result)]
            }
            MediaKind::Svg => {
                debug!("File is an SVG");
                let attempt = self
                    .attempt(&entry.url, body, ImageFormat::Svg, CompressionMode::Lossless, original_size)
                    .await;
                apply_lossless(&mut entry.optimization, &attempt.result);
                if let Some(candidate) = attempt.candidate {
                    // Attempt::candidate is only kept for valid UTF-8 SVG output
                    entry.optimization.body_after_optimization =
                        Some(String::from_utf8_lossy(&candidate).into_owned());
                }
                vec![report(CompressionMode::Lossless, attempt.result)]
            }
            MediaKind::Unsupported => {
                debug!("File type {} is not an optimizable image", entry.content_type);
                return Outcome::Unsupported {
                    content_type: entry.content_type.clone(),
                };
            }
        };

        Outcome::Completed { kind, stages }
    }

    async fn optimize_jpeg(
        &self,
        url: &str,
        body: &[u8],
        original_size: u64,
        record: &mut OptimizationRecord,
    ) -> Vec<StageReport> {
        let mut stages = Vec::with_capacity(2);
        let mut stage = JpegStage::Init;

        loop {
            stage = match stage {
                JpegStage::Init => {
                    // Starting softly with a lossless compression
                    let attempt = self
                        .attempt(url, body, ImageFormat::Jpeg, CompressionMode::Lossless, original_size)
                        .await;
                    apply_lossless(record, &attempt.result);
                    let lossless_accepted = match attempt.result {
                        StageResult::Accepted { size } => Some(size),
                        _ => None,
                    };
                    stages.push(report(CompressionMode::Lossless, attempt.result));
                    JpegStage::LosslessDone { lossless_accepted }
                }
                JpegStage::LosslessDone { lossless_accepted } => {
                    // Lossy always starts again from the original body
                    let attempt = self
                        .attempt(url, body, ImageFormat::Jpeg, CompressionMode::Lossy, original_size)
                        .await;
                    match attempt.result {
                        StageResult::Accepted { size } => {
                            record.lossy = Some(size);
                            record.accept(select_optimized(lossless_accepted, size));
                        }
                        StageResult::InsufficientGain { .. } => record.reject(),
                        _ => {}
                    }
                    stages.push(report(CompressionMode::Lossy, attempt.result));
                    JpegStage::LossyDone
                }
                JpegStage::LossyDone => break,
            };
        }

        stages
    }

    /// Run one pass through the codec and evaluate the candidate
    async fn attempt(
        &self,
        url: &str,
        body: &[u8],
        format: ImageFormat,
        mode: CompressionMode,
        original_size: u64,
    ) -> Attempt {
        let candidate = match self.codec.compress(body, format, mode).await {
            Ok(Some(candidate)) => candidate,
            Ok(None) => {
                debug!("Optimization didn't work");
                return Attempt {
                    result: StageResult::NoCandidate,
                    candidate: None,
                };
            }
            Err(e) => {
                warn!("{} {} optimization failed for {}: {}", format, mode, url, e);
                return Attempt {
                    result: StageResult::CodecFailed { reason: e.to_string() },
                    candidate: None,
                };
            }
        };

        if format == ImageFormat::Svg && std::str::from_utf8(&candidate).is_err() {
            warn!("SVG optimization for {} produced invalid text", url);
            return Attempt {
                result: StageResult::CodecFailed {
                    reason: OptimizeError::InvalidSvg.to_string(),
                },
                candidate: None,
            };
        }

        let new_size = candidate.len() as u64;
        debug!("{} {} compression complete for {}", format, mode, url);
        debug!("Old file size: {}", original_size);
        debug!("New file size: {}", new_size);

        if gain_is_enough(original_size, new_size) {
            debug!(
                "Filesize is {} bytes smaller (-{:.0}%)",
                original_size - new_size,
                reduction_percent(original_size, new_size)
            );
            Attempt {
                result: StageResult::Accepted { size: new_size },
                candidate: Some(candidate),
            }
        } else {
            Attempt {
                result: StageResult::InsufficientGain { size: new_size },
                candidate: None,
            }
        }
    }

    pub async fn compress_jpeg_losslessly(&self, body: &[u8]) -> Result<Option<Vec<u8>>, OptimizeError> {
        self.codec.compress(body, ImageFormat::Jpeg, CompressionMode::Lossless).await
    }

    pub async fn compress_jpeg_lossy(&self, body: &[u8]) -> Result<Option<Vec<u8>>, OptimizeError> {
        self.codec.compress(body, ImageFormat::Jpeg, CompressionMode::Lossy).await
    }

    pub async fn compress_png_losslessly(&self, body: &[u8]) -> Result<Option<Vec<u8>>, OptimizeError> {
        self.codec.compress(body, ImageFormat::Png, CompressionMode::Lossless).await
    }

    pub async fn compress_svg_losslessly(&self, body: &[u8]) -> Result<Option<Vec<u8>>, OptimizeError> {
        self.codec.compress(body, ImageFormat::Svg, CompressionMode::Lossless).await
    }
}

fn apply_lossless(record: &mut OptimizationRecord, result: &StageResult) {
    match *result {
        StageResult::Accepted { size } => {
            record.lossless = Some(size);
            record.accept(size);
        }
        StageResult::InsufficientGain { .. } => record.reject(),
        _ => {}
    }
}

fn report(mode: CompressionMode, result: StageResult) -> StageReport {
    StageReport { mode, result }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::OptimizationStatus;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Clone)]
    enum Reply {
        Size(usize),
        Bytes(Vec<u8>),
        Nothing,
        Fail,
    }

    /// Codec double answering from a fixed table and recording every call
    #[derive(Default)]
    struct ScriptedCodec {
        replies: HashMap<(ImageFormat, CompressionMode), Reply>,
        calls: Mutex<Vec<(ImageFormat, CompressionMode, usize)>>,
    }

    impl ScriptedCodec {
        fn reply(mut self, format: ImageFormat, mode: CompressionMode, reply: Reply) -> Self {
            self.replies.insert((format, mode), reply);
            self
        }

        fn calls(&self) -> Vec<(ImageFormat, CompressionMode, usize)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Codec for ScriptedCodec {
        async fn compress(
            &self,
            body: &[u8],
            format: ImageFormat,
            mode: CompressionMode,
        ) -> Result<Option<Vec<u8>>, OptimizeError> {
            self.calls.lock().unwrap().push((format, mode, body.len()));
            match self.replies.get(&(format, mode)).cloned() {
                Some(Reply::Size(n)) => Ok(Some(vec![b'x'; n])),
                Some(Reply::Bytes(bytes)) => Ok(Some(bytes)),
                Some(Reply::Nothing) => Ok(None),
                Some(Reply::Fail) | None => Err(OptimizeError::NoEngine { format, mode }),
            }
        }
    }

    fn jpeg(size: usize) -> AssetEntry {
        AssetEntry::new("https://example.com/photo.jpg", "image/jpeg", vec![0u8; size])
    }

    fn setup(codec: ScriptedCodec) -> (Arc<ScriptedCodec>, ImageOptimizer) {
        let codec = Arc::new(codec);
        let optimizer = ImageOptimizer::new(codec.clone());
        (codec, optimizer)
    }

    #[tokio::test]
    async fn test_no_body_is_untouched() {
        let (codec, optimizer) = setup(ScriptedCodec::default());
        let mut entry = AssetEntry::unfetched("https://example.com/a.jpg", "image/jpeg");
        let before = entry.clone();

        assert_eq!(optimizer.optimize(&mut entry).await, Outcome::NoBody);
        assert_eq!(entry, before);
        assert!(codec.calls().is_empty());
    }

    #[test]
    fn test_unsupported_is_untouched() {
        let (codec, optimizer) = setup(ScriptedCodec::default());
        let mut entry = AssetEntry::new("https://example.com/", "text/html", b"<html></html>".to_vec());
        let before = entry.clone();

        let outcome = tokio_test::block_on(optimizer.optimize(&mut entry));
        assert_eq!(
            outcome,
            Outcome::Unsupported {
                content_type: "text/html".to_string()
            }
        );
        assert_eq!(entry, before);
        assert!(codec.calls().is_empty());
    }

    #[tokio::test]
    async fn test_jpeg_lossy_beats_lossless() {
        let (codec, optimizer) = setup(
            ScriptedCodec::default()
                .reply(ImageFormat::Jpeg, CompressionMode::Lossless, Reply::Size(7000))
                .reply(ImageFormat::Jpeg, CompressionMode::Lossy, Reply::Size(6000)),
        );
        let mut entry = jpeg(10000);

        let outcome = optimizer.optimize(&mut entry).await;

        let record = &entry.optimization;
        assert_eq!(record.lossless, Some(7000));
        assert_eq!(record.lossy, Some(6000));
        assert_eq!(record.optimized(), Some(6000));
        assert_eq!(record.is_optimized(), Some(false));
        assert!(outcome.is_improved());
        // both passes compress the original body
        assert_eq!(
            codec.calls(),
            vec![
                (ImageFormat::Jpeg, CompressionMode::Lossless, 10000),
                (ImageFormat::Jpeg, CompressionMode::Lossy, 10000),
            ]
        );
    }

    #[tokio::test]
    async fn test_jpeg_lossless_keeps_optimized_when_lossy_is_larger() {
        let (_, optimizer) = setup(
            ScriptedCodec::default()
                .reply(ImageFormat::Jpeg, CompressionMode::Lossless, Reply::Size(7000))
                .reply(ImageFormat::Jpeg, CompressionMode::Lossy, Reply::Size(7500)),
        );
        let mut entry = jpeg(10000);

        optimizer.optimize(&mut entry).await;

        assert_eq!(entry.optimization.lossless, Some(7000));
        assert_eq!(entry.optimization.lossy, Some(7500));
        assert_eq!(entry.optimization.optimized(), Some(7000));
    }

    #[tokio::test]
    async fn test_jpeg_tie_goes_to_lossless() {
        let (_, optimizer) = setup(
            ScriptedCodec::default()
                .reply(ImageFormat::Jpeg, CompressionMode::Lossless, Reply::Size(7000))
                .reply(ImageFormat::Jpeg, CompressionMode::Lossy, Reply::Size(7000)),
        );
        let mut entry = jpeg(10000);

        optimizer.optimize(&mut entry).await;

        assert_eq!(entry.optimization.lossy, Some(7000));
        assert_eq!(entry.optimization.status, OptimizationStatus::Accepted(7000));
    }

    #[tokio::test]
    async fn test_jpeg_lossy_only() {
        let (_, optimizer) = setup(
            ScriptedCodec::default()
                .reply(ImageFormat::Jpeg, CompressionMode::Lossless, Reply::Size(9950))
                .reply(ImageFormat::Jpeg, CompressionMode::Lossy, Reply::Size(7900)),
        );
        let mut entry = jpeg(10000);

        let outcome = optimizer.optimize(&mut entry).await;

        assert_eq!(entry.optimization.lossless, None);
        assert_eq!(entry.optimization.lossy, Some(7900));
        assert_eq!(entry.optimization.optimized(), Some(7900));
        assert_eq!(entry.optimization.status, OptimizationStatus::Accepted(7900));
        assert_eq!(
            outcome.stages()[0].result,
            StageResult::InsufficientGain { size: 9950 }
        );
        assert_eq!(outcome.stages()[1].result, StageResult::Accepted { size: 7900 });
    }

    #[tokio::test]
    async fn test_jpeg_exact_twenty_percent_is_rejected() {
        let (_, optimizer) = setup(
            ScriptedCodec::default()
                .reply(ImageFormat::Jpeg, CompressionMode::Lossless, Reply::Size(8000))
                .reply(ImageFormat::Jpeg, CompressionMode::Lossy, Reply::Size(8000)),
        );
        let mut entry = jpeg(10000);

        let outcome = optimizer.optimize(&mut entry).await;

        assert_eq!(entry.optimization.lossless, None);
        assert_eq!(entry.optimization.lossy, None);
        assert_eq!(entry.optimization.optimized(), None);
        assert_eq!(entry.optimization.status, OptimizationStatus::Rejected);
        assert!(!outcome.is_improved());
    }

    #[tokio::test]
    async fn test_jpeg_codec_failures_leave_record_untouched() {
        let (codec, optimizer) = setup(
            ScriptedCodec::default()
                .reply(ImageFormat::Jpeg, CompressionMode::Lossless, Reply::Fail)
                .reply(ImageFormat::Jpeg, CompressionMode::Lossy, Reply::Fail),
        );
        let mut entry = jpeg(10000);

        let outcome = optimizer.optimize(&mut entry).await;

        assert_eq!(codec.calls().len(), 2, "lossy pass must still run");
        assert_eq!(entry.optimization, OptimizationRecord::default());
        assert!(!outcome.is_improved());
        assert!(outcome
            .stages()
            .iter()
            .all(|stage| matches!(stage.result, StageResult::CodecFailed { .. })));
    }

    #[tokio::test]
    async fn test_jpeg_lossless_failure_then_lossy_success() {
        let (_, optimizer) = setup(
            ScriptedCodec::default()
                .reply(ImageFormat::Jpeg, CompressionMode::Lossless, Reply::Nothing)
                .reply(ImageFormat::Jpeg, CompressionMode::Lossy, Reply::Size(5000)),
        );
        let mut entry = jpeg(10000);

        let outcome = optimizer.optimize(&mut entry).await;

        assert_eq!(outcome.stages()[0].result, StageResult::NoCandidate);
        assert_eq!(entry.optimization.lossless, None);
        assert_eq!(entry.optimization.optimized(), Some(5000));
    }

    #[tokio::test]
    async fn test_lossless_accepted_then_lossy_fails() {
        let (_, optimizer) = setup(
            ScriptedCodec::default()
                .reply(ImageFormat::Jpeg, CompressionMode::Lossless, Reply::Size(7000))
                .reply(ImageFormat::Jpeg, CompressionMode::Lossy, Reply::Fail),
        );
        let mut entry = jpeg(10000);

        optimizer.optimize(&mut entry).await;

        assert_eq!(entry.optimization.lossless, Some(7000));
        assert_eq!(entry.optimization.lossy, None);
        assert_eq!(entry.optimization.optimized(), Some(7000));
    }

    #[tokio::test]
    async fn test_insufficient_gain_marks_rejected() {
        let (_, optimizer) = setup(
            ScriptedCodec::default()
                .reply(ImageFormat::Png, CompressionMode::Lossless, Reply::Size(480)),
        );
        let mut entry = AssetEntry::new("https://example.com/a.png", "image/png", vec![0u8; 500]);

        optimizer.optimize(&mut entry).await;

        assert_eq!(entry.optimization.status, OptimizationStatus::Rejected);
        assert_eq!(entry.optimization.lossless, None);
        assert_eq!(entry.optimization.optimized(), None);
    }

    #[tokio::test]
    async fn test_png_single_lossless_pass() {
        let (codec, optimizer) = setup(
            ScriptedCodec::default()
                .reply(ImageFormat::Png, CompressionMode::Lossless, Reply::Size(700)),
        );
        let mut entry = AssetEntry::new("https://example.com/a.png", "image/png", vec![0u8; 1000]);

        let outcome = optimizer.optimize(&mut entry).await;

        assert_eq!(codec.calls(), vec![(ImageFormat::Png, CompressionMode::Lossless, 1000)]);
        assert_eq!(entry.optimization.lossless, Some(700));
        assert_eq!(entry.optimization.lossy, None);
        assert_eq!(entry.optimization.optimized(), Some(700));
        assert!(entry.optimization.body_after_optimization.is_none());
        assert!(matches!(outcome, Outcome::Completed { kind: MediaKind::Png, .. }));
    }

    #[tokio::test]
    async fn test_svg_keeps_rewritten_body() {
        let original = format!("<svg>{}</svg>", " ".repeat(500));
        let minified = "<svg></svg>".to_string();
        let (_, optimizer) = setup(ScriptedCodec::default().reply(
            ImageFormat::Svg,
            CompressionMode::Lossless,
            Reply::Bytes(minified.clone().into_bytes()),
        ));
        let mut entry = AssetEntry::new("https://example.com/a.svg", "image/svg+xml", original.into_bytes());

        optimizer.optimize(&mut entry).await;

        assert_eq!(entry.optimization.lossless, Some(minified.len() as u64));
        assert_eq!(entry.optimization.body_after_optimization.as_deref(), Some(minified.as_str()));
    }

    #[tokio::test]
    async fn test_svg_invalid_utf8_is_a_codec_failure() {
        let (_, optimizer) = setup(ScriptedCodec::default().reply(
            ImageFormat::Svg,
            CompressionMode::Lossless,
            Reply::Bytes(vec![0xff, 0xfe]),
        ));
        let mut entry = AssetEntry::new("https://example.com/a.svg", "image/svg+xml", vec![b' '; 1000]);

        let outcome = optimizer.optimize(&mut entry).await;

        assert_eq!(entry.optimization, OptimizationRecord::default());
        assert!(matches!(outcome.stages()[0].result, StageResult::CodecFailed { .. }));
    }

    #[tokio::test]
    async fn test_svg_failure_returns_unchanged() {
        let (_, optimizer) = setup(ScriptedCodec::default());
        let mut entry = AssetEntry::new("https://example.com/a.svg", "image/svg+xml", vec![b' '; 1000]);
        let before = entry.clone();

        optimizer.optimize(&mut entry).await;

        assert_eq!(entry, before);
    }

    #[tokio::test]
    async fn test_single_stage_helpers_forward_to_codec() {
        let (codec, optimizer) = setup(
            ScriptedCodec::default()
                .reply(ImageFormat::Jpeg, CompressionMode::Lossy, Reply::Size(3)),
        );

        let out = optimizer.compress_jpeg_lossy(b"12345").await.unwrap();
        assert_eq!(out.map(|b| b.len()), Some(3));
        assert!(optimizer.compress_png_losslessly(b"12345").await.is_err());
        assert_eq!(codec.calls().len(), 2);
    }

    #[test]
    fn test_select_optimized() {
        assert_eq!(select_optimized(None, 6000), 6000);
        assert_eq!(select_optimized(Some(7000), 6000), 6000);
        assert_eq!(select_optimized(Some(7000), 7000), 7000);
        assert_eq!(select_optimized(Some(7000), 7500), 7000);
    }

    #[test]
    fn test_skip_reason_tells_failures_from_small_gains() {
        let jpeg_outcome = |results: Vec<StageResult>| Outcome::Completed {
            kind: MediaKind::Jpeg,
            stages: results
                .into_iter()
                .map(|result| report(CompressionMode::Lossless, result))
                .collect(),
        };
        let failed = || StageResult::CodecFailed { reason: "exit 1".into() };

        assert_eq!(Outcome::NoBody.skip_reason(), Some(SkipReason::NotFetched));
        assert_eq!(
            Outcome::Unsupported {
                content_type: "text/html".into()
            }
            .skip_reason(),
            Some(SkipReason::Unsupported)
        );
        assert_eq!(
            jpeg_outcome(vec![StageResult::InsufficientGain { size: 99 }, StageResult::Accepted { size: 50 }])
                .skip_reason(),
            None
        );
        assert_eq!(
            jpeg_outcome(vec![failed(), StageResult::InsufficientGain { size: 99 }]).skip_reason(),
            Some(SkipReason::GainTooSmall)
        );
        assert_eq!(
            jpeg_outcome(vec![failed(), StageResult::NoCandidate]).skip_reason(),
            Some(SkipReason::ToolFailed)
        );
        assert_eq!(
            jpeg_outcome(vec![StageResult::NoCandidate, StageResult::NoCandidate]).skip_reason(),
            Some(SkipReason::NoResult)
        );
        assert_eq!(SkipReason::ToolFailed.to_string(), "optimization tool failed");
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = Outcome::Completed {
            kind: MediaKind::Png,
            stages: vec![report(CompressionMode::Lossless, StageResult::Accepted { size: 10 })],
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "completed");
        assert_eq!(json["kind"], "png");
        assert_eq!(json["stages"][0]["mode"], "lossless");
        assert_eq!(json["stages"][0]["result"], "accepted");
        assert_eq!(json["stages"][0]["size"], 10);
    }
}
