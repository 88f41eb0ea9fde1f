//! # Codec Boundary
//!
//! L'optimizer non comprime nulla da sé: chiede a un `Codec` una versione
//! ricompressa del body originale, una chiamata per passaggio.
//!
//! - `external`: implementazione che usa tool esterni (jpegtran, jpegoptim, optipng, svgo)

pub mod external;

use async_trait::async_trait;

use crate::error::OptimizeError;
use crate::media::{CompressionMode, ImageFormat};

pub use external::ExternalToolCodec;

/// Abstract compression capability.
///
/// `Ok(None)` means the engine ran but produced no candidate; the optimizer
/// treats it the same way as an error, without touching the record.
#[async_trait]
pub trait Codec: Send + Sync {
    async fn compress(
        &self,
        body: &[u8],
        format: ImageFormat,
        mode: CompressionMode,
    ) -> Result<Option<Vec<u8>>, OptimizeError>;
}
