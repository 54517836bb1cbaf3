//! Source images
//!
//! Turning a URL or path into per-frame palette indices:
//!
//! ```text
//!   fetch (async I/O) ──► decode ──► resize ──► quantize
//!                         └────── CPU, run off the async workers ──────┘
//! ```

pub mod decode;
pub mod fetch;

use std::sync::Arc;

use crate::color::ColorMatcher;
use crate::error::{Error, Result, SourceError};
use crate::protocol::constants::MAP_SIZE;

pub use decode::{decode_frames, quantize_frames, resize_frames};
pub use fetch::{fetch, is_remote};

/// Fetch `source` and quantize it for a `width × height` cell display
///
/// Returns one full-image index buffer per frame, row-major, sized
/// `width*128 × height*128`.
pub async fn load_indexed(
    source: &str,
    width: u32,
    height: u32,
    max_bytes: usize,
    matcher: Arc<dyn ColorMatcher>,
) -> Result<Vec<Vec<u8>>> {
    let pixels = width
        .checked_mul(MAP_SIZE)
        .zip(height.checked_mul(MAP_SIZE))
        .and_then(|(w, h)| (w as usize).checked_mul(h as usize));
    if !matches!(pixels, Some(n) if n > 0) {
        return Err(Error::InvalidDimensions { width, height });
    }

    let bytes = fetch(source, max_bytes).await?;

    let indexed = tokio::task::spawn_blocking(move || -> std::result::Result<_, SourceError> {
        let frames = decode_frames(&bytes)?;
        let frames = resize_frames(&frames, width, height);
        Ok(quantize_frames(&frames, matcher.as_ref()))
    })
    .await
    .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))??;

    tracing::debug!(
        source = %source,
        frames = indexed.len(),
        width = width,
        height = height,
        "Source quantized"
    );
    Ok(indexed)
}
