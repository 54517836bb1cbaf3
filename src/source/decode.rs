//! Frame decoding and scaling
//!
//! Animated GIFs yield one image per frame; every other format yields one.
//! Frame timing is ignored: displays advance on their own tick interval.

use std::io::Cursor;

use image::codecs::gif::GifDecoder;
use image::imageops::FilterType;
use image::{AnimationDecoder, ImageFormat, RgbaImage};

use crate::color::ColorMatcher;
use crate::error::SourceError;
use crate::protocol::constants::MAP_SIZE;

/// Decode every frame in `bytes`
pub fn decode_frames(bytes: &[u8]) -> Result<Vec<RgbaImage>, SourceError> {
    let format = image::guess_format(bytes)?;

    let frames = if format == ImageFormat::Gif {
        let decoder = GifDecoder::new(Cursor::new(bytes))?;
        decoder
            .into_frames()
            .collect_frames()?
            .into_iter()
            .map(|frame| frame.into_buffer())
            .collect()
    } else {
        vec![image::load_from_memory_with_format(bytes, format)?.to_rgba8()]
    };

    if frames.is_empty() {
        return Err(SourceError::NoFrames);
    }
    Ok(frames)
}

/// Scale frames to cover exactly `width × height` cells
pub fn resize_frames(frames: &[RgbaImage], width: u32, height: u32) -> Vec<RgbaImage> {
    let target_width = width * MAP_SIZE;
    let target_height = height * MAP_SIZE;

    frames
        .iter()
        .map(|frame| {
            if frame.dimensions() == (target_width, target_height) {
                frame.clone()
            } else {
                image::imageops::resize(frame, target_width, target_height, FilterType::Triangle)
            }
        })
        .collect()
}

/// Palette indices for each frame
pub fn quantize_frames(frames: &[RgbaImage], matcher: &dyn ColorMatcher) -> Vec<Vec<u8>> {
    frames.iter().map(|frame| matcher.match_image(frame)).collect()
}
