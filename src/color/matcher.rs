//! Color matchers
//!
//! A matcher turns RGB(A) pixels into palette indices. [`CachedColorMatcher`]
//! maps every pixel independently and memoizes the result per 24-bit color.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use image::RgbaImage;

use super::palette::{Palette, Rgb, TRANSPARENT};

/// Pixels with alpha below this render as transparent
pub const ALPHA_THRESHOLD: u8 = 128;

/// Maps colors to palette indices
///
/// Implementations are shared between every display that uses the same
/// palette, so they must tolerate concurrent calls.
pub trait ColorMatcher: Send + Sync {
    /// The palette this matcher is bound to
    fn palette(&self) -> &Palette;

    /// Palette index for a single opaque color
    fn match_color(&self, rgb: Rgb) -> u8;

    /// Palette indices for a whole frame, row-major, one byte per pixel
    fn match_image(&self, image: &RgbaImage) -> Vec<u8> {
        image
            .pixels()
            .map(|p| {
                if p[3] < ALPHA_THRESHOLD {
                    TRANSPARENT
                } else {
                    self.match_color(Rgb::new(p[0], p[1], p[2]))
                }
            })
            .collect()
    }
}

/// Exact nearest-color matcher with an unbounded per-color cache
///
/// The palette never changes, so cached entries are never invalidated.
pub struct CachedColorMatcher {
    palette: Arc<Palette>,
    cache: RwLock<HashMap<u32, u8>>,
}

impl CachedColorMatcher {
    pub fn new(palette: Arc<Palette>) -> Self {
        Self {
            palette,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Number of distinct colors resolved so far
    pub fn cached_colors(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }
}

impl ColorMatcher for CachedColorMatcher {
    fn palette(&self) -> &Palette {
        &self.palette
    }

    fn match_color(&self, rgb: Rgb) -> u8 {
        let key = rgb.packed();

        if let Ok(cache) = self.cache.read() {
            if let Some(&index) = cache.get(&key) {
                return index;
            }
        }

        let index = self.palette.nearest(rgb).index;

        // A poisoned lock only costs us the memoization
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(key, index);
        }

        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::palette::PaletteVersion;

    fn matcher() -> CachedColorMatcher {
        CachedColorMatcher::new(Arc::new(Palette::new(PaletteVersion::LATEST)))
    }

    #[test]
    fn test_match_is_brute_force_minimum() {
        let matcher = matcher();
        let samples = [
            Rgb::new(0, 0, 0),
            Rgb::new(255, 255, 255),
            Rgb::new(13, 200, 77),
            Rgb::new(128, 128, 128),
            Rgb::new(250, 10, 240),
            Rgb::new(1, 2, 3),
        ];

        for rgb in samples {
            let index = matcher.match_color(rgb);
            let chosen = matcher.palette().color_of(index).unwrap();
            let min = matcher
                .palette()
                .entries()
                .iter()
                .map(|e| rgb.distance_sq(e.color))
                .min()
                .unwrap();
            assert_eq!(rgb.distance_sq(chosen), min, "color {}", rgb);
        }
    }

    #[test]
    fn test_match_is_idempotent_and_cached() {
        let matcher = matcher();
        let rgb = Rgb::new(40, 90, 200);

        let first = matcher.match_color(rgb);
        assert_eq!(matcher.cached_colors(), 1);
        let second = matcher.match_color(rgb);

        assert_eq!(first, second);
        assert_eq!(matcher.cached_colors(), 1);
    }

    #[test]
    fn test_match_image_transparency() {
        let matcher = matcher();
        let mut image = RgbaImage::new(2, 1);
        image.put_pixel(0, 0, image::Rgba([255, 255, 255, 255]));
        image.put_pixel(1, 0, image::Rgba([255, 255, 255, 10]));

        let indices = matcher.match_image(&image);
        assert_eq!(indices, vec![matcher.match_color(Rgb::new(255, 255, 255)), TRANSPARENT]);
    }

    #[test]
    fn test_concurrent_fills() {
        let matcher = Arc::new(matcher());
        let handles: Vec<_> = (0..4u8)
            .map(|t| {
                let matcher = Arc::clone(&matcher);
                std::thread::spawn(move || {
                    (0..=255u8)
                        .map(|v| matcher.match_color(Rgb::new(v, t * 60, 255 - v)))
                        .collect::<Vec<u8>>()
                })
            })
            .collect();

        for (t, handle) in handles.into_iter().enumerate() {
            let results = handle.join().unwrap();
            for (v, index) in results.into_iter().enumerate() {
                let rgb = Rgb::new(v as u8, t as u8 * 60, 255 - v as u8);
                assert_eq!(index, matcher.palette().nearest(rgb).index);
            }
        }
    }
}
