//! Error-diffusion matcher
//!
//! Floyd–Steinberg dithering over one frame at a time. Quantization error of
//! each pixel is pushed to its unvisited neighbours:
//!
//! ```text
//!            *    7/16
//!   3/16   5/16   1/16
//! ```
//!
//! The error buffer is allocated per call and dropped afterwards, so no error
//! carries over from one frame to the next.

use std::sync::Arc;

use image::RgbaImage;

use super::matcher::{CachedColorMatcher, ColorMatcher, ALPHA_THRESHOLD};
use super::palette::{Palette, Rgb, TRANSPARENT};

/// Nearest-color matcher with Floyd–Steinberg error diffusion
pub struct DitheringMatcher {
    exact: CachedColorMatcher,
}

impl DitheringMatcher {
    pub fn new(palette: Arc<Palette>) -> Self {
        Self {
            exact: CachedColorMatcher::new(palette),
        }
    }
}

impl ColorMatcher for DitheringMatcher {
    fn palette(&self) -> &Palette {
        self.exact.palette()
    }

    fn match_color(&self, rgb: Rgb) -> u8 {
        self.exact.match_color(rgb)
    }

    fn match_image(&self, image: &RgbaImage) -> Vec<u8> {
        let width = image.width() as usize;
        let height = image.height() as usize;
        let mut errors = vec![[0i32; 3]; width * height];
        let mut out = Vec::with_capacity(width * height);

        for y in 0..height {
            for x in 0..width {
                let pixel = image.get_pixel(x as u32, y as u32);
                if pixel[3] < ALPHA_THRESHOLD {
                    out.push(TRANSPARENT);
                    continue;
                }

                let err = errors[y * width + x];
                let wanted = [
                    (pixel[0] as i32 + err[0]).clamp(0, 255),
                    (pixel[1] as i32 + err[1]).clamp(0, 255),
                    (pixel[2] as i32 + err[2]).clamp(0, 255),
                ];

                let index = self
                    .exact
                    .match_color(Rgb::new(wanted[0] as u8, wanted[1] as u8, wanted[2] as u8));
                out.push(index);

                let Some(actual) = self.palette().color_of(index) else {
                    continue;
                };
                let diff = [
                    wanted[0] - actual.r as i32,
                    wanted[1] - actual.g as i32,
                    wanted[2] - actual.b as i32,
                ];
                if diff == [0, 0, 0] {
                    continue;
                }

                let mut spread = |dx: isize, dy: usize, weight: i32| {
                    let nx = x as isize + dx;
                    let ny = y + dy;
                    if nx < 0 || nx as usize >= width || ny >= height {
                        return;
                    }
                    let slot = &mut errors[ny * width + nx as usize];
                    for c in 0..3 {
                        slot[c] += diff[c] * weight / 16;
                    }
                };

                spread(1, 0, 7);
                spread(-1, 1, 3);
                spread(0, 1, 5);
                spread(1, 1, 1);
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::palette::{PaletteEntry, PaletteVersion};
    use image::Rgba;

    fn latest() -> Arc<Palette> {
        Arc::new(Palette::new(PaletteVersion::LATEST))
    }

    #[test]
    fn test_uniform_palette_color_matches_exact() {
        let palette = latest();
        let dither = DitheringMatcher::new(Arc::clone(&palette));
        let exact = CachedColorMatcher::new(Arc::clone(&palette));

        let color = palette.entries()[17].color;
        let image = RgbaImage::from_pixel(32, 32, Rgba([color.r, color.g, color.b, 255]));

        let expected = exact.match_color(color);
        assert!(dither.match_image(&image).iter().all(|&i| i == expected));
    }

    #[test]
    fn test_single_pixel_is_exact() {
        let palette = latest();
        let dither = DitheringMatcher::new(Arc::clone(&palette));
        let exact = CachedColorMatcher::new(palette);

        for rgb in [Rgb::new(3, 141, 77), Rgb::new(200, 200, 10), Rgb::new(90, 0, 255)] {
            let image = RgbaImage::from_pixel(1, 1, Rgba([rgb.r, rgb.g, rgb.b, 255]));
            assert_eq!(dither.match_image(&image), vec![exact.match_color(rgb)]);
        }
    }

    #[test]
    fn test_dithered_average_tracks_source() {
        let palette = Arc::new(Palette::from_entries(
            PaletteVersion::LATEST,
            vec![
                PaletteEntry {
                    index: 4,
                    color: Rgb::new(0, 0, 0),
                },
                PaletteEntry {
                    index: 5,
                    color: Rgb::new(255, 255, 255),
                },
            ],
        ));
        let dither = DitheringMatcher::new(Arc::clone(&palette));
        let exact = CachedColorMatcher::new(Arc::clone(&palette));
        let image = RgbaImage::from_pixel(16, 16, Rgba([128, 128, 128, 255]));

        let mean = |indices: &[u8]| {
            let total: u32 = indices
                .iter()
                .map(|&i| palette.color_of(i).unwrap().r as u32)
                .sum();
            total as f64 / indices.len() as f64
        };

        let dithered = mean(&dither.match_image(&image));
        let plain = mean(&exact.match_image(&image));

        assert!((dithered - 128.0).abs() < 20.0, "dithered mean {}", dithered);
        assert!((dithered - 128.0).abs() < (plain - 128.0).abs());
    }

    #[test]
    fn test_transparent_pixels_skip_diffusion() {
        let dither = DitheringMatcher::new(latest());
        let mut image = RgbaImage::from_pixel(3, 1, Rgba([255, 255, 255, 255]));
        image.put_pixel(1, 0, Rgba([10, 10, 10, 0]));

        let indices = dither.match_image(&image);
        assert_eq!(indices[1], TRANSPARENT);
        assert_eq!(indices[0], indices[2]);
    }

    #[test]
    fn test_frames_are_independent() {
        let dither = DitheringMatcher::new(latest());
        let image = RgbaImage::from_fn(8, 8, |x, y| Rgba([(x * 30) as u8, (y * 30) as u8, 99, 255]));

        let first = dither.match_image(&image);
        let second = dither.match_image(&image);
        assert_eq!(first, second);
    }
}
