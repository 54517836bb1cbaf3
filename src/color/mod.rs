//! Color quantization
//!
//! Source frames are reduced to map palette indices before they are packed
//! into map data packets. Two strategies share the [`ColorMatcher`] trait:
//!
//! - [`CachedColorMatcher`]: nearest color per pixel, memoized per RGB value
//! - [`DitheringMatcher`]: nearest color with Floyd–Steinberg error diffusion
//!
//! [`MatcherSet`] holds one matcher per palette generation.

pub mod dither;
pub mod matcher;
pub mod palette;
pub mod set;

pub use dither::DitheringMatcher;
pub use matcher::{CachedColorMatcher, ColorMatcher, ALPHA_THRESHOLD};
pub use palette::{Palette, PaletteEntry, PaletteVersion, Rgb, TRANSPARENT};
pub use set::MatcherSet;
