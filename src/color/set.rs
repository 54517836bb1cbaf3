//! Per-palette matcher selection

use std::collections::HashMap;
use std::sync::Arc;

use super::dither::DitheringMatcher;
use super::matcher::{CachedColorMatcher, ColorMatcher};
use super::palette::{Palette, PaletteVersion};

/// One matcher per palette generation
///
/// Rebuilt on reload; the dithering flag applies to every palette at once.
#[derive(Clone)]
pub struct MatcherSet {
    dithering: bool,
    matchers: HashMap<PaletteVersion, Arc<dyn ColorMatcher>>,
}

impl MatcherSet {
    /// Build matchers for every known palette
    pub fn new(dithering: bool) -> Self {
        let matchers = PaletteVersion::ALL
            .iter()
            .map(|&version| {
                let palette = Arc::new(Palette::new(version));
                let matcher: Arc<dyn ColorMatcher> = if dithering {
                    Arc::new(DitheringMatcher::new(palette))
                } else {
                    Arc::new(CachedColorMatcher::new(palette))
                };
                (version, matcher)
            })
            .collect();

        tracing::debug!(dithering, palettes = PaletteVersion::ALL.len(), "Color matchers built");

        Self {
            dithering,
            matchers,
        }
    }

    /// Whether the matchers diffuse error
    pub fn dithering(&self) -> bool {
        self.dithering
    }

    /// Matcher for a palette generation
    pub fn get(&self, version: PaletteVersion) -> Arc<dyn ColorMatcher> {
        match self.matchers.get(&version) {
            Some(matcher) => Arc::clone(matcher),
            // every generation is populated in new(); keep a fallback anyway
            None => Arc::new(CachedColorMatcher::new(Arc::new(Palette::new(version)))),
        }
    }
}

impl Default for MatcherSet {
    fn default() -> Self {
        Self::new(false)
    }
}
