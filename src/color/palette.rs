//! Map color palettes
//!
//! Map pixels are indices into a palette of `base color × 4 shades`. The
//! base color list grew over several game versions, so each generation gets
//! its own [`Palette`]. Base color 0 is transparent and is never a match
//! target.

use std::fmt;

/// Shade multipliers applied to each base color, in index order
const SHADE_MULTIPLIERS: [u32; 4] = [180, 220, 255, 135];

/// Palette index for a fully transparent pixel
pub const TRANSPARENT: u8 = 0;

/// Map base colors, newest generation. Older generations use a prefix.
const BASE_COLORS: [(u8, u8, u8); 62] = [
    (0, 0, 0),
    (127, 178, 56),
    (247, 233, 163),
    (199, 199, 199),
    (255, 0, 0),
    (160, 160, 255),
    (167, 167, 167),
    (0, 124, 0),
    (255, 255, 255),
    (164, 168, 184),
    (151, 109, 77),
    (112, 112, 112),
    (64, 64, 255),
    (143, 119, 72),
    (255, 252, 245),
    (216, 127, 51),
    (178, 76, 216),
    (102, 153, 216),
    (229, 229, 51),
    (127, 204, 25),
    (242, 127, 165),
    (76, 76, 76),
    (153, 153, 153),
    (76, 127, 153),
    (127, 63, 178),
    (51, 76, 178),
    (102, 76, 51),
    (102, 127, 51),
    (153, 51, 51),
    (25, 25, 25),
    (250, 238, 77),
    (92, 219, 213),
    (74, 128, 255),
    (0, 217, 58),
    (129, 86, 49),
    (112, 2, 0),
    // terracotta, 1.12
    (209, 177, 161),
    (159, 82, 36),
    (149, 87, 108),
    (112, 108, 138),
    (186, 133, 36),
    (103, 117, 53),
    (160, 77, 78),
    (57, 41, 35),
    (135, 107, 98),
    (87, 92, 92),
    (122, 73, 88),
    (76, 62, 92),
    (76, 50, 35),
    (76, 82, 42),
    (142, 60, 46),
    (37, 22, 16),
    // nether, 1.16
    (189, 48, 49),
    (148, 63, 97),
    (92, 25, 29),
    (22, 126, 134),
    (58, 142, 140),
    (86, 44, 62),
    (20, 180, 133),
    // 1.17
    (100, 100, 100),
    (216, 175, 147),
    (127, 167, 150),
];

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Packed `0xRRGGBB` value, used as the cache key
    pub fn packed(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Squared Euclidean distance in RGB space
    pub fn distance_sq(self, other: Rgb) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.packed())
    }
}

/// Palette generations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaletteVersion {
    /// 1.8 - 1.11, 36 base colors
    Legacy,
    /// 1.12 - 1.15, adds terracotta
    V1_12,
    /// 1.16, adds nether wood
    V1_16,
    /// 1.17+, adds deepslate, raw iron, glow lichen
    V1_17,
}

impl PaletteVersion {
    /// Every generation, oldest first
    pub const ALL: [PaletteVersion; 4] = [
        PaletteVersion::Legacy,
        PaletteVersion::V1_12,
        PaletteVersion::V1_16,
        PaletteVersion::V1_17,
    ];

    /// Newest generation
    pub const LATEST: PaletteVersion = PaletteVersion::V1_17;

    /// Number of base colors available in this generation
    pub fn base_color_count(self) -> usize {
        match self {
            PaletteVersion::Legacy => 36,
            PaletteVersion::V1_12 => 52,
            PaletteVersion::V1_16 => 59,
            PaletteVersion::V1_17 => 62,
        }
    }
}

/// A palette entry: wire index and the color it renders as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    pub index: u8,
    pub color: Rgb,
}

/// Immutable set of matchable colors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    version: PaletteVersion,
    entries: Vec<PaletteEntry>,
    // indexed by wire index
    colors: Vec<Option<Rgb>>,
}

impl Palette {
    /// Build the shaded palette for a generation
    pub fn new(version: PaletteVersion) -> Self {
        let entries = BASE_COLORS[..version.base_color_count()]
            .iter()
            .enumerate()
            .skip(1) // transparent
            .flat_map(|(base, &(r, g, b))| {
                SHADE_MULTIPLIERS
                    .iter()
                    .enumerate()
                    .map(move |(shade, &m)| PaletteEntry {
                        index: (base * 4 + shade) as u8,
                        color: Rgb::new(
                            (r as u32 * m / 255) as u8,
                            (g as u32 * m / 255) as u8,
                            (b as u32 * m / 255) as u8,
                        ),
                    })
            })
            .collect();

        Self::from_entries(version, entries)
    }

    /// Build a palette from explicit entries
    ///
    /// If two entries share an index, the first one defines its color.
    pub fn from_entries(version: PaletteVersion, entries: Vec<PaletteEntry>) -> Self {
        let mut colors = vec![None; 256];
        for entry in &entries {
            colors[entry.index as usize].get_or_insert(entry.color);
        }

        Self {
            version,
            entries,
            colors,
        }
    }

    pub fn version(&self) -> PaletteVersion {
        self.version
    }

    /// Matchable entries in iteration order
    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Color rendered for a wire index
    pub fn color_of(&self, index: u8) -> Option<Rgb> {
        self.colors[index as usize]
    }

    /// Nearest entry by squared distance; the first entry wins ties
    ///
    /// Returns [`TRANSPARENT`] for an empty palette.
    pub fn nearest(&self, rgb: Rgb) -> PaletteEntry {
        let mut best = PaletteEntry {
            index: TRANSPARENT,
            color: Rgb::new(0, 0, 0),
        };
        let mut best_distance = u32::MAX;

        for entry in &self.entries {
            let distance = rgb.distance_sq(entry.color);
            if distance < best_distance {
                best = *entry;
                best_distance = distance;
                if distance == 0 {
                    break;
                }
            }
        }

        best
    }
}
