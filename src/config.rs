//! Service configuration

use std::time::Duration;

use crate::color::PaletteVersion;
use crate::connection::DEFAULT_ENCODER_MARKER;
use crate::protocol::BuilderOptions;

/// Server tick length
pub const DEFAULT_TICK_DURATION: Duration = Duration::from_millis(50);

/// Frame service configuration options
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Use error-diffusion dithering when quantizing
    pub dithering: bool,

    /// Spawn glowing item frames
    pub glow: bool,

    /// Hide the item frame border
    pub invisible_frames: bool,

    /// Blocks around a display within which clients get frame updates
    pub view_radius: f64,

    /// Ticks between frame advances
    pub frame_interval_ticks: u64,

    /// Real time per tick for the scheduler driver
    pub tick_duration: Duration,

    /// Handler name that precedes the encoder in each connection's chain
    pub encoder_marker: String,

    /// Palette new displays are quantized against
    pub palette: PaletteVersion,

    /// Largest source download or file accepted, in bytes
    pub max_source_bytes: usize,

    /// Largest width × height accepted by create
    pub max_cells: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            dithering: false,
            glow: false,
            invisible_frames: true,
            view_radius: 256.0,
            frame_interval_ticks: 1,
            tick_duration: DEFAULT_TICK_DURATION,
            encoder_marker: DEFAULT_ENCODER_MARKER.to_string(),
            palette: PaletteVersion::LATEST,
            max_source_bytes: 32 * 1024 * 1024, // 32MB
            max_cells: 64,
        }
    }
}

impl ServiceConfig {
    /// Enable or disable dithering
    pub fn dithering(mut self, enabled: bool) -> Self {
        self.dithering = enabled;
        self
    }

    /// Use glowing item frames
    pub fn glow(mut self, enabled: bool) -> Self {
        self.glow = enabled;
        self
    }

    /// Show or hide the item frame border
    pub fn invisible_frames(mut self, invisible: bool) -> Self {
        self.invisible_frames = invisible;
        self
    }

    /// Set the update radius
    pub fn view_radius(mut self, radius: f64) -> Self {
        self.view_radius = radius.max(0.0);
        self
    }

    /// Set ticks between frame advances (at least 1)
    pub fn frame_interval_ticks(mut self, ticks: u64) -> Self {
        self.frame_interval_ticks = ticks.max(1);
        self
    }

    /// Set the tick length
    pub fn tick_duration(mut self, duration: Duration) -> Self {
        self.tick_duration = duration;
        self
    }

    /// Set the encoder marker handler name
    pub fn encoder_marker(mut self, marker: impl Into<String>) -> Self {
        self.encoder_marker = marker.into();
        self
    }

    /// Set the palette
    pub fn palette(mut self, palette: PaletteVersion) -> Self {
        self.palette = palette;
        self
    }

    /// Set the source size limit
    pub fn max_source_bytes(mut self, bytes: usize) -> Self {
        self.max_source_bytes = bytes;
        self
    }

    /// Set the cell limit for new displays
    pub fn max_cells(mut self, cells: u32) -> Self {
        self.max_cells = cells;
        self
    }

    /// Packet builder options implied by this config
    pub fn builder_options(&self) -> BuilderOptions {
        BuilderOptions {
            glow: self.glow,
            invisible: self.invisible_frames,
        }
    }
}
