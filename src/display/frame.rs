//! Frame display
//!
//! A [`FrameDisplay`] is one (possibly animated) image: its placement, its
//! cell layout, the quantized pixels of every frame, and the index of the
//! frame currently shown. Everything but the frame index and lifecycle state
//! is fixed at construction.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use bytes::Bytes;
use uuid::Uuid;

use super::cell::{layout, split_cells, Cell};
use super::geometry::{Facing, Location};
use super::record::DisplayRecord;
use crate::error::{Error, Result, SourceError};
use crate::protocol::constants::MAP_PIXELS;

/// Per-cell map pixels of one frame, in cell raster order
pub type Frame = Vec<Bytes>;

/// Lifecycle of a display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    /// Built but not yet shown to anyone
    Unregistered,
    /// Shown, single frame, no timer
    Spawned,
    /// Shown and advancing frames on a timer
    Animating,
    /// Removed; terminal
    Destroyed,
}

/// One image anchored in the world
#[derive(Debug)]
pub struct FrameDisplay {
    id: Uuid,
    location: Location,
    facing: Facing,
    width: u32,
    height: u32,
    source: String,
    cells: Vec<Cell>,
    frames: Vec<Frame>,
    current: AtomicUsize,
    state: Mutex<DisplayState>,
}

impl FrameDisplay {
    /// Build a display from per-cell frame data
    ///
    /// Every frame must hold `width * height` cells of 128×128 indices.
    pub fn new(
        id: Uuid,
        location: Location,
        facing: Facing,
        width: u32,
        height: u32,
        source: impl Into<String>,
        frames: Vec<Frame>,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        if frames.is_empty() {
            return Err(Error::Source(SourceError::NoFrames));
        }

        let cell_count = (width as usize)
            .checked_mul(height as usize)
            .ok_or(Error::InvalidDimensions { width, height })?;
        let well_formed = frames
            .iter()
            .all(|f| f.len() == cell_count && f.iter().all(|c| c.len() == MAP_PIXELS));
        if !well_formed {
            return Err(Error::InvalidDimensions { width, height });
        }

        let cells = layout(&location, facing, width, height);

        Ok(Self {
            id,
            location,
            facing,
            width,
            height,
            source: source.into(),
            cells,
            frames,
            current: AtomicUsize::new(0),
            state: Mutex::new(DisplayState::Unregistered),
        })
    }

    /// Build a display from full-image index buffers, one per frame
    pub fn from_indexed(
        id: Uuid,
        location: Location,
        facing: Facing,
        width: u32,
        height: u32,
        source: impl Into<String>,
        indexed: Vec<Vec<u8>>,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }

        let frames = indexed
            .iter()
            .map(|indices| split_cells(indices, width, height))
            .collect::<Option<Vec<Frame>>>()
            .ok_or(Error::InvalidDimensions { width, height })?;

        Self::new(id, location, facing, width, height, source, frames)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Name of the world the display lives in
    pub fn world(&self) -> &str {
        &self.location.world
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Width in cells
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in cells
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Cells in raster order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Whether the display needs a frame timer
    pub fn is_animated(&self) -> bool {
        self.frames.len() > 1
    }

    /// Cell data of a frame; the index wraps modulo the frame count
    pub fn frame(&self, index: usize) -> &Frame {
        &self.frames[index % self.frames.len()]
    }

    /// Index of the frame currently shown
    pub fn current_frame(&self) -> usize {
        self.current.load(Ordering::Acquire)
    }

    /// Step to the next frame and return its index
    pub fn advance(&self) -> usize {
        let count = self.frames.len();
        let previous = self
            .current
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| Some((c + 1) % count))
            .unwrap_or_else(|c| c);
        (previous + 1) % count
    }

    pub fn state(&self) -> DisplayState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record that the display has been shown
    pub(crate) fn mark_spawned(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if *state == DisplayState::Unregistered {
            *state = if self.is_animated() {
                DisplayState::Animating
            } else {
                DisplayState::Spawned
            };
        }
    }

    /// Move to the terminal state; returns false if already there
    pub(crate) fn mark_destroyed(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if *state == DisplayState::Destroyed {
            return false;
        }
        *state = DisplayState::Destroyed;
        true
    }

    /// Snapshot for persistence
    pub fn record(&self) -> DisplayRecord {
        DisplayRecord {
            id: self.id,
            location: self.location.clone(),
            facing: self.facing,
            width: self.width,
            height: self.height,
            source: self.source.clone(),
        }
    }
}
