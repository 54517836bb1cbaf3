//! Frame displays
//!
//! A display is a grid of item frames, each holding a filled map, that
//! together show one image. The grid is anchored at its top-left block and
//! extends right (as the viewer sees it) and down.
//!
//! ```text
//!   origin ──► ┌──────┬──────┐
//!              │ c0   │ c1   │   row 0
//!              ├──────┼──────┤
//!              │ c2   │ c3   │   row 1 (y - 1)
//!              └──────┴──────┘
//!              128×128 map pixels per cell
//! ```
//!
//! Frames are quantized once, up front, and stored per cell as raw palette
//! indices. Advancing the animation only moves an index.

pub mod cell;
pub mod frame;
pub mod geometry;
pub mod record;

pub use cell::{layout, next_entity_id, next_map_id, split_cells, Cell};
pub use frame::{DisplayState, Frame, FrameDisplay};
pub use geometry::{Facing, Location};
pub use record::DisplayRecord;
