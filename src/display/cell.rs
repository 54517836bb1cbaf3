//! Cell layout
//!
//! A display of `width × height` cells is one item frame holding one map per
//! cell. Cells are numbered in raster order, top-left first.

use std::sync::atomic::{AtomicI32, Ordering};

use bytes::Bytes;
use uuid::Uuid;

use super::geometry::{Facing, Location};
use crate::protocol::constants::{MAP_PIXELS, MAP_SIZE};

/// First entity id handed out; far above anything the host allocates
const FIRST_ENTITY_ID: i32 = 0x3F00_0000;

/// First map id handed out
const FIRST_MAP_ID: i32 = 30_000;

static NEXT_ENTITY_ID: AtomicI32 = AtomicI32::new(FIRST_ENTITY_ID);
static NEXT_MAP_ID: AtomicI32 = AtomicI32::new(FIRST_MAP_ID);

/// Allocate a process-unique entity id
pub fn next_entity_id() -> i32 {
    NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed)
}

/// Allocate a process-unique map id
pub fn next_map_id() -> i32 {
    NEXT_MAP_ID.fetch_add(1, Ordering::Relaxed)
}

/// One item frame of a display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Raster index, `row * width + column`
    pub index: usize,
    pub column: u32,
    pub row: u32,
    pub entity_id: i32,
    pub entity_uuid: Uuid,
    pub map_id: i32,
    /// Block the item frame occupies
    pub block: Location,
}

/// Lay out cells for a display anchored at its top-left block
pub fn layout(origin: &Location, facing: Facing, width: u32, height: u32) -> Vec<Cell> {
    let (step_x, step_z) = facing.column_step();

    (0..height)
        .flat_map(|row| (0..width).map(move |column| (row, column)))
        .enumerate()
        .map(|(index, (row, column))| Cell {
            index,
            column,
            row,
            entity_id: next_entity_id(),
            entity_uuid: Uuid::new_v4(),
            map_id: next_map_id(),
            block: origin.offset(
                step_x * column as i32,
                -(row as i32),
                step_z * column as i32,
            ),
        })
        .collect()
}

/// Split a full-image index buffer into per-cell map buffers
///
/// `indices` is row-major with `width * 128` columns and `height * 128`
/// rows. Returns `None` if the buffer has the wrong size.
pub fn split_cells(indices: &[u8], width: u32, height: u32) -> Option<Vec<Bytes>> {
    let stride = width.checked_mul(MAP_SIZE)? as usize;
    let rows = height.checked_mul(MAP_SIZE)? as usize;
    if indices.len() != stride.checked_mul(rows)? {
        return None;
    }

    let size = MAP_SIZE as usize;
    let mut cells = Vec::with_capacity(width as usize * height as usize);

    for row in 0..height as usize {
        for column in 0..width as usize {
            let mut map = Vec::with_capacity(MAP_PIXELS);
            for y in 0..size {
                let start = (row * size + y) * stride + column * size;
                map.extend_from_slice(&indices[start..start + size]);
            }
            cells.push(Bytes::from(map));
        }
    }

    Some(cells)
}
