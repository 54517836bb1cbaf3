//! World placement types

use serde::{Deserialize, Serialize};

/// A block position in a named world
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub world: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Location {
    pub fn new(world: impl Into<String>, x: i32, y: i32, z: i32) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
        }
    }

    /// Same world, shifted by a block offset
    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            world: self.world.clone(),
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }

    /// Squared distance between block centers, ignoring worlds
    pub fn distance_sq(&self, other: &Location) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        let dz = (self.z - other.z) as f64;
        dx * dx + dy * dy + dz * dz
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{},{},{}", self.world, self.x, self.y, self.z)
    }
}

/// Direction the image faces (out of the wall, toward the viewer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    North,
    South,
    East,
    West,
}

impl Facing {
    /// Facing that points back at a viewer looking along `yaw`
    ///
    /// Yaw follows the game convention: 0 = south, 90 = west, 180 = north,
    /// 270 = east.
    pub fn toward_viewer(yaw: f32) -> Self {
        let yaw = yaw.rem_euclid(360.0);
        match yaw {
            y if !(45.0..315.0).contains(&y) => Facing::North,
            y if y < 135.0 => Facing::East,
            y if y < 225.0 => Facing::South,
            _ => Facing::West,
        }
    }

    /// Orientation value carried in the spawn packet's data field
    pub fn orientation(self) -> i32 {
        match self {
            Facing::North => 2,
            Facing::South => 3,
            Facing::West => 4,
            Facing::East => 5,
        }
    }

    /// Yaw of an entity facing this way, in degrees
    pub fn yaw(self) -> f32 {
        match self {
            Facing::South => 0.0,
            Facing::West => 90.0,
            Facing::North => 180.0,
            Facing::East => 270.0,
        }
    }

    /// Block step (dx, dz) from one column to the next, as the viewer sees it
    pub fn column_step(self) -> (i32, i32) {
        match self {
            Facing::North => (-1, 0),
            Facing::South => (1, 0),
            Facing::East => (0, -1),
            Facing::West => (0, 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toward_viewer() {
        assert_eq!(Facing::toward_viewer(0.0), Facing::North);
        assert_eq!(Facing::toward_viewer(90.0), Facing::East);
        assert_eq!(Facing::toward_viewer(180.0), Facing::South);
        assert_eq!(Facing::toward_viewer(270.0), Facing::West);
        assert_eq!(Facing::toward_viewer(-90.0), Facing::West);
        assert_eq!(Facing::toward_viewer(350.0), Facing::North);
    }

    #[test]
    fn test_orientation_values() {
        assert_eq!(Facing::North.orientation(), 2);
        assert_eq!(Facing::East.orientation(), 5);
    }

    #[test]
    fn test_location_offset_and_distance() {
        let origin = Location::new("world", 10, 64, -5);
        let moved = origin.offset(3, -4, 0);
        assert_eq!(moved, Location::new("world", 13, 60, -5));
        assert_eq!(origin.distance_sq(&moved), 25.0);
        assert_eq!(origin.to_string(), "world@10,64,-5");
    }

    #[test]
    fn test_facing_serde() {
        let json = serde_json::to_string(&Facing::West).unwrap();
        assert_eq!(json, "\"west\"");
        let back: Facing = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Facing::West);
    }
}
