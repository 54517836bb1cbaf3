//! Persisted display definition

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::geometry::{Facing, Location};

/// Everything needed to rebuild a display after a restart
///
/// Pixel data is not stored; frames are fetched again from `source`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayRecord {
    pub id: Uuid,
    pub location: Location,
    pub facing: Facing,
    pub width: u32,
    pub height: u32,
    /// URL or file path the frames came from
    pub source: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_json_shape() {
        let record = DisplayRecord {
            id: Uuid::nil(),
            location: Location::new("world", 1, 2, 3),
            facing: Facing::East,
            width: 2,
            height: 3,
            source: "https://example.com/cat.gif".into(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["facing"], "east");
        assert_eq!(json["location"]["world"], "world");
        assert_eq!(json["width"], 2);

        let back: DisplayRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
