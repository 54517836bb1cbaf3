//! NBT tag types
//!
//! A tag tree is built from [`NbtTag`] values. Lists are homogeneous and
//! checked when constructed; compounds keep their entries in insertion order.

use crate::error::NbtError;

// NBT type ids
pub const TAG_END: u8 = 0;
pub const TAG_BYTE: u8 = 1;
pub const TAG_SHORT: u8 = 2;
pub const TAG_INT: u8 = 3;
pub const TAG_LONG: u8 = 4;
pub const TAG_FLOAT: u8 = 5;
pub const TAG_DOUBLE: u8 = 6;
pub const TAG_BYTE_ARRAY: u8 = 7;
pub const TAG_STRING: u8 = 8;
pub const TAG_LIST: u8 = 9;
pub const TAG_COMPOUND: u8 = 10;

/// A single NBT value
#[derive(Debug, Clone, PartialEq)]
pub enum NbtTag {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<u8>),
    /// Encoded with a u16 length; anything past 65535 bytes is cut at a
    /// char boundary
    String(String),
    List(NbtList),
    Compound(NbtCompound),
}

impl NbtTag {
    /// Type id written before the tag
    pub fn type_id(&self) -> u8 {
        match self {
            NbtTag::Byte(_) => TAG_BYTE,
            NbtTag::Short(_) => TAG_SHORT,
            NbtTag::Int(_) => TAG_INT,
            NbtTag::Long(_) => TAG_LONG,
            NbtTag::Float(_) => TAG_FLOAT,
            NbtTag::Double(_) => TAG_DOUBLE,
            NbtTag::ByteArray(_) => TAG_BYTE_ARRAY,
            NbtTag::String(_) => TAG_STRING,
            NbtTag::List(_) => TAG_LIST,
            NbtTag::Compound(_) => TAG_COMPOUND,
        }
    }

    /// Try to get this tag as an int
    pub fn as_int(&self) -> Option<i32> {
        match self {
            NbtTag::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get this tag as a string reference
    pub fn as_str(&self) -> Option<&str> {
        match self {
            NbtTag::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this tag as a compound reference
    pub fn as_compound(&self) -> Option<&NbtCompound> {
        match self {
            NbtTag::Compound(c) => Some(c),
            _ => None,
        }
    }
}

impl From<i8> for NbtTag {
    fn from(v: i8) -> Self {
        NbtTag::Byte(v)
    }
}

impl From<bool> for NbtTag {
    fn from(v: bool) -> Self {
        NbtTag::Byte(v as i8)
    }
}

impl From<i16> for NbtTag {
    fn from(v: i16) -> Self {
        NbtTag::Short(v)
    }
}

impl From<i32> for NbtTag {
    fn from(v: i32) -> Self {
        NbtTag::Int(v)
    }
}

impl From<i64> for NbtTag {
    fn from(v: i64) -> Self {
        NbtTag::Long(v)
    }
}

impl From<f32> for NbtTag {
    fn from(v: f32) -> Self {
        NbtTag::Float(v)
    }
}

impl From<f64> for NbtTag {
    fn from(v: f64) -> Self {
        NbtTag::Double(v)
    }
}

impl From<&str> for NbtTag {
    fn from(v: &str) -> Self {
        NbtTag::String(v.to_string())
    }
}

impl From<String> for NbtTag {
    fn from(v: String) -> Self {
        NbtTag::String(v)
    }
}

impl From<NbtCompound> for NbtTag {
    fn from(v: NbtCompound) -> Self {
        NbtTag::Compound(v)
    }
}

impl From<NbtList> for NbtTag {
    fn from(v: NbtList) -> Self {
        NbtTag::List(v)
    }
}

/// Homogeneous list of tags
#[derive(Debug, Clone, PartialEq)]
pub struct NbtList {
    element_type: u8,
    items: Vec<NbtTag>,
}

impl NbtList {
    /// Build a list, rejecting mixed element types
    ///
    /// An empty list gets the End element type.
    pub fn new(items: Vec<NbtTag>) -> Result<Self, NbtError> {
        let element_type = items.first().map(NbtTag::type_id).unwrap_or(TAG_END);

        if let Some(bad) = items.iter().find(|t| t.type_id() != element_type) {
            return Err(NbtError::HeterogeneousList {
                expected: element_type,
                found: bad.type_id(),
            });
        }

        Ok(Self {
            element_type,
            items,
        })
    }

    /// An empty list that declares its element type
    pub fn empty(element_type: u8) -> Self {
        Self {
            element_type,
            items: Vec::new(),
        }
    }

    /// Type id shared by every element
    pub fn element_type(&self) -> u8 {
        self.element_type
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NbtTag> {
        self.items.iter()
    }
}

/// Named, ordered collection of tags
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NbtCompound {
    entries: Vec<(String, NbtTag)>,
}

impl NbtCompound {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry
    ///
    /// Replacing keeps the entry's original position.
    pub fn insert(&mut self, name: impl Into<String>, tag: impl Into<NbtTag>) {
        let name = name.into();
        let tag = tag.into();

        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = tag,
            None => self.entries.push((name, tag)),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, tag: impl Into<NbtTag>) -> Self {
        self.insert(name, tag);
        self
    }

    pub fn get(&self, name: &str) -> Option<&NbtTag> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, tag)| tag)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NbtTag)> {
        self.entries.iter().map(|(n, t)| (n.as_str(), t))
    }
}
