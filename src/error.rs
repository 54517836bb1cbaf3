//! Error types
//!
//! Each subsystem has its own error enum; [`Error`] wraps them for the
//! service-level operations that can fail for more than one reason.

use std::fmt;

use uuid::Uuid;

/// Result alias for service-level operations
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-level error
#[derive(Debug)]
pub enum Error {
    /// I/O failure outside of a connection write
    Io(std::io::Error),
    /// The raw protocol path is unusable on this host
    Protocol(ProtocolError),
    /// Source image could not be fetched or decoded
    Source(SourceError),
    /// Registry lookup or insertion failed
    Registry(RegistryError),
    /// Persisted snapshot could not be read or written
    Store(StoreError),
    /// Width or height rejected before any work was done
    InvalidDimensions { width: u32, height: u32 },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Protocol(e) => write!(f, "Protocol error: {}", e),
            Error::Source(e) => write!(f, "Source image error: {}", e),
            Error::Registry(e) => write!(f, "Registry error: {}", e),
            Error::Store(e) => write!(f, "Store error: {}", e),
            Error::InvalidDimensions { width, height } => {
                write!(f, "Invalid display dimensions: {}x{}", width, height)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Protocol(e) => Some(e),
            Error::Source(e) => Some(e),
            Error::Registry(e) => Some(e),
            Error::Store(e) => Some(e),
            Error::InvalidDimensions { .. } => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<ProtocolError> for Error {
    fn from(e: ProtocolError) -> Self {
        Error::Protocol(e)
    }
}

impl From<SourceError> for Error {
    fn from(e: SourceError) -> Self {
        Error::Source(e)
    }
}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Error::Registry(e)
    }
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Error::Store(e)
    }
}

/// Structured-data construction errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NbtError {
    /// A list was given elements of more than one tag type
    HeterogeneousList { expected: u8, found: u8 },
}

impl fmt::Display for NbtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NbtError::HeterogeneousList { expected, found } => write!(
                f,
                "List element type mismatch: expected tag {}, found tag {}",
                expected, found
            ),
        }
    }
}

impl std::error::Error for NbtError {}

/// Raw protocol path errors
///
/// These mean the host does not look the way this crate expects and are not
/// worth retrying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// No handler follows the encoder marker in the outbound chain
    EncoderHandlerNotFound { marker: String },
    /// A write targeted a handler the chain does not contain
    UnknownHandler(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::EncoderHandlerNotFound { marker } => {
                write!(f, "Couldn't find encoder handler after '{}'", marker)
            }
            ProtocolError::UnknownHandler(name) => {
                write!(f, "Handler not present in pipeline: {}", name)
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Failure writing to a single connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteError {
    /// The connection has gone away
    Closed,
    /// The connection reported an I/O error
    Io(String),
    /// The write path itself is broken
    Protocol(ProtocolError),
}

impl WriteError {
    /// Whether skipping this recipient and carrying on is the right response
    pub fn is_transient(&self) -> bool {
        !matches!(self, WriteError::Protocol(_))
    }
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteError::Closed => write!(f, "Connection closed"),
            WriteError::Io(msg) => write!(f, "Connection write failed: {}", msg),
            WriteError::Protocol(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for WriteError {}

impl From<ProtocolError> for WriteError {
    fn from(e: ProtocolError) -> Self {
        WriteError::Protocol(e)
    }
}

/// Source image fetch/decode errors
#[derive(Debug)]
pub enum SourceError {
    /// Download or file read failed
    Fetch(String),
    /// Bytes could not be decoded as an image
    Decode(image::ImageError),
    /// Decoding succeeded but produced no frames
    NoFrames,
    /// Source larger than the configured limit
    TooLarge { limit: usize },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Fetch(msg) => write!(f, "Failed to fetch source: {}", msg),
            SourceError::Decode(e) => write!(f, "Failed to decode source: {}", e),
            SourceError::NoFrames => write!(f, "Source contains no frames"),
            SourceError::TooLarge { limit } => {
                write!(f, "Source exceeds {} bytes", limit)
            }
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<image::ImageError> for SourceError {
    fn from(e: image::ImageError) -> Self {
        SourceError::Decode(e)
    }
}

/// Display registry errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No live display has this id
    DisplayNotFound(Uuid),
    /// A live display already has this id
    DuplicateDisplay(Uuid),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::DisplayNotFound(id) => write!(f, "Display not found: {}", id),
            RegistryError::DuplicateDisplay(id) => write!(f, "Display already registered: {}", id),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Persistence errors
#[derive(Debug)]
pub enum StoreError {
    /// Reading or writing the snapshot failed
    Io(std::io::Error),
    /// The snapshot could not be (de)serialized
    Serialization(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "Store I/O failed: {}", e),
            StoreError::Serialization(e) => write!(f, "Store serialization failed: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Serialization(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e)
    }
}
