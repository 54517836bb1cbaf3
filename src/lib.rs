//! framed-image: animated map-art displays over raw play-state packets
//!
//! Images are quantized to the map color palette, split into 128×128 cells,
//! and shown as filled maps in item frames that exist only on the client.
//! Every packet is built here and written straight to each connection's
//! encoder, bypassing the host's entity and map APIs.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use framed_image::{
//!     CreateRequest, Facing, FrameService, Location, MemoryStore, ServiceConfig, StaticWorld,
//! };
//!
//! # async fn example() -> framed_image::error::Result<()> {
//! let config = ServiceConfig::default().dithering(true);
//! let service = Arc::new(FrameService::new(config, StaticWorld::new(), MemoryStore::new()));
//! let _driver = service.spawn_driver();
//!
//! service
//!     .create(CreateRequest {
//!         location: Location::new("world", 0, 80, 0),
//!         facing: Facing::South,
//!         width: 2,
//!         height: 2,
//!         source: "https://example.com/cat.gif".into(),
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod color;
pub mod config;
pub mod connection;
pub mod display;
pub mod error;
pub mod nbt;
pub mod protocol;
pub mod registry;
pub mod scheduler;
pub mod service;
pub mod source;
pub mod stats;
pub mod world;

pub use color::{CachedColorMatcher, ColorMatcher, DitheringMatcher, MatcherSet, Palette, PaletteVersion, Rgb};
pub use config::ServiceConfig;
pub use connection::{ChannelPipeline, ConnectionMap, EncoderContext, Pipeline, RecordingPipeline};
pub use display::{DisplayRecord, DisplayState, Facing, FrameDisplay, Location};
pub use error::{Error, Result};
pub use nbt::{NbtCompound, NbtEncoder, NbtList, NbtTag};
pub use protocol::{Packet, PacketBuilder, PacketKind};
pub use registry::{DisplayRegistry, DisplayStore, JsonFileStore, MemoryStore};
pub use scheduler::{TaskHandle, TickScheduler};
pub use service::{CreateRequest, FrameService};
pub use stats::{ServiceStats, StatsSnapshot};
pub use world::{ClientId, StaticWorld, WorldView};
