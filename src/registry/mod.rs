//! Display registry and persistence
//!
//! The registry holds every live display, indexed by world name. Changes go
//! through a [`RegistryTxn`] that also owns the store for its duration, so
//! the in-memory index and the persisted snapshot change together.
//!
//! # Architecture
//!
//! ```text
//!                   Arc<DisplayRegistry<S>>
//!              ┌──────────────────────────────┐
//!              │ Mutex<BTreeMap<World,        │
//!              │   Vec<Arc<FrameDisplay>>>>   │
//!              │ store: S (DisplayStore)      │
//!              └──────────────┬───────────────┘
//!                             │ lock()
//!                             ▼
//!                        RegistryTxn
//!              insert / remove / drain ──► persist()
//! ```
//!
//! Tick callbacks never touch the registry; they hold the display itself.

pub mod persist;
pub mod store;

pub use persist::{DisplayStore, JsonFileStore, MemoryStore};
pub use store::{DisplayRegistry, RegistryTxn};
