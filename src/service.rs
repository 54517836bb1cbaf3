//! Frame service
//!
//! Drives every display through its lifecycle:
//!
//! ```text
//!   Unregistered ──spawn──► Spawned            (one frame)
//!        │                  Animating          (timer advancing frames)
//!        └───────────────────────┴──destroy──► Destroyed
//! ```
//!
//! Spawn and destroy go to everyone in the display's world. Frame updates go
//! only to clients near the display that are not flagged quiet. A failed
//! write to one client is logged and skipped; it never stops the rest of a
//! broadcast.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};

use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::color::MatcherSet;
use crate::config::ServiceConfig;
use crate::connection::{ConnectionMap, EncoderContext, Pipeline};
use crate::display::{DisplayRecord, Facing, FrameDisplay, Location};
use crate::error::{Error, RegistryError, Result, WriteError};
use crate::protocol::{Packet, PacketBuilder};
use crate::registry::{DisplayRegistry, DisplayStore};
use crate::scheduler::{TaskHandle, TickScheduler};
use crate::source;
use crate::stats::ServiceStats;
use crate::world::{ClientId, WorldView};

/// A request to build a new display from a source image
#[derive(Debug, Clone)]
pub struct CreateRequest {
    /// Top-left block of the display
    pub location: Location,
    pub facing: Facing,
    /// Width in cells
    pub width: u32,
    /// Height in cells
    pub height: u32,
    /// URL or path of the image
    pub source: String,
}

/// Owns displays, connections and the frame timer
pub struct FrameService<W: WorldView, S: DisplayStore> {
    config: ServiceConfig,
    world: Arc<W>,
    registry: DisplayRegistry<S>,
    connections: ConnectionMap,
    encoder: EncoderContext,
    scheduler: Arc<TickScheduler>,
    builder: PacketBuilder,
    matchers: RwLock<MatcherSet>,
    timers: Mutex<HashMap<Uuid, TaskHandle>>,
    quiet: RwLock<HashSet<ClientId>>,
    stats: ServiceStats,
}

impl<W: WorldView, S: DisplayStore> FrameService<W, S> {
    pub fn new(config: ServiceConfig, world: W, store: S) -> Self {
        Self::with_world(config, Arc::new(world), store)
    }

    /// Create a service around a world view the host also holds
    pub fn with_world(config: ServiceConfig, world: Arc<W>, store: S) -> Self {
        Self {
            encoder: EncoderContext::new(config.encoder_marker.clone()),
            builder: PacketBuilder::new(config.builder_options()),
            matchers: RwLock::new(MatcherSet::new(config.dithering)),
            config,
            world,
            registry: DisplayRegistry::new(store),
            connections: ConnectionMap::new(),
            scheduler: Arc::new(TickScheduler::new()),
            timers: Mutex::new(HashMap::new()),
            quiet: RwLock::new(HashSet::new()),
            stats: ServiceStats::new(),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn world(&self) -> &Arc<W> {
        &self.world
    }

    pub fn registry(&self) -> &DisplayRegistry<S> {
        &self.registry
    }

    pub fn connections(&self) -> &ConnectionMap {
        &self.connections
    }

    pub fn scheduler(&self) -> &Arc<TickScheduler> {
        &self.scheduler
    }

    pub fn stats(&self) -> &ServiceStats {
        &self.stats
    }

    /// Spawn the task that drives frame timers in real time
    pub fn spawn_driver(&self) -> JoinHandle<()> {
        self.scheduler.spawn_driver(self.config.tick_duration)
    }

    // ---- connections ----

    /// Register a client's outbound pipeline
    pub fn register_connection(&self, client: impl Into<ClientId>, pipeline: Arc<dyn Pipeline>) {
        let client = client.into();
        tracing::debug!(client = %client, "Connection registered");
        self.connections.insert(client, pipeline);
    }

    /// Forget a client's pipeline
    pub fn unregister_connection(&self, client: &ClientId) {
        if self.connections.remove(client).is_some() {
            tracing::debug!(client = %client, "Connection unregistered");
        }
    }

    /// Suppress or resume per-tick frame updates for a client
    pub fn set_quiet(&self, client: impl Into<ClientId>, quiet: bool) {
        let client = client.into();
        let mut set = self.quiet.write().unwrap_or_else(|e| e.into_inner());
        let changed = if quiet {
            set.insert(client.clone())
        } else {
            set.remove(&client)
        };
        if changed {
            tracing::info!(client = %client, quiet = quiet, "Frame updates toggled");
        }
    }

    pub fn is_quiet(&self, client: &ClientId) -> bool {
        self.quiet
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(client)
    }

    // ---- write path ----

    /// Queue one packet at the encoder handler of `pipeline`
    ///
    /// Does not flush.
    pub fn write_packet(&self, pipeline: &dyn Pipeline, packet: &Packet) -> std::result::Result<(), WriteError> {
        let handler = self.encoder.resolve(pipeline)?;
        pipeline.write_at(&handler, packet)
    }

    /// Write a batch to one client and flush once
    ///
    /// Returns whether the whole batch went out. Failures are logged and
    /// counted, never returned.
    fn send_to(&self, client: &ClientId, packets: &[Packet]) -> bool {
        let Some(pipeline) = self.connections.get(client) else {
            tracing::trace!(client = %client, "No connection, skipping");
            return false;
        };

        let result = self
            .encoder
            .resolve(pipeline.as_ref())
            .map_err(WriteError::from)
            .and_then(|handler| pipeline.write_batch(&handler, packets));

        match result {
            Ok(()) => {
                self.stats.record_packets(packets.len());
                true
            }
            Err(e) if e.is_transient() => {
                self.stats.record_write_failure();
                tracing::warn!(client = %client, error = %e, "Write failed, skipping client");
                false
            }
            Err(e) => {
                self.stats.record_write_failure();
                tracing::error!(client = %client, error = %e, "Raw packet path unusable");
                false
            }
        }
    }

    // ---- display lifecycle ----

    /// Advance a display one frame and send it to nearby clients
    ///
    /// Returns the new frame index, or `None` if the display is destroyed.
    pub fn display_next_frame(&self, shown: &FrameDisplay) -> Option<usize> {
        if shown.state() == crate::display::DisplayState::Destroyed {
            return None;
        }

        let frame = shown.advance();
        self.stats.record_frame();

        let packets = self.builder.frame_update(shown, frame);
        let recipients = self
            .world
            .nearby_players(shown.location(), self.config.view_radius);

        for client in recipients.iter().filter(|c| !self.is_quiet(c)) {
            self.send_to(client, &packets);
        }

        tracing::trace!(
            display = %shown.id(),
            frame = frame,
            recipients = recipients.len(),
            "Frame advanced"
        );
        Some(frame)
    }

    /// Show a display to everyone in its world and start its timer
    pub fn spawn(self: &Arc<Self>, shown: &Arc<FrameDisplay>) {
        if shown.state() == crate::display::DisplayState::Destroyed {
            return;
        }

        let packets = self.builder.spawn(shown);
        for client in self.world.players_in_world(shown.world()) {
            self.send_to(&client, &packets);
        }
        self.stats.record_spawn();
        shown.mark_spawned();

        if shown.is_animated() {
            self.start_timer(shown);
        }

        tracing::debug!(
            display = %shown.id(),
            cells = shown.cells().len(),
            frames = shown.frame_count(),
            "Display spawned"
        );
    }

    /// Show a display to one client, at its current frame
    pub fn spawn_for(&self, shown: &FrameDisplay, client: &ClientId) {
        let mut packets = self.builder.spawn(shown);
        let current = shown.current_frame();
        if current != 0 {
            packets.extend(self.builder.frame_update(shown, current));
        }

        if self.send_to(client, &packets) {
            self.stats.record_spawn();
        }
    }

    /// Show every display in `world` to a client that just arrived there
    pub async fn spawn_player(&self, client: &ClientId, world: &str) {
        let displays = self.registry.displays_in(world).await;
        for shown in &displays {
            self.spawn_for(shown, client);
        }
        tracing::debug!(client = %client, world = %world, displays = displays.len(), "Player spawned displays");
    }

    /// Stop a display's timer and remove it from everyone in its world
    ///
    /// Calling this again on the same display does nothing.
    pub fn destroy(&self, shown: &FrameDisplay) {
        self.stop_timer(shown.id());

        if !shown.mark_destroyed() {
            return;
        }

        let packets = self.builder.destroy(shown);
        for client in self.world.players_in_world(shown.world()) {
            self.send_to(&client, &packets);
        }

        tracing::debug!(display = %shown.id(), "Display destroyed");
    }

    /// Remove a display from one client only
    pub fn destroy_for(&self, shown: &FrameDisplay, client: &ClientId) {
        let packets = self.builder.destroy(shown);
        self.send_to(client, &packets);
    }

    /// Remove every display in `world` from a client leaving it
    pub async fn destroy_player(&self, client: &ClientId, world: &str) {
        for shown in self.registry.displays_in(world).await {
            self.destroy_for(&shown, client);
        }
    }

    /// Whether a display currently has a frame timer
    pub fn is_animating(&self, id: Uuid) -> bool {
        self.timers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(&id)
    }

    fn start_timer(self: &Arc<Self>, shown: &Arc<FrameDisplay>) {
        let mut timers = self.timers.lock().unwrap_or_else(|e| e.into_inner());
        if timers.contains_key(&shown.id()) {
            return;
        }

        let service = Arc::downgrade(self);
        let target = Arc::clone(shown);
        let handle = self
            .scheduler
            .schedule_recurring(self.config.frame_interval_ticks, move || {
                if let Some(service) = service.upgrade() {
                    service.display_next_frame(&target);
                }
            });
        timers.insert(shown.id(), handle);
    }

    fn stop_timer(&self, id: Uuid) {
        let handle = self
            .timers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&id);
        if let Some(handle) = handle {
            self.scheduler.cancel(&handle);
        }
    }

    // ---- registry ----

    /// Spawn a display, index it and persist
    pub async fn add(self: &Arc<Self>, shown: Arc<FrameDisplay>) -> Result<()> {
        let mut txn = self.registry.lock().await;
        if txn.get(shown.id()).is_some() {
            return Err(RegistryError::DuplicateDisplay(shown.id()).into());
        }

        self.spawn(&shown);
        txn.insert(Arc::clone(&shown))?;
        txn.persist().await?;

        tracing::info!(
            display = %shown.id(),
            location = %shown.location(),
            width = shown.width(),
            height = shown.height(),
            frames = shown.frame_count(),
            "Display added"
        );
        Ok(())
    }

    /// Destroy a display, drop it from the index and persist
    pub async fn remove(&self, id: Uuid) -> Result<Arc<FrameDisplay>> {
        let mut txn = self.registry.lock().await;
        let shown = txn.get(id).ok_or(RegistryError::DisplayNotFound(id))?;

        self.destroy(&shown);
        txn.remove(id);
        txn.persist().await?;

        tracing::info!(display = %id, "Display removed");
        Ok(shown)
    }

    /// Destroy every display, clear the index and persist
    pub async fn remove_all(&self) -> Result<usize> {
        let mut txn = self.registry.lock().await;
        let displays = txn.drain();
        for shown in &displays {
            self.destroy(shown);
        }
        txn.persist().await?;

        tracing::info!(count = displays.len(), "All displays removed");
        Ok(displays.len())
    }

    /// Live displays in one world
    pub async fn displays_in(&self, world: &str) -> Vec<Arc<FrameDisplay>> {
        self.registry.displays_in(world).await
    }

    pub async fn display_count(&self) -> usize {
        self.registry.len().await
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<FrameDisplay>> {
        self.registry.get(id).await
    }

    // ---- creation ----

    /// Rebuild a display from its persisted record
    ///
    /// Fetches and quantizes the source again; nothing is registered.
    pub async fn create_frame_display(&self, record: &DisplayRecord) -> Result<FrameDisplay> {
        self.check_dimensions(record.width, record.height)?;

        let matcher = self
            .matchers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(self.config.palette);

        let indexed = source::load_indexed(
            &record.source,
            record.width,
            record.height,
            self.config.max_source_bytes,
            matcher,
        )
        .await?;

        FrameDisplay::from_indexed(
            record.id,
            record.location.clone(),
            record.facing,
            record.width,
            record.height,
            record.source.clone(),
            indexed,
        )
    }

    /// Reject empty displays and ones over `max_cells`
    fn check_dimensions(&self, width: u32, height: u32) -> Result<()> {
        match width.checked_mul(height) {
            Some(cells) if cells > 0 && cells <= self.config.max_cells => Ok(()),
            _ => Err(Error::InvalidDimensions { width, height }),
        }
    }

    /// Build a new display from a source image and add it
    ///
    /// Nothing is registered unless the source loads completely.
    pub async fn create(self: &Arc<Self>, request: CreateRequest) -> Result<Arc<FrameDisplay>> {
        let CreateRequest {
            location,
            facing,
            width,
            height,
            source,
        } = request;

        self.check_dimensions(width, height)?;

        let record = DisplayRecord {
            id: Uuid::new_v4(),
            location,
            facing,
            width,
            height,
            source,
        };

        let shown = match self.create_frame_display(&record).await {
            Ok(shown) => Arc::new(shown),
            Err(e) => {
                tracing::warn!(source = %record.source, error = %e, "Display creation failed");
                return Err(e);
            }
        };

        self.add(Arc::clone(&shown)).await?;
        Ok(shown)
    }

    /// Replace every live display with what the store holds
    ///
    /// Matchers are rebuilt first, so caches start empty. Records whose
    /// source fails to load are logged and kept in the store for the next
    /// reload. The registry stays locked until the new snapshot is
    /// persisted; concurrent `add` and `remove` wait for the reload.
    /// Returns the number of displays now live.
    pub async fn reload(self: &Arc<Self>) -> Result<usize> {
        let mut txn = self.registry.lock().await;
        let records = self.registry.store().load().await?;

        for shown in txn.drain() {
            self.destroy(&shown);
        }

        *self.matchers.write().unwrap_or_else(|e| e.into_inner()) =
            MatcherSet::new(self.config.dithering);

        let mut failed = Vec::new();
        for record in records {
            if txn.get(record.id).is_some() {
                tracing::warn!(display = %record.id, "Duplicate display id in store, skipping");
                continue;
            }

            match self.create_frame_display(&record).await {
                Ok(shown) => {
                    let shown = Arc::new(shown);
                    self.spawn(&shown);
                    txn.insert(shown)?;
                }
                Err(e) => {
                    tracing::warn!(
                        display = %record.id,
                        source = %record.source,
                        error = %e,
                        "Failed to reload display"
                    );
                    failed.push(record);
                }
            }
        }

        let live = txn.all().len();
        txn.persist_with(&failed).await?;

        tracing::info!(
            loaded = live,
            failed = failed.len(),
            dithering = self.config.dithering,
            glow = self.config.glow,
            "Displays reloaded"
        );
        Ok(live)
    }

    /// Destroy everything and drop all connections without persisting
    pub async fn shutdown(&self) {
        let displays = self.registry.lock().await.drain();
        for shown in &displays {
            self.destroy(shown);
        }
        self.scheduler.clear();
        self.timers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        self.connections.clear();

        tracing::info!(displays = displays.len(), "Frame service shut down");
    }
}

impl<W: WorldView, S: DisplayStore> std::fmt::Debug for FrameService<W, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameService")
            .field("config", &self.config)
            .field("connections", &self.connections.len())
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::RecordingPipeline;
    use crate::display::frame::tests::solid_display;
    use crate::source::decode::tests::png_bytes;
    use crate::display::DisplayState;
    use crate::protocol::PacketKind;
    use crate::registry::MemoryStore;
    use crate::world::StaticWorld;

    fn service() -> Arc<FrameService<StaticWorld, MemoryStore>> {
        Arc::new(FrameService::new(
            ServiceConfig::default(),
            StaticWorld::new(),
            MemoryStore::new(),
        ))
    }

    fn join(
        service: &FrameService<StaticWorld, MemoryStore>,
        name: &str,
        location: Location,
    ) -> Arc<RecordingPipeline> {
        let pipeline = Arc::new(RecordingPipeline::with_marker());
        service.world().place(name, location);
        service.register_connection(name, pipeline.clone());
        pipeline
    }

    #[tokio::test]
    async fn test_add_spawns_and_persists() {
        let service = service();
        let alice = join(&service, "alice", Location::new("world", 0, 64, 0));
        let shown = Arc::new(solid_display(2, 1, 1));

        service.add(Arc::clone(&shown)).await.unwrap();

        assert_eq!(alice.batches().len(), 1);
        assert_eq!(alice.packets().len(), 6);
        assert_eq!(service.display_count().await, 1);
        assert_eq!(service.registry().store().records()[0].id, shown.id());
        assert_eq!(shown.state(), DisplayState::Spawned);
        assert!(!service.is_animating(shown.id()));
    }

    #[tokio::test]
    async fn test_add_duplicate() {
        let service = service();
        let shown = Arc::new(solid_display(1, 1, 1));

        service.add(Arc::clone(&shown)).await.unwrap();
        let result = service.add(shown).await;
        assert!(matches!(
            result,
            Err(Error::Registry(RegistryError::DuplicateDisplay(_)))
        ));
    }

    #[tokio::test]
    async fn test_animated_display_ticks() {
        let service = service();
        let alice = join(&service, "alice", Location::new("world", 10, 64, 10));
        let shown = Arc::new(solid_display(1, 1, 3));

        service.add(Arc::clone(&shown)).await.unwrap();
        assert!(service.is_animating(shown.id()));
        alice.clear();

        service.scheduler().tick();
        service.scheduler().tick();

        assert_eq!(shown.current_frame(), 2);
        assert_eq!(alice.packets_of(PacketKind::MapData).len(), 2);
        assert_eq!(service.stats().snapshot().frames_advanced, 2);
    }

    #[tokio::test]
    async fn test_far_player_gets_no_updates() {
        let service = service();
        let far = join(&service, "far", Location::new("world", 1000, 64, 0));
        let shown = Arc::new(solid_display(1, 1, 2));

        service.add(shown).await.unwrap();
        // same world, so spawn arrives
        assert_eq!(far.packets_of(PacketKind::SpawnEntity).len(), 1);
        far.clear();

        service.scheduler().tick();
        assert!(far.packets().is_empty());
    }

    #[tokio::test]
    async fn test_failing_client_does_not_stop_broadcast() {
        let service = service();
        let broken = join(&service, "broken", Location::new("world", 0, 64, 0));
        let fine = join(&service, "fine", Location::new("world", 1, 64, 0));
        broken.set_failing(true);

        let shown = Arc::new(solid_display(1, 1, 2));
        service.add(Arc::clone(&shown)).await.unwrap();
        service.display_next_frame(&shown);

        assert_eq!(fine.batches().len(), 2);
        assert!(broken.packets().is_empty());
        assert_eq!(service.stats().snapshot().write_failures, 2);
    }

    #[tokio::test]
    async fn test_missing_marker_is_reported_not_panicked() {
        let service = service();
        let odd = Arc::new(RecordingPipeline::new(vec!["decoder".into(), "encoder".into()]));
        service.world().place("odd", Location::new("world", 0, 64, 0));
        service.register_connection("odd", odd.clone());

        service.add(Arc::new(solid_display(1, 1, 1))).await.unwrap();
        assert!(odd.packets().is_empty());
        assert_eq!(service.stats().snapshot().write_failures, 1);
    }

    #[tokio::test]
    async fn test_spawn_for_sends_current_frame() {
        let service = service();
        let shown = Arc::new(solid_display(1, 1, 3));
        service.add(Arc::clone(&shown)).await.unwrap();
        service.scheduler().tick();

        let late = join(&service, "late", Location::new("world", 0, 64, 0));
        service.spawn_player(&ClientId::from("late"), "world").await;

        let batches = late.batches();
        assert_eq!(batches.len(), 1);
        let kinds: Vec<PacketKind> = batches[0].iter().map(|p| p.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                PacketKind::SpawnEntity,
                PacketKind::EntityMetadata,
                PacketKind::MapData,
                PacketKind::MapData
            ]
        );
        // last map packet carries frame 1 (fill byte 5)
        assert_eq!(*batches[0][3].data().last().unwrap(), 5);
    }

    #[tokio::test]
    async fn test_destroy_for_one_client() {
        let service = service();
        let a = join(&service, "a", Location::new("world", 0, 64, 0));
        let b = join(&service, "b", Location::new("world", 0, 64, 0));
        let shown = Arc::new(solid_display(2, 2, 2));
        service.add(Arc::clone(&shown)).await.unwrap();

        service
            .destroy_player(&ClientId::from("a"), "world")
            .await;

        assert_eq!(a.packets_of(PacketKind::DestroyEntities).len(), 4);
        assert!(b.packets_of(PacketKind::DestroyEntities).is_empty());
        assert!(service.is_animating(shown.id()));
    }

    #[tokio::test]
    async fn test_remove_unknown() {
        let service = service();
        let id = Uuid::new_v4();
        let result = service.remove(id).await;
        assert!(matches!(
            result,
            Err(Error::Registry(RegistryError::DisplayNotFound(found))) if found == id
        ));
    }

    #[tokio::test]
    async fn test_remove_all() {
        let service = service();
        let a = Arc::new(solid_display(1, 1, 2));
        let b = Arc::new(solid_display(1, 1, 1));
        service.add(Arc::clone(&a)).await.unwrap();
        service.add(Arc::clone(&b)).await.unwrap();

        assert_eq!(service.remove_all().await.unwrap(), 2);
        assert_eq!(service.display_count().await, 0);
        assert!(service.registry().store().records().is_empty());
        assert!(service.scheduler().is_empty());
        assert_eq!(a.state(), DisplayState::Destroyed);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let service = service();
        service.registry().store().set_failing(true);

        let result = service.add(Arc::new(solid_display(1, 1, 1))).await;
        assert!(matches!(result, Err(Error::Store(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_dimensions() {
        let service = service();
        for (width, height) in [(0, 1), (1, 0), (9, 9)] {
            let result = service
                .create(CreateRequest {
                    location: Location::new("world", 0, 64, 0),
                    facing: Facing::North,
                    width,
                    height,
                    source: "unused.png".into(),
                })
                .await;
            assert!(matches!(result, Err(Error::InvalidDimensions { .. })));
        }
        assert_eq!(service.display_count().await, 0);
    }

    #[tokio::test]
    async fn test_persisted_oversized_record_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.png");
        tokio::fs::write(&path, png_bytes(4, 4, [10, 200, 10, 255]))
            .await
            .unwrap();

        let oversized = DisplayRecord {
            id: Uuid::new_v4(),
            location: Location::new("world", 0, 64, 0),
            facing: Facing::North,
            width: 40_000_000,
            height: 1,
            source: path.to_str().unwrap().to_string(),
        };
        let service = Arc::new(FrameService::new(
            ServiceConfig::default(),
            StaticWorld::new(),
            MemoryStore::with_records(vec![oversized.clone()]),
        ));

        let result = service.create_frame_display(&oversized).await;
        assert!(matches!(
            result,
            Err(Error::InvalidDimensions {
                width: 40_000_000,
                height: 1
            })
        ));

        // over max_cells without overflowing
        let wide = DisplayRecord {
            width: 65,
            ..oversized.clone()
        };
        assert!(matches!(
            service.create_frame_display(&wide).await,
            Err(Error::InvalidDimensions { .. })
        ));

        assert_eq!(service.reload().await.unwrap(), 0);
        assert_eq!(service.registry().store().records(), vec![oversized]);
    }

    #[tokio::test]
    async fn test_create_bad_source_registers_nothing() {
        let service = service();
        let result = service
            .create(CreateRequest {
                location: Location::new("world", 0, 64, 0),
                facing: Facing::North,
                width: 1,
                height: 1,
                source: "/nonexistent/framed-image.png".into(),
            })
            .await;

        assert!(matches!(result, Err(Error::Source(_))));
        assert_eq!(service.display_count().await, 0);
        assert_eq!(service.registry().store().save_count(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_does_not_persist() {
        let service = service();
        let alice = join(&service, "alice", Location::new("world", 0, 64, 0));
        service.add(Arc::new(solid_display(1, 1, 2))).await.unwrap();

        service.shutdown().await;

        assert_eq!(alice.packets_of(PacketKind::DestroyEntities).len(), 1);
        assert_eq!(service.registry().store().records().len(), 1);
        assert!(service.connections().is_empty());
        assert!(service.scheduler().is_empty());
    }
}
