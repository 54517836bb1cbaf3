//! Statistics for the frame service

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Live counters, updated from the tick path and from service calls
#[derive(Debug)]
pub struct ServiceStats {
    started_at: Instant,
    packets_written: AtomicU64,
    frames_advanced: AtomicU64,
    write_failures: AtomicU64,
    displays_spawned: AtomicU64,
}

impl ServiceStats {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            packets_written: AtomicU64::new(0),
            frames_advanced: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
            displays_spawned: AtomicU64::new(0),
        }
    }

    pub(crate) fn record_packets(&self, count: usize) {
        self.packets_written
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_frame(&self) {
        self.frames_advanced.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_write_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_spawn(&self) {
        self.displays_spawned.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            uptime: self.started_at.elapsed(),
            packets_written: self.packets_written.load(Ordering::Relaxed),
            frames_advanced: self.frames_advanced.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            displays_spawned: self.displays_spawned.load(Ordering::Relaxed),
        }
    }
}

impl Default for ServiceStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy of [`ServiceStats`] at one instant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub uptime: Duration,
    /// Packets accepted by connection pipelines
    pub packets_written: u64,
    /// Animation steps across all displays
    pub frames_advanced: u64,
    /// Writes or flushes rejected by a connection
    pub write_failures: u64,
    /// Spawn operations (all viewers or one)
    pub displays_spawned: u64,
}

impl StatsSnapshot {
    /// Average packets written per second of uptime
    pub fn packet_rate(&self) -> f64 {
        let secs = self.uptime.as_secs_f64();
        if secs > 0.0 {
            self.packets_written as f64 / secs
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let stats = ServiceStats::new();
        stats.record_packets(4);
        stats.record_packets(2);
        stats.record_frame();
        stats.record_write_failure();
        stats.record_spawn();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.packets_written, 6);
        assert_eq!(snapshot.frames_advanced, 1);
        assert_eq!(snapshot.write_failures, 1);
        assert_eq!(snapshot.displays_spawned, 1);
    }

    #[test]
    fn test_packet_rate_zero_uptime() {
        let snapshot = StatsSnapshot::default();
        assert_eq!(snapshot.packet_rate(), 0.0);
    }

    #[test]
    fn test_packet_rate() {
        let snapshot = StatsSnapshot {
            uptime: Duration::from_secs(4),
            packets_written: 100,
            ..Default::default()
        };
        assert_eq!(snapshot.packet_rate(), 25.0);
    }
}
