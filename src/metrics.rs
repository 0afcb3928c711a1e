// Install metrics module
//
// Provides lightweight counters for install activity

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Install activity counters
///
/// Uses atomic operations so the coordinator can record from any task without
/// locks. Typically logged on shutdown.
#[derive(Debug)]
pub struct Metrics {
    /// Installs that finished and wrote their state entry
    pub installs_completed: AtomicUsize,

    /// Installs that aborted
    pub installs_failed: AtomicUsize,

    pub uninstalls: AtomicUsize,

    /// Files copied into profiles
    pub files_copied: AtomicU64,

    /// Package files excluded or unrouted
    pub files_skipped: AtomicU64,

    /// Total time spent in successful installs, in milliseconds
    pub total_install_time_ms: AtomicU64,

    /// Install events delivered to at least one subscriber
    pub events_broadcast: AtomicU64,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            installs_completed: AtomicUsize::new(0),
            installs_failed: AtomicUsize::new(0),
            uninstalls: AtomicUsize::new(0),
            files_copied: AtomicU64::new(0),
            files_skipped: AtomicU64::new(0),
            total_install_time_ms: AtomicU64::new(0),
            events_broadcast: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a successful install and how long it took
    pub fn record_install_completed(&self, duration: Duration) {
        self.installs_completed.fetch_add(1, Ordering::Relaxed);
        self.total_install_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn record_install_failed(&self) {
        self.installs_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_uninstall(&self) {
        self.uninstalls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_files_copied(&self, count: usize) {
        self.files_copied.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_files_skipped(&self, count: usize) {
        self.files_skipped.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_event_broadcast(&self) {
        self.events_broadcast.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average duration of a successful install in milliseconds
    pub fn avg_install_time_ms(&self) -> f64 {
        let total = self.total_install_time_ms.load(Ordering::Relaxed);
        let count = self.installs_completed.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Install Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Installs: {} completed, {} failed; uninstalls: {}",
            self.installs_completed.load(Ordering::Relaxed),
            self.installs_failed.load(Ordering::Relaxed),
            self.uninstalls.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Files: {} copied, {} skipped",
            self.files_copied.load(Ordering::Relaxed),
            self.files_skipped.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Total install time: {:.2}s (avg: {:.2}ms per install)",
            self.total_install_time_ms.load(Ordering::Relaxed) as f64 / 1000.0,
            self.avg_install_time_ms()
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
