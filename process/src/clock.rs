// Clock sources for process uptime.
//
// The sandbox has no wall clock of its own, so the time source is a seam:
// hosts with `std` use `SystemClock`, everything else drives a `ManualClock`
// from whatever tick source the embedder has.

use core::sync::atomic::{AtomicU64, Ordering};

// ---------------------------------------------------------------------------
// Clock trait
// ---------------------------------------------------------------------------

/// A millisecond time source.
pub trait Clock: Send + Sync {
    /// Current time in milliseconds from an arbitrary fixed origin.
    fn now_ms(&self) -> u64;
}

// ---------------------------------------------------------------------------
// ManualClock
// ---------------------------------------------------------------------------

/// Clock advanced explicitly by the embedder.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicU64,
}

impl ManualClock {
    /// Create a clock reading zero.
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Create a clock reading `ms`.
    pub fn starting_at(ms: u64) -> Self {
        Self {
            now_ms: AtomicU64::new(ms),
        }
    }

    /// Move the clock forward by `ms`.
    pub fn advance(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::Relaxed);
    }

    /// Set the clock to an absolute reading. May move it backward.
    pub fn set(&self, ms: u64) {
        self.now_ms.store(ms, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// SystemClock
// ---------------------------------------------------------------------------

/// Monotonic clock backed by `std::time::Instant`.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
