use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Monotonic time source shared by every history of one input hub.
///
/// Timestamps are seconds since the clock's origin, never wall-clock time,
/// so samples taken on different device axes stay comparable.
pub trait Clock: Send + Sync + Debug {
    /// Seconds elapsed since the origin.  Never negative, never decreasing.
    fn elapsed(&self) -> f64;

    fn elapsed_ms(&self) -> f64 {
        self.elapsed() * 1_000.0
    }

    fn elapsed_us(&self) -> f64 {
        self.elapsed() * 1_000_000.0
    }

    fn elapsed_ns(&self) -> f64 {
        self.elapsed() * 1_000_000_000.0
    }
}

/// Cheaply clonable handle to a [`Clock`].
pub type SharedClock = Arc<dyn Clock>;

/// Real clock backed by [`Instant`].
#[derive(Debug)]
pub struct MonotonicClock {
    origin: Mutex<Instant>,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Mutex::new(Instant::now()),
        }
    }

    /// Convenience constructor returning a [`SharedClock`].
    pub fn shared() -> SharedClock {
        Arc::new(Self::new())
    }

    /// Re-base the origin to "now".  Existing timestamps are not rewritten.
    pub fn reset(&self) {
        *self.origin.lock().unwrap_or_else(|e| e.into_inner()) = Instant::now();
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn elapsed(&self) -> f64 {
        let origin = *self.origin.lock().unwrap_or_else(|e| e.into_inner());
        origin.elapsed().as_secs_f64()
    }
}

/// Hand-driven clock for tests and scripted input.
///
/// Stores the current time as the bit pattern of an `f64`.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Jump to `secs`.  Moving backwards is ignored to keep the clock monotonic.
    pub fn set(&self, secs: f64) {
        let current = self.elapsed();
        if secs > current {
            self.now.store(secs.to_bits(), Ordering::Release);
        }
    }

    pub fn advance(&self, secs: f64) {
        self.set(self.elapsed() + secs.max(0.0));
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> f64 {
        f64::from_bits(self.now.load(Ordering::Acquire))
    }
}
